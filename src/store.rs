//! Transposition store mapping position keys to search nodes.
//!
//! The store is a fixed array of `TABLE_BUCKETS` buckets. A key's 64-bit
//! digest picks the bucket and the bucket holds `(key, node)` pairs. Keys carry
//! both bitboards and the side to move, so two different positions never
//! share an entry even when their digests collide.

use std::fmt;
use std::hash::{Hash, Hasher};

use rustc_hash::FxHasher;

use crate::constants::TABLE_BUCKETS;
use crate::error::{Error, Result};
use crate::position::Player;

/// Key of a position in the transposition store.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct StateKey {
    black: u64,
    white: u64,
    turn: Player,
}

impl StateKey {
    pub fn new(black: u64, white: u64, turn: Player) -> Self {
        Self { black, white, turn }
    }

    /// 64-bit digest used to address a bucket.
    pub fn digest(&self) -> u64 {
        let mut hasher = FxHasher::default();
        self.hash(&mut hasher);
        hasher.finish()
    }

    #[inline]
    fn bucket(&self) -> usize {
        (self.digest() % TABLE_BUCKETS as u64) as usize
    }
}

impl fmt::Display for StateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let side = self.turn.symbol();
        write!(f, "{:016x}:{:016x}:{side}", self.black, self.white)
    }
}

/// Fixed-bucket hash table from `StateKey` to `T`.
pub struct TranspositionStore<T> {
    buckets: Vec<Vec<(StateKey, T)>>,
    len: usize,
}

impl<T> Default for TranspositionStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TranspositionStore<T> {
    pub fn new() -> Self {
        Self {
            buckets: (0..TABLE_BUCKETS).map(|_| Vec::new()).collect(),
            len: 0,
        }
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn contains(&self, key: &StateKey) -> bool {
        self.lookup(key).is_some()
    }

    /// Entry for `key`, if present.
    pub fn lookup(&self, key: &StateKey) -> Option<&T> {
        self.buckets[key.bucket()]
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Mutable entry for `key`, if present. The borrow is tied to the store.
    pub fn get_mut(&mut self, key: &StateKey) -> Option<&mut T> {
        self.buckets[key.bucket()]
            .iter_mut()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Entry for `key`, or `Error::KeyNotFound`.
    pub fn get(&self, key: &StateKey) -> Result<&T> {
        self.lookup(key).ok_or(Error::KeyNotFound(*key))
    }

    /// Insert `value` under `key` unless an entry is already there.
    ///
    /// Returns `true` when the value was stored. An existing entry is kept
    /// untouched, so repeated inserts of the same key are harmless.
    pub fn insert(&mut self, key: StateKey, value: T) -> bool {
        let bucket = &mut self.buckets[key.bucket()];
        if bucket.iter().any(|(k, _)| *k == key) {
            return false;
        }
        bucket.push((key, value));
        self.len += 1;
        true
    }

    /// Remove and return the entry for `key`.
    pub fn remove(&mut self, key: &StateKey) -> Option<T> {
        let bucket = &mut self.buckets[key.bucket()];
        let index = bucket.iter().position(|(k, _)| k == key)?;
        self.len -= 1;
        Some(bucket.swap_remove(index).1)
    }

    /// Apply `f` to the stored entry for `key` in place.
    pub fn update<R>(&mut self, key: &StateKey, f: impl FnOnce(&mut T) -> R) -> Result<R> {
        self.get_mut(key).map(f).ok_or(Error::KeyNotFound(*key))
    }

    /// Entry for `key`, inserting `make()` first when absent.
    pub fn get_or_insert_with(&mut self, key: StateKey, make: impl FnOnce() -> T) -> &mut T {
        let index = key.bucket();
        let pos = match self.buckets[index].iter().position(|(k, _)| *k == key) {
            Some(pos) => pos,
            None => {
                self.buckets[index].push((key, make()));
                self.len += 1;
                self.buckets[index].len() - 1
            }
        };
        &mut self.buckets[index][pos].1
    }

    /// Iterate over all `(key, value)` pairs in bucket order.
    pub fn iter(&self) -> impl Iterator<Item = (&StateKey, &T)> {
        self.buckets
            .iter()
            .flat_map(|bucket| bucket.iter().map(|(k, v)| (k, v)))
    }
}

impl<T> fmt::Display for TranspositionStore<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Transposition store ({} entries)", self.len)?;
        for (index, bucket) in self.buckets.iter().enumerate() {
            if bucket.is_empty() {
                continue;
            }
            writeln!(f, "bucket {index}:")?;
            for (key, _) in bucket {
                writeln!(f, "  {key}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(n: u64) -> StateKey {
        StateKey::new(n, n << 32, Player::Black)
    }

    #[test]
    fn test_insert_and_get() {
        let mut store = TranspositionStore::new();
        assert!(store.insert(key(1), 10));
        assert!(store.contains(&key(1)));
        assert_eq!(store.get(&key(1)), Ok(&10));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_get_missing_is_key_not_found() {
        let store: TranspositionStore<u32> = TranspositionStore::new();
        assert_eq!(store.get(&key(7)), Err(Error::KeyNotFound(key(7))));
        assert!(store.lookup(&key(7)).is_none());
    }

    #[test]
    fn test_insert_keeps_first_value() {
        let mut store = TranspositionStore::new();
        assert!(store.insert(key(3), "first"));
        assert!(!store.insert(key(3), "second"));
        assert_eq!(store.get(&key(3)), Ok(&"first"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_turn_is_part_of_the_key() {
        let mut store = TranspositionStore::new();
        let black = StateKey::new(5, 9, Player::Black);
        let white = StateKey::new(5, 9, Player::White);
        store.insert(black, 1);
        store.insert(white, 2);
        assert_eq!(store.get(&black), Ok(&1));
        assert_eq!(store.get(&white), Ok(&2));
    }

    #[test]
    fn test_update_mutates_in_place() {
        let mut store = TranspositionStore::new();
        store.insert(key(4), vec![1]);
        let len = store.update(&key(4), |v| {
            v.push(2);
            v.len()
        });
        assert_eq!(len, Ok(2));
        assert_eq!(store.get(&key(4)), Ok(&vec![1, 2]));
        assert_eq!(store.update(&key(5), |v| v.len()), Err(Error::KeyNotFound(key(5))));
    }

    #[test]
    fn test_remove() {
        let mut store = TranspositionStore::new();
        store.insert(key(8), 'a');
        assert_eq!(store.remove(&key(8)), Some('a'));
        assert_eq!(store.remove(&key(8)), None);
        assert!(store.is_empty());
    }

    #[test]
    fn test_same_bucket_entries_stay_distinct() {
        let mut store = TranspositionStore::new();
        let first = key(1);
        let target = first.bucket();
        let second = (2..).map(key).find(|k| k.bucket() == target).unwrap();

        store.insert(first, 1);
        store.insert(second, 2);
        assert_eq!(store.get(&first), Ok(&1));
        assert_eq!(store.get(&second), Ok(&2));
        store.remove(&first);
        assert_eq!(store.get(&second), Ok(&2));
    }

    #[test]
    fn test_get_or_insert_with() {
        let mut store = TranspositionStore::new();
        *store.get_or_insert_with(key(2), || 0) += 5;
        *store.get_or_insert_with(key(2), || 100) += 1;
        assert_eq!(store.get(&key(2)), Ok(&6));
        assert_eq!(store.iter().count(), 1);
    }

    #[test]
    fn test_display_lists_keys() {
        let mut store = TranspositionStore::new();
        store.insert(StateKey::new(1, 2, Player::White), ());
        let text = store.to_string();
        assert!(text.contains("1 entries"));
        assert!(text.contains("0000000000000001:0000000000000002:W"));
    }
}
