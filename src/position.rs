//! Othello position representation and move execution.
//!
//! This module provides the core game logic, including:
//! - Board state kept both as an 8x8 grid and as one bitboard per color
//! - Legality checking and directional capture
//! - Terminal detection and final scoring helpers
//! - Coordinate parsing for the text interfaces
//!
//! Every public operation takes a `&Position` and returns a fresh value.
//! In-place mutation is limited to the crate, where searches and playouts
//! work on their own clones.

use std::fmt;

use anyhow::{bail, ensure};

use crate::constants::{BOARD_SIZE, DIRECTIONS, NUM_CELLS, START_BLACK, START_WHITE};
use crate::error::{Error, Result};
use crate::store::StateKey;

/// One of the two sides. Black moves first.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Player {
    Black,
    White,
}

impl Player {
    /// The other side.
    #[inline]
    pub fn opponent(self) -> Self {
        match self {
            Player::Black => Player::White,
            Player::White => Player::Black,
        }
    }

    /// Character used when printing a board.
    pub fn symbol(self) -> char {
        match self {
            Player::Black => 'B',
            Player::White => 'W',
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Player::Black => write!(f, "Black"),
            Player::White => write!(f, "White"),
        }
    }
}

/// A move: a piece placed on `(row, col)`, or a pass.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Move {
    Place { row: usize, col: usize },
    Pass,
}

/// The pass sentinel returned when the side to move has no placement.
pub const PASS_MOVE: Move = Move::Pass;

/// An Othello position.
///
/// The grid and the two bitboards always describe the same pieces, and
/// `empty` always equals `64 - popcount(black) - popcount(white)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Position {
    cells: [[Option<Player>; BOARD_SIZE]; BOARD_SIZE],
    black: u64,
    white: u64,
    turn: Player,
    empty: usize,
}

impl Default for Position {
    fn default() -> Self {
        Self::new()
    }
}

impl Position {
    /// The standard starting position with Black to move.
    pub fn new() -> Self {
        let mut pos = Position {
            cells: [[None; BOARD_SIZE]; BOARD_SIZE],
            black: 0,
            white: 0,
            turn: Player::Black,
            empty: NUM_CELLS,
        };
        for bit in START_WHITE {
            pos.place(Player::White, bit / BOARD_SIZE, bit % BOARD_SIZE);
        }
        for bit in START_BLACK {
            pos.place(Player::Black, bit / BOARD_SIZE, bit % BOARD_SIZE);
        }
        pos
    }

    /// Build a position from eight rows of `B`, `W` and `.` (row 0 first).
    ///
    /// Whitespace inside a row is ignored, so `"B . W"` and `"B.W"` are the same.
    pub fn from_rows(rows: &[&str], turn: Player) -> anyhow::Result<Self> {
        ensure!(
            rows.len() == BOARD_SIZE,
            "expected {BOARD_SIZE} rows, got {}",
            rows.len()
        );

        let mut pos = Position {
            cells: [[None; BOARD_SIZE]; BOARD_SIZE],
            black: 0,
            white: 0,
            turn,
            empty: NUM_CELLS,
        };
        for (row, line) in rows.iter().enumerate() {
            let marks: Vec<char> = line.chars().filter(|c| !c.is_whitespace()).collect();
            ensure!(
                marks.len() == BOARD_SIZE,
                "row {row} has {} cells, expected {BOARD_SIZE}: '{line}'",
                marks.len()
            );
            for (col, mark) in marks.into_iter().enumerate() {
                match mark {
                    'B' | 'b' | 'X' | 'x' => pos.place(Player::Black, row, col),
                    'W' | 'w' | 'O' | 'o' => pos.place(Player::White, row, col),
                    '.' | '_' => {}
                    other => bail!("invalid cell '{other}' at row {row}, col {col}"),
                }
            }
        }
        Ok(pos)
    }

    /// Piece at `(row, col)`, or `None` when the cell is empty.
    #[inline]
    pub fn cell(&self, row: usize, col: usize) -> Option<Player> {
        self.cells[row][col]
    }

    /// The side to move.
    #[inline]
    pub fn turn(&self) -> Player {
        self.turn
    }

    /// Bitboard of one side's pieces; bit `row * 8 + col` is set when occupied.
    #[inline]
    pub fn bits(&self, player: Player) -> u64 {
        match player {
            Player::Black => self.black,
            Player::White => self.white,
        }
    }

    /// Number of empty cells.
    #[inline]
    pub fn empty_count(&self) -> usize {
        self.empty
    }

    /// Piece counts as `(black, white)`.
    pub fn piece_counts(&self) -> (u32, u32) {
        (self.black.count_ones(), self.white.count_ones())
    }

    /// Put a piece on an empty cell.
    fn place(&mut self, player: Player, row: usize, col: usize) {
        debug_assert!(self.cells[row][col].is_none());
        self.cells[row][col] = Some(player);
        let bit = bit(row, col);
        match player {
            Player::Black => self.black |= bit,
            Player::White => self.white |= bit,
        }
        self.empty -= 1;
    }

    /// Turn an existing piece over to `player`.
    fn flip(&mut self, player: Player, row: usize, col: usize) {
        self.cells[row][col] = Some(player);
        let bit = bit(row, col);
        match player {
            Player::Black => {
                self.black |= bit;
                self.white &= !bit;
            }
            Player::White => {
                self.white |= bit;
                self.black &= !bit;
            }
        }
    }

    #[inline]
    fn toggle_turn(&mut self) {
        self.turn = self.turn.opponent();
    }
}

/// Bit for `(row, col)` in a color bitboard.
#[inline]
pub fn bit(row: usize, col: usize) -> u64 {
    1u64 << (row * BOARD_SIZE + col)
}

#[inline]
fn in_bounds(row: isize, col: isize) -> bool {
    (0..BOARD_SIZE as isize).contains(&row) && (0..BOARD_SIZE as isize).contains(&col)
}

/// Length of the opponent run that `player` would capture from `(row, col)`
/// along `(dr, dc)`. Zero when the run is empty, leaves the board or ends on
/// an empty cell.
fn capture_run(
    pos: &Position,
    player: Player,
    row: usize,
    col: usize,
    dr: isize,
    dc: isize,
) -> usize {
    let opponent = player.opponent();
    let (mut r, mut c) = (row as isize + dr, col as isize + dc);
    let mut run = 0;

    while in_bounds(r, c) {
        match pos.cells[r as usize][c as usize] {
            Some(p) if p == opponent => run += 1,
            Some(_) => return run,
            None => return 0,
        }
        r += dr;
        c += dc;
    }
    0
}

/// Check whether `player` may place a piece at `(row, col)`.
fn is_legal_for(pos: &Position, player: Player, row: usize, col: usize) -> bool {
    if pos.cells[row][col].is_some() {
        return false;
    }
    DIRECTIONS
        .iter()
        .any(|&(dr, dc)| capture_run(pos, player, row, col, dr, dc) > 0)
}

/// Check whether the side to move may place a piece at `(row, col)`.
///
/// The cell must be empty and at least one direction must hold a run of
/// opponent pieces closed off by one of the mover's own pieces.
pub fn is_legal(pos: &Position, row: usize, col: usize) -> bool {
    debug_assert!(row < BOARD_SIZE && col < BOARD_SIZE, "is_legal called off the board");
    is_legal_for(pos, pos.turn, row, col)
}

/// Whether `player` has any placement, regardless of whose turn it is.
pub fn has_legal_move(pos: &Position, player: Player) -> bool {
    (0..BOARD_SIZE).any(|row| (0..BOARD_SIZE).any(|col| is_legal_for(pos, player, row, col)))
}

/// All legal placements for the side to move in row-major order.
///
/// Never empty: a side without placements gets `[PASS_MOVE]`.
pub fn legal_moves(pos: &Position) -> Vec<Move> {
    let mut moves = Vec::new();
    for row in 0..BOARD_SIZE {
        for col in 0..BOARD_SIZE {
            if is_legal(pos, row, col) {
                moves.push(Move::Place { row, col });
            }
        }
    }
    if moves.is_empty() {
        moves.push(PASS_MOVE);
    }
    moves
}

/// Play `mv` on `pos` in place without checking legality.
///
/// The move must come from `legal_moves`. A pass only hands the turn over.
pub(crate) fn make_move(pos: &mut Position, mv: Move) {
    if let Move::Place { row, col } = mv {
        let player = pos.turn;
        pos.place(player, row, col);

        for &(dr, dc) in &DIRECTIONS {
            let run = capture_run(pos, player, row, col, dr, dc);
            for step in 1..=run as isize {
                let r = (row as isize + dr * step) as usize;
                let c = (col as isize + dc * step) as usize;
                pos.flip(player, r, c);
            }
        }
    }
    pos.toggle_turn();
}

/// Return the position after `mv`.
///
/// With `check_legal` set, an illegal placement yields `Error::IllegalMove`
/// and a pass while a placement exists yields `Error::IllegalPass`; `pos` is
/// left as it was. Without it the caller vouches for the move; only moves
/// from `legal_moves` are safe.
pub fn apply_move(pos: &Position, mv: Move, check_legal: bool) -> Result<Position> {
    if check_legal {
        match mv {
            Move::Place { row, col } => {
                if row >= BOARD_SIZE || col >= BOARD_SIZE || !is_legal(pos, row, col) {
                    return Err(Error::IllegalMove { row, col });
                }
            }
            Move::Pass => {
                if has_legal_move(pos, pos.turn) {
                    return Err(Error::IllegalPass(pos.turn));
                }
            }
        }
    }

    let mut next = pos.clone();
    make_move(&mut next, mv);
    Ok(next)
}

/// The game is over when the board is full or neither side can place.
pub fn is_terminal(pos: &Position) -> bool {
    pos.empty == 0
        || (!has_legal_move(pos, Player::Black) && !has_legal_move(pos, Player::White))
}

/// Side with more pieces, or `None` on a tie.
pub fn winner(pos: &Position) -> Option<Player> {
    let (black, white) = pos.piece_counts();
    match black.cmp(&white) {
        std::cmp::Ordering::Greater => Some(Player::Black),
        std::cmp::Ordering::Less => Some(Player::White),
        std::cmp::Ordering::Equal => None,
    }
}

/// Transposition key of a position: both bitboards and the side to move.
#[inline]
pub fn hash_key(pos: &Position) -> StateKey {
    StateKey::new(pos.black, pos.white, pos.turn)
}

/// Parse a coordinate string (e.g., "d3", "pass") into a Move.
///
/// Columns are letters `a`-`h`, rows are numbers `1`-`8` with row 1 at the top.
/// Returns `None` for anything else.
pub fn parse_coord(s: &str) -> Option<Move> {
    let s = s.trim();
    if s.eq_ignore_ascii_case("pass") {
        return Some(PASS_MOVE);
    }

    let mut chars = s.chars();
    let col_char = chars.next()?.to_ascii_lowercase();
    if !('a'..='h').contains(&col_char) {
        return None;
    }
    let row: usize = chars.as_str().parse().ok()?;
    if !(1..=BOARD_SIZE).contains(&row) {
        return None;
    }

    Some(Move::Place {
        row: row - 1,
        col: (col_char as u8 - b'a') as usize,
    })
}

/// Convert a Move to a coordinate string (e.g., "d3").
///
/// Returns "pass" for `PASS_MOVE`.
pub fn str_coord(mv: Move) -> String {
    match mv {
        Move::Pass => "pass".into(),
        Move::Place { row, col } => format!("{}{}", (b'a' + col as u8) as char, row + 1),
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "  ")?;
        for col in 0..BOARD_SIZE {
            write!(f, " {}", (b'a' + col as u8) as char)?;
        }
        writeln!(f)?;
        for row in 0..BOARD_SIZE {
            write!(f, "{:>2}", row + 1)?;
            for col in 0..BOARD_SIZE {
                let ch = self.cells[row][col].map_or('.', Player::symbol);
                write!(f, " {ch}")?;
            }
            writeln!(f)?;
        }
        let (black, white) = self.piece_counts();
        writeln!(f, "{} to move (black {black}, white {white})", self.turn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_consistent(pos: &Position) {
        assert_eq!(pos.black & pos.white, 0, "bitboards overlap");
        assert_eq!(
            pos.empty as u32 + pos.black.count_ones() + pos.white.count_ones(),
            NUM_CELLS as u32
        );
        for row in 0..BOARD_SIZE {
            for col in 0..BOARD_SIZE {
                let b = bit(row, col);
                let expected = match (pos.black & b != 0, pos.white & b != 0) {
                    (true, false) => Some(Player::Black),
                    (false, true) => Some(Player::White),
                    _ => None,
                };
                assert_eq!(pos.cells[row][col], expected, "grid/bits mismatch at {row},{col}");
            }
        }
    }

    #[test]
    fn test_new_position() {
        let pos = Position::new();
        assert_eq!(pos.turn(), Player::Black);
        assert_eq!(pos.empty_count(), 60);
        assert_eq!(pos.cell(3, 3), Some(Player::White));
        assert_eq!(pos.cell(4, 4), Some(Player::White));
        assert_eq!(pos.cell(3, 4), Some(Player::Black));
        assert_eq!(pos.cell(4, 3), Some(Player::Black));
        assert_consistent(&pos);
    }

    #[test]
    fn test_parse_str_coord_roundtrip() {
        for row in 0..BOARD_SIZE {
            for col in 0..BOARD_SIZE {
                let mv = Move::Place { row, col };
                assert_eq!(parse_coord(&str_coord(mv)), Some(mv));
            }
        }
        assert_eq!(parse_coord("PASS"), Some(PASS_MOVE));
        assert_eq!(parse_coord("d3"), Some(Move::Place { row: 2, col: 3 }));
    }

    #[test]
    fn test_parse_coord_rejects_garbage() {
        for s in ["", "i1", "a0", "a9", "3d", "zz", "d"] {
            assert_eq!(parse_coord(s), None, "{s:?} should not parse");
        }
    }

    #[test]
    fn test_capture_run_stops_at_edge() {
        // White run towards the edge with no closing black piece.
        let pos = Position::from_rows(
            &[
                "........", "........", "........", "........", "........", "........",
                "........", ".WWW....",
            ],
            Player::Black,
        )
        .unwrap();
        assert!(!is_legal(&pos, 7, 4));
        assert!(!is_legal(&pos, 7, 0));
    }

    #[test]
    fn test_make_move_flips_every_direction() {
        let pos = Position::from_rows(
            &[
                "B..B..B.", ".W.W.W..", "..WWW...", "BWW.WWWB", "..WWW...", ".W.W.W..",
                "B..B..B.", "........",
            ],
            Player::Black,
        )
        .unwrap();
        let next = apply_move(&pos, Move::Place { row: 3, col: 3 }, true).unwrap();
        assert_consistent(&next);
        let (black, white) = next.piece_counts();
        // 8 black pieces, the placed one and 17 flipped.
        assert_eq!((black, white), (26, 0));
        assert_eq!(next.turn(), Player::White);
    }

    #[test]
    fn test_illegal_checked_move_leaves_position() {
        let pos = Position::new();
        let err = apply_move(&pos, Move::Place { row: 0, col: 0 }, true).unwrap_err();
        assert_eq!(err, Error::IllegalMove { row: 0, col: 0 });
        assert_eq!(pos, Position::new());
    }

    #[test]
    fn test_checked_pass_needs_no_placement() {
        let pos = Position::new();
        let err = apply_move(&pos, PASS_MOVE, true).unwrap_err();
        assert_eq!(err, Error::IllegalPass(Player::Black));
        assert_eq!(pos, Position::new());

        // Unchecked passes are the caller's business.
        let passed = apply_move(&pos, PASS_MOVE, false).unwrap();
        assert_eq!(passed.turn(), Player::White);
    }

    #[test]
    fn test_display_shows_turn_and_counts() {
        let text = Position::new().to_string();
        assert!(text.contains("Black to move (black 2, white 2)"));
        assert!(text.starts_with("   a b c d e f g h"));
    }
}
