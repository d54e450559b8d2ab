//! Error types for the engine and planner.

use thiserror::Error;

use crate::position::Player;
use crate::store::StateKey;

/// Errors raised by the board engine, the transposition store and the planner.
///
/// `IllegalMove`, `IllegalPass` and `KeyNotFound` are ordinary outcomes the caller handles.
/// `NoLegalMoves` and `MissingNode` mean an internal invariant was broken.
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum Error {
    #[error("illegal move at row {row}, col {col}")]
    IllegalMove { row: usize, col: usize },

    #[error("illegal pass: {0} has a legal placement")]
    IllegalPass(Player),

    #[error("key {0} not found in transposition store")]
    KeyNotFound(StateKey),

    #[error("node has no candidate moves")]
    NoLegalMoves,

    #[error("search path references key {0} which is missing from the store")]
    MissingNode(StateKey),
}

pub type Result<T> = std::result::Result<T, Error>;
