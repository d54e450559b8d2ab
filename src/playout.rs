//! Monte Carlo playouts (random game simulation).
//!
//! A playout plays uniformly random legal moves until the game ends, then
//! scores the final board from Black's point of view.

use fastrand::Rng;

use crate::position::{Position, is_terminal, legal_moves, make_move};

/// Play random moves from `pos` to the end of the game and score the result.
///
/// `pos` is consumed as scratch space; callers pass their own clone.
pub fn rollout(mut pos: Position, rng: &mut Rng) -> f64 {
    while !is_terminal(&pos) {
        let moves = legal_moves(&pos);
        let mv = moves[rng.usize(..moves.len())];
        make_move(&mut pos, mv);
    }
    score(&pos)
}

/// Signed score of a position: `sqrt` of the piece margin, positive when
/// Black is ahead, negative when White is ahead, zero on a tie.
pub fn score(pos: &Position) -> f64 {
    let (black, white) = pos.piece_counts();
    let diff = black as f64 - white as f64;
    diff.signum() * diff.abs().sqrt()
}
