//! Othello-MCTS: an Othello engine with a Monte Carlo Tree Search planner.
//!
//! The planner runs UCT over a transposition store keyed by position, grows
//! one node per simulation, and estimates leaves with uniformly random
//! playouts scored as a signed square root of the final piece margin.
//!
//! ## Modules
//!
//! - [`constants`] - Board geometry and search parameters
//! - [`position`] - Core game logic (board state, legality, captures)
//! - [`store`] - Fixed-bucket transposition store
//! - [`mcts`] - Monte Carlo Tree Search with UCT
//! - [`playout`] - Random game simulation for position evaluation
//! - [`config`] - Planner configuration
//! - [`arena`] - Planner-versus-planner games
//! - [`console`] - Text protocol for driving the engine
//! - [`error`] - Error types
//!
//! ## Example
//!
//! ```
//! use othello_mcts::position::{Position, apply_move, parse_coord, str_coord};
//! use othello_mcts::mcts::plan;
//!
//! // Create a new game and play an opening move
//! let pos = Position::new();
//! let pos = apply_move(&pos, parse_coord("d3").unwrap(), true).unwrap();
//!
//! // Run MCTS to find the best response
//! let best = plan(&pos, 100, 2.0).unwrap();
//! println!("Best move: {}", str_coord(best));
//! ```

pub mod arena;
pub mod config;
pub mod console;
pub mod constants;
pub mod error;
pub mod mcts;
pub mod playout;
pub mod position;
pub mod store;

pub use error::{Error, Result};
