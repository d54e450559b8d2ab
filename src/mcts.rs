//! Monte Carlo Tree Search (MCTS) with UCT selection.
//!
//! This module implements MCTS with:
//! - UCT selection with a configurable exploration constant
//! - One-node-per-simulation expansion
//! - Uniformly random playouts for value estimation
//! - Incremental-mean back-up of playout scores
//!
//! Nodes live in a `TranspositionStore` keyed by position rather than in an
//! explicit tree, so transpositions share statistics. Scores are always from
//! Black's point of view: Black picks the highest score, White the lowest.

use std::fmt;

use fastrand::Rng;
use tracing::{debug, trace};

use crate::config::PlannerConfig;
use crate::constants::UNVISITED_TOTAL;
use crate::error::{Error, Result};
use crate::playout::rollout;
use crate::position::{
    Move, Player, Position, hash_key, is_terminal, legal_moves, make_move, str_coord,
};
use crate::store::{StateKey, TranspositionStore};

/// Statistics for one candidate move of a node.
#[derive(Clone, Debug, PartialEq)]
pub struct MoveStats {
    pub mv: Move,
    /// Times this move was taken from the node.
    pub visits: u32,
    /// Running mean of the playout scores that followed it.
    pub score: f64,
}

/// Search statistics for one position.
#[derive(Clone, Debug, PartialEq)]
pub struct SearchNode {
    /// Side to move at this position
    pub turn: Player,
    /// Number of simulations that passed through this node
    pub visits: u32,
    /// One entry per legal move, or a single pass
    pub moves: Vec<MoveStats>,
}

impl SearchNode {
    /// Create an unvisited node for the given position.
    pub fn new(pos: &Position) -> Self {
        Self {
            turn: pos.turn(),
            visits: 0,
            moves: legal_moves(pos)
                .into_iter()
                .map(|mv| MoveStats {
                    mv,
                    visits: 0,
                    score: 0.0,
                })
                .collect(),
        }
    }

    /// Fold one playout result into the node through move `index`.
    pub fn record(&mut self, index: usize, result: f64) {
        self.visits += 1;
        let stats = &mut self.moves[index];
        stats.visits += 1;
        stats.score += (result - stats.score) / stats.visits as f64;
    }
}

impl fmt::Display for SearchNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} to move, {} visits", self.turn, self.visits)?;
        for stats in &self.moves {
            writeln!(
                f,
                "  {:<4} visits {:>6}  score {:+.3}",
                str_coord(stats.mv),
                stats.visits,
                stats.score
            )?;
        }
        Ok(())
    }
}

/// Select the index of the move to explore from `node` with UCT.
///
/// Each move is scored as its mean plus (Black) or minus (White) the bonus
/// `c * sqrt(ln(N) / n)`. With any positive `c` an unvisited move outranks
/// every visited one, so each move is tried once before any repeats. With
/// `c == 0` this is a plain arg-max (Black) or arg-min (White) of the means.
/// Ties go to the lowest index.
pub fn select_move(node: &SearchNode, c: f64) -> Result<usize> {
    match node.moves.len() {
        0 => return Err(Error::NoLegalMoves),
        1 => return Ok(0),
        _ => {}
    }

    let total = if node.visits == 0 {
        UNVISITED_TOTAL
    } else {
        node.visits as f64
    };
    let log_total = total.ln();

    // Urgency is oriented so that higher is always better for the mover.
    let urgency = |stats: &MoveStats| {
        if stats.visits == 0 && c > 0.0 {
            return f64::INFINITY;
        }
        let bonus = if stats.visits == 0 {
            0.0
        } else {
            c * (log_total / stats.visits as f64).sqrt()
        };
        match node.turn {
            Player::Black => stats.score + bonus,
            Player::White => -(stats.score - bonus),
        }
    };

    let mut best_index = 0;
    let mut best = urgency(&node.moves[0]);
    for (i, stats) in node.moves.iter().enumerate().skip(1) {
        let u = urgency(stats);
        if u > best {
            best = u;
            best_index = i;
        }
    }
    Ok(best_index)
}

/// Walk from `pos` through known nodes, expanding the first unknown one.
///
/// `pos` is advanced along the chosen moves and ends at the position the
/// playout should start from. Returns the `(key, move index)` pairs visited,
/// deepest first. The walk stops early, without expanding, on a finished game.
fn tree_walk(
    store: &mut TranspositionStore<SearchNode>,
    pos: &mut Position,
    c: f64,
) -> Result<Vec<(StateKey, usize)>> {
    let mut path = Vec::new();

    while !is_terminal(pos) {
        let key = hash_key(pos);
        let (index, mv, expanded) = match store.lookup(&key) {
            Some(node) => {
                let index = select_move(node, c)?;
                (index, node.moves[index].mv, false)
            }
            None => {
                let node = SearchNode::new(pos);
                let index = select_move(&node, c)?;
                let mv = node.moves[index].mv;
                store.insert(key, node);
                (index, mv, true)
            }
        };

        path.push((key, index));
        make_move(pos, mv);
        if expanded {
            break;
        }
    }

    path.reverse();
    Ok(path)
}

/// Update every node on `path` with the playout `result`.
///
/// Each key was inserted during the same simulation's walk, so a miss means
/// the path is corrupt and is reported as `Error::MissingNode`.
fn back_up(
    store: &mut TranspositionStore<SearchNode>,
    path: &[(StateKey, usize)],
    result: f64,
) -> Result<()> {
    for &(key, index) in path {
        store
            .update(&key, |node| node.record(index, result))
            .map_err(|_| Error::MissingNode(key))?;
    }
    Ok(())
}

/// Result of a completed search.
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// Move chosen at the root
    pub best: Move,
    /// Root statistics after the last simulation
    pub root: SearchNode,
    /// Number of positions in the store
    pub nodes: usize,
    /// Number of simulations performed
    pub simulations: usize,
}

/// A Monte Carlo planner with its own configuration and RNG.
///
/// Each search builds a fresh transposition store rooted at the given
/// position and drops it when done.
pub struct Planner {
    config: PlannerConfig,
    rng: Rng,
}

impl Planner {
    pub fn new(config: PlannerConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => Rng::with_seed(seed),
            None => Rng::new(),
        };
        Self { config, rng }
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Run the configured number of simulations from `root`.
    pub fn search(&mut self, root: &Position) -> Result<SearchResult> {
        let c = self.config.exploration;
        let root_key = hash_key(root);
        let mut store = TranspositionStore::new();

        for sim in 0..self.config.simulations {
            let mut pos = root.clone();
            let path = tree_walk(&mut store, &mut pos, c)?;
            let result = rollout(pos, &mut self.rng);
            back_up(&mut store, &path, result)?;
            trace!(sim, depth = path.len(), result, "simulation finished");
        }

        let nodes = store.len();
        // Absent when the root is terminal or no simulation ran.
        let root_node = store.get_or_insert_with(root_key, || SearchNode::new(root));
        let index = select_move(root_node, 0.0)?;
        let best = root_node.moves[index].mv;

        debug!(
            best = %str_coord(best),
            visits = root_node.visits,
            score = root_node.moves[index].score,
            nodes,
            "search finished"
        );

        Ok(SearchResult {
            best,
            root: root_node.clone(),
            nodes,
            simulations: self.config.simulations,
        })
    }

    /// Run a search and return only the chosen move.
    pub fn plan(&mut self, root: &Position) -> Result<Move> {
        self.search(root).map(|result| result.best)
    }
}

/// Pick a move for the side to move in `root` with a fresh planner.
pub fn plan(root: &Position, simulations: usize, exploration: f64) -> Result<Move> {
    Planner::new(PlannerConfig::new(simulations, exploration)).plan(root)
}

/// Print debug information about the root's moves.
pub fn dump_children(root: &SearchNode) {
    for stats in &root.moves {
        debug!(
            mv = %str_coord(stats.mv),
            visits = stats.visits,
            score = stats.score,
            "root move"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(turn: Player, stats: &[(u32, f64)]) -> SearchNode {
        SearchNode {
            turn,
            visits: stats.iter().map(|(v, _)| v).sum(),
            moves: stats
                .iter()
                .enumerate()
                .map(|(i, &(visits, score))| MoveStats {
                    mv: Move::Place { row: 0, col: i },
                    visits,
                    score,
                })
                .collect(),
        }
    }

    #[test]
    fn test_select_move_empty_node() {
        let empty = node(Player::Black, &[]);
        assert_eq!(select_move(&empty, 1.0), Err(Error::NoLegalMoves));
    }

    #[test]
    fn test_select_move_single_move() {
        let forced = node(Player::White, &[(0, 0.0)]);
        assert_eq!(select_move(&forced, 1.0), Ok(0));
    }

    #[test]
    fn test_select_move_exploitation() {
        let stats = [(3, 0.5), (4, 1.5), (2, -2.0)];
        assert_eq!(select_move(&node(Player::Black, &stats), 0.0), Ok(1));
        assert_eq!(select_move(&node(Player::White, &stats), 0.0), Ok(2));
    }

    #[test]
    fn test_unvisited_move_wins() {
        let black = node(Player::Black, &[(1, 8.0), (0, 0.0)]);
        assert_eq!(select_move(&black, 0.1), Ok(1));
        let white = node(Player::White, &[(1, -8.0), (0, 0.0), (5, -3.0)]);
        assert_eq!(select_move(&white, 0.1), Ok(1));
    }

    #[test]
    fn test_unvisited_move_wins_with_tiny_exploration() {
        let black = node(Player::Black, &[(1, 8.0), (0, 0.0)]);
        assert_eq!(select_move(&black, 1e-7), Ok(1));
        assert_eq!(select_move(&black, f64::MIN_POSITIVE), Ok(1));
        let white = node(Player::White, &[(3, -8.0), (0, 5.0)]);
        assert_eq!(select_move(&white, 1e-12), Ok(1));
        // Without exploration the unvisited move is judged on its mean alone.
        assert_eq!(select_move(&black, 0.0), Ok(0));
    }

    #[test]
    fn test_ties_pick_first_index() {
        let fresh = node(Player::Black, &[(0, 0.0), (0, 0.0), (0, 0.0)]);
        assert_eq!(select_move(&fresh, 2.0), Ok(0));
        let even = node(Player::White, &[(2, 1.0), (2, 1.0)]);
        assert_eq!(select_move(&even, 2.0), Ok(0));
    }

    #[test]
    fn test_record_keeps_running_mean() {
        let mut n = node(Player::Black, &[(0, 0.0), (0, 0.0)]);
        n.record(1, 2.0);
        n.record(1, 4.0);
        n.record(0, -1.0);
        assert_eq!(n.visits, 3);
        assert_eq!(n.moves[1].visits, 2);
        assert!((n.moves[1].score - 3.0).abs() < 1e-12);
        assert_eq!(n.moves[0].score, -1.0);
    }

    #[test]
    fn test_tree_walk_expands_one_node() {
        let mut store = TranspositionStore::new();
        let mut pos = Position::new();
        let path = tree_walk(&mut store, &mut pos, 1.0).unwrap();
        assert_eq!(path.len(), 1);
        assert_eq!(store.len(), 1);
        assert_eq!(path[0].0, hash_key(&Position::new()));
        assert_eq!(pos.turn(), Player::White);
    }

    #[test]
    fn test_tree_walk_path_is_deepest_first() {
        let mut store = TranspositionStore::new();
        let root = Position::new();
        for _ in 0..5 {
            let mut pos = root.clone();
            let path = tree_walk(&mut store, &mut pos, 1.0).unwrap();
            back_up(&mut store, &path, 0.0).unwrap();
        }
        assert_eq!(store.len(), 5);

        // Root -> second opening move (expanded earlier) -> new reply node.
        let mut pos = root.clone();
        let path = tree_walk(&mut store, &mut pos, 1.0).unwrap();
        assert_eq!(path.len(), 3);
        assert_eq!(path.last().unwrap(), &(hash_key(&root), 1));
        assert_eq!(store.len(), 6);
    }

    #[test]
    fn test_back_up_missing_node() {
        let mut store = TranspositionStore::new();
        let key = hash_key(&Position::new());
        assert_eq!(back_up(&mut store, &[(key, 0)], 1.0), Err(Error::MissingNode(key)));
    }

    #[test]
    fn test_root_visits_equal_simulations() {
        let mut planner = Planner::new(PlannerConfig::new(40, 1.0).with_seed(3));
        let result = planner.search(&Position::new()).unwrap();
        assert_eq!(result.root.visits, 40);
        let per_move: u32 = result.root.moves.iter().map(|m| m.visits).sum();
        assert_eq!(per_move, 40);
        // Every opening move is tried before any is repeated.
        assert!(result.root.moves.iter().all(|m| m.visits > 0));
        assert_eq!(result.nodes, 40);
    }

    #[test]
    fn test_zero_simulations_returns_first_move() {
        let best = plan(&Position::new(), 0, 1.0).unwrap();
        assert_eq!(best, Move::Place { row: 2, col: 3 });
    }
}
