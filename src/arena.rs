//! Planner-versus-planner games.
//!
//! Two `PlannerConfig`s play a full game from the starting position, one per
//! side. Used to compare simulation budgets and exploration constants.

use tracing::{debug, info};

use crate::config::PlannerConfig;
use crate::error::Result;
use crate::mcts::Planner;
use crate::position::{Move, Player, Position, apply_move, is_terminal, str_coord, winner};

/// Outcome of one finished game.
#[derive(Debug, Clone)]
pub struct GameRecord {
    /// Moves in the order they were played, passes included
    pub moves: Vec<Move>,
    /// Final position
    pub final_position: Position,
}

impl GameRecord {
    /// Final piece counts as `(black, white)`.
    pub fn piece_counts(&self) -> (u32, u32) {
        self.final_position.piece_counts()
    }

    /// Winning side, or `None` on a tie.
    pub fn winner(&self) -> Option<Player> {
        winner(&self.final_position)
    }
}

/// Aggregate results of a series of games.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchSummary {
    pub black_wins: u32,
    pub white_wins: u32,
    pub ties: u32,
}

impl MatchSummary {
    pub fn games(&self) -> u32 {
        self.black_wins + self.white_wins + self.ties
    }

    fn add(&mut self, outcome: Option<Player>) {
        match outcome {
            Some(Player::Black) => self.black_wins += 1,
            Some(Player::White) => self.white_wins += 1,
            None => self.ties += 1,
        }
    }
}

/// Play one game between two planners, Black first.
///
/// With `verbose` set every position is logged at info level.
pub fn compete(black: &PlannerConfig, white: &PlannerConfig, verbose: bool) -> Result<GameRecord> {
    let mut black_planner = Planner::new(black.clone());
    let mut white_planner = Planner::new(white.clone());
    let mut pos = Position::new();
    let mut moves = Vec::new();

    while !is_terminal(&pos) {
        let planner = match pos.turn() {
            Player::Black => &mut black_planner,
            Player::White => &mut white_planner,
        };
        let mv = planner.plan(&pos)?;
        debug!(ply = moves.len(), side = %pos.turn(), mv = %str_coord(mv), "move chosen");

        pos = apply_move(&pos, mv, true)?;
        moves.push(mv);
        if verbose {
            info!("after {}:\n{pos}", str_coord(mv));
        }
    }

    let (b, w) = pos.piece_counts();
    info!(black = b, white = w, plies = moves.len(), "game over");

    Ok(GameRecord {
        moves,
        final_position: pos,
    })
}

/// Play `games` games with the same configurations and tally the winners.
///
/// Seeded configurations get a different seed per game so the games differ.
pub fn run_match(black: &PlannerConfig, white: &PlannerConfig, games: u32) -> Result<MatchSummary> {
    let mut summary = MatchSummary::default();

    for game in 0..games {
        let reseed = |config: &PlannerConfig, salt: u64| {
            let mut config = config.clone();
            config.seed = config
                .seed
                .map(|s| s.wrapping_add(u64::from(game).wrapping_mul(2) + salt));
            config
        };
        let record = compete(&reseed(black, 0), &reseed(white, 1), false)?;
        summary.add(record.winner());
        info!(
            game,
            black_wins = summary.black_wins,
            white_wins = summary.white_wins,
            ties = summary.ties,
            "match progress"
        );
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compete_plays_to_the_end() {
        let black = PlannerConfig::new(5, 1.0).with_seed(11);
        let white = PlannerConfig::new(5, 1.0).with_seed(12);
        let record = compete(&black, &white, false).unwrap();

        assert!(is_terminal(&record.final_position));
        let (b, w) = record.piece_counts();
        assert_eq!(b + w + record.final_position.empty_count() as u32, 64);
        let placements = record.moves.iter().filter(|m| **m != Move::Pass).count();
        assert_eq!(placements, 60 - record.final_position.empty_count());
    }

    #[test]
    fn test_match_counts_every_game() {
        let config = PlannerConfig::new(2, 1.0).with_seed(5);
        let summary = run_match(&config, &config, 3).unwrap();
        assert_eq!(summary.games(), 3);
    }
}
