//! Planner configuration parameters.

use crate::constants::{EXPLORATION, N_SIMS};

/// Configuration for one Monte Carlo planner.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannerConfig {
    /// Number of simulations to run per search.
    pub simulations: usize,

    /// Exploration constant `c` of the UCT rule.
    /// Zero means pure exploitation; larger values favour rarely tried moves.
    pub exploration: f64,

    /// Seed for the playout RNG. `None` draws a seed from the system.
    pub seed: Option<u64>,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            simulations: N_SIMS,
            exploration: EXPLORATION,
            seed: None,
        }
    }
}

impl PlannerConfig {
    pub fn new(simulations: usize, exploration: f64) -> Self {
        Self {
            simulations,
            exploration,
            seed: None,
        }
    }

    /// Fix the RNG seed so searches are reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Create a fast config for testing.
    pub fn for_testing() -> Self {
        Self {
            simulations: 50,
            exploration: EXPLORATION,
            seed: Some(0),
        }
    }
}
