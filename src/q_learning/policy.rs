//! ε-greedy action selection

use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::{
    q_learning::q_table::QTable,
    types::{Action, DiscreteState},
};

pub(crate) fn build_rng(seed: Option<u64>) -> StdRng {
    if let Some(seed) = seed {
        StdRng::seed_from_u64(seed)
    } else {
        StdRng::from_rng(&mut rand::rng())
    }
}

/// ε-greedy policy over a [`QTable`].
///
/// Owns its random source so runs are reproducible when seeded.
#[derive(Debug, Clone)]
pub struct EpsilonGreedy {
    rng: StdRng,
    rng_seed: Option<u64>,
}

impl EpsilonGreedy {
    pub fn new(seed: Option<u64>) -> Self {
        Self {
            rng: build_rng(seed),
            rng_seed: seed,
        }
    }

    /// Pick an action for `state`.
    ///
    /// With `explore` off this is the table's best action. With it on, a
    /// uniform draw below `exploration_rate` picks a uniformly random action
    /// instead.
    pub fn select_action(
        &mut self,
        table: &QTable,
        state: &DiscreteState,
        exploration_rate: f64,
        explore: bool,
    ) -> Action {
        if explore && self.rng.random::<f64>() < exploration_rate {
            // Explore: random action
            Action::ALL[self.rng.random_range(0..Action::COUNT)]
        } else {
            table.best_action(state)
        }
    }

    /// Replace the random source with one seeded from `seed`.
    pub fn reseed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
        self.rng_seed = Some(seed);
    }

    /// Restart the random sequence from the configured seed.
    pub fn reset_rng(&mut self) {
        self.rng = build_rng(self.rng_seed);
    }
}
