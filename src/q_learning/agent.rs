//! Tabular Q-learning agent
//!
//! Bundles the discretizer, the Q-table, the ε-greedy policy and the reward
//! shaping so the training loop only deals in raw observations and signals.

use crate::{
    Error, Result,
    app::{AgentConfig, RewardShaping},
    discretizer::StateDiscretizer,
    q_learning::{policy::EpsilonGreedy, q_table::QTable},
    types::{Action, DiscreteState, RawObservation},
};

/// Q-learning agent for the pipe-gap game
#[derive(Debug, Clone)]
pub struct QLearningAgent {
    discretizer: StateDiscretizer,
    q_table: QTable,
    policy: EpsilonGreedy,
    rewards: RewardShaping,
    epsilon: f64,
    initial_epsilon: f64,
    epsilon_decay: f64,
    min_epsilon: f64,
    explore: bool,
}

impl QLearningAgent {
    /// Create an agent with a zeroed table.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if the config does not validate.
    pub fn new(config: AgentConfig) -> Result<Self> {
        config.validate()?;
        let discretizer = StateDiscretizer::new(config.discretizer.clone())?;
        let q_table = QTable::for_discretizer(
            &discretizer,
            config.learning_rate,
            config.discount_factor,
        );
        Ok(Self::assemble(config, discretizer, q_table))
    }

    /// Create an agent that continues from an existing table.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ShapeMismatch`] if the table was not built for the
    /// configured bucket counts.
    pub fn with_table(config: AgentConfig, q_table: QTable) -> Result<Self> {
        config.validate()?;
        let discretizer = StateDiscretizer::new(config.discretizer.clone())?;
        let (height, distance, velocity) = discretizer.bucket_counts();
        let expected = [height, distance, velocity, Action::COUNT];
        if q_table.shape() != expected {
            return Err(Error::ShapeMismatch {
                expected,
                got: q_table.shape(),
            });
        }
        Ok(Self::assemble(config, discretizer, q_table))
    }

    fn assemble(config: AgentConfig, discretizer: StateDiscretizer, q_table: QTable) -> Self {
        Self {
            discretizer,
            q_table,
            policy: EpsilonGreedy::new(config.seed),
            rewards: config.rewards,
            epsilon: config.epsilon,
            initial_epsilon: config.epsilon,
            epsilon_decay: config.epsilon_decay,
            min_epsilon: config.min_epsilon,
            explore: config.explore,
        }
    }

    /// Discretize a raw observation
    pub fn state(&self, raw: &RawObservation) -> DiscreteState {
        self.discretizer.discretize(raw)
    }

    /// Choose the action to play in `state` using the configured mode
    pub fn select_action(&mut self, state: &DiscreteState) -> Action {
        self.policy
            .select_action(&self.q_table, state, self.epsilon, self.explore)
    }

    /// Shape a raw environment signal into a reward
    pub fn reward(&self, raw_signal: f64) -> f64 {
        self.rewards.reward(raw_signal)
    }

    /// Apply one TD update and return the new estimate
    pub fn learn(
        &mut self,
        state: &DiscreteState,
        action: Action,
        reward: f64,
        next_state: &DiscreteState,
    ) -> f64 {
        self.q_table.update(state, action, reward, next_state)
    }

    /// Decay epsilon after episode
    pub fn decay_epsilon(&mut self) {
        self.epsilon = (self.epsilon * self.epsilon_decay).max(self.min_epsilon);
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    pub fn explores(&self) -> bool {
        self.explore
    }

    pub fn q_table(&self) -> &QTable {
        &self.q_table
    }

    pub fn discretizer(&self) -> &StateDiscretizer {
        &self.discretizer
    }

    /// Reseed the exploration policy
    pub fn set_rng_seed(&mut self, seed: u64) {
        self.policy.reseed(seed);
    }

    /// Clear learned values and restore the initial exploration rate
    pub fn reset(&mut self) {
        self.q_table.reset();
        self.epsilon = self.initial_epsilon;
        self.policy.reset_rng();
    }
}
