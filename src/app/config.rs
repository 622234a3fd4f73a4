//! Configuration types for agent creation.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Bucket thresholds for each observation feature.
///
/// Each feature gets `thresholds.len() + 1` categories. A value is placed in
/// the first bucket whose threshold it is strictly below, or in the last
/// bucket if it is not below any of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscretizerConfig {
    /// Cut points for the vertical offset between the bird and the gap
    pub height_thresholds: Vec<f64>,
    /// Cut points for the horizontal distance to the gap
    pub distance_thresholds: Vec<f64>,
    /// Cut points for the vertical velocity
    pub velocity_thresholds: Vec<f64>,
}

impl Default for DiscretizerConfig {
    fn default() -> Self {
        Self {
            height_thresholds: vec![8.0, 20.0, 50.0, 125.0, 250.0],
            distance_thresholds: vec![8.0, 20.0, 50.0, 125.0, 250.0],
            velocity_thresholds: vec![-15.0, -10.0, -5.0, 0.0, 5.0],
        }
    }
}

impl DiscretizerConfig {
    /// Check every threshold list is non-empty, finite and strictly increasing.
    pub fn validate(&self) -> Result<()> {
        for (name, thresholds) in [
            ("height_thresholds", &self.height_thresholds),
            ("distance_thresholds", &self.distance_thresholds),
            ("velocity_thresholds", &self.velocity_thresholds),
        ] {
            if thresholds.is_empty() {
                return Err(Error::InvalidConfiguration {
                    message: format!("{name} must not be empty"),
                });
            }
            if thresholds.iter().any(|t| !t.is_finite()) {
                return Err(Error::InvalidConfiguration {
                    message: format!("{name} must be finite"),
                });
            }
            if thresholds.windows(2).any(|pair| pair[0] >= pair[1]) {
                return Err(Error::InvalidConfiguration {
                    message: format!("{name} must be strictly increasing"),
                });
            }
        }
        Ok(())
    }
}

/// Maps the raw per-step signal returned by the game to a reward.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardShaping {
    /// Reward when the raw signal is 0 (survived the frame)
    pub survive: f64,
    /// Reward when the raw signal is 1 (passed a pipe)
    pub score: f64,
    /// Reward for any other signal (collision)
    pub death: f64,
}

impl Default for RewardShaping {
    fn default() -> Self {
        Self {
            survive: 1.0,
            score: 10.0,
            death: -1000.0,
        }
    }
}

impl RewardShaping {
    /// Shape a raw environment signal into a reward.
    pub fn reward(&self, raw_signal: f64) -> f64 {
        if raw_signal == 0.0 {
            self.survive
        } else if raw_signal == 1.0 {
            self.score
        } else {
            self.death
        }
    }
}

/// Configuration for creating a Q-learning agent.
///
/// Defaults reproduce the reference sizing: α = 0.7, γ = 0.8, ε starts at
/// 0.8 and decays by 0.95 per episode, and action selection is purely greedy.
///
/// # Examples
///
/// ```
/// use flappy_q::app::AgentConfig;
///
/// let config = AgentConfig::default()
///     .with_seed(42)
///     .with_exploration(true)
///     .with_min_epsilon(0.01);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Learning rate α
    pub learning_rate: f64,
    /// Discount factor γ
    pub discount_factor: f64,
    /// Initial exploration rate ε
    pub epsilon: f64,
    /// Multiplicative decay applied to ε after each episode
    pub epsilon_decay: f64,
    /// Floor for ε
    pub min_epsilon: f64,
    /// Use ε-greedy selection during episodes instead of pure exploitation
    pub explore: bool,
    /// Random seed for reproducibility
    pub seed: Option<u64>,
    /// Raw signal to reward mapping
    pub rewards: RewardShaping,
    /// Observation bucketing
    pub discretizer: DiscretizerConfig,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.7,
            discount_factor: 0.8,
            epsilon: 0.8,
            epsilon_decay: 0.95,
            min_epsilon: 0.0,
            explore: false,
            seed: None,
            rewards: RewardShaping::default(),
            discretizer: DiscretizerConfig::default(),
        }
    }
}

impl AgentConfig {
    /// Set the random seed for deterministic behavior.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Enable or disable ε-greedy exploration during training.
    pub fn with_exploration(mut self, explore: bool) -> Self {
        self.explore = explore;
        self
    }

    /// Set the floor for the exploration rate.
    pub fn with_min_epsilon(mut self, min_epsilon: f64) -> Self {
        self.min_epsilon = min_epsilon;
        self
    }

    /// Set α and γ.
    pub fn with_learning(mut self, learning_rate: f64, discount_factor: f64) -> Self {
        self.learning_rate = learning_rate;
        self.discount_factor = discount_factor;
        self
    }

    /// Set the reward shaping.
    pub fn with_rewards(mut self, rewards: RewardShaping) -> Self {
        self.rewards = rewards;
        self
    }

    /// Set the discretizer thresholds.
    pub fn with_discretizer(mut self, discretizer: DiscretizerConfig) -> Self {
        self.discretizer = discretizer;
        self
    }

    /// Validate parameter ranges.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] describing the first bad field.
    pub fn validate(&self) -> Result<()> {
        let unit = |name: &str, value: f64| -> Result<()> {
            if (0.0..=1.0).contains(&value) {
                Ok(())
            } else {
                Err(Error::InvalidConfiguration {
                    message: format!("{name} must be within [0, 1], got {value}"),
                })
            }
        };

        unit("learning_rate", self.learning_rate)?;
        unit("discount_factor", self.discount_factor)?;
        unit("epsilon", self.epsilon)?;
        unit("epsilon_decay", self.epsilon_decay)?;
        unit("min_epsilon", self.min_epsilon)?;

        if self.min_epsilon > self.epsilon {
            return Err(Error::InvalidConfiguration {
                message: format!(
                    "min_epsilon ({}) must not exceed epsilon ({})",
                    self.min_epsilon, self.epsilon
                ),
            });
        }

        self.discretizer.validate()
    }

    /// Load a configuration from a JSON file; missing fields keep their defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|source| Error::Io {
            operation: format!("open config {path:?}"),
            source,
        })?;
        let config: Self = serde_json::from_reader(std::io::BufReader::new(file))?;
        config.validate()?;
        Ok(config)
    }
}
