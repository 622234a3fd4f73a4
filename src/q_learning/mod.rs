//! Tabular Q-learning
//!
//! The value function is a dense table indexed by the discretized state and
//! the action. Each step applies a one-step temporal difference update:
//!
//! ```text
//! Q(s,a) ← (1-α)·Q(s,a) + α·(r + γ·max_a' Q(s',a'))
//! ```
//!
//! ## Usage Example
//!
//! ```
//! use flappy_q::app::AgentConfig;
//! use flappy_q::q_learning::QLearningAgent;
//! use flappy_q::types::RawObservation;
//!
//! let mut agent = QLearningAgent::new(AgentConfig::default().with_seed(1))?;
//! let state = agent.state(&RawObservation {
//!     player_y: 180.0,
//!     player_vel: -4.0,
//!     next_pipe_top_y: 120.0,
//!     next_pipe_dist_to_player: 140.0,
//! });
//! let action = agent.select_action(&state);
//! let reward = agent.reward(0.0);
//! agent.learn(&state, action, reward, &state);
//! # Ok::<(), flappy_q::Error>(())
//! ```

pub mod agent;
pub mod policy;
pub mod q_table;

pub use agent::QLearningAgent;
pub use policy::EpsilonGreedy;
pub use q_table::{QTable, TableShape, TableSnapshot};
