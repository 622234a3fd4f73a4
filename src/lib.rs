//! Tabular Q-learning agent for Flappy Bird
//!
//! This crate provides:
//! - State discretization of raw game observations into a small grid
//! - A dense Q-table with one-step temporal-difference updates
//! - ε-greedy action selection with decaying exploration
//! - An episodic training loop over an abstract game environment
//! - MessagePack persistence of milestone Q-table snapshots

pub mod adapters;
pub mod app;
pub mod cli;
pub mod discretizer;
pub mod error;
pub mod pipeline;
pub mod ports;
pub mod q_learning;
pub mod types;

pub use discretizer::StateDiscretizer;
pub use error::{Error, Result};
pub use q_learning::{QLearningAgent, QTable, TableSnapshot};
pub use types::{Action, ActionSet, DiscreteState, RawObservation};
