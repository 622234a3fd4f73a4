//! Observer port - abstraction for training observation and data collection
//!
//! This port defines the interface for observing training events,
//! allowing composable data collection without coupling training
//! logic to specific output formats or metrics.

use std::{cell::RefCell, path::Path, rc::Rc};

use serde::{Deserialize, Serialize};

use crate::{
    Result,
    types::{Action, DiscreteState},
};

/// One agent step as seen by observers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepRecord {
    /// State before the action
    pub state: DiscreteState,
    /// Action taken
    pub action: Action,
    /// Raw signal returned by the environment
    pub raw_signal: f64,
    /// Shaped reward used for learning
    pub reward: f64,
    /// State after the action
    pub next_state: DiscreteState,
    /// Q-value of (state, action) after the update
    pub q_value: f64,
}

/// Outcome of a finished episode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EpisodeSummary {
    /// Episode index (0-based)
    pub episode: u64,
    /// Final score reported by the environment
    pub score: f64,
    /// Best score seen so far, including this episode
    pub max_score: f64,
    /// Number of steps played
    pub steps: usize,
    /// Sum of shaped rewards
    pub total_reward: f64,
    /// Exploration rate after this episode's decay
    pub epsilon: f64,
}

/// Observer trait for monitoring training
///
/// Observers can be composed to collect different types of data during training.
/// Examples include:
/// - Progress bars for user feedback
/// - JSONL export for analysis
/// - Metrics tracking for evaluation
///
/// # Event Sequence
///
/// The observer methods are called in the following order:
/// 1. `on_training_start(total_episodes)` - Once at the beginning
/// 2. For each episode:
///    - `on_episode_start(episode)`
///    - `on_step(...)` - For each step in the episode
///    - `on_snapshot_saved(...)` - If the episode reached a milestone
///    - `on_episode_end(summary)`
/// 3. `on_training_end()` - Once at the end
///
/// # Examples
///
/// ```no_run
/// use flappy_q::ports::{EpisodeSummary, Observer};
///
/// struct CountingObserver {
///     episodes: u64,
/// }
///
/// impl Observer for CountingObserver {
///     fn on_episode_end(&mut self, _summary: &EpisodeSummary) -> flappy_q::Result<()> {
///         self.episodes += 1;
///         Ok(())
///     }
/// }
/// ```
pub trait Observer {
    /// Called when training starts.
    fn on_training_start(&mut self, _total_episodes: u64) -> Result<()> {
        Ok(())
    }

    /// Called after the environment was reset for a new episode.
    fn on_episode_start(&mut self, _episode: u64) -> Result<()> {
        Ok(())
    }

    /// Called after each learning update.
    fn on_step(&mut self, _episode: u64, _step: usize, _record: &StepRecord) -> Result<()> {
        Ok(())
    }

    /// Called after a milestone snapshot was written.
    fn on_snapshot_saved(&mut self, _episode: u64, _score: f64, _path: &Path) -> Result<()> {
        Ok(())
    }

    /// Called when an episode reaches its terminal state.
    fn on_episode_end(&mut self, _summary: &EpisodeSummary) -> Result<()> {
        Ok(())
    }

    /// Called when training completes.
    ///
    /// Use this to finalize outputs, close files, or display summaries.
    fn on_training_end(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Shared observer, so its state can still be read once the pipeline owns a handle.
impl<O: Observer + ?Sized> Observer for Rc<RefCell<O>> {
    fn on_training_start(&mut self, total_episodes: u64) -> Result<()> {
        self.borrow_mut().on_training_start(total_episodes)
    }

    fn on_episode_start(&mut self, episode: u64) -> Result<()> {
        self.borrow_mut().on_episode_start(episode)
    }

    fn on_step(&mut self, episode: u64, step: usize, record: &StepRecord) -> Result<()> {
        self.borrow_mut().on_step(episode, step, record)
    }

    fn on_snapshot_saved(&mut self, episode: u64, score: f64, path: &Path) -> Result<()> {
        self.borrow_mut().on_snapshot_saved(episode, score, path)
    }

    fn on_episode_end(&mut self, summary: &EpisodeSummary) -> Result<()> {
        self.borrow_mut().on_episode_end(summary)
    }

    fn on_training_end(&mut self) -> Result<()> {
        self.borrow_mut().on_training_end()
    }
}
