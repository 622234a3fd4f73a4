//! Environment port - the game the agent is trained against
//!
//! The game simulation, physics and rendering live outside this crate. Any
//! backend that can report the bird's state and execute an action per frame
//! can drive training by implementing [`Environment`].

use crate::{Result, types::RawObservation};

/// Synchronous, single-player game environment.
///
/// # Event Sequence
///
/// 1. `action_set()` - Once per `TrainingPipeline::run`, before the first
///    episode. Agents are built without an environment, so the codes are
///    read and checked there; a set that is not `[flap, no-op]` fails the
///    run before any episode starts.
/// 2. For each episode:
///    - `reset()`
///    - `observe()` - Starting observation
///    - Repeated until `is_over()`: `act(code)`, `observe()`, `score()`
pub trait Environment {
    /// Environment-specific identifier for an action.
    type ActionCode: Clone + std::fmt::Debug;

    /// Codes for `[flap, no-op]`, in that order.
    fn action_set(&self) -> Vec<Self::ActionCode>;

    /// Restart the game.
    fn reset(&mut self) -> Result<()>;

    /// Current raw features. Valid both before the first action and after each one.
    fn observe(&self) -> Result<RawObservation>;

    /// Execute one step and return the raw signal for it.
    ///
    /// The signal is 0 for an ordinary frame, 1 when a pipe was passed and
    /// anything else when the bird collided.
    fn act(&mut self, code: &Self::ActionCode) -> Result<f64>;

    /// Score of the current episode.
    fn score(&self) -> f64;

    /// Whether the current episode has ended.
    fn is_over(&self) -> bool;
}
