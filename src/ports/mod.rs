//! Ports (trait boundaries) for external dependencies.
//!
//! The game, the snapshot storage and training observation are all reached
//! through these traits; adapters in [`crate::adapters`] and
//! [`crate::pipeline`] implement them.

pub mod environment;
pub mod observer;
pub mod repository;

pub use environment::Environment;
pub use observer::{EpisodeSummary, Observer, StepRecord};
pub use repository::SnapshotRepository;
