//! Training pipeline
//!
//! This module provides the episodic training loop and the observers that
//! can be attached to it:
//! - Logging episode outcomes through `tracing`
//! - Progress bars
//! - Metrics tracking
//! - JSONL export of episodes and steps

pub mod observers;
pub mod training;

pub use observers::{
    EpisodeObservation, JsonlObserver, LogObserver, MetricsObserver, MetricsSummary,
    ProgressObserver,
};
pub use training::{TrainingConfig, TrainingPipeline, TrainingResult, milestone_file_name};

pub use crate::ports::{Environment, Observer};
