//! Observer implementations for the training pipeline
//!
//! Observers allow composable data collection during training without coupling
//! training logic to specific output formats.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    Result,
    ports::{EpisodeSummary, Observer, StepRecord},
};

/// Log observer - Emits one line per episode through `tracing`
///
/// With an interval of `n`, only every n-th episode is logged. Episodes that
/// set a new best score are always logged.
pub struct LogObserver {
    interval: u64,
    best_logged: f64,
}

impl LogObserver {
    /// Log every episode
    pub fn new() -> Self {
        Self::every(1)
    }

    /// Log every `interval`-th episode
    pub fn every(interval: u64) -> Self {
        Self {
            interval: interval.max(1),
            best_logged: f64::NEG_INFINITY,
        }
    }
}

impl Default for LogObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl Observer for LogObserver {
    fn on_episode_end(&mut self, summary: &EpisodeSummary) -> Result<()> {
        let new_best = summary.score > self.best_logged;
        if new_best || summary.episode.is_multiple_of(self.interval) {
            info!(
                episode = summary.episode,
                score = summary.score,
                max_score = summary.max_score,
                steps = summary.steps,
                epsilon = summary.epsilon,
                "episode finished"
            );
        }
        if new_best {
            self.best_logged = summary.score;
        }
        Ok(())
    }

    fn on_snapshot_saved(&mut self, episode: u64, score: f64, path: &Path) -> Result<()> {
        info!(episode, score, path = %path.display(), "milestone reached");
        Ok(())
    }
}

/// Progress bar observer - Shows training progress
pub struct ProgressObserver {
    progress_bar: Option<ProgressBar>,
}

impl ProgressObserver {
    /// Create a new progress observer
    pub fn new() -> Self {
        Self { progress_bar: None }
    }
}

impl Default for ProgressObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl Observer for ProgressObserver {
    fn on_training_start(&mut self, total_episodes: u64) -> Result<()> {
        let pb = ProgressBar::new(total_episodes);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} episodes ({msg})")
                .map_err(|e| crate::Error::ProgressBarTemplate {
                    message: e.to_string(),
                })?
                .progress_chars("=>-"),
        );
        self.progress_bar = Some(pb);
        Ok(())
    }

    fn on_episode_end(&mut self, summary: &EpisodeSummary) -> Result<()> {
        if let Some(pb) = &self.progress_bar {
            pb.set_position(summary.episode + 1);
            pb.set_message(format!(
                "score {} max {} ε {:.4}",
                summary.score, summary.max_score, summary.epsilon
            ));
        }
        Ok(())
    }

    fn on_training_end(&mut self) -> Result<()> {
        if let Some(pb) = &self.progress_bar {
            pb.finish();
        }
        Ok(())
    }
}

/// Metrics observer - Tracks training metrics
#[derive(Debug, Default)]
pub struct MetricsObserver {
    episodes: u64,
    total_steps: u64,
    score_sum: f64,
    max_score: f64,
    collisions: u64,
    snapshots: Vec<PathBuf>,
}

impl MetricsObserver {
    /// Create a new metrics observer
    pub fn new() -> Self {
        Self::default()
    }

    /// Get mean episode score
    pub fn mean_score(&self) -> f64 {
        if self.episodes == 0 {
            0.0
        } else {
            self.score_sum / self.episodes as f64
        }
    }

    /// Get average episode length in steps
    pub fn avg_episode_length(&self) -> f64 {
        if self.episodes == 0 {
            0.0
        } else {
            self.total_steps as f64 / self.episodes as f64
        }
    }

    /// Snapshot paths reported so far
    pub fn snapshots(&self) -> &[PathBuf] {
        &self.snapshots
    }

    /// Get metrics summary
    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            episodes: self.episodes,
            total_steps: self.total_steps,
            max_score: self.max_score,
            mean_score: self.mean_score(),
            avg_episode_length: self.avg_episode_length(),
            collisions: self.collisions,
            snapshots: self.snapshots.len(),
        }
    }
}

/// Summary of training metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSummary {
    pub episodes: u64,
    pub total_steps: u64,
    pub max_score: f64,
    pub mean_score: f64,
    pub avg_episode_length: f64,
    /// Steps whose raw signal was neither 0 nor 1
    pub collisions: u64,
    pub snapshots: usize,
}

impl Observer for MetricsObserver {
    fn on_step(&mut self, _episode: u64, _step: usize, record: &StepRecord) -> Result<()> {
        if record.raw_signal != 0.0 && record.raw_signal != 1.0 {
            self.collisions += 1;
        }
        Ok(())
    }

    fn on_snapshot_saved(&mut self, _episode: u64, _score: f64, path: &Path) -> Result<()> {
        self.snapshots.push(path.to_path_buf());
        Ok(())
    }

    fn on_episode_end(&mut self, summary: &EpisodeSummary) -> Result<()> {
        self.episodes += 1;
        self.total_steps += summary.steps as u64;
        self.score_sum += summary.score;
        self.max_score = self.max_score.max(summary.score);
        Ok(())
    }
}

/// Complete observation of a training episode
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpisodeObservation {
    #[serde(flatten)]
    pub summary: EpisodeSummary,
    /// Per-step records, empty unless step capture is enabled
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub steps: Vec<StepRecord>,
}

/// JSONL observer - Exports observations to JSON Lines format
pub struct JsonlObserver {
    writer: BufWriter<File>,
    include_steps: bool,
    current_steps: Vec<StepRecord>,
}

impl JsonlObserver {
    /// Create a new JSONL observer writing one summary line per episode
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::create(path)?;
        Ok(Self {
            writer: BufWriter::new(file),
            include_steps: false,
            current_steps: Vec::new(),
        })
    }

    /// Also record every step of each episode
    pub fn with_steps(mut self) -> Self {
        self.include_steps = true;
        self
    }
}

impl Observer for JsonlObserver {
    fn on_episode_start(&mut self, _episode: u64) -> Result<()> {
        self.current_steps.clear();
        Ok(())
    }

    fn on_step(&mut self, _episode: u64, _step: usize, record: &StepRecord) -> Result<()> {
        if self.include_steps {
            self.current_steps.push(*record);
        }
        Ok(())
    }

    fn on_episode_end(&mut self, summary: &EpisodeSummary) -> Result<()> {
        let observation = EpisodeObservation {
            summary: *summary,
            steps: std::mem::take(&mut self.current_steps),
        };

        // Write as JSONL (one JSON object per line)
        serde_json::to_writer(&mut self.writer, &observation)?;
        writeln!(&mut self.writer)?;
        self.writer.flush()?;

        Ok(())
    }
}
