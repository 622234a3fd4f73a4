//! Episodic training loop

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    Result,
    adapters::{MsgPackRepository, SNAPSHOT_EXTENSION},
    ports::{Environment, EpisodeSummary, Observer, SnapshotRepository, StepRecord},
    q_learning::QLearningAgent,
    types::ActionSet,
};

/// Training configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Number of episodes to play
    pub num_episodes: u64,

    /// Episodes scoring strictly above this are snapshotted
    pub milestone_score: f64,

    /// Directory receiving milestone snapshots
    pub snapshot_dir: PathBuf,

    /// Random seed applied to the agent before training
    pub seed: Option<u64>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            num_episodes: 2_000_000_000,
            milestone_score: 300.0,
            snapshot_dir: PathBuf::from("."),
            seed: None,
        }
    }
}

impl TrainingConfig {
    pub fn with_episodes(mut self, num_episodes: u64) -> Self {
        self.num_episodes = num_episodes;
        self
    }

    pub fn with_milestone_score(mut self, milestone_score: f64) -> Self {
        self.milestone_score = milestone_score;
        self
    }

    pub fn with_snapshot_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.snapshot_dir = dir.into();
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// File name of a milestone snapshot: `{score}_{episode}.msgpack`.
pub fn milestone_file_name(score: f64, episode: u64) -> String {
    format!("{score}_{episode}.{SNAPSHOT_EXTENSION}")
}

/// Result of a training run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingResult {
    /// Episodes played
    pub total_episodes: u64,

    /// Agent steps across all episodes
    pub total_steps: u64,

    /// Best episode score
    pub max_score: f64,

    /// Mean episode score
    pub mean_score: f64,

    /// Exploration rate after the last episode
    pub final_epsilon: f64,

    /// Milestone snapshots written, in order
    pub snapshots: Vec<PathBuf>,
}

impl TrainingResult {
    /// Save result to JSON file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }

    /// Load result from JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let result = serde_json::from_reader(file)?;
        Ok(result)
    }
}

/// Running totals across episodes.
#[derive(Debug, Default)]
struct Tally {
    episodes: u64,
    steps: u64,
    score_sum: f64,
    max_score: f64,
    snapshots: Vec<PathBuf>,
}

/// Training pipeline driving a [`QLearningAgent`] against an [`Environment`]
///
/// Each episode resets the environment, then repeatedly selects an action,
/// executes it, shapes the raw signal into a reward and applies a TD update
/// until the environment reports the episode is over. At the end of the
/// episode the exploration rate decays once and a table snapshot is written
/// if the score beat the milestone.
pub struct TrainingPipeline {
    config: TrainingConfig,
    observers: Vec<Box<dyn Observer>>,
    repository: Box<dyn SnapshotRepository>,
}

impl TrainingPipeline {
    /// Create a new training pipeline writing snapshots with MessagePack
    pub fn new(config: TrainingConfig) -> Self {
        Self {
            config,
            observers: Vec::new(),
            repository: Box::new(MsgPackRepository::new()),
        }
    }

    /// Add an observer to the pipeline
    pub fn with_observer(mut self, observer: Box<dyn Observer>) -> Self {
        self.observers.push(observer);
        self
    }

    /// Replace the snapshot repository
    pub fn with_repository<R: SnapshotRepository + 'static>(mut self, repository: R) -> Self {
        self.repository = Box::new(repository);
        self
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Run the configured number of episodes
    ///
    /// # Errors
    ///
    /// Fails if the environment's action set is not `[flap, no-op]`, or as
    /// soon as the environment, the repository or an observer fails.
    pub fn run<E: Environment>(
        &mut self,
        agent: &mut QLearningAgent,
        env: &mut E,
    ) -> Result<TrainingResult> {
        if let Some(seed) = self.config.seed {
            agent.set_rng_seed(seed);
        }
        let action_set = ActionSet::new(env.action_set())?;

        info!(
            episodes = self.config.num_episodes,
            milestone = self.config.milestone_score,
            explore = agent.explores(),
            "starting training"
        );

        for observer in &mut self.observers {
            observer.on_training_start(self.config.num_episodes)?;
        }

        let mut tally = Tally::default();
        for episode in 0..self.config.num_episodes {
            let summary = self.run_episode(episode, agent, env, &action_set, &mut tally)?;

            for observer in &mut self.observers {
                observer.on_episode_end(&summary)?;
            }
        }

        for observer in &mut self.observers {
            observer.on_training_end()?;
        }

        let mean_score = if tally.episodes > 0 {
            tally.score_sum / tally.episodes as f64
        } else {
            0.0
        };

        info!(
            episodes = tally.episodes,
            max_score = tally.max_score,
            snapshots = tally.snapshots.len(),
            "training finished"
        );

        Ok(TrainingResult {
            total_episodes: tally.episodes,
            total_steps: tally.steps,
            max_score: tally.max_score,
            mean_score,
            final_epsilon: agent.epsilon(),
            snapshots: tally.snapshots,
        })
    }

    fn run_episode<E: Environment>(
        &mut self,
        episode: u64,
        agent: &mut QLearningAgent,
        env: &mut E,
        action_set: &ActionSet<E::ActionCode>,
        tally: &mut Tally,
    ) -> Result<EpisodeSummary> {
        env.reset()?;
        for observer in &mut self.observers {
            observer.on_episode_start(episode)?;
        }

        let mut state = agent.state(&env.observe()?);
        let mut steps = 0;
        let mut total_reward = 0.0;

        let score = loop {
            let action = agent.select_action(&state);
            let raw_signal = env.act(action_set.code(action))?;
            let reward = agent.reward(raw_signal);
            let next_state = agent.state(&env.observe()?);
            let q_value = agent.learn(&state, action, reward, &next_state);
            let score = env.score();

            let record = StepRecord {
                state,
                action,
                raw_signal,
                reward,
                next_state,
                q_value,
            };
            for observer in &mut self.observers {
                observer.on_step(episode, steps, &record)?;
            }

            state = next_state;
            steps += 1;
            total_reward += reward;

            if env.is_over() {
                break score;
            }
        };

        tally.episodes += 1;
        tally.steps += steps as u64;
        tally.score_sum += score;
        tally.max_score = tally.max_score.max(score);
        agent.decay_epsilon();

        debug!(episode, score, steps, epsilon = agent.epsilon(), "episode over");

        if score > self.config.milestone_score {
            let path = self
                .config
                .snapshot_dir
                .join(milestone_file_name(score, episode));
            self.repository.save(&agent.q_table().to_snapshot(), &path)?;
            info!(episode, score, path = %path.display(), "saved milestone snapshot");

            for observer in &mut self.observers {
                observer.on_snapshot_saved(episode, score, &path)?;
            }
            tally.snapshots.push(path);
        }

        Ok(EpisodeSummary {
            episode,
            score,
            max_score: tally.max_score,
            steps,
            total_reward,
            epsilon: agent.epsilon(),
        })
    }
}
