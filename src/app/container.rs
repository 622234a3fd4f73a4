//! Dependency injection container for the flappy-q application.
//!
//! The container owns infrastructure dependencies (snapshot storage, default
//! seed) and wires them into agents and training pipelines.

use std::{path::Path, sync::Arc};

use super::config::AgentConfig;
use crate::{
    Result,
    adapters::MsgPackRepository,
    pipeline::{TrainingConfig, TrainingPipeline},
    ports::SnapshotRepository,
    q_learning::{QLearningAgent, QTable},
};

/// Application with dependency injection.
///
/// # Examples
///
/// ## Production usage
///
/// ```
/// use flappy_q::app::{AgentConfig, App};
///
/// let app = App::new();
/// let agent = app.create_agent(AgentConfig::default().with_seed(42))?;
/// # Ok::<(), flappy_q::Error>(())
/// ```
///
/// ## Testing with dependency injection
///
/// ```
/// use flappy_q::adapters::InMemoryRepository;
/// use flappy_q::app::App;
///
/// let app = App::for_testing()
///     .with_repository(InMemoryRepository::new())
///     .with_default_seed(42)
///     .build();
/// ```
pub struct App {
    /// Repository for milestone snapshots
    repository: Arc<dyn SnapshotRepository + Send + Sync>,
    /// Default random seed (None = non-deterministic)
    default_seed: Option<u64>,
}

impl App {
    /// Create a new app with production defaults.
    ///
    /// Uses:
    /// - `MsgPackRepository` for snapshot persistence
    /// - No default seed (non-deterministic RNG)
    pub fn new() -> Self {
        Self {
            repository: Arc::new(MsgPackRepository::new()),
            default_seed: None,
        }
    }

    /// Create a builder for constructing app with custom dependencies.
    pub fn for_testing() -> AppBuilder {
        AppBuilder::new()
    }

    /// Get the snapshot repository.
    pub fn repository(&self) -> Arc<dyn SnapshotRepository + Send + Sync> {
        Arc::clone(&self.repository)
    }

    fn seeded(&self, mut config: AgentConfig) -> AgentConfig {
        config.seed = config.seed.or(self.default_seed);
        config
    }

    /// Create a new agent with a zeroed table.
    ///
    /// A seed in `config` takes precedence over the container default.
    pub fn create_agent(&self, config: AgentConfig) -> Result<QLearningAgent> {
        QLearningAgent::new(self.seeded(config))
    }

    /// Create an agent continuing from a saved snapshot.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use flappy_q::app::{AgentConfig, App};
    /// use std::path::Path;
    ///
    /// let app = App::new();
    /// let agent = app.load_agent(AgentConfig::default(), Path::new("301_42.msgpack"))?;
    /// # Ok::<(), flappy_q::Error>(())
    /// ```
    pub fn load_agent(&self, config: AgentConfig, path: &Path) -> Result<QLearningAgent> {
        let table = self.load_table(&config, path)?;
        QLearningAgent::with_table(self.seeded(config), table)
    }

    /// Load a snapshot as a table using the learning parameters of `config`.
    pub fn load_table(&self, config: &AgentConfig, path: &Path) -> Result<QTable> {
        let snapshot = self.repository.load(path)?;
        QTable::from_snapshot(snapshot, config.learning_rate, config.discount_factor)
    }

    /// Save an agent's table.
    pub fn save_agent(&self, agent: &QLearningAgent, path: &Path) -> Result<()> {
        self.repository.save(&agent.q_table().to_snapshot(), path)
    }

    /// Create a training pipeline that persists snapshots through this app's repository.
    pub fn create_pipeline(&self, mut config: TrainingConfig) -> TrainingPipeline {
        config.seed = config.seed.or(self.default_seed);
        TrainingPipeline::new(config).with_repository(self.repository())
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for constructing app with custom dependencies.
///
/// Primarily used for testing to inject in-memory repositories and control randomness.
pub struct AppBuilder {
    repository: Option<Arc<dyn SnapshotRepository + Send + Sync>>,
    default_seed: Option<u64>,
}

impl AppBuilder {
    /// Create a new app builder.
    pub fn new() -> Self {
        Self {
            repository: None,
            default_seed: None,
        }
    }

    /// Set a custom snapshot repository.
    pub fn with_repository<R: SnapshotRepository + Send + Sync + 'static>(
        mut self,
        repo: R,
    ) -> Self {
        self.repository = Some(Arc::new(repo));
        self
    }

    /// Set a default random seed for all agents and pipelines created by this container.
    pub fn with_default_seed(mut self, seed: u64) -> Self {
        self.default_seed = Some(seed);
        self
    }

    /// Build the app with the configured dependencies.
    ///
    /// If no repository was specified, uses `MsgPackRepository` by default.
    pub fn build(self) -> App {
        App {
            repository: self
                .repository
                .unwrap_or_else(|| Arc::new(MsgPackRepository::new())),
            default_seed: self.default_seed,
        }
    }
}

impl Default for AppBuilder {
    fn default() -> Self {
        Self::new()
    }
}
