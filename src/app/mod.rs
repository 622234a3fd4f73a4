//! Application layer with dependency injection container.
//!
//! The container owns infrastructure dependencies and provides factory
//! methods for creating agents and training pipelines.
//!
//! # Usage
//!
//! ## Production
//!
//! ```
//! use flappy_q::app::{AgentConfig, App};
//!
//! let app = App::new();
//! let agent = app.create_agent(AgentConfig::default().with_seed(42))?;
//! # Ok::<(), flappy_q::Error>(())
//! ```
//!
//! ## Testing
//!
//! ```
//! use flappy_q::adapters::InMemoryRepository;
//! use flappy_q::app::App;
//!
//! let app = App::for_testing()
//!     .with_repository(InMemoryRepository::new())
//!     .with_default_seed(42)
//!     .build();
//! ```

pub mod config;
pub mod container;

pub use config::{AgentConfig, DiscretizerConfig, RewardShaping};
pub use container::{App, AppBuilder};
