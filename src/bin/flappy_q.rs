//! flappy-q CLI - Tabular Q-learning toolkit for Flappy Bird agents
//!
//! This CLI provides:
//! - Offline training runs against recorded episodes
//! - Summaries of persisted Q-table snapshots
//! - Greedy policy grids per velocity bucket

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(name = "flappy-q")]
#[command(version, about = "Tabular Q-learning toolkit for Flappy Bird", long_about = None)]
struct Cli {
    /// Log level used when RUST_LOG is not set
    #[arg(long, global = true, default_value_t = Level::INFO)]
    log_level: Level,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train an agent on recorded episodes
    Train(Box<flappy_q::cli::commands::train::TrainArgs>),

    /// Summarize a Q-table snapshot
    Inspect(flappy_q::cli::commands::inspect::InspectArgs),

    /// Print the greedy policy of a Q-table snapshot
    Policy(flappy_q::cli::commands::policy::PolicyArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_level.as_str().to_lowercase()));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Train(args) => flappy_q::cli::commands::train::execute(*args).map(|_| ()),
        Commands::Inspect(args) => flappy_q::cli::commands::inspect::execute(args),
        Commands::Policy(args) => flappy_q::cli::commands::policy::execute(args),
    }
}
