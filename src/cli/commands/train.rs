//! Train command - Replay scripted episodes through the training loop
//!
//! The game itself runs outside this crate; this command drives the agent
//! against recorded episodes so learning runs can be reproduced offline.

use std::{
    cell::RefCell,
    path::{Path, PathBuf},
    rc::Rc,
};

use anyhow::{Context, Result};
use clap::Parser;

use crate::{
    adapters::{ScriptedEnvironment, ScriptedEpisode},
    app::{AgentConfig, App},
    cli::output::{format_number, print_kv, print_section},
    pipeline::{
        JsonlObserver, LogObserver, MetricsObserver, ProgressObserver, TrainingConfig,
        TrainingResult,
    },
};

#[derive(Parser, Debug)]
#[command(about = "Train an agent on recorded episodes")]
pub struct TrainArgs {
    /// JSON file holding a list of scripted episodes
    pub script: PathBuf,

    /// Number of episodes to play
    #[arg(long, short = 'e', default_value_t = 1000)]
    pub episodes: u64,

    /// Agent configuration (JSON); reference defaults when omitted
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Continue from an existing snapshot
    #[arg(long)]
    pub resume: Option<PathBuf>,

    /// Directory receiving milestone snapshots
    #[arg(long, default_value = ".")]
    pub snapshot_dir: PathBuf,

    /// Episodes scoring above this are snapshotted
    #[arg(long, default_value_t = 300.0)]
    pub milestone: f64,

    /// Random seed for reproducibility
    #[arg(long)]
    pub seed: Option<u64>,

    /// Enable ε-greedy exploration
    #[arg(long)]
    pub explore: bool,

    /// Log every n-th episode
    #[arg(long, default_value_t = 100)]
    pub log_every: u64,

    /// Show a progress bar
    #[arg(long)]
    pub progress: bool,

    /// Write per-episode summaries as JSON Lines
    #[arg(long)]
    pub jsonl: Option<PathBuf>,

    /// Write the training result as JSON
    #[arg(long)]
    pub summary: Option<PathBuf>,

    /// Save the final table to this path
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

/// Read a list of scripted episodes from a JSON file.
pub fn load_script(path: &Path) -> Result<Vec<ScriptedEpisode>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open script {}", path.display()))?;
    let episodes = serde_json::from_reader(std::io::BufReader::new(file))
        .with_context(|| format!("Failed to parse script {}", path.display()))?;
    Ok(episodes)
}

pub fn execute(args: TrainArgs) -> Result<TrainingResult> {
    let mut env = ScriptedEnvironment::new(load_script(&args.script)?)?;

    let mut agent_config = match &args.config {
        Some(path) => AgentConfig::from_json_file(path)
            .with_context(|| format!("Failed to load agent config {}", path.display()))?,
        None => AgentConfig::default(),
    };
    if args.explore {
        agent_config = agent_config.with_exploration(true);
    }

    let app = App::new();
    let mut agent = match &args.resume {
        Some(path) => app.load_agent(agent_config, path)?,
        None => app.create_agent(agent_config)?,
    };

    let mut training = TrainingConfig::default()
        .with_episodes(args.episodes)
        .with_milestone_score(args.milestone)
        .with_snapshot_dir(&args.snapshot_dir);
    if let Some(seed) = args.seed {
        training = training.with_seed(seed);
    }

    let metrics = Rc::new(RefCell::new(MetricsObserver::new()));
    let mut pipeline = app
        .create_pipeline(training)
        .with_observer(Box::new(LogObserver::every(args.log_every)))
        .with_observer(Box::new(Rc::clone(&metrics)));
    if args.progress {
        pipeline = pipeline.with_observer(Box::new(ProgressObserver::new()));
    }
    if let Some(path) = &args.jsonl {
        pipeline = pipeline.with_observer(Box::new(JsonlObserver::new(path)?));
    }

    let result = pipeline.run(&mut agent, &mut env)?;
    let metrics = metrics.borrow();
    let summary = metrics.summary();

    print_section("Training complete");
    print_kv("Episodes", &format_number(summary.episodes));
    print_kv("Steps", &format_number(summary.total_steps));
    print_kv("Max score", &summary.max_score.to_string());
    print_kv("Mean score", &format!("{:.2}", summary.mean_score));
    print_kv(
        "Avg episode length",
        &format!("{:.2}", summary.avg_episode_length),
    );
    print_kv("Collisions", &format_number(summary.collisions));
    print_kv("Final epsilon", &format!("{:.6}", result.final_epsilon));
    print_kv("Visited cells", &agent.q_table().visited_cells().to_string());
    print_kv("Snapshots", &summary.snapshots.to_string());
    for path in metrics.snapshots() {
        println!("  ✓ {}", path.display());
    }

    if let Some(path) = &args.summary {
        result.save(path)?;
        println!("✓ Training summary saved to: {}", path.display());
    }
    if let Some(path) = &args.output {
        app.save_agent(&agent, path)?;
        println!("✓ Table saved to: {}", path.display());
    }

    Ok(result)
}
