//! Inspect command - Summarize a persisted Q-table snapshot

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;

use crate::{
    adapters::MsgPackRepository,
    app::{AgentConfig, App, DiscretizerConfig},
    cli::output::{format_number, print_kv, print_section},
    ports::SnapshotRepository,
    q_learning::{QTable, TableShape, TableSnapshot},
    types::Action,
};

#[derive(Parser, Debug)]
#[command(about = "Summarize a Q-table snapshot")]
pub struct InspectArgs {
    /// Path to a `.msgpack` snapshot
    pub snapshot: PathBuf,

    /// Agent configuration (JSON) the table was trained with
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Print the summary as JSON instead of text
    #[arg(long)]
    pub json: bool,
}

/// Aggregate view of a table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableSummary {
    pub shape: TableShape,
    pub learning_rate: f64,
    pub discount_factor: f64,
    pub cells: usize,
    pub visited_cells: usize,
    pub min_value: f64,
    pub max_value: f64,
    pub mean_value: f64,
    /// States whose greedy action is flap
    pub flap_states: usize,
    /// States with at least one non-zero action value
    pub visited_states: usize,
}

impl TableSummary {
    pub fn of(table: &QTable) -> Self {
        let values = table.values();
        let (min_value, max_value) = values
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });
        let mean_value = if values.is_empty() {
            0.0
        } else {
            values.iter().sum::<f64>() / values.len() as f64
        };

        let mut flap_states = 0;
        let mut visited_states = 0;
        for state in table.states() {
            if table.best_action(&state) == Action::Flap {
                flap_states += 1;
            }
            if Action::ALL.iter().any(|&a| table.value(&state, a) != 0.0) {
                visited_states += 1;
            }
        }

        Self {
            shape: table.shape(),
            learning_rate: table.learning_rate(),
            discount_factor: table.discount_factor(),
            cells: table.size(),
            visited_cells: table.visited_cells(),
            min_value,
            max_value,
            mean_value,
            flap_states,
            visited_states,
        }
    }
}

/// A snapshot loaded for display.
pub(crate) struct LoadedTable {
    pub table: QTable,
    /// Thresholds the table was trained with, when known
    pub discretizer: Option<DiscretizerConfig>,
}

/// Load a snapshot from disk.
///
/// With an agent config the table is checked against its discretizer and
/// carries its learning parameters; without one the reference α and γ are
/// attached and the thresholds stay unknown.
pub(crate) fn load_table(path: &Path, config: Option<&Path>) -> Result<LoadedTable> {
    match config {
        Some(config_path) => {
            let config = AgentConfig::from_json_file(config_path).with_context(|| {
                format!("Failed to load agent config {}", config_path.display())
            })?;
            let agent = App::new()
                .load_agent(config, path)
                .with_context(|| format!("Failed to load snapshot {}", path.display()))?;
            Ok(LoadedTable {
                table: agent.q_table().clone(),
                discretizer: Some(agent.discretizer().config().clone()),
            })
        }
        None => {
            let snapshot: TableSnapshot = MsgPackRepository::new()
                .load(path)
                .with_context(|| format!("Failed to load snapshot {}", path.display()))?;
            let defaults = AgentConfig::default();
            Ok(LoadedTable {
                table: QTable::from_snapshot(
                    snapshot,
                    defaults.learning_rate,
                    defaults.discount_factor,
                )?,
                discretizer: None,
            })
        }
    }
}

pub fn execute(args: InspectArgs) -> Result<()> {
    let loaded = load_table(&args.snapshot, args.config.as_deref())?;
    let summary = TableSummary::of(&loaded.table);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    print_section(&format!("Snapshot: {}", args.snapshot.display()));
    let [height, distance, velocity, actions] = summary.shape;
    print_kv(
        "Shape",
        &format!("{height} x {distance} x {velocity} x {actions}"),
    );
    let source = if loaded.discretizer.is_some() {
        "config"
    } else {
        "default"
    };
    print_kv(
        "Learning rate",
        &format!("{} ({source})", summary.learning_rate),
    );
    print_kv(
        "Discount factor",
        &format!("{} ({source})", summary.discount_factor),
    );
    print_kv("Cells", &format_number(summary.cells as u64));
    print_kv(
        "Visited cells",
        &format!(
            "{} ({:.1}%)",
            format_number(summary.visited_cells as u64),
            100.0 * summary.visited_cells as f64 / summary.cells as f64
        ),
    );
    print_kv("Visited states", &format_number(summary.visited_states as u64));
    print_kv("Greedy flap states", &format_number(summary.flap_states as u64));
    print_kv(
        "Value range",
        &format!("[{:.3}, {:.3}]", summary.min_value, summary.max_value),
    );
    print_kv("Mean value", &format!("{:.3}", summary.mean_value));

    Ok(())
}
