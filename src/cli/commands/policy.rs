//! Policy command - Show the greedy action for every discretized state

use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::Parser;

use crate::{
    cli::{
        commands::inspect::load_table,
        output::{print_section, print_subsection},
    },
    q_learning::QTable,
    types::{Action, DiscreteState},
};

#[derive(Parser, Debug)]
#[command(about = "Print the greedy policy of a Q-table snapshot")]
pub struct PolicyArgs {
    /// Path to a `.msgpack` snapshot
    pub snapshot: PathBuf,

    /// Only show this velocity bucket
    #[arg(long, short = 'v')]
    pub velocity: Option<usize>,

    /// Agent configuration (JSON) the table was trained with; labels
    /// buckets with its thresholds instead of bare indices
    #[arg(long)]
    pub config: Option<PathBuf>,
}

/// One cell of the policy grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyCell {
    Flap,
    NoOp,
    /// Both action values are still zero
    Unvisited,
}

impl PolicyCell {
    fn symbol(self) -> char {
        match self {
            PolicyCell::Flap => 'F',
            PolicyCell::NoOp => '.',
            PolicyCell::Unvisited => ' ',
        }
    }
}

/// Greedy actions for one velocity bucket, indexed `[height][distance]`.
pub fn policy_grid(table: &QTable, velocity: usize) -> Vec<Vec<PolicyCell>> {
    let [height, distance, _, _] = table.shape();
    (0..height)
        .map(|h| {
            (0..distance)
                .map(|d| {
                    let state = DiscreteState::new(h, d, velocity);
                    if Action::ALL.iter().all(|&a| table.value(&state, a) == 0.0) {
                        PolicyCell::Unvisited
                    } else {
                        match table.best_action(&state) {
                            Action::Flap => PolicyCell::Flap,
                            Action::NoOp => PolicyCell::NoOp,
                        }
                    }
                })
                .collect()
        })
        .collect()
}

/// Human label for a bucket: `<t` below a threshold, `>=t` past the last one.
///
/// Without thresholds the bare index is used.
fn bucket_label(index: usize, thresholds: Option<&[f64]>) -> String {
    match thresholds {
        Some(thresholds) => match (thresholds.get(index), thresholds.last()) {
            (Some(t), _) => format!("<{t}"),
            (None, Some(last)) => format!(">={last}"),
            (None, None) => index.to_string(),
        },
        None => index.to_string(),
    }
}

pub fn execute(args: PolicyArgs) -> Result<()> {
    let loaded = load_table(&args.snapshot, args.config.as_deref())?;
    let table = loaded.table;
    let [_, distance, velocity_count, _] = table.shape();
    let thresholds = loaded.discretizer.as_ref();
    let heights = thresholds.map(|t| t.height_thresholds.as_slice());
    let distances = thresholds.map(|t| t.distance_thresholds.as_slice());
    let speeds = thresholds.map(|t| t.velocity_thresholds.as_slice());

    let velocities: Vec<usize> = match args.velocity {
        Some(v) if v >= velocity_count => {
            bail!("velocity bucket {v} out of range (table has {velocity_count})")
        }
        Some(v) => vec![v],
        None => (0..velocity_count).collect(),
    };

    print_section(&format!("Greedy policy: {}", args.snapshot.display()));
    println!("  F = flap, . = no-op, blank = unvisited");
    println!("  rows: height offset, columns: distance to pipe");
    if thresholds.is_none() {
        println!("  buckets shown as indices; pass --config for thresholds");
    }

    for v in velocities {
        print_subsection(&format!("velocity {}", bucket_label(v, speeds)));

        let header: Vec<String> = (0..distance)
            .map(|d| format!("{:>7}", bucket_label(d, distances)))
            .collect();
        println!("{:>7} {}", "", header.join(""));

        for (h, row) in policy_grid(&table, v).iter().enumerate() {
            let cells: String = row
                .iter()
                .map(|cell| format!("{:>7}", cell.symbol()))
                .collect();
            println!("{:>7} {cells}", bucket_label(h, heights));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        adapters::MsgPackRepository,
        app::{AgentConfig, DiscretizerConfig},
        ports::SnapshotRepository,
    };

    #[test]
    fn test_policy_grid_marks_cells() {
        let mut table = QTable::new([6, 6, 6, 2], 0.7, 0.8);
        table.set(&DiscreteState::new(0, 1, 2), Action::Flap, 3.0);
        table.set(&DiscreteState::new(4, 5, 2), Action::NoOp, 1.0);
        // tie between non-zero values goes to no-op
        table.set(&DiscreteState::new(3, 3, 2), Action::Flap, 2.0);
        table.set(&DiscreteState::new(3, 3, 2), Action::NoOp, 2.0);

        let grid = policy_grid(&table, 2);
        assert_eq!(grid.len(), 6);
        assert_eq!(grid[0].len(), 6);
        assert_eq!(grid[0][1], PolicyCell::Flap);
        assert_eq!(grid[4][5], PolicyCell::NoOp);
        assert_eq!(grid[3][3], PolicyCell::NoOp);
        assert_eq!(grid[0][0], PolicyCell::Unvisited);

        let other = policy_grid(&table, 0);
        assert!(other.iter().flatten().all(|&c| c == PolicyCell::Unvisited));
    }

    #[test]
    fn test_bucket_labels() {
        let thresholds = [8.0, 20.0, 50.0, 125.0, 250.0];
        assert_eq!(bucket_label(0, Some(&thresholds[..])), "<8");
        assert_eq!(bucket_label(5, Some(&thresholds[..])), ">=250");
        assert_eq!(bucket_label(2, None), "2");

        let custom = [10.0, 30.0, 60.0, 100.0, 200.0];
        assert_eq!(bucket_label(0, Some(&custom[..])), "<10");
        assert_eq!(bucket_label(5, Some(&custom[..])), ">=200");
    }

    #[test]
    fn test_custom_thresholds_come_from_config() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot = dir.path().join("table.msgpack");
        let config_path = dir.path().join("agent.json");
        let discretizer = DiscretizerConfig {
            height_thresholds: vec![10.0, 30.0, 60.0, 100.0, 200.0],
            ..DiscretizerConfig::default()
        };
        let config = AgentConfig::default().with_discretizer(discretizer.clone());
        std::fs::write(&config_path, serde_json::to_string(&config).unwrap()).unwrap();
        MsgPackRepository::new()
            .save(&QTable::new([6, 6, 6, 2], 0.7, 0.8).to_snapshot(), &snapshot)
            .unwrap();

        let loaded = load_table(&snapshot, Some(&config_path)).unwrap();
        assert_eq!(loaded.discretizer, Some(discretizer));
        assert!(
            execute(PolicyArgs {
                snapshot: snapshot.clone(),
                velocity: Some(0),
                config: Some(config_path),
            })
            .is_ok()
        );

        assert!(load_table(&snapshot, None).unwrap().discretizer.is_none());
    }

    #[test]
    fn test_out_of_range_velocity_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("table.msgpack");
        let table = QTable::new([6, 6, 6, 2], 0.7, 0.8);
        MsgPackRepository::new()
            .save(&table.to_snapshot(), &path)
            .unwrap();

        let result = execute(PolicyArgs {
            snapshot: path,
            velocity: Some(6),
            config: None,
        });
        assert!(result.is_err());
    }
}
