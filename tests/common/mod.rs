//! Common test utilities for the flappy-q test suite.
//!
//! Builders for scripted episodes with hand-picked observations.

#![allow(dead_code)]

use flappy_q::{
    adapters::{ScriptedEpisode, ScriptedStep},
    types::RawObservation,
};

/// Observation with the given vertical offset and pipe distance, velocity 0.
pub fn obs(offset: f64, distance: f64) -> RawObservation {
    RawObservation {
        player_y: offset,
        player_vel: 0.0,
        next_pipe_top_y: 0.0,
        next_pipe_dist_to_player: distance,
    }
}

/// Episode that starts at `start` and replays `(signal, observation)` pairs.
pub fn episode(start: RawObservation, steps: &[(f64, RawObservation)]) -> ScriptedEpisode {
    ScriptedEpisode {
        start,
        steps: steps
            .iter()
            .map(|&(signal, observation)| ScriptedStep {
                signal,
                observation,
            })
            .collect(),
    }
}

/// Three steps with signals `[0, 0, 1]`, each landing in a different height bucket.
pub fn three_step_episode() -> ScriptedEpisode {
    episode(
        obs(100.0, 200.0),
        &[
            (0.0, obs(30.0, 200.0)),
            (0.0, obs(10.0, 200.0)),
            (1.0, obs(5.0, 200.0)),
        ],
    )
}

/// `passes` scoring steps followed by a collision.
pub fn passes_then_death(passes: usize) -> ScriptedEpisode {
    let mut steps: Vec<(f64, RawObservation)> = (0..passes)
        .map(|i| (1.0, obs(60.0 + (i % 7) as f64 * 20.0, (i % 300) as f64)))
        .collect();
    steps.push((-5.0, obs(0.0, 0.0)));
    episode(obs(100.0, 200.0), &steps)
}
