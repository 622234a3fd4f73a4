//! Scripted environment for deterministic training runs.
//!
//! Replays pre-recorded episodes instead of simulating the game. Each step
//! pops the next raw signal and observation from the script regardless of the
//! action taken, which makes the learning loop fully predictable in tests.

use serde::{Deserialize, Serialize};

use crate::{Error, Result, ports::Environment, types::RawObservation};

/// Key code the game binds to a flap.
pub const FLAP_KEY: u32 = 119;

/// One scripted frame: what the environment returns after an action.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScriptedStep {
    pub signal: f64,
    pub observation: RawObservation,
}

/// One scripted episode. The episode ends after its last step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptedEpisode {
    pub start: RawObservation,
    pub steps: Vec<ScriptedStep>,
}

/// [`Environment`] that cycles through a fixed list of episodes.
///
/// The score counts the steps whose signal was exactly 1, like the game's
/// passed-pipe counter.
#[derive(Debug, Clone)]
pub struct ScriptedEnvironment {
    episodes: Vec<ScriptedEpisode>,
    next_episode: usize,
    current: Option<usize>,
    cursor: usize,
    score: f64,
    actions: Option<Vec<Option<u32>>>,
}

impl ScriptedEnvironment {
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if there are no episodes or an
    /// episode has no steps.
    pub fn new(episodes: Vec<ScriptedEpisode>) -> Result<Self> {
        if episodes.is_empty() || episodes.iter().any(|episode| episode.steps.is_empty()) {
            return Err(Error::InvalidConfiguration {
                message: "scripted environment needs at least one non-empty episode".to_string(),
            });
        }
        Ok(Self {
            episodes,
            next_episode: 0,
            current: None,
            cursor: 0,
            score: 0.0,
            actions: None,
        })
    }

    /// Keep a log of every action code received, across all episodes.
    ///
    /// Off by default; the log grows by one entry per step.
    pub fn recording(mut self) -> Self {
        self.actions = Some(Vec::new());
        self
    }

    /// Action codes received so far. Empty unless [`Self::recording`] was enabled.
    pub fn actions(&self) -> &[Option<u32>] {
        self.actions.as_deref().unwrap_or_default()
    }

    fn episode(&self, operation: &str) -> Result<&ScriptedEpisode> {
        self.current
            .map(|idx| &self.episodes[idx])
            .ok_or_else(|| Error::environment(operation, "reset() has not been called"))
    }
}

impl Environment for ScriptedEnvironment {
    type ActionCode = Option<u32>;

    fn action_set(&self) -> Vec<Option<u32>> {
        vec![Some(FLAP_KEY), None]
    }

    fn reset(&mut self) -> Result<()> {
        self.current = Some(self.next_episode);
        self.next_episode = (self.next_episode + 1) % self.episodes.len();
        self.cursor = 0;
        self.score = 0.0;
        Ok(())
    }

    fn observe(&self) -> Result<RawObservation> {
        let episode = self.episode("observe")?;
        Ok(match self.cursor {
            0 => episode.start,
            n => episode.steps[n - 1].observation,
        })
    }

    fn act(&mut self, code: &Option<u32>) -> Result<f64> {
        if self.is_over() {
            return Err(Error::environment("act", "episode is already over"));
        }
        let step = self.episode("act")?.steps[self.cursor];
        self.cursor += 1;
        if let Some(actions) = &mut self.actions {
            actions.push(*code);
        }
        if step.signal == 1.0 {
            self.score += 1.0;
        }
        Ok(step.signal)
    }

    fn score(&self) -> f64 {
        self.score
    }

    fn is_over(&self) -> bool {
        self.current
            .is_some_and(|idx| self.cursor >= self.episodes[idx].steps.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(y: f64) -> RawObservation {
        RawObservation {
            player_y: y,
            ..RawObservation::default()
        }
    }

    fn episode(signals: &[f64]) -> ScriptedEpisode {
        ScriptedEpisode {
            start: obs(0.0),
            steps: signals
                .iter()
                .enumerate()
                .map(|(i, &signal)| ScriptedStep {
                    signal,
                    observation: obs(i as f64 + 1.0),
                })
                .collect(),
        }
    }

    #[test]
    fn test_replays_script_and_counts_score() {
        let mut env = ScriptedEnvironment::new(vec![episode(&[0.0, 1.0, -5.0])])
            .unwrap()
            .recording();
        env.reset().unwrap();
        assert_eq!(env.observe().unwrap(), obs(0.0));

        assert_eq!(env.act(&None).unwrap(), 0.0);
        assert_eq!(env.observe().unwrap(), obs(1.0));
        assert_eq!(env.act(&Some(FLAP_KEY)).unwrap(), 1.0);
        assert_eq!(env.score(), 1.0);
        assert!(!env.is_over());
        assert_eq!(env.act(&None).unwrap(), -5.0);
        assert!(env.is_over());
        assert_eq!(env.actions(), &[None, Some(FLAP_KEY), None]);
    }

    #[test]
    fn test_actions_not_kept_unless_recording() {
        let mut env = ScriptedEnvironment::new(vec![episode(&[0.0, 1.0, -5.0])]).unwrap();
        for _ in 0..1000 {
            env.reset().unwrap();
            while !env.is_over() {
                env.act(&Some(FLAP_KEY)).unwrap();
            }
        }
        assert!(env.actions().is_empty());
        assert!(env.actions.is_none());
    }

    #[test]
    fn test_act_after_game_over_fails() {
        let mut env = ScriptedEnvironment::new(vec![episode(&[-5.0])]).unwrap();
        env.reset().unwrap();
        env.act(&None).unwrap();
        assert!(matches!(env.act(&None), Err(Error::Environment { .. })));
    }

    #[test]
    fn test_observe_before_reset_fails() {
        let env = ScriptedEnvironment::new(vec![episode(&[-5.0])]).unwrap();
        assert!(env.observe().is_err());
        assert!(!env.is_over());
    }

    #[test]
    fn test_episodes_cycle() {
        let mut env =
            ScriptedEnvironment::new(vec![episode(&[-5.0]), episode(&[1.0, -5.0])]).unwrap();
        for expected_len in [1, 2, 1] {
            env.reset().unwrap();
            let mut steps = 0;
            while !env.is_over() {
                env.act(&None).unwrap();
                steps += 1;
            }
            assert_eq!(steps, expected_len);
        }
    }

    #[test]
    fn test_rejects_empty_script() {
        assert!(ScriptedEnvironment::new(Vec::new()).is_err());
        assert!(ScriptedEnvironment::new(vec![episode(&[])]).is_err());
    }
}
