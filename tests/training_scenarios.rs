//! End-to-end training runs against scripted episodes.

mod common;

use std::{cell::RefCell, rc::Rc};

use common::{episode, obs, passes_then_death, three_step_episode};
use flappy_q::{
    Error, Result,
    adapters::{InMemoryRepository, ScriptedEnvironment},
    app::AgentConfig,
    pipeline::{
        LogObserver, MetricsObserver, ProgressObserver, TrainingConfig, TrainingPipeline,
    },
    ports::Environment,
    q_learning::QLearningAgent,
    types::{Action, DiscreteState, RawObservation},
};

fn pipeline(episodes: u64) -> TrainingPipeline {
    TrainingPipeline::new(TrainingConfig::default().with_episodes(episodes))
        .with_repository(InMemoryRepository::new())
}

#[test]
fn test_single_three_step_episode() {
    let mut env = ScriptedEnvironment::new(vec![three_step_episode()])
        .unwrap()
        .recording();
    let mut agent = QLearningAgent::new(AgentConfig::default()).unwrap();

    let result = pipeline(1).run(&mut agent, &mut env).unwrap();

    let table = agent.q_table();
    assert_eq!(table.visited_cells(), 3);
    // greedy on a zero table always picks no-op
    assert_eq!(env.actions(), &[None, None, None]);
    assert!((table.value(&DiscreteState::new(3, 4, 4), Action::NoOp) - 0.7).abs() < 1e-12);
    assert!((table.value(&DiscreteState::new(2, 4, 4), Action::NoOp) - 0.7).abs() < 1e-12);
    assert!((table.value(&DiscreteState::new(1, 4, 4), Action::NoOp) - 7.0).abs() < 1e-12);

    assert_eq!(result.total_episodes, 1);
    assert_eq!(result.total_steps, 3);
    assert_eq!(result.max_score, 1.0);
    assert!((agent.epsilon() - 0.76).abs() < 1e-12);
}

#[test]
fn test_collision_is_punished() {
    let mut env = ScriptedEnvironment::new(vec![episode(
        obs(100.0, 200.0),
        &[(0.0, obs(30.0, 200.0)), (-5.0, obs(0.0, 200.0))],
    )])
    .unwrap();
    let mut agent = QLearningAgent::new(AgentConfig::default()).unwrap();

    pipeline(1).run(&mut agent, &mut env).unwrap();

    let crash_state = DiscreteState::new(2, 4, 4);
    assert!((agent.q_table().value(&crash_state, Action::NoOp) + 700.0).abs() < 1e-9);
    assert_eq!(agent.q_table().best_action(&crash_state), Action::Flap);
}

#[test]
fn test_second_episode_bootstraps_from_next_state() {
    let mut env = ScriptedEnvironment::new(vec![three_step_episode()]).unwrap();
    let mut agent = QLearningAgent::new(AgentConfig::default()).unwrap();

    pipeline(2).run(&mut agent, &mut env).unwrap();

    // 0.3 * 0.7 + 0.7 * (1 + 0.8 * 0.7)
    let start = DiscreteState::new(3, 4, 4);
    assert!((agent.q_table().value(&start, Action::NoOp) - 1.302).abs() < 1e-9);
    assert!((agent.epsilon() - 0.8 * 0.95 * 0.95).abs() < 1e-12);
}

#[test]
fn test_seeded_exploration_is_reproducible() {
    let run = || {
        let mut env = ScriptedEnvironment::new(vec![passes_then_death(20)])
            .unwrap()
            .recording();
        let config = AgentConfig::default().with_exploration(true);
        let mut agent = QLearningAgent::new(config).unwrap();
        let mut pipeline = TrainingPipeline::new(
            TrainingConfig::default().with_episodes(25).with_seed(7),
        )
        .with_repository(InMemoryRepository::new());
        pipeline.run(&mut agent, &mut env).unwrap();
        (env.actions().to_vec(), agent.q_table().clone())
    };

    let (actions_a, table_a) = run();
    let (actions_b, table_b) = run();
    assert_eq!(actions_a, actions_b);
    assert_eq!(table_a, table_b);
    // ε starts high, so some flaps must have been explored
    assert!(actions_a.contains(&Some(flappy_q::adapters::FLAP_KEY)));
}

#[test]
fn test_long_run_keeps_no_action_log() {
    let mut env = ScriptedEnvironment::new(vec![passes_then_death(50)]).unwrap();
    let mut agent = QLearningAgent::new(AgentConfig::default()).unwrap();

    let result = pipeline(2_000).run(&mut agent, &mut env).unwrap();

    assert_eq!(result.total_steps, 2_000 * 51);
    assert!(env.actions().is_empty());
}

#[test]
fn test_min_epsilon_floors_decay() {
    let mut env = ScriptedEnvironment::new(vec![passes_then_death(0)]).unwrap();
    let config = AgentConfig::default().with_min_epsilon(0.5);
    let mut agent = QLearningAgent::new(config).unwrap();

    let result = pipeline(50).run(&mut agent, &mut env).unwrap();
    assert_eq!(result.final_epsilon, 0.5);
}

#[test]
fn test_observers_do_not_change_outcome() {
    let mut plain_env = ScriptedEnvironment::new(vec![passes_then_death(3)]).unwrap();
    let mut plain_agent = QLearningAgent::new(AgentConfig::default()).unwrap();
    let plain = pipeline(10).run(&mut plain_agent, &mut plain_env).unwrap();

    let mut env = ScriptedEnvironment::new(vec![passes_then_death(3)]).unwrap();
    let mut agent = QLearningAgent::new(AgentConfig::default()).unwrap();
    let observed = pipeline(10)
        .with_observer(Box::new(LogObserver::every(5)))
        .with_observer(Box::new(ProgressObserver::new()))
        .with_observer(Box::new(MetricsObserver::new()))
        .run(&mut agent, &mut env)
        .unwrap();

    assert_eq!(plain, observed);
    assert_eq!(plain_agent.q_table(), agent.q_table());
}

#[test]
fn test_shared_metrics_observer_is_readable_after_run() {
    let mut env =
        ScriptedEnvironment::new(vec![passes_then_death(2), three_step_episode()]).unwrap();
    let mut agent = QLearningAgent::new(AgentConfig::default()).unwrap();
    let metrics = Rc::new(RefCell::new(MetricsObserver::new()));

    let result = pipeline(4)
        .with_observer(Box::new(Rc::clone(&metrics)))
        .run(&mut agent, &mut env)
        .unwrap();

    let summary = metrics.borrow().summary();
    assert_eq!(summary.episodes, result.total_episodes);
    assert_eq!(summary.total_steps, result.total_steps);
    assert_eq!(summary.max_score, result.max_score);
    // only the scripted deaths collide; the three-step episode ends on a pass
    assert_eq!(summary.collisions, 2);
    assert_eq!(summary.avg_episode_length, 3.0);
    assert!(metrics.borrow().snapshots().is_empty());
}

/// Counts how often the training loop asks for the action set.
struct CountingEnvironment {
    inner: ScriptedEnvironment,
    action_set_calls: Rc<RefCell<usize>>,
}

impl Environment for CountingEnvironment {
    type ActionCode = Option<u32>;

    fn action_set(&self) -> Vec<Option<u32>> {
        *self.action_set_calls.borrow_mut() += 1;
        self.inner.action_set()
    }

    fn reset(&mut self) -> Result<()> {
        self.inner.reset()
    }

    fn observe(&self) -> Result<RawObservation> {
        self.inner.observe()
    }

    fn act(&mut self, code: &Option<u32>) -> Result<f64> {
        self.inner.act(code)
    }

    fn score(&self) -> f64 {
        self.inner.score()
    }

    fn is_over(&self) -> bool {
        self.inner.is_over()
    }
}

#[test]
fn test_action_set_read_once_per_run() {
    let calls = Rc::new(RefCell::new(0));
    let mut env = CountingEnvironment {
        inner: ScriptedEnvironment::new(vec![three_step_episode()]).unwrap(),
        action_set_calls: Rc::clone(&calls),
    };
    let mut agent = QLearningAgent::new(AgentConfig::default()).unwrap();

    pipeline(25).run(&mut agent, &mut env).unwrap();
    assert_eq!(*calls.borrow(), 1);

    pipeline(5).run(&mut agent, &mut env).unwrap();
    assert_eq!(*calls.borrow(), 2);
}

/// Environment whose game process dies after a few frames.
struct FlakyEnvironment {
    frames_left: usize,
}

impl Environment for FlakyEnvironment {
    type ActionCode = &'static str;

    fn action_set(&self) -> Vec<&'static str> {
        vec!["flap", "wait"]
    }

    fn reset(&mut self) -> Result<()> {
        Ok(())
    }

    fn observe(&self) -> Result<RawObservation> {
        Ok(obs(40.0, 120.0))
    }

    fn act(&mut self, _code: &&'static str) -> Result<f64> {
        if self.frames_left == 0 {
            return Err(Error::environment("act", "game process exited"));
        }
        self.frames_left -= 1;
        Ok(0.0)
    }

    fn score(&self) -> f64 {
        0.0
    }

    fn is_over(&self) -> bool {
        false
    }
}

#[test]
fn test_environment_failure_aborts_training() {
    let mut env = FlakyEnvironment { frames_left: 4 };
    let mut agent = QLearningAgent::new(AgentConfig::default()).unwrap();

    let err = pipeline(3).run(&mut agent, &mut env).unwrap_err();
    assert!(matches!(err, Error::Environment { .. }));
    assert_eq!(agent.q_table().visited_cells(), 1);
    // the failing episode never finished, so ε is untouched
    assert_eq!(agent.epsilon(), 0.8);
}
