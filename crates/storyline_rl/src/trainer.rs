//! Training loop and greedy policy rollouts.
//!
//! [`Trainer`] drives the environment and the learner through complete
//! episodes. Training always runs the configured number of episodes; there
//! is no convergence check. Greedy rollouts reuse the same loop with
//! exploration switched off and no learning.

use crate::action::{DesignAction, NUM_ACTIONS};
use crate::config::{Config, TrainingConfig};
use crate::encoder::StateEncoder;
use crate::environment::GameEnvironment;
use crate::error::{Error, Result};
use crate::learning::QLearner;
use crate::state::GameState;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use serde::{Deserialize, Serialize};

/// Offset mixed into the seed so the learner and the environment draw
/// from independent streams.
const LEARNER_SEED_SALT: u64 = 0x9E37_79B9_7F4A_7C15;

/// Per-episode statistics of a training run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrainingReport {
    pub episodes: usize,
    pub episode_rewards: Vec<f64>,
    pub episode_steps: Vec<usize>,
    pub final_epsilon: f64,
    pub total_updates: u64,
}

impl TrainingReport {
    /// Mean total reward per episode.
    pub fn average_reward(&self) -> f64 {
        mean(&self.episode_rewards)
    }

    /// Mean number of steps per episode.
    pub fn average_steps(&self) -> f64 {
        if self.episode_steps.is_empty() {
            return 0.0;
        }
        self.episode_steps.iter().sum::<usize>() as f64 / self.episode_steps.len() as f64
    }

    /// Mean reward over each consecutive, non-overlapping window of episodes.
    /// A trailing partial window is averaged over its own length.
    pub fn moving_average(&self, window: usize) -> Vec<f64> {
        if window == 0 {
            return Vec::new();
        }
        self.episode_rewards.chunks(window).map(mean).collect()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// One step of a greedy rollout.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TraceStep {
    pub step: usize,
    pub action: DesignAction,
    pub reward: f64,
    pub state: GameState,
}

/// A full greedy rollout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeTrace {
    pub initial_state: GameState,
    pub steps: Vec<TraceStep>,
    pub total_reward: f64,
    pub done: bool,
    /// The rollout hit `max_demo_steps` before the storyline finished.
    pub truncated: bool,
}

impl EpisodeTrace {
    pub fn actions(&self) -> Vec<DesignAction> {
        self.steps.iter().map(|s| s.action).collect()
    }
}

/// Owns an environment and a learner and runs episodes over them.
pub struct Trainer<R = StdRng> {
    env: GameEnvironment<R>,
    learner: QLearner<R>,
    encoder: StateEncoder,
    training: TrainingConfig,
}

impl Trainer<StdRng> {
    /// Builds a trainer from a validated configuration. With a seed the whole
    /// run is reproducible; without one both RNGs are seeded from the OS.
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;

        let (env_rng, learner_rng) = match config.training.seed {
            Some(seed) => (
                StdRng::seed_from_u64(seed),
                StdRng::seed_from_u64(seed ^ LEARNER_SEED_SALT),
            ),
            None => (StdRng::from_os_rng(), StdRng::from_os_rng()),
        };

        let encoder = StateEncoder::new(config.environment.bounds);
        let env = GameEnvironment::new(config.environment.clone(), env_rng);
        let learner = QLearner::new(
            encoder.num_states(),
            NUM_ACTIONS,
            config.learning.clone(),
            learner_rng,
        )?;

        Self::new(env, learner, config.training.clone())
    }
}

impl<R: RngCore> Trainer<R> {
    /// Wires an environment and a learner together. The learner's table must
    /// cover the environment's state space and its hyperparameters must pass
    /// [`LearningConfig::validate`](crate::config::LearningConfig::validate).
    pub fn new(
        env: GameEnvironment<R>,
        learner: QLearner<R>,
        training: TrainingConfig,
    ) -> Result<Self> {
        learner.config().validate()?;

        let encoder = StateEncoder::new(*env.bounds());
        let table = learner.q_table();
        if table.num_states() != encoder.num_states() || table.num_actions() != NUM_ACTIONS {
            return Err(Error::Config(format!(
                "Q-table is {}x{}, environment needs {}x{}",
                table.num_states(),
                table.num_actions(),
                encoder.num_states(),
                NUM_ACTIONS
            )));
        }

        Ok(Self {
            env,
            learner,
            encoder,
            training,
        })
    }

    /// Trains for the configured number of episodes.
    pub fn train(&mut self) -> Result<TrainingReport> {
        self.train_episodes(self.training.episodes)
    }

    /// Trains for exactly `episodes` episodes.
    pub fn train_episodes(&mut self, episodes: usize) -> Result<TrainingReport> {
        let mut report = TrainingReport {
            episodes,
            episode_rewards: Vec::with_capacity(episodes),
            episode_steps: Vec::with_capacity(episodes),
            ..Default::default()
        };

        for episode in 0..episodes {
            let (reward, steps) = self.train_episode()?;
            report.episode_rewards.push(reward);
            report.episode_steps.push(steps);

            let log_every = self.training.log_every;
            if log_every > 0 && (episode + 1) % log_every == 0 {
                let recent = &report.episode_rewards[report.episode_rewards.len() - log_every..];
                log::info!(
                    "Episode {}/{}: avg reward {:.2} over last {}, epsilon {:.4}",
                    episode + 1,
                    episodes,
                    mean(recent),
                    log_every,
                    self.learner.epsilon()
                );
            }
        }

        report.final_epsilon = self.learner.epsilon();
        report.total_updates = self.learner.total_updates();
        Ok(report)
    }

    fn train_episode(&mut self) -> Result<(f64, usize)> {
        let initial = self.env.reset();
        let mut state_index = self.encoder.encode(&initial)?;
        let mut total_reward = 0.0;
        let mut steps = 0;
        let mut done = false;

        while !done {
            let action = self.learner.choose_action(state_index)?;
            let result = self.env.step(action);
            let next_index = self.encoder.encode(&result.next_state)?;

            self.learner
                .update(state_index, action, result.reward, next_index, result.done)?;
            log::debug!(
                "action={} reward={} state={}",
                action,
                result.reward,
                result.next_state
            );

            state_index = next_index;
            total_reward += result.reward;
            steps += 1;
            done = result.done;
        }

        self.learner.end_episode();
        Ok((total_reward, steps))
    }

    /// Rolls out one greedy episode from a fresh reset.
    pub fn run_greedy_episode(&mut self) -> Result<EpisodeTrace> {
        let initial = self.env.reset();
        self.rollout_greedy(initial)
    }

    /// Rolls out one greedy episode starting from `start`.
    pub fn run_greedy_from(&mut self, start: GameState) -> Result<EpisodeTrace> {
        self.env.set_state(start)?;
        self.rollout_greedy(start)
    }

    fn rollout_greedy(&mut self, initial: GameState) -> Result<EpisodeTrace> {
        let mut state_index = self.encoder.encode(&initial)?;
        let mut trace = EpisodeTrace {
            initial_state: initial,
            steps: Vec::new(),
            total_reward: 0.0,
            done: false,
            truncated: false,
        };

        for step in 0..self.training.max_demo_steps {
            let action = self.learner.greedy_action(state_index)?;
            let result = self.env.step(action);
            let design_action = DesignAction::from_index(action).ok_or_else(|| {
                Error::Internal(format!("greedy policy produced action {}", action))
            })?;

            log::info!(
                " Step {:2}: Action={}, Reward={:.2}, State={}",
                step,
                action,
                result.reward,
                result.next_state
            );

            trace.steps.push(TraceStep {
                step,
                action: design_action,
                reward: result.reward,
                state: result.next_state,
            });
            trace.total_reward += result.reward;
            state_index = self.encoder.encode(&result.next_state)?;

            if result.done {
                trace.done = true;
                return Ok(trace);
            }
        }

        trace.truncated = true;
        log::warn!(
            "Greedy rollout stopped after {} steps without finishing the storyline",
            self.training.max_demo_steps
        );
        Ok(trace)
    }

    /// Rolls out `runs` greedy episodes, logging every step.
    pub fn demo(&mut self, runs: usize) -> Result<Vec<EpisodeTrace>> {
        let mut traces = Vec::with_capacity(runs);
        for run in 0..runs {
            log::info!("Starting Demo Episode {}", run + 1);
            let trace = self.run_greedy_episode()?;
            log::info!(
                "Episode finished: {} steps, total reward {:.2}",
                trace.steps.len(),
                trace.total_reward
            );
            traces.push(trace);
        }
        Ok(traces)
    }

    pub fn learner(&self) -> &QLearner<R> {
        &self.learner
    }

    pub fn environment(&self) -> &GameEnvironment<R> {
        &self.env
    }

    pub fn environment_mut(&mut self) -> &mut GameEnvironment<R> {
        &mut self.env
    }

    pub fn encoder(&self) -> &StateEncoder {
        &self.encoder
    }

    pub fn training_config(&self) -> &TrainingConfig {
        &self.training
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::{FixedOutcome, SilentStoryline};
    use crate::config::{EnvironmentConfig, LearningConfig};

    fn scripted_trainer(learning: LearningConfig, episodes: usize) -> Trainer {
        let env = GameEnvironment::seeded(EnvironmentConfig::default(), 5)
            .with_storyline(SilentStoryline)
            .with_puzzle_simulator(FixedOutcome(true));
        let encoder = StateEncoder::default();
        let learner = QLearner::seeded(encoder.num_states(), NUM_ACTIONS, learning, 6).unwrap();
        let training = TrainingConfig {
            episodes,
            seed: Some(5),
            demo_runs: 1,
            max_demo_steps: 30,
            log_every: 0,
        };
        Trainer::new(env, learner, training).unwrap()
    }

    #[test]
    fn test_training_runs_all_episodes() {
        let mut trainer = scripted_trainer(LearningConfig::default(), 50);
        let report = trainer.train().unwrap();

        assert_eq!(report.episodes, 50);
        assert_eq!(report.episode_rewards.len(), 50);
        assert_eq!(trainer.learner().total_episodes(), 50);
        let steps: usize = report.episode_steps.iter().sum();
        assert_eq!(report.total_updates, steps as u64);
        assert!(report.final_epsilon < 1.0);
    }

    #[test]
    fn test_epsilon_decays_once_per_episode() {
        let learning = LearningConfig {
            epsilon: 1.0,
            epsilon_decay: 0.5,
            epsilon_min: 0.1,
            ..Default::default()
        };
        let mut trainer = scripted_trainer(learning, 3);
        let report = trainer.train().unwrap();
        assert!((report.final_epsilon - 0.125).abs() < 1e-12);
    }

    #[test]
    fn test_untrained_greedy_rollout_truncates() {
        let mut trainer = scripted_trainer(LearningConfig::default(), 0);
        let trace = trainer.run_greedy_from(GameState::initial(0)).unwrap();

        // An all-zero table always picks the puzzle action, which never ends the episode.
        assert!(trace.truncated);
        assert!(!trace.done);
        assert_eq!(trace.steps.len(), 30);
        assert!(trace
            .actions()
            .iter()
            .all(|a| *a == DesignAction::PresentPuzzle));
    }

    #[test]
    fn test_greedy_rollout_is_deterministic() {
        let mut trainer = scripted_trainer(LearningConfig::default(), 300);
        trainer.train().unwrap();

        let start = GameState::initial(1);
        let first = trainer.run_greedy_from(start).unwrap();
        let second = trainer.run_greedy_from(start).unwrap();
        assert_eq!(first.actions(), second.actions());
        assert_eq!(first.total_reward, second.total_reward);
    }

    #[test]
    fn test_greedy_rollout_does_not_learn() {
        let mut trainer = scripted_trainer(LearningConfig::default(), 20);
        trainer.train().unwrap();
        let updates = trainer.learner().total_updates();
        let table = trainer.learner().q_table().clone();

        trainer.demo(2).unwrap();
        assert_eq!(trainer.learner().total_updates(), updates);
        assert_eq!(trainer.learner().q_table(), &table);
    }

    #[test]
    fn test_zero_exploration_rejected_before_training() {
        let mut config = Config::test_mode();
        config.learning.epsilon = 0.0;
        assert!(matches!(Trainer::from_config(&config), Err(Error::Config(_))));

        let env = GameEnvironment::seeded(EnvironmentConfig::default(), 1);
        let learning = LearningConfig {
            epsilon: 0.0,
            epsilon_min: 0.0,
            ..Default::default()
        };
        let learner =
            QLearner::seeded(StateEncoder::default().num_states(), NUM_ACTIONS, learning, 1)
                .unwrap();
        assert!(matches!(
            Trainer::new(env, learner, TrainingConfig::default()),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_mismatched_table_rejected() {
        let env = GameEnvironment::seeded(EnvironmentConfig::default(), 1);
        let learner = QLearner::seeded(10, NUM_ACTIONS, LearningConfig::default(), 1).unwrap();
        assert!(matches!(
            Trainer::new(env, learner, TrainingConfig::default()),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_report_statistics() {
        let report = TrainingReport {
            episodes: 5,
            episode_rewards: vec![1.0, 3.0, 5.0, 7.0, 9.0],
            episode_steps: vec![2, 4, 6, 8, 10],
            final_epsilon: 0.1,
            total_updates: 30,
        };
        assert_eq!(report.average_reward(), 5.0);
        assert_eq!(report.average_steps(), 6.0);
        assert_eq!(report.moving_average(2), vec![2.0, 6.0, 9.0]);
        assert!(report.moving_average(0).is_empty());
        assert!(report.to_json().unwrap().contains("\"total_updates\": 30"));
    }

    #[test]
    fn test_seeded_runs_are_reproducible() {
        let config = Config::test_mode();
        let mut a = Trainer::from_config(&config).unwrap();
        let mut b = Trainer::from_config(&config).unwrap();
        let ra = a.train().unwrap();
        let rb = b.train().unwrap();
        assert_eq!(ra.episode_rewards, rb.episode_rewards);
        assert_eq!(ra.episode_steps, rb.episode_steps);
        assert_eq!(a.learner().q_table(), b.learner().q_table());
    }
}
