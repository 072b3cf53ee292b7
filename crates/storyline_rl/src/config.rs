//! Configuration for the storyline learning engine.
//!
//! Every numeric input of the system lives here: the environment's bounds
//! and reward shaping, the learner's hyperparameters, and the training run.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

const ENV_EPISODES: &str = "STORYLINE_RL_EPISODES";
const ENV_SEED: &str = "STORYLINE_RL_SEED";
const ENV_ALPHA: &str = "STORYLINE_RL_ALPHA";
const ENV_GAMMA: &str = "STORYLINE_RL_GAMMA";
const ENV_EPSILON: &str = "STORYLINE_RL_EPSILON";
const ENV_EPSILON_DECAY: &str = "STORYLINE_RL_EPSILON_DECAY";
const ENV_EPSILON_MIN: &str = "STORYLINE_RL_EPSILON_MIN";
const ENV_DEMO_RUNS: &str = "STORYLINE_RL_DEMO_RUNS";

/// Upper bounds of every state field. Each field ranges over `0..=max`
/// (or `0..count` for the two count fields).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentBounds {
    /// Number of player archetypes.
    pub role_count: u8,
    /// Final storyline stage; reaching it ends the episode.
    pub max_stage: u8,
    /// Highest skill level.
    pub max_skill: u8,
    /// Engagement time is clamped to this value.
    pub max_time: u8,
    /// Number of puzzle difficulty tiers.
    pub difficulty_levels: u8,
}

impl Default for EnvironmentBounds {
    fn default() -> Self {
        Self {
            role_count: 2,
            max_stage: 5,
            max_skill: 5,
            max_time: 100,
            difficulty_levels: 3,
        }
    }
}

impl EnvironmentBounds {
    /// The hardest difficulty tier.
    pub fn max_difficulty(&self) -> u8 {
        self.difficulty_levels.saturating_sub(1)
    }
}

/// Reward shaping and engagement-time costs of each design action.
///
/// This is the main tuning lever of the system: the completion bonus biases
/// the learned policy toward finishing the storyline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewardConfig {
    pub puzzle_solved: f64,
    pub puzzle_failed: f64,
    pub practice: f64,
    pub escalate_difficulty: f64,
    /// Reward when escalation is already at the hardest tier and moves the stage instead.
    pub escalate_stage: f64,
    pub advance_plot: f64,
    /// Added once, on the step where the final stage is reached.
    pub completion_bonus: f64,
    pub puzzle_time: u8,
    pub practice_time: u8,
    pub escalate_time: u8,
    pub advance_time: u8,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            puzzle_solved: 10.0,
            puzzle_failed: 2.0,
            practice: 5.0,
            escalate_difficulty: 3.0,
            escalate_stage: 5.0,
            advance_plot: 8.0,
            completion_bonus: 20.0,
            puzzle_time: 5,
            practice_time: 3,
            escalate_time: 2,
            advance_time: 4,
        }
    }
}

/// Environment configuration: state bounds plus reward shaping.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnvironmentConfig {
    pub bounds: EnvironmentBounds,
    pub rewards: RewardConfig,
}

/// Hyperparameters of the tabular Q-learner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LearningConfig {
    /// The learning rate (alpha).
    pub learning_rate: f64,
    /// The discount factor (gamma).
    pub discount_factor: f64,
    /// The initial exploration rate (epsilon).
    pub epsilon: f64,
    /// Multiplier applied to epsilon after each episode.
    pub epsilon_decay: f64,
    /// Floor epsilon never decays below.
    pub epsilon_min: f64,
    /// Value every Q-table cell starts with.
    pub initial_q_value: f64,
}

impl Default for LearningConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.1,
            discount_factor: 0.95,
            epsilon: 1.0,
            epsilon_decay: 0.99,
            epsilon_min: 0.01,
            initial_q_value: 0.0,
        }
    }
}

impl LearningConfig {
    /// Validates the hyperparameters.
    ///
    /// Training episodes end only when the storyline finishes, so exploration
    /// must stay strictly positive: `0 < epsilon_min <= epsilon <= 1`.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.learning_rate) {
            return Err(Error::Config(format!(
                "learning_rate {} outside [0, 1]",
                self.learning_rate
            )));
        }
        if !(0.0..=1.0).contains(&self.discount_factor) {
            return Err(Error::Config(format!(
                "discount_factor {} outside [0, 1]",
                self.discount_factor
            )));
        }
        if !(self.epsilon_min > 0.0 && self.epsilon_min <= 1.0) {
            return Err(Error::Config(format!(
                "epsilon_min {} outside (0, 1]",
                self.epsilon_min
            )));
        }
        if !(self.epsilon >= self.epsilon_min && self.epsilon <= 1.0) {
            return Err(Error::Config(format!(
                "epsilon {} outside [epsilon_min = {}, 1]",
                self.epsilon, self.epsilon_min
            )));
        }
        if self.epsilon_decay <= 0.0 || self.epsilon_decay > 1.0 {
            return Err(Error::Config(format!(
                "epsilon_decay {} outside (0, 1]",
                self.epsilon_decay
            )));
        }
        Ok(())
    }
}

/// Parameters of a training run and of the greedy demo that follows it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Number of episodes to train for. There is no early stopping.
    pub episodes: usize,
    /// Seed for the environment and learner RNGs. `None` seeds from the OS.
    pub seed: Option<u64>,
    /// Number of greedy episodes rolled out after training.
    pub demo_runs: usize,
    /// Greedy rollouts are cut after this many steps.
    pub max_demo_steps: usize,
    /// Log training progress every this many episodes (0 disables).
    pub log_every: usize,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            episodes: 2000,
            seed: None,
            demo_runs: 5,
            max_demo_steps: 200,
            log_every: 500,
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    pub environment: EnvironmentConfig,
    pub learning: LearningConfig,
    pub training: TrainingConfig,
}

impl Config {
    /// Returns a small, seeded configuration suited to tests.
    pub fn test_mode() -> Self {
        Self {
            training: TrainingConfig {
                episodes: 200,
                seed: Some(7),
                demo_runs: 1,
                max_demo_steps: 50,
                log_every: 0,
            },
            ..Default::default()
        }
    }

    /// Builds a configuration from defaults overridden by `STORYLINE_RL_*`
    /// environment variables. Values that fail to parse are ignored.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(episodes) = parse_env::<usize>(ENV_EPISODES) {
            config.training.episodes = episodes;
        }
        if let Some(seed) = parse_env::<u64>(ENV_SEED) {
            config.training.seed = Some(seed);
        }
        if let Some(runs) = parse_env::<usize>(ENV_DEMO_RUNS) {
            config.training.demo_runs = runs;
        }
        if let Some(alpha) = parse_env::<f64>(ENV_ALPHA) {
            config.learning.learning_rate = alpha;
        }
        if let Some(gamma) = parse_env::<f64>(ENV_GAMMA) {
            config.learning.discount_factor = gamma;
        }
        if let Some(epsilon) = parse_env::<f64>(ENV_EPSILON) {
            config.learning.epsilon = epsilon;
        }
        if let Some(decay) = parse_env::<f64>(ENV_EPSILON_DECAY) {
            config.learning.epsilon_decay = decay;
        }
        if let Some(min) = parse_env::<f64>(ENV_EPSILON_MIN) {
            config.learning.epsilon_min = min;
        }

        config
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        let bounds = &self.environment.bounds;
        if bounds.role_count == 0 || bounds.difficulty_levels == 0 {
            return Err(Error::Config(
                "role_count and difficulty_levels must be at least 1".into(),
            ));
        }
        if bounds.max_stage == 0 {
            return Err(Error::Config("max_stage must be at least 1".into()));
        }

        self.learning.validate()?;

        if self.training.max_demo_steps == 0 {
            return Err(Error::Config("max_demo_steps must be at least 1".into()));
        }

        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.environment.bounds.max_time, 100);
        assert_eq!(config.environment.bounds.max_difficulty(), 2);
        assert_eq!(config.learning.discount_factor, 0.95);
        assert_eq!(config.training.episodes, 2000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_test_mode_is_seeded() {
        let config = Config::test_mode();
        assert_eq!(config.training.seed, Some(7));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_env_ignores_missing_key() {
        assert_eq!(parse_env::<usize>("STORYLINE_RL_TEST_UNSET_KEY_7F3A"), None);
    }

    #[test]
    fn test_validate_requires_positive_exploration() {
        let mut config = Config::default();
        config.learning.epsilon = 0.0;
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let mut config = Config::default();
        config.learning.epsilon_min = 0.0;
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let mut config = Config::default();
        config.learning.epsilon = 0.005;
        config.learning.epsilon_min = 0.01;
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        config.learning.epsilon = 0.01;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_decay() {
        let mut config = Config::default();
        config.learning.epsilon_decay = 0.0;
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        config.learning.epsilon_decay = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_learning_rate() {
        let mut config = Config::default();
        config.learning.learning_rate = -0.1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let json = serde_json::to_string(&config).unwrap();
        let back: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(back.environment.bounds, config.environment.bounds);
        assert_eq!(back.environment.rewards.completion_bonus, 20.0);
    }
}
