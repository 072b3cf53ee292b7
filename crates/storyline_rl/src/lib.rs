#![doc = include_str!("../README.md")]
//! # storyline_rl
//!
//! A tabular Q-learning engine that learns to sequence game-design
//! decisions (present a puzzle, offer practice, raise difficulty, advance
//! the plot) against a simulated player.
//!
//! ## Architecture
//!
//! ```text
//!  Trainer
//!    │ reset / step                      choose_action / update
//!    ▼                                              ▼
//!  GameEnvironment ──► GameState ──► StateEncoder ──► QLearner ──► QTable
//!    │                                   (index)
//!    ├── StorylineHook    (side effects only)
//!    └── PuzzleSimulator  (solved?)
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use storyline_rl::{Config, Trainer};
//!
//! let mut config = Config::test_mode();
//! config.training.episodes = 50;
//!
//! let mut trainer = Trainer::from_config(&config).unwrap();
//! let report = trainer.train().unwrap();
//! assert_eq!(report.episode_rewards.len(), 50);
//!
//! let traces = trainer.demo(1).unwrap();
//! assert_eq!(traces.len(), 1);
//! ```

pub mod action;
pub mod collaborators;
pub mod config;
pub mod encoder;
pub mod environment;
pub mod error;
pub mod learning;
pub mod state;
pub mod trainer;

pub use action::{DesignAction, NUM_ACTIONS};
pub use collaborators::{
    FixedOutcome, LoggingStoryline, PuzzleSimulator, RecordingStoryline, SilentStoryline,
    SkillGapSimulator, StorylineEvent, StorylineHook,
};
pub use config::{
    Config, EnvironmentBounds, EnvironmentConfig, LearningConfig, RewardConfig, TrainingConfig,
};
pub use encoder::StateEncoder;
pub use environment::{GameEnvironment, StepResult};
pub use error::{Error, Result};
pub use learning::{QLearner, QTable};
pub use state::{GameState, PuzzleDifficulty, Role};
pub use trainer::{EpisodeTrace, TraceStep, Trainer, TrainingReport};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Trains with `config` and returns the trainer, ready for greedy rollouts.
///
/// # Examples
///
/// ```
/// use storyline_rl::{train, Config};
///
/// let mut config = Config::test_mode();
/// config.training.episodes = 10;
/// let (trainer, report) = train(&config).unwrap();
/// assert_eq!(report.episodes, 10);
/// assert_eq!(trainer.learner().total_episodes(), 10);
/// ```
pub fn train(config: &Config) -> Result<(Trainer, TrainingReport)> {
    let mut trainer = Trainer::from_config(config)?;
    let report = trainer.train()?;
    Ok((trainer, report))
}
