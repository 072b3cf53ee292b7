//! Learning module.
//!
//! Tabular Q-learning over the dense state space produced by
//! [`StateEncoder`](crate::encoder::StateEncoder).
//!
//! ## Example
//!
//! ```rust
//! use storyline_rl::learning::QLearner;
//! use storyline_rl::LearningConfig;
//!
//! let config = LearningConfig {
//!     learning_rate: 0.1,
//!     discount_factor: 0.95,
//!     epsilon: 0.0,
//!     ..Default::default()
//! };
//! let mut learner = QLearner::seeded(16, 4, config, 7).unwrap();
//!
//! learner.update(0, 3, 8.0, 1, false).unwrap();
//! assert_eq!(learner.choose_action(0).unwrap(), 3);
//!
//! learner.end_episode();
//! assert_eq!(learner.total_episodes(), 1);
//! ```

pub mod engine;
pub mod q_table;

pub use engine::QLearner;
pub use q_table::QTable;
