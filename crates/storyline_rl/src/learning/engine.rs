//! The tabular Q-learning engine.
//!
//! Holds the Q-table and the hyperparameters. The table is only touched
//! through [`QLearner::choose_action`], [`QLearner::update`] and
//! [`QLearner::decay_epsilon`], plus read-only export for policy extraction.

use crate::config::LearningConfig;
use crate::error::Result;
use crate::learning::q_table::QTable;
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};

/// Tabular Q-learner with epsilon-greedy exploration.
#[derive(Debug, Clone)]
pub struct QLearner<R = StdRng> {
    /// The table of learned action-values.
    q_table: QTable,
    /// Hyperparameters. `epsilon` is the live exploration rate.
    config: LearningConfig,
    /// Source of exploration randomness.
    rng: R,
    /// Total number of Q-value updates performed.
    total_updates: u64,
    /// Total number of completed episodes.
    total_episodes: u64,
}

impl QLearner<StdRng> {
    /// Creates a learner whose exploration is fully determined by `seed`.
    pub fn seeded(
        num_states: usize,
        num_actions: usize,
        config: LearningConfig,
        seed: u64,
    ) -> Result<Self> {
        Self::new(num_states, num_actions, config, StdRng::seed_from_u64(seed))
    }
}

impl<R: RngCore> QLearner<R> {
    /// Creates a learner whose `num_states x num_actions` table starts at
    /// `initial_q_value`.
    pub fn new(
        num_states: usize,
        num_actions: usize,
        config: LearningConfig,
        rng: R,
    ) -> Result<Self> {
        Ok(Self {
            q_table: QTable::new(num_states, num_actions, config.initial_q_value)?,
            config,
            rng,
            total_updates: 0,
            total_episodes: 0,
        })
    }

    /// Epsilon-greedy selection: a uniformly random action with probability
    /// epsilon, otherwise the greedy action.
    pub fn choose_action(&mut self, state_index: usize) -> Result<usize> {
        // Validate before drawing so a bad index never consumes randomness.
        self.q_table.row(state_index)?;

        if self.rng.random::<f64>() < self.config.epsilon {
            Ok(self.rng.random_range(0..self.q_table.num_actions()))
        } else {
            self.q_table.argmax(state_index)
        }
    }

    /// The argmax action, ignoring epsilon. Ties resolve to the lowest index.
    pub fn greedy_action(&self, state_index: usize) -> Result<usize> {
        self.q_table.argmax(state_index)
    }

    /// One-step Q-learning update:
    /// `Q(s,a) += α * (r + γ * max_a' Q(s',a') - Q(s,a))`,
    /// with the bootstrap term dropped when `done`.
    pub fn update(
        &mut self,
        state_index: usize,
        action: usize,
        reward: f64,
        next_state_index: usize,
        done: bool,
    ) -> Result<()> {
        let current_q = self.q_table.get(state_index, action)?;
        let max_next_q = self.q_table.max(next_state_index)?;

        let bootstrap = if done { 0.0 } else { max_next_q };
        let td_target = reward + self.config.discount_factor * bootstrap;
        let new_q = current_q + self.config.learning_rate * (td_target - current_q);

        self.q_table.set(state_index, action, new_q)?;
        self.total_updates += 1;
        Ok(())
    }

    /// Decays the exploration rate, never below `epsilon_min`. Epsilon never
    /// increases: a rate already under the floor is left as is.
    pub fn decay_epsilon(&mut self) {
        let epsilon = self.config.epsilon;
        self.config.epsilon = (epsilon * self.config.epsilon_decay)
            .max(self.config.epsilon_min)
            .min(epsilon);
    }

    /// Marks the end of an episode and decays epsilon.
    pub fn end_episode(&mut self) {
        self.total_episodes += 1;
        self.decay_epsilon();
    }

    /// The greedy action for every state index, in index order.
    pub fn greedy_policy(&self) -> Vec<usize> {
        (0..self.q_table.num_states())
            .map(|s| self.q_table.argmax(s).unwrap_or(0))
            .collect()
    }

    /// Read-only view of the Q-table.
    pub fn q_table(&self) -> &QTable {
        &self.q_table
    }

    pub fn epsilon(&self) -> f64 {
        self.config.epsilon
    }

    pub fn total_updates(&self) -> u64 {
        self.total_updates
    }

    pub fn total_episodes(&self) -> u64 {
        self.total_episodes
    }

    pub fn config(&self) -> &LearningConfig {
        &self.config
    }
}
