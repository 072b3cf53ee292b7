//! Dense action-value table.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// A `num_states x num_actions` table of action-values stored row-major.
///
/// The table never grows or shrinks after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QTable {
    values: Vec<f64>,
    num_states: usize,
    num_actions: usize,
}

impl QTable {
    /// Creates a table with every cell set to `initial_value`. Both
    /// dimensions must be non-zero.
    pub fn new(num_states: usize, num_actions: usize, initial_value: f64) -> Result<Self> {
        if num_states == 0 || num_actions == 0 {
            return Err(Error::Config(format!(
                "Q-table needs at least one state and one action, got {}x{}",
                num_states, num_actions
            )));
        }
        Ok(Self {
            values: vec![initial_value; num_states * num_actions],
            num_states,
            num_actions,
        })
    }

    pub fn num_states(&self) -> usize {
        self.num_states
    }

    pub fn num_actions(&self) -> usize {
        self.num_actions
    }

    /// The action-values of one state.
    pub fn row(&self, state: usize) -> Result<&[f64]> {
        self.check_state(state)?;
        let start = state * self.num_actions;
        Ok(&self.values[start..start + self.num_actions])
    }

    pub fn get(&self, state: usize, action: usize) -> Result<f64> {
        Ok(self.row(state)?[self.check_action(action)?])
    }

    pub(crate) fn set(&mut self, state: usize, action: usize, value: f64) -> Result<()> {
        self.check_state(state)?;
        let action = self.check_action(action)?;
        self.values[state * self.num_actions + action] = value;
        Ok(())
    }

    /// Index of the largest value in a row. Ties resolve to the lowest index.
    pub fn argmax(&self, state: usize) -> Result<usize> {
        Ok(first_argmax(self.row(state)?))
    }

    /// Largest value in a row.
    pub fn max(&self, state: usize) -> Result<f64> {
        let row = self.row(state)?;
        Ok(row[first_argmax(row)])
    }

    /// Number of cells whose value differs from `baseline`.
    pub fn count_visited(&self, baseline: f64) -> usize {
        self.values.iter().filter(|v| **v != baseline).count()
    }

    fn check_state(&self, state: usize) -> Result<()> {
        if state >= self.num_states {
            return Err(Error::StateIndexOutOfRange {
                index: state,
                num_states: self.num_states,
            });
        }
        Ok(())
    }

    fn check_action(&self, action: usize) -> Result<usize> {
        if action >= self.num_actions {
            return Err(Error::ActionOutOfRange {
                action,
                num_actions: self.num_actions,
            });
        }
        Ok(action)
    }
}

/// First-maximum scan: only a strictly greater value replaces the current best.
fn first_argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, v) in values.iter().enumerate().skip(1) {
        if *v > values[best] {
            best = i;
        }
    }
    best
}
