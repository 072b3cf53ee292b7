//! Mixed-radix encoding of a [`GameState`] into a dense Q-table row index.
//!
//! The digits, least significant first, are `role`, `stage`, `skill`, `time`
//! and `difficulty`, with radices `(role_count, max_stage+1, max_skill+1,
//! max_time+1, difficulty_levels)`. With the default bounds that is a
//! base-(2, 6, 6, 101, 3) number over `[0, 21816)`.
//!
//! Every consumer (training, evaluation, policy export) goes through this
//! encoder; the formula is not repeated anywhere else.

use crate::config::EnvironmentBounds;
use crate::error::{Error, Result};
use crate::state::GameState;

/// Bijective mapping between in-bounds states and `[0, num_states)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateEncoder {
    bounds: EnvironmentBounds,
    radices: [usize; 5],
    num_states: usize,
}

impl StateEncoder {
    pub fn new(bounds: EnvironmentBounds) -> Self {
        let radices = [
            bounds.role_count as usize,
            bounds.max_stage as usize + 1,
            bounds.max_skill as usize + 1,
            bounds.max_time as usize + 1,
            bounds.difficulty_levels as usize,
        ];
        Self {
            bounds,
            radices,
            num_states: radices.iter().product(),
        }
    }

    /// Size of the state space, i.e. the number of Q-table rows.
    pub fn num_states(&self) -> usize {
        self.num_states
    }

    pub fn bounds(&self) -> &EnvironmentBounds {
        &self.bounds
    }

    /// Encodes `state`, rejecting any field outside its bound.
    pub fn encode(&self, state: &GameState) -> Result<usize> {
        state.check_bounds(&self.bounds)?;

        let digits = Self::digits(state);
        let mut index = 0;
        let mut place = 1;
        for (digit, radix) in digits.iter().zip(self.radices.iter()) {
            index += *digit as usize * place;
            place *= radix;
        }
        Ok(index)
    }

    /// Recovers the state a valid index was encoded from.
    pub fn decode(&self, index: usize) -> Result<GameState> {
        if index >= self.num_states {
            return Err(Error::StateIndexOutOfRange {
                index,
                num_states: self.num_states,
            });
        }

        let mut digits = [0u8; 5];
        let mut rest = index;
        for (digit, radix) in digits.iter_mut().zip(self.radices.iter()) {
            // Each radix is at most 256, so the remainder fits in a u8.
            *digit = (rest % radix) as u8;
            rest /= radix;
        }
        Ok(GameState::new(
            digits[0], digits[1], digits[2], digits[3], digits[4],
        ))
    }

    fn digits(state: &GameState) -> [u8; 5] {
        [
            state.role,
            state.stage,
            state.skill,
            state.time,
            state.difficulty,
        ]
    }
}

impl Default for StateEncoder {
    fn default() -> Self {
        Self::new(EnvironmentBounds::default())
    }
}
