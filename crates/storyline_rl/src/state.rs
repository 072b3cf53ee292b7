//! The player-progression state the environment simulates.

use crate::config::EnvironmentBounds;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Player archetype. Only the storyline hook branches on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Merchant,
    Brave,
}

impl Role {
    /// Maps a role code to a role. Codes other than 0 are treated as `Brave`.
    pub fn from_value(v: u8) -> Self {
        if v == 0 {
            Role::Merchant
        } else {
            Role::Brave
        }
    }

    pub fn value(self) -> u8 {
        match self {
            Role::Merchant => 0,
            Role::Brave => 1,
        }
    }
}

/// Puzzle difficulty tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PuzzleDifficulty {
    Easy,
    Medium,
    Hard,
}

impl PuzzleDifficulty {
    /// Maps a difficulty code to a tier, falling back to `Easy` for unknown codes.
    pub fn from_value(v: u8) -> Self {
        match v {
            1 => PuzzleDifficulty::Medium,
            2 => PuzzleDifficulty::Hard,
            _ => PuzzleDifficulty::Easy,
        }
    }

    pub fn value(self) -> u8 {
        match self {
            PuzzleDifficulty::Easy => 0,
            PuzzleDifficulty::Medium => 1,
            PuzzleDifficulty::Hard => 2,
        }
    }
}

/// A snapshot of a player's progression.
///
/// Every field stays within the bounds of [`EnvironmentBounds`]; the encoder
/// rejects states that do not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct GameState {
    pub role: u8,
    pub stage: u8,
    pub skill: u8,
    pub time: u8,
    pub difficulty: u8,
}

impl GameState {
    pub fn new(role: u8, stage: u8, skill: u8, time: u8, difficulty: u8) -> Self {
        Self {
            role,
            stage,
            skill,
            time,
            difficulty,
        }
    }

    /// The state every episode starts from for the given role.
    pub fn initial(role: u8) -> Self {
        Self {
            role,
            ..Default::default()
        }
    }

    pub fn role_kind(&self) -> Role {
        Role::from_value(self.role)
    }

    pub fn difficulty_tier(&self) -> PuzzleDifficulty {
        PuzzleDifficulty::from_value(self.difficulty)
    }

    /// Checks every field against `bounds`, naming the first field out of range.
    pub fn check_bounds(&self, bounds: &EnvironmentBounds) -> Result<()> {
        let checks = [
            ("role", self.role, bounds.role_count.saturating_sub(1)),
            ("stage", self.stage, bounds.max_stage),
            ("skill", self.skill, bounds.max_skill),
            ("time", self.time, bounds.max_time),
            ("difficulty", self.difficulty, bounds.max_difficulty()),
        ];

        for (field, value, max) in checks {
            if value > max {
                return Err(Error::StateOutOfBounds {
                    field,
                    value: value as u32,
                    max: max as u32,
                });
            }
        }
        Ok(())
    }
}

impl std::fmt::Display for GameState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "GameState(role={}, stage={}, skill={}, time={}, diff={})",
            self.role, self.stage, self.skill, self.time, self.difficulty
        )
    }
}
