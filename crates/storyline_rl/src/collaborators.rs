//! External collaborators the environment calls synchronously.
//!
//! - [`StorylineHook`] receives narrative notifications. The environment
//!   ignores anything it does, so learning never depends on its output.
//! - [`PuzzleSimulator`] decides whether a simulated player solves a puzzle.

use crate::state::{PuzzleDifficulty, Role};
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::Rc;

/// Receives storyline side effects from the environment.
pub trait StorylineHook {
    /// Called when the learner offers a practice arc.
    fn add_practice_arc(&mut self, role: Role, stage: u8, difficulty: PuzzleDifficulty);

    /// Called when the plot advances to the next big event.
    fn next_big_event(&mut self, _stage: u8) {}
}

/// Writes storyline notifications to the `log` facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingStoryline;

impl StorylineHook for LoggingStoryline {
    fn add_practice_arc(&mut self, role: Role, stage: u8, difficulty: PuzzleDifficulty) {
        match role {
            Role::Merchant => log::debug!(
                "Merchant practice arc added at stage {} (difficulty {:?})",
                stage,
                difficulty
            ),
            Role::Brave => log::debug!(
                "Brave practice arc added at stage {} (difficulty {:?})",
                stage,
                difficulty
            ),
        }
    }

    fn next_big_event(&mut self, stage: u8) {
        log::debug!("Moving to next big event (stage={})", stage);
    }
}

/// Discards every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentStoryline;

impl StorylineHook for SilentStoryline {
    fn add_practice_arc(&mut self, _role: Role, _stage: u8, _difficulty: PuzzleDifficulty) {}
}

/// A storyline notification captured by [`RecordingStoryline`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StorylineEvent {
    PracticeArc {
        role: Role,
        stage: u8,
        difficulty: PuzzleDifficulty,
    },
    NextBigEvent {
        stage: u8,
    },
}

/// Records notifications into a shared buffer. Clones share the buffer, so
/// a caller can keep one handle and hand another to the environment.
#[derive(Debug, Clone, Default)]
pub struct RecordingStoryline {
    events: Rc<RefCell<Vec<StorylineEvent>>>,
}

impl RecordingStoryline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<StorylineEvent> {
        self.events.borrow().clone()
    }
}

impl StorylineHook for RecordingStoryline {
    fn add_practice_arc(&mut self, role: Role, stage: u8, difficulty: PuzzleDifficulty) {
        self.events.borrow_mut().push(StorylineEvent::PracticeArc {
            role,
            stage,
            difficulty,
        });
    }

    fn next_big_event(&mut self, stage: u8) {
        self.events
            .borrow_mut()
            .push(StorylineEvent::NextBigEvent { stage });
    }
}

/// Simulates a player's attempt at a puzzle.
pub trait PuzzleSimulator {
    /// Returns whether the player solves a puzzle of `difficulty` at `skill`.
    /// Implementations draw at most what they need from `rng`.
    fn simulate_solve(&mut self, difficulty: u8, skill: u8, rng: &mut dyn RngCore) -> bool;
}

/// Success probability grows linearly with the gap between skill and difficulty:
///
/// `p = clamp(base + slope * (skill - difficulty), min_probability, max_probability)`
///
/// One uniform draw is taken per attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillGapSimulator {
    pub base: f64,
    pub slope: f64,
    pub min_probability: f64,
    pub max_probability: f64,
}

impl Default for SkillGapSimulator {
    fn default() -> Self {
        Self {
            base: 0.5,
            slope: 0.1,
            min_probability: 0.1,
            max_probability: 0.9,
        }
    }
}

impl SkillGapSimulator {
    pub fn success_probability(&self, difficulty: u8, skill: u8) -> f64 {
        let gap = skill as f64 - difficulty as f64;
        (self.base + self.slope * gap)
            .clamp(self.min_probability, self.max_probability)
            .clamp(0.0, 1.0)
    }
}

impl PuzzleSimulator for SkillGapSimulator {
    fn simulate_solve(&mut self, difficulty: u8, skill: u8, rng: &mut dyn RngCore) -> bool {
        let p = self.success_probability(difficulty, skill);
        let draw: f64 = rng.random();
        draw < p
    }
}

/// Deterministic outcome, for tests and scripted demos.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedOutcome(pub bool);

impl PuzzleSimulator for FixedOutcome {
    fn simulate_solve(&mut self, _difficulty: u8, _skill: u8, _rng: &mut dyn RngCore) -> bool {
        self.0
    }
}
