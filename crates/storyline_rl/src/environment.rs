//! The MDP simulator: a player's progression through the storyline.
//!
//! The environment owns the current [`GameState`]. [`GameEnvironment::reset`]
//! starts a new episode and [`GameEnvironment::step`] applies one design
//! action, returning the next state, the reward and whether the storyline
//! is finished.

use crate::action::DesignAction;
use crate::collaborators::{LoggingStoryline, PuzzleSimulator, SkillGapSimulator, StorylineHook};
use crate::config::{EnvironmentBounds, EnvironmentConfig, RewardConfig};
use crate::state::GameState;
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use serde::{Deserialize, Serialize};

/// The outcome of a single environment step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepResult {
    pub next_state: GameState,
    pub reward: f64,
    pub done: bool,
}

/// Simulated player progression driven by design actions.
pub struct GameEnvironment<R = StdRng> {
    bounds: EnvironmentBounds,
    rewards: RewardConfig,
    current: GameState,
    rng: R,
    storyline: Box<dyn StorylineHook>,
    puzzles: Box<dyn PuzzleSimulator>,
}

impl GameEnvironment<StdRng> {
    /// Creates an environment whose randomness is fully determined by `seed`.
    pub fn seeded(config: EnvironmentConfig, seed: u64) -> Self {
        Self::new(config, StdRng::seed_from_u64(seed))
    }
}

impl<R: RngCore> GameEnvironment<R> {
    /// Creates an environment with the logging storyline and the default
    /// skill-gap puzzle model.
    pub fn new(config: EnvironmentConfig, rng: R) -> Self {
        Self {
            bounds: config.bounds,
            rewards: config.rewards,
            current: GameState::default(),
            rng,
            storyline: Box::new(LoggingStoryline),
            puzzles: Box::new(SkillGapSimulator::default()),
        }
    }

    /// Replaces the storyline collaborator.
    pub fn with_storyline(mut self, storyline: impl StorylineHook + 'static) -> Self {
        self.storyline = Box::new(storyline);
        self
    }

    /// Replaces the puzzle-outcome collaborator.
    pub fn with_puzzle_simulator(mut self, puzzles: impl PuzzleSimulator + 'static) -> Self {
        self.puzzles = Box::new(puzzles);
        self
    }

    /// Starts a new episode: random role, every other field zero.
    pub fn reset(&mut self) -> GameState {
        let role = self.rng.random_range(0..self.bounds.role_count.max(1));
        self.current = GameState::initial(role);
        self.current
    }

    /// Applies `action` to the current state.
    ///
    /// Unrecognized action codes are a no-op transition with zero reward.
    pub fn step(&mut self, action: usize) -> StepResult {
        let GameState {
            role,
            mut stage,
            mut skill,
            mut time,
            mut difficulty,
        } = self.current;
        let max_stage = self.bounds.max_stage;
        let mut reward = 0.0;
        let mut done = false;

        match DesignAction::from_index(action) {
            Some(DesignAction::PresentPuzzle) => {
                let solved = self
                    .puzzles
                    .simulate_solve(difficulty, skill, &mut self.rng);
                if solved {
                    skill = skill.saturating_add(1).min(self.bounds.max_skill);
                    reward += self.rewards.puzzle_solved;
                } else {
                    reward += self.rewards.puzzle_failed;
                }
                time = time.saturating_add(self.rewards.puzzle_time);
            }
            Some(DesignAction::OfferPractice) => {
                let current = self.current;
                self.storyline.add_practice_arc(
                    current.role_kind(),
                    stage,
                    current.difficulty_tier(),
                );
                time = time.saturating_add(self.rewards.practice_time);
                reward += self.rewards.practice;
            }
            Some(DesignAction::Escalate) => {
                if difficulty < self.bounds.max_difficulty() {
                    difficulty += 1;
                    reward += self.rewards.escalate_difficulty;
                } else {
                    stage = stage.saturating_add(1).min(max_stage);
                    reward += self.rewards.escalate_stage;
                }
                time = time.saturating_add(self.rewards.escalate_time);
            }
            Some(DesignAction::AdvancePlot) => {
                stage = stage.saturating_add(1).min(max_stage);
                self.storyline.next_big_event(stage);
                reward += self.rewards.advance_plot;
                time = time.saturating_add(self.rewards.advance_time);
            }
            None => {
                log::debug!("Ignoring unrecognized action {}", action);
            }
        }

        if stage == max_stage {
            done = true;
            // Paid only on the step that reaches the final stage.
            if self.current.stage < max_stage {
                reward += self.rewards.completion_bonus;
            }
        }

        time = time.min(self.bounds.max_time);

        self.current = GameState::new(role, stage, skill, time, difficulty);
        StepResult {
            next_state: self.current,
            reward,
            done,
        }
    }

    /// Typed convenience over [`GameEnvironment::step`].
    pub fn step_action(&mut self, action: DesignAction) -> StepResult {
        self.step(action.index())
    }

    pub fn current_state(&self) -> GameState {
        self.current
    }

    pub fn bounds(&self) -> &EnvironmentBounds {
        &self.bounds
    }

    pub fn rewards(&self) -> &RewardConfig {
        &self.rewards
    }

    /// Overwrites the current state, e.g. to replay a scenario.
    pub fn set_state(&mut self, state: GameState) -> crate::Result<()> {
        state.check_bounds(&self.bounds)?;
        self.current = state;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::{FixedOutcome, RecordingStoryline, SilentStoryline, StorylineEvent};
    use crate::state::{PuzzleDifficulty, Role};

    fn scripted_env(solves: bool) -> GameEnvironment {
        GameEnvironment::seeded(EnvironmentConfig::default(), 42)
            .with_storyline(SilentStoryline)
            .with_puzzle_simulator(FixedOutcome(solves))
    }

    #[test]
    fn test_reset_zeroes_progress() {
        let mut env = scripted_env(true);
        for _ in 0..20 {
            let state = env.reset();
            assert!(state.role <= 1);
            assert_eq!((state.stage, state.skill, state.time, state.difficulty), (0, 0, 0, 0));
            assert_eq!(env.current_state(), state);
        }
    }

    #[test]
    fn test_reset_draws_both_roles() {
        let mut env = scripted_env(true);
        let roles: std::collections::HashSet<u8> = (0..64).map(|_| env.reset().role).collect();
        assert_eq!(roles.len(), 2);
    }

    #[test]
    fn test_advance_plot_scenario() {
        let mut env = scripted_env(true);
        env.set_state(GameState::initial(0)).unwrap();

        let mut total = 0.0;
        for _ in 0..4 {
            let result = env.step(3);
            assert!(!result.done);
            total += result.reward;
        }
        let state = env.current_state();
        assert_eq!(state.stage, 4);
        assert_eq!(state.time, 16);
        assert_eq!(total, 32.0);

        let result = env.step(3);
        assert_eq!(result.next_state.stage, 5);
        assert_eq!(result.next_state.time, 20);
        assert_eq!(result.reward, 28.0);
        assert!(result.done);
    }

    #[test]
    fn test_puzzle_success_and_failure() {
        let mut env = scripted_env(true);
        env.reset();
        let result = env.step(0);
        assert_eq!(result.reward, 10.0);
        assert_eq!(result.next_state.skill, 1);
        assert_eq!(result.next_state.time, 5);

        let mut env = scripted_env(false);
        env.reset();
        let result = env.step(0);
        assert_eq!(result.reward, 2.0);
        assert_eq!(result.next_state.skill, 0);
        assert_eq!(result.next_state.time, 5);
    }

    #[test]
    fn test_skill_saturates() {
        let mut env = scripted_env(true);
        env.reset();
        for _ in 0..10 {
            env.step(0);
        }
        assert_eq!(env.current_state().skill, 5);
        assert_eq!(env.current_state().time, 50);
    }

    #[test]
    fn test_practice_notifies_storyline() {
        let recorder = RecordingStoryline::new();
        let mut env = GameEnvironment::seeded(EnvironmentConfig::default(), 1)
            .with_storyline(recorder.clone());
        env.set_state(GameState::new(1, 2, 0, 0, 1)).unwrap();

        let result = env.step(1);
        assert_eq!(result.reward, 5.0);
        assert_eq!(result.next_state.time, 3);
        assert_eq!(
            recorder.events(),
            vec![StorylineEvent::PracticeArc {
                role: Role::Brave,
                stage: 2,
                difficulty: PuzzleDifficulty::Medium,
            }]
        );
    }

    #[test]
    fn test_escalate_raises_difficulty_then_stage() {
        let mut env = scripted_env(true);
        env.set_state(GameState::initial(0)).unwrap();

        let r1 = env.step(2);
        let r2 = env.step(2);
        assert_eq!((r1.reward, r2.reward), (3.0, 3.0));
        assert_eq!(env.current_state().difficulty, 2);
        assert_eq!(env.current_state().stage, 0);

        let r3 = env.step(2);
        assert_eq!(r3.reward, 5.0);
        assert_eq!(r3.next_state.stage, 1);
        assert_eq!(r3.next_state.difficulty, 2);
        assert_eq!(r3.next_state.time, 6);
    }

    #[test]
    fn test_unrecognized_action_is_noop() {
        let mut env = scripted_env(true);
        let before = env.reset();
        let result = env.step(17);
        assert_eq!(result.reward, 0.0);
        assert!(!result.done);
        assert_eq!(result.next_state, before);
    }

    #[test]
    fn test_time_clamped() {
        let mut env = scripted_env(false);
        env.set_state(GameState::new(0, 0, 0, 98, 0)).unwrap();
        let result = env.step(0);
        assert_eq!(result.next_state.time, 100);
        let result = env.step(1);
        assert_eq!(result.next_state.time, 100);
    }

    #[test]
    fn test_bounds_preserved_under_random_actions() {
        let mut env = GameEnvironment::seeded(EnvironmentConfig::default(), 9)
            .with_storyline(SilentStoryline);
        let mut rng = StdRng::seed_from_u64(3);
        let bounds = *env.bounds();

        for _ in 0..200 {
            let mut prev = env.reset();
            for _ in 0..100 {
                let action = rng.random_range(0..6);
                let result = env.step(action);
                let s = result.next_state;
                assert!(s.check_bounds(&bounds).is_ok(), "{}", s);
                assert!(s.stage >= prev.stage && s.skill >= prev.skill && s.time >= prev.time);
                prev = s;
                if result.done {
                    break;
                }
            }
        }
    }

    #[test]
    fn test_completion_bonus_paid_once() {
        let mut env = scripted_env(true);
        env.set_state(GameState::new(0, 4, 0, 0, 2)).unwrap();
        let finale = env.step(2);
        assert!(finale.done);
        assert_eq!(finale.reward, 25.0);

        let after = env.step(3);
        assert!(after.done);
        assert_eq!(after.reward, 8.0);
        let after = env.step(1);
        assert_eq!(after.reward, 5.0);
    }

    #[test]
    fn test_set_state_rejects_out_of_bounds() {
        let mut env = scripted_env(true);
        assert!(env.set_state(GameState::new(0, 9, 0, 0, 0)).is_err());
    }
}
