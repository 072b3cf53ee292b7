//! Design actions the learner can take.
//!
//! The environment and the Q-table speak in plain action indices; this enum
//! gives those indices names for logging and for callers that prefer a typed API.

use serde::{Deserialize, Serialize};

/// Number of design actions, and the width of each Q-table row.
pub const NUM_ACTIONS: usize = 4;

/// A game-design decision the learner sequences.
///
/// # Examples
///
/// ```
/// # use storyline_rl::DesignAction;
/// assert_eq!(DesignAction::AdvancePlot.index(), 3);
/// assert_eq!(DesignAction::from_index(1), Some(DesignAction::OfferPractice));
/// assert_eq!(DesignAction::from_index(4), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DesignAction {
    /// Present a puzzle at the current difficulty.
    PresentPuzzle,
    /// Offer a practice arc at the same difficulty.
    OfferPractice,
    /// Raise the difficulty, or advance the stage once already at the hardest tier.
    Escalate,
    /// Move to the next big storyline event.
    AdvancePlot,
}

impl DesignAction {
    /// All actions in index order.
    pub const ALL: [DesignAction; NUM_ACTIONS] = [
        DesignAction::PresentPuzzle,
        DesignAction::OfferPractice,
        DesignAction::Escalate,
        DesignAction::AdvancePlot,
    ];

    /// Maps an action index to an action, or `None` for unrecognized codes.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn index(self) -> usize {
        match self {
            DesignAction::PresentPuzzle => 0,
            DesignAction::OfferPractice => 1,
            DesignAction::Escalate => 2,
            DesignAction::AdvancePlot => 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DesignAction::PresentPuzzle => "present-puzzle",
            DesignAction::OfferPractice => "offer-practice",
            DesignAction::Escalate => "escalate",
            DesignAction::AdvancePlot => "advance-plot",
        }
    }
}

impl std::fmt::Display for DesignAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
