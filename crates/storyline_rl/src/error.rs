//! Error types for the storyline learning engine.

/// A specialized `Result` type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The primary error enum for all operations within the `storyline_rl` crate.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// An invalid configuration value.
    Config(String),
    /// A state field outside its declared bound reached the encoder.
    StateOutOfBounds {
        field: &'static str,
        value: u32,
        max: u32,
    },
    /// A table index outside `[0, num_states)` reached the learner or decoder.
    StateIndexOutOfRange { index: usize, num_states: usize },
    /// An action index outside `[0, num_actions)` reached the learner.
    ActionOutOfRange { action: usize, num_actions: usize },
    /// A report or configuration could not be (de)serialized.
    Serialization(String),
    /// An unexpected internal error, which may indicate a bug.
    Internal(String),
}

impl Error {
    /// Returns `true` for errors caused by a caller handing the core a value
    /// outside its declared range.
    pub fn is_precondition_violation(&self) -> bool {
        matches!(
            self,
            Error::StateOutOfBounds { .. }
                | Error::StateIndexOutOfRange { .. }
                | Error::ActionOutOfRange { .. }
        )
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Config(s) => write!(f, "Configuration error: {}", s),
            Error::StateOutOfBounds { field, value, max } => write!(
                f,
                "Precondition violation: state field `{}` = {} exceeds maximum {}",
                field, value, max
            ),
            Error::StateIndexOutOfRange { index, num_states } => write!(
                f,
                "Precondition violation: state index {} outside [0, {})",
                index, num_states
            ),
            Error::ActionOutOfRange {
                action,
                num_actions,
            } => write!(
                f,
                "Precondition violation: action {} outside [0, {})",
                action, num_actions
            ),
            Error::Serialization(s) => write!(f, "Serialization error: {}", s),
            Error::Internal(s) => write!(f, "Internal error: {}", s),
        }
    }
}

impl std::error::Error for Error {}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
