//! Error types surfaced while wiring the ball controller.
use std::fmt;

/// Failures that prevent the controller from starting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BallControllerError {
    /// No entity carries the configured ball name.
    BallNotFound { name: String },
    /// More than one entity carries the configured ball name.
    AmbiguousBall { name: String, matches: usize },
}

impl BallControllerError {
    pub fn ball_not_found(name: impl Into<String>) -> Self {
        Self::BallNotFound { name: name.into() }
    }

    pub fn ambiguous_ball(name: impl Into<String>, matches: usize) -> Self {
        Self::AmbiguousBall {
            name: name.into(),
            matches,
        }
    }
}

impl fmt::Display for BallControllerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BallNotFound { name } => {
                write!(f, "No ball found in scene with name '{}'", name)
            }
            Self::AmbiguousBall { name, matches } => write!(
                f,
                "Ball name '{}' is ambiguous ({} entities share it)",
                name, matches
            ),
        }
    }
}

impl std::error::Error for BallControllerError {}
