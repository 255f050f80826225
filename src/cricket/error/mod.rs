use std::fmt;
use thiserror::Error;

/// Which half of the roster an index refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Xi,
    Sub,
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Xi => write!(f, "XI"),
            Slot::Sub => write!(f, "substitute"),
        }
    }
}

/// Errors raised while loading or changing a roster
#[derive(Debug, Error)]
pub enum RosterError {
    #[error("no profile for user {0}")]
    UserNotFound(String),

    #[error("user {0} has no players")]
    EmptyRoster(String),

    #[error("interaction from someone other than the roster owner")]
    UnauthorizedActor,

    #[error("{slot} index {index} out of range (len {len})")]
    IndexOutOfRange { slot: Slot, index: usize, len: usize },

    #[error("selected players no longer sit at the chosen positions")]
    StaleSelection,

    #[error("database error: {0}")]
    Persistence(#[from] sqlx::Error),

    #[error("stored roster is not valid JSON: {0}")]
    Corrupt(#[from] serde_json::Error),
}

impl RosterError {
    /// Whether the failure came from the store rather than from the request
    pub fn is_persistence(&self) -> bool {
        matches!(self, RosterError::Persistence(_) | RosterError::Corrupt(_))
    }
}

pub type RosterResult<T> = Result<T, RosterError>;
