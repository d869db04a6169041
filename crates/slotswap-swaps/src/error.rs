use slotswap_profiles::ProfileError;
use thiserror::Error;

use crate::types::EventStatus;

/// Errors raised by event and swap-request operations.
///
/// Every variant is recoverable. A failed operation never leaves a partial
/// write behind: the surrounding transaction is dropped and rolls back.
#[derive(Debug, Error)]
pub enum SwapError {
    /// The actor is not allowed to perform the operation on this record.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// The record's current status has no edge for the requested action.
    #[error("Invalid transition: cannot {action} a {from} {kind}")]
    InvalidTransition {
        kind: &'static str,
        from: String,
        action: &'static str,
    },

    /// A precondition on related records does not hold (not swappable,
    /// ownership changed, negotiation in progress).
    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Cannot request a swap with yourself")]
    SelfSwap,

    /// Missing, or hidden from the actor.
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error(transparent)]
    Profile(#[from] ProfileError),
}

impl SwapError {
    /// Short error code string sent to clients in WS RES frames.
    pub fn code(&self) -> &'static str {
        match self {
            SwapError::Forbidden(_) => "FORBIDDEN",
            SwapError::InvalidTransition { .. } => "INVALID_TRANSITION",
            SwapError::InvalidState(_) => "INVALID_STATE",
            SwapError::SelfSwap => "SELF_SWAP",
            SwapError::NotFound { .. } => "NOT_FOUND",
            SwapError::Validation(_) => "VALIDATION_ERROR",
            SwapError::Database(_) => "DATABASE_ERROR",
            SwapError::Profile(e) => e.code(),
        }
    }

    pub(crate) fn event_not_found(id: &str) -> Self {
        SwapError::NotFound {
            kind: "event",
            id: id.to_string(),
        }
    }

    pub(crate) fn request_not_found(id: &str) -> Self {
        SwapError::NotFound {
            kind: "swap request",
            id: id.to_string(),
        }
    }

    pub(crate) fn event_transition(from: EventStatus, action: &'static str) -> Self {
        SwapError::InvalidTransition {
            kind: "event",
            from: from.to_string(),
            action,
        }
    }
}

pub type Result<T> = std::result::Result<T, SwapError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_errors_keep_their_code() {
        let err = SwapError::from(ProfileError::NotFound("p".into()));
        assert_eq!(err.code(), "NOT_FOUND");
    }

    #[test]
    fn transition_message_names_status_and_action() {
        let err = SwapError::event_transition(EventStatus::SwapPending, "mark busy");
        assert_eq!(err.code(), "INVALID_TRANSITION");
        assert_eq!(
            err.to_string(),
            "Invalid transition: cannot mark busy a swap_pending event"
        );
    }
}
