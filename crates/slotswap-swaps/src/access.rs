use slotswap_core::ProfileId;

use crate::error::{Result, SwapError};
use crate::types::{Event, EventStatus, SwapRequest};

/// Row-level capabilities checked before every read or write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    ReadEvent,
    WriteEvent,
    /// Accept or reject.
    ResolveRequest,
}

/// Outcome of an access check.
///
/// `Hidden` means the record must look absent to the actor, so the caller
/// reports NotFound rather than Forbidden.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessCheck {
    Allowed,
    Hidden,
    Denied { reason: String },
}

impl AccessCheck {
    /// Map to the error a caller should surface for record `id`.
    pub fn require(self, kind: &'static str, id: &str) -> Result<()> {
        match self {
            AccessCheck::Allowed => Ok(()),
            AccessCheck::Hidden => Err(SwapError::NotFound {
                kind,
                id: id.to_string(),
            }),
            AccessCheck::Denied { reason } => Err(SwapError::Forbidden(reason)),
        }
    }
}

pub struct AccessChecker;

impl AccessChecker {
    /// Owners see all their events; everyone sees swappable events.
    /// Only owners write.
    pub fn event(actor: &ProfileId, event: &Event, access: Access) -> AccessCheck {
        let owned = event.is_owned_by(actor);
        match access {
            Access::ReadEvent if owned || event.status == EventStatus::Swappable => {
                AccessCheck::Allowed
            }
            Access::ReadEvent => AccessCheck::Hidden,
            Access::WriteEvent if owned => AccessCheck::Allowed,
            Access::WriteEvent => AccessCheck::Denied {
                reason: "only the owner may modify this event".to_string(),
            },
            Access::ResolveRequest => AccessCheck::Denied {
                reason: format!("{access:?} does not apply to events"),
            },
        }
    }

    /// Only the owner party resolves a request. Reads of requests are
    /// scoped by party in the list queries.
    pub fn request(actor: &ProfileId, request: &SwapRequest, access: Access) -> AccessCheck {
        match access {
            Access::ResolveRequest if actor == &request.owner_id => AccessCheck::Allowed,
            Access::ResolveRequest => AccessCheck::Denied {
                reason: "only the receiving party may resolve this request".to_string(),
            },
            Access::ReadEvent | Access::WriteEvent => AccessCheck::Denied {
                reason: format!("{access:?} does not apply to swap requests"),
            },
        }
    }
}
