//! The swap state machine as pure functions over statuses.
//!
//! Event: `Busy -> Swappable -> SwapPending -> {Busy, Swappable}`.
//! Request: `Pending -> {Accepted, Rejected}`.
//!
//! Nothing here touches storage; the manager looks up the edge, then writes
//! the result inside its transaction.

use crate::types::{EventStatus, SwapStatus};

/// Every action that can move an event between statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventTransition {
    /// Owner lists the event.
    MarkSwappable,
    /// Owner withdraws the listing.
    MarkBusy,
    /// The event becomes one side of a new pending request.
    Offer,
    /// The pending request referencing the event was accepted.
    Accept,
    /// The pending request referencing the event was rejected.
    Reject,
}

impl EventTransition {
    /// Verb used in error messages.
    pub fn action(self) -> &'static str {
        match self {
            EventTransition::MarkSwappable => "mark swappable",
            EventTransition::MarkBusy => "mark busy",
            EventTransition::Offer => "offer",
            EventTransition::Accept => "accept",
            EventTransition::Reject => "reject",
        }
    }
}

impl EventStatus {
    /// Target status for `transition`, or None when the table has no edge.
    pub fn next(self, transition: EventTransition) -> Option<EventStatus> {
        use EventStatus::*;
        use EventTransition::*;

        match (self, transition) {
            (Busy, MarkSwappable) => Some(Swappable),
            (Swappable, MarkBusy) => Some(Busy),
            (Swappable, Offer) => Some(SwapPending),
            (SwapPending, Accept) => Some(Busy),
            (SwapPending, Reject) => Some(Swappable),
            _ => None,
        }
    }

    /// Whether the owner may edit or delete the event in this status.
    pub fn is_frozen(self) -> bool {
        self == EventStatus::SwapPending
    }
}

/// How the owner party closes a pending request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Accept,
    Reject,
}

impl Resolution {
    pub fn request_status(self) -> SwapStatus {
        match self {
            Resolution::Accept => SwapStatus::Accepted,
            Resolution::Reject => SwapStatus::Rejected,
        }
    }

    /// The edge both referenced events follow.
    pub fn event_transition(self) -> EventTransition {
        match self {
            Resolution::Accept => EventTransition::Accept,
            Resolution::Reject => EventTransition::Reject,
        }
    }

    pub fn action(self) -> &'static str {
        self.event_transition().action()
    }
}

impl SwapStatus {
    /// Target status when resolving, or None once terminal.
    pub fn resolve(self, resolution: Resolution) -> Option<SwapStatus> {
        if self.is_terminal() {
            return None;
        }
        Some(resolution.request_status())
    }

    pub fn is_terminal(self) -> bool {
        self != SwapStatus::Pending
    }
}
