use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use slotswap_core::ProfileId;

/// Marketplace status of a calendar event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    /// Private to the owner; not offered.
    Busy,
    /// Listed on the marketplace and open to offers.
    Swappable,
    /// Referenced by exactly one pending swap request.
    SwapPending,
}

impl std::fmt::Display for EventStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            EventStatus::Busy => "busy",
            EventStatus::Swappable => "swappable",
            EventStatus::SwapPending => "swap_pending",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for EventStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "busy" => Ok(EventStatus::Busy),
            "swappable" => Ok(EventStatus::Swappable),
            "swap_pending" => Ok(EventStatus::SwapPending),
            other => Err(format!("unknown event status: {other}")),
        }
    }
}

/// Lifecycle of a swap request. `Accepted` and `Rejected` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwapStatus {
    Pending,
    Accepted,
    Rejected,
}

impl std::fmt::Display for SwapStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SwapStatus::Pending => "pending",
            SwapStatus::Accepted => "accepted",
            SwapStatus::Rejected => "rejected",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for SwapStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "pending" => Ok(SwapStatus::Pending),
            "accepted" => Ok(SwapStatus::Accepted),
            "rejected" => Ok(SwapStatus::Rejected),
            other => Err(format!("unknown swap status: {other}")),
        }
    }
}

/// A persisted calendar event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// UUIDv7 string, primary key.
    pub id: String,
    pub owner_id: String,
    /// Trimmed, 1 to 100 characters.
    pub title: String,
    pub start_time: DateTime<Utc>,
    /// Always strictly after `start_time`.
    pub end_time: DateTime<Utc>,
    pub status: EventStatus,
    pub created_at: String,
    pub updated_at: String,
}

impl Event {
    pub fn is_owned_by(&self, profile: &ProfileId) -> bool {
        profile == &self.owner_id
    }
}

/// A proposal to exchange `requester_event_id` for `owner_event_id`.
///
/// The event references are only ever null on resolved requests, after the
/// event itself was deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapRequest {
    pub id: String,
    pub requester_id: String,
    pub requester_event_id: Option<String>,
    /// The counterparty; the only profile allowed to accept or reject.
    pub owner_id: String,
    pub owner_event_id: Option<String>,
    pub status: SwapStatus,
    pub created_at: String,
    pub updated_at: String,
}

impl SwapRequest {
    /// Both event ids, skipping references cleared by deletion.
    pub fn event_ids(&self) -> impl Iterator<Item = &str> {
        self.requester_event_id
            .as_deref()
            .into_iter()
            .chain(self.owner_event_id.as_deref())
    }
}

/// Input for a new event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewEvent {
    pub title: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

/// Partial update of an event. Absent fields keep their stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventPatch {
    pub title: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
}

impl EventPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.start_time.is_none() && self.end_time.is_none()
    }
}

/// A swappable event as seen on the marketplace, with its owner's name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketEvent {
    #[serde(flatten)]
    pub event: Event,
    pub owner_name: String,
}

/// Title and time range of an event referenced from a swap request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventBrief {
    pub id: String,
    pub title: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

/// A swap request joined with both parties' names and the two events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapRequestView {
    #[serde(flatten)]
    pub request: SwapRequest,
    pub requester_name: String,
    pub owner_name: String,
    /// None once the event has been deleted.
    pub requester_event: Option<EventBrief>,
    pub owner_event: Option<EventBrief>,
}
