//! Typed `params` for each method and payloads for push events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// `events.create`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEventParams {
    pub title: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

/// `events.update` — absent fields are left unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateEventParams {
    pub event_id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
}

/// `events.get`, `events.delete`, `events.mark_swappable`, `events.mark_busy`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventIdParams {
    pub event_id: String,
}

/// `swaps.create`
///
/// `owner_id` is the counterparty as seen in the marketplace listing; a
/// stale listing (event changed hands since) is refused.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSwapParams {
    pub requester_event_id: String,
    pub owner_event_id: String,
    pub owner_id: String,
}

/// `swaps.accept`, `swaps.reject`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestIdParams {
    pub request_id: String,
}

/// Payload of the `swap.changed` push event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SwapChanged {
    pub request_id: String,
    pub status: String,
    pub requester_id: String,
    pub owner_id: String,
}

/// Payload of the `market.changed` push event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MarketChanged {
    pub event_id: String,
}
