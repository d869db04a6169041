use axum::{routing::get, Router};
use dashmap::DashMap;
use slotswap_core::{ProfileId, SlotswapConfig};
use slotswap_profiles::ProfileResolver;
use slotswap_protocol::frames::EventFrame;
use slotswap_protocol::methods::{EV_MARKET_CHANGED, EV_SWAP_CHANGED};
use slotswap_protocol::params::{MarketChanged, SwapChanged};
use slotswap_swaps::{SwapManager, SwapRequest};
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use crate::ws::broadcast::{Audience, EventBroadcaster};

/// Central shared state — passed as Arc<AppState> to all Axum handlers.
pub struct AppState {
    pub config: SlotswapConfig,
    pub event_seq: AtomicU64,
    pub broadcaster: EventBroadcaster,
    pub profiles: ProfileResolver,
    pub swaps: SwapManager,
    /// Authenticated WS connections: conn_id -> profile.
    pub ws_clients: DashMap<String, ProfileId>,
}

impl AppState {
    pub fn new(config: SlotswapConfig, profiles: ProfileResolver, swaps: SwapManager) -> Self {
        Self {
            config,
            event_seq: AtomicU64::new(0),
            broadcaster: EventBroadcaster::new(),
            profiles,
            swaps,
            ws_clients: DashMap::new(),
        }
    }

    /// Monotonically increasing sequence for broadcast events.
    pub fn next_seq(&self) -> u64 {
        self.event_seq.fetch_add(1, Ordering::Relaxed)
    }

    /// `swap.changed` to the connections of both parties.
    pub fn notify_swap_changed(&self, request: &SwapRequest) {
        let payload = SwapChanged {
            request_id: request.id.clone(),
            status: request.status.to_string(),
            requester_id: request.requester_id.clone(),
            owner_id: request.owner_id.clone(),
        };
        let frame = EventFrame::new(EV_SWAP_CHANGED, payload).with_seq(self.next_seq());
        self.broadcaster.send(
            Audience::Profiles(vec![
                ProfileId::from(request.requester_id.as_str()),
                ProfileId::from(request.owner_id.as_str()),
            ]),
            &frame,
        );
    }

    /// `market.changed` to every authenticated connection.
    pub fn notify_market_changed(&self, event_id: &str) {
        let payload = MarketChanged {
            event_id: event_id.to_string(),
        };
        let frame = EventFrame::new(EV_MARKET_CHANGED, payload).with_seq(self.next_seq());
        self.broadcaster.send(Audience::All, &frame);
    }
}

/// Assemble the full Axum router.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(crate::http::health::health_handler))
        .route("/ws", get(crate::ws::connection::ws_handler))
        .with_state(state)
        .layer(tower_http::trace::TraceLayer::new_for_http())
}
