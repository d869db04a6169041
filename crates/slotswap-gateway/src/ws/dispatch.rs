use std::sync::Arc;

use slotswap_core::{ProfileId, SlotswapError};
use slotswap_protocol::frames::{ReqFrame, ResFrame};
use slotswap_protocol::methods::*;
use tracing::debug;

use crate::app::AppState;
use crate::ws::handlers;

/// Route a WS method call to the correct handler.
///
/// `actor` is the profile the connection authenticated as; every handler
/// acts on its behalf.
pub fn route(req: &ReqFrame, actor: &ProfileId, app: &Arc<AppState>) -> ResFrame {
    debug!(method = %req.method, actor = %actor, "dispatch");
    match req.method.as_str() {
        // ------------------------------------------------------------------
        // Utility
        // ------------------------------------------------------------------
        PING => ResFrame::ok(&req.id, serde_json::json!({ "pong": true })),

        // ------------------------------------------------------------------
        // Profile
        // ------------------------------------------------------------------
        PROFILE_GET => handlers::handle_profile_get(req, actor, app),
        PROFILE_DELETE => handlers::handle_profile_delete(req, actor, app),

        // ------------------------------------------------------------------
        // Own events
        // ------------------------------------------------------------------
        EVENTS_LIST => handlers::handle_events_list(req, actor, app),
        EVENTS_GET => handlers::handle_events_get(req, actor, app),
        EVENTS_CREATE => handlers::handle_events_create(req, actor, app),
        EVENTS_UPDATE => handlers::handle_events_update(req, actor, app),
        EVENTS_DELETE => handlers::handle_events_delete(req, actor, app),
        EVENTS_MARK_SWAPPABLE => handlers::handle_events_mark_swappable(req, actor, app),
        EVENTS_MARK_BUSY => handlers::handle_events_mark_busy(req, actor, app),

        // ------------------------------------------------------------------
        // Marketplace
        // ------------------------------------------------------------------
        MARKET_LIST => handlers::handle_market_list(req, actor, app),

        // ------------------------------------------------------------------
        // Swap requests
        // ------------------------------------------------------------------
        SWAPS_CREATE => handlers::handle_swaps_create(req, actor, app),
        SWAPS_ACCEPT => handlers::handle_swaps_accept(req, actor, app),
        SWAPS_REJECT => handlers::handle_swaps_reject(req, actor, app),
        SWAPS_INCOMING => handlers::handle_swaps_incoming(req, actor, app),
        SWAPS_OUTGOING => handlers::handle_swaps_outgoing(req, actor, app),

        other => {
            let e = SlotswapError::MethodNotFound {
                method: other.to_string(),
            };
            ResFrame::err(&req.id, e.code(), &e.to_string())
        }
    }
}
