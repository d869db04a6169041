//! Concrete WS method handler functions.
//!
//! Each function extracts its parameters, calls the appropriate `AppState`
//! subsystem on behalf of `actor`, pushes notifications for whatever the
//! call changed, and returns a `ResFrame`. `dispatch::route` is the only
//! caller.

use serde::de::DeserializeOwned;
use slotswap_core::ProfileId;
use slotswap_protocol::frames::{ReqFrame, ResFrame};
use slotswap_protocol::params::{
    CreateEventParams, CreateSwapParams, EventIdParams, RequestIdParams, UpdateEventParams,
};
use slotswap_swaps::{Event, EventPatch, EventStatus, NewEvent, SwapError, SwapStatus};
use tracing::warn;

use crate::app::AppState;

/// Decode typed params or produce the INVALID_PARAMS response.
fn parse<T: DeserializeOwned>(req: &ReqFrame) -> Result<T, ResFrame> {
    req.params_as()
        .map_err(|e| ResFrame::err(&req.id, "INVALID_PARAMS", &e.to_string()))
}

/// Map a refused operation to its error response.
fn refused(req: &ReqFrame, e: SwapError) -> ResFrame {
    warn!(method = %req.method, code = e.code(), error = %e, "request refused");
    ResFrame::err(&req.id, e.code(), &e.to_string())
}

macro_rules! params {
    ($req:expr) => {
        match parse($req) {
            Ok(p) => p,
            Err(res) => return res,
        }
    };
}

// ---------------------------------------------------------------------------
// profile.*
// ---------------------------------------------------------------------------

/// Handler for `profile.get`. Returns the caller's own profile.
pub fn handle_profile_get(req: &ReqFrame, actor: &ProfileId, app: &AppState) -> ResFrame {
    match app.profiles.get_profile(actor.as_str()) {
        Ok(Some(profile)) => ResFrame::ok(&req.id, serde_json::json!({ "profile": profile })),
        Ok(None) => ResFrame::err(&req.id, "NOT_FOUND", "profile not found"),
        Err(e) => ResFrame::err(&req.id, e.code(), &e.to_string()),
    }
}

/// Handler for `profile.delete`.
///
/// Deletes the caller's profile. Counterparties of any pending request get
/// `swap.changed` (rejected) and their events reappear on the marketplace.
pub fn handle_profile_delete(req: &ReqFrame, actor: &ProfileId, app: &AppState) -> ResFrame {
    match app.swaps.delete_profile(actor, actor.as_str()) {
        Ok(closed) => {
            for request in &closed {
                app.notify_swap_changed(request);
                for event_id in request.event_ids() {
                    app.notify_market_changed(event_id);
                }
            }
            ResFrame::ok(
                &req.id,
                serde_json::json!({ "deleted": true, "rejected_requests": closed.len() }),
            )
        }
        Err(e) => refused(req, e),
    }
}

// ---------------------------------------------------------------------------
// events.*
// ---------------------------------------------------------------------------

/// Handler for `events.list`. The caller's events, earliest first.
pub fn handle_events_list(req: &ReqFrame, actor: &ProfileId, app: &AppState) -> ResFrame {
    match app.swaps.list_own_events(actor) {
        Ok(events) => ResFrame::ok(&req.id, serde_json::json!({ "events": events })),
        Err(e) => refused(req, e),
    }
}

/// Handler for `events.get`.
///
/// Params: `{ "event_id": string }`
pub fn handle_events_get(req: &ReqFrame, actor: &ProfileId, app: &AppState) -> ResFrame {
    let p: EventIdParams = params!(req);
    event_result(req, app.swaps.get_event(actor, &p.event_id))
}

/// Handler for `events.create`.
///
/// Params: `{ "title": string, "start_time": RFC3339, "end_time": RFC3339 }`
pub fn handle_events_create(req: &ReqFrame, actor: &ProfileId, app: &AppState) -> ResFrame {
    let p: CreateEventParams = params!(req);
    let input = NewEvent {
        title: p.title,
        start_time: p.start_time,
        end_time: p.end_time,
    };
    event_result(req, app.swaps.create_event(actor, input))
}

/// Handler for `events.update`. Absent fields keep their value.
pub fn handle_events_update(req: &ReqFrame, actor: &ProfileId, app: &AppState) -> ResFrame {
    let p: UpdateEventParams = params!(req);
    let patch = EventPatch {
        title: p.title,
        start_time: p.start_time,
        end_time: p.end_time,
    };
    let result = app.swaps.update_event(actor, &p.event_id, patch);
    if let Ok(ev) = &result {
        if ev.status == EventStatus::Swappable {
            app.notify_market_changed(&ev.id);
        }
    }
    event_result(req, result)
}

/// Handler for `events.delete`.
pub fn handle_events_delete(req: &ReqFrame, actor: &ProfileId, app: &AppState) -> ResFrame {
    let p: EventIdParams = params!(req);
    match app.swaps.delete_event(actor, &p.event_id) {
        Ok(ev) => {
            if ev.status == EventStatus::Swappable {
                app.notify_market_changed(&ev.id);
            }
            ResFrame::ok(&req.id, serde_json::json!({ "deleted": ev.id }))
        }
        Err(e) => refused(req, e),
    }
}

/// Handler for `events.mark_swappable`.
pub fn handle_events_mark_swappable(req: &ReqFrame, actor: &ProfileId, app: &AppState) -> ResFrame {
    let p: EventIdParams = params!(req);
    let result = app.swaps.mark_swappable(actor, &p.event_id);
    if result.is_ok() {
        app.notify_market_changed(&p.event_id);
    }
    event_result(req, result)
}

/// Handler for `events.mark_busy`.
pub fn handle_events_mark_busy(req: &ReqFrame, actor: &ProfileId, app: &AppState) -> ResFrame {
    let p: EventIdParams = params!(req);
    let result = app.swaps.mark_busy(actor, &p.event_id);
    if result.is_ok() {
        app.notify_market_changed(&p.event_id);
    }
    event_result(req, result)
}

fn event_result(req: &ReqFrame, result: slotswap_swaps::Result<Event>) -> ResFrame {
    match result {
        Ok(event) => ResFrame::ok(&req.id, serde_json::json!({ "event": event })),
        Err(e) => refused(req, e),
    }
}

// ---------------------------------------------------------------------------
// market.list
// ---------------------------------------------------------------------------

/// Handler for `market.list`. Other profiles' swappable events.
pub fn handle_market_list(req: &ReqFrame, actor: &ProfileId, app: &AppState) -> ResFrame {
    match app.swaps.list_marketplace(actor) {
        Ok(events) => ResFrame::ok(&req.id, serde_json::json!({ "events": events })),
        Err(e) => refused(req, e),
    }
}

// ---------------------------------------------------------------------------
// swaps.*
// ---------------------------------------------------------------------------

/// Handler for `swaps.create`.
///
/// Params: `{ "requester_event_id", "owner_event_id", "owner_id" }`
///
/// Both events leave the marketplace, so `market.changed` goes out for each.
pub fn handle_swaps_create(req: &ReqFrame, actor: &ProfileId, app: &AppState) -> ResFrame {
    let p: CreateSwapParams = params!(req);
    let owner = ProfileId::from(p.owner_id);
    match app
        .swaps
        .create_swap_request(actor, &p.requester_event_id, &p.owner_event_id, &owner)
    {
        Ok(request) => {
            app.notify_swap_changed(&request);
            for event_id in request.event_ids() {
                app.notify_market_changed(event_id);
            }
            ResFrame::ok(&req.id, serde_json::json!({ "request": request }))
        }
        Err(e) => refused(req, e),
    }
}

/// Handler for `swaps.accept`.
pub fn handle_swaps_accept(req: &ReqFrame, actor: &ProfileId, app: &AppState) -> ResFrame {
    let p: RequestIdParams = params!(req);
    resolve_result(req, app, app.swaps.accept_swap_request(actor, &p.request_id))
}

/// Handler for `swaps.reject`. Both events return to the marketplace.
pub fn handle_swaps_reject(req: &ReqFrame, actor: &ProfileId, app: &AppState) -> ResFrame {
    let p: RequestIdParams = params!(req);
    resolve_result(req, app, app.swaps.reject_swap_request(actor, &p.request_id))
}

fn resolve_result(
    req: &ReqFrame,
    app: &AppState,
    result: slotswap_swaps::Result<slotswap_swaps::SwapRequest>,
) -> ResFrame {
    match result {
        Ok(request) => {
            app.notify_swap_changed(&request);
            if request.status == SwapStatus::Rejected {
                for event_id in request.event_ids() {
                    app.notify_market_changed(event_id);
                }
            }
            ResFrame::ok(&req.id, serde_json::json!({ "request": request }))
        }
        Err(e) => refused(req, e),
    }
}

/// Handler for `swaps.incoming`. Requests awaiting the caller's answer
/// (and past ones), newest first.
pub fn handle_swaps_incoming(req: &ReqFrame, actor: &ProfileId, app: &AppState) -> ResFrame {
    match app.swaps.list_incoming_requests(actor) {
        Ok(requests) => ResFrame::ok(&req.id, serde_json::json!({ "requests": requests })),
        Err(e) => refused(req, e),
    }
}

/// Handler for `swaps.outgoing`.
pub fn handle_swaps_outgoing(req: &ReqFrame, actor: &ProfileId, app: &AppState) -> ResFrame {
    match app.swaps.list_outgoing_requests(actor) {
        Ok(requests) => ResFrame::ok(&req.id, serde_json::json!({ "requests": requests })),
        Err(e) => refused(req, e),
    }
}
