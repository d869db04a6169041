use slotswap_core::ProfileId;
use slotswap_protocol::{
    frames::{InboundFrame, ResFrame},
    handshake::ConnectParams,
    methods::{CONNECT, PROFILE_DELETE},
};
use std::sync::Arc;
use tracing::{info, warn};

use crate::app::AppState;
use crate::ws::connection::ConnState;
use crate::ws::send::WsSink;
use crate::ws::{dispatch, handshake, send};

/// Process one inbound WS text frame. Returns the new connection state.
pub async fn handle(
    conn_id: &str,
    text: &str,
    state: ConnState,
    tx: &mut WsSink,
    app: &Arc<AppState>,
) -> ConnState {
    let frame: InboundFrame = match serde_json::from_str(text) {
        Ok(f) => f,
        Err(e) => {
            warn!(conn_id, error = %e, "malformed frame");
            return state;
        }
    };

    match state {
        ConnState::AwaitingConnect => handle_auth(conn_id, frame, tx, app).await,
        ConnState::Authenticated { profile_id } => {
            handle_method(conn_id, frame, profile_id, tx, app).await
        }
        ConnState::Closing => ConnState::Closing,
    }
}

/// Pre-auth: only `connect` method is accepted.
async fn handle_auth(
    conn_id: &str,
    frame: InboundFrame,
    tx: &mut WsSink,
    app: &Arc<AppState>,
) -> ConnState {
    let Some(req) = frame.as_req() else {
        return ConnState::AwaitingConnect;
    };

    if req.method != CONNECT {
        let res = ResFrame::err(&req.id, "PROTOCOL_ERROR", "must authenticate first");
        let _ = send::json(tx, &res).await;
        return ConnState::AwaitingConnect;
    }

    let params: ConnectParams = match req.params_as() {
        Ok(p) => p,
        Err(e) => {
            let res = ResFrame::err(&req.id, "PROTOCOL_ERROR", &format!("invalid connect params: {e}"));
            let _ = send::json(tx, &res).await;
            return ConnState::Closing;
        }
    };

    let claims = match handshake::authenticate(&params, &app.config.gateway.auth) {
        Ok(claims) => claims,
        Err(e) => {
            warn!(conn_id, reason = %e, "auth failed");
            let res = ResFrame::err(&req.id, e.code(), &e.to_string());
            let _ = send::json(tx, &res).await;
            return ConnState::Closing;
        }
    };

    let resolved = match app.profiles.resolve(
        &claims.subject,
        &claims.email,
        claims.display_name.as_deref(),
    ) {
        Ok(r) => r,
        Err(e) => {
            warn!(conn_id, subject = %claims.subject, error = %e, "profile resolution failed");
            let res = ResFrame::err(&req.id, e.code(), &e.to_string());
            let _ = send::json(tx, &res).await;
            return ConnState::Closing;
        }
    };

    let hello = handshake::hello_ok(resolved.profile(), resolved.is_new());
    let profile_id = resolved.into_profile().profile_id();
    if send::json(tx, &ResFrame::ok(&req.id, hello)).await.is_err() {
        return ConnState::Closing;
    }
    app.ws_clients.insert(conn_id.to_string(), profile_id.clone());
    info!(conn_id, profile_id = %profile_id, "client authenticated");
    ConnState::Authenticated { profile_id }
}

/// Post-auth: dispatch method calls to handlers.
async fn handle_method(
    conn_id: &str,
    frame: InboundFrame,
    profile_id: ProfileId,
    tx: &mut WsSink,
    app: &Arc<AppState>,
) -> ConnState {
    let Some(req) = frame.as_req() else {
        return ConnState::Authenticated { profile_id };
    };

    let res = dispatch::route(&req, &profile_id, app);
    let closed_account = req.method == PROFILE_DELETE && res.ok;
    let _ = send::json(tx, &res).await;

    if closed_account {
        info!(conn_id, profile_id = %profile_id, "profile deleted; closing connection");
        ConnState::Closing
    } else {
        ConnState::Authenticated { profile_id }
    }
}
