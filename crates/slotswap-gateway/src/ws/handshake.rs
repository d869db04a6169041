use slotswap_core::config::{
    AuthConfig, AuthMode, HEARTBEAT_INTERVAL_SECS, MAX_PAYLOAD_BYTES, PROTOCOL_VERSION,
};
use slotswap_core::SlotswapError;
use slotswap_profiles::Profile;
use slotswap_protocol::{
    frames::EventFrame,
    handshake::{
        AuthPayload, ClientPolicy, ConnectChallenge, ConnectParams, HelloOk, IdentityClaims,
        ProfileSummary, ServerInfo,
    },
    methods::EV_CONNECT_CHALLENGE,
};
use uuid::Uuid;

/// Random nonce for the connect challenge.
pub fn make_nonce() -> String {
    Uuid::new_v4().to_string().replace('-', "")
}

/// Serialize the `connect.challenge` event that opens every WS session.
pub fn challenge_event(nonce: &str) -> String {
    let frame = EventFrame::new(
        EV_CONNECT_CHALLENGE,
        ConnectChallenge {
            nonce: nonce.to_string(),
        },
    );
    serde_json::to_string(&frame).unwrap_or_default()
}

/// Verify client auth against server config and return the identity the
/// connection acts as from now on.
pub fn authenticate(
    params: &ConnectParams,
    auth: &AuthConfig,
) -> Result<IdentityClaims, SlotswapError> {
    match (&auth.mode, &params.auth) {
        (AuthMode::None, AuthPayload::None) => claimed_identity(params),

        (AuthMode::Token, AuthPayload::Token { token }) => {
            let Some(expected) = auth.token.as_ref() else {
                return Err(SlotswapError::AuthFailed(
                    "token auth enabled but no token configured".to_string(),
                ));
            };
            if token != expected {
                return Err(SlotswapError::AuthFailed("invalid token".to_string()));
            }
            claimed_identity(params)
        }

        // The proxy has already authenticated the user; its forwarded
        // identity wins over anything in `identity`.
        (
            AuthMode::TrustedProxy,
            AuthPayload::TrustedProxy {
                forwarded_user,
                forwarded_email,
                forwarded_name,
            },
        ) => {
            if forwarded_user.trim().is_empty() {
                return Err(SlotswapError::AuthFailed("empty forwarded user".to_string()));
            }
            Ok(IdentityClaims {
                subject: forwarded_user.clone(),
                email: forwarded_email.clone(),
                display_name: forwarded_name.clone(),
            })
        }

        (mode, _) => Err(SlotswapError::AuthFailed(format!(
            "expected {} auth mode",
            mode_name(mode)
        ))),
    }
}

fn claimed_identity(params: &ConnectParams) -> Result<IdentityClaims, SlotswapError> {
    match &params.identity {
        Some(id) if !id.subject.trim().is_empty() => Ok(id.clone()),
        _ => Err(SlotswapError::InvalidParams(
            "connect requires identity.subject".to_string(),
        )),
    }
}

fn mode_name(mode: &AuthMode) -> &'static str {
    match mode {
        AuthMode::Token => "token",
        AuthMode::TrustedProxy => "trusted-proxy",
        AuthMode::None => "none",
    }
}

/// Build the `hello-ok` response payload after successful authentication.
pub fn hello_ok(profile: &Profile, new_profile: bool) -> HelloOk {
    HelloOk {
        protocol: PROTOCOL_VERSION,
        server: ServerInfo {
            name: "slotswap".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        profile: ProfileSummary {
            id: profile.id.clone(),
            display_name: profile.display_name.clone(),
            email: profile.email.clone(),
        },
        new_profile,
        policy: ClientPolicy {
            max_message_size: MAX_PAYLOAD_BYTES,
            heartbeat_secs: HEARTBEAT_INTERVAL_SECS,
        },
    }
}
