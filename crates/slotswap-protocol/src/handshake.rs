use serde::{Deserialize, Serialize};

/// Server → Client: initial challenge on WS connect.
/// Sent as: `EVENT connect.challenge { nonce: "..." }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectChallenge {
    pub nonce: String,
}

/// Client → Server: authentication request.
/// Sent as: `REQ connect { auth: { mode: "token", token: "..." }, identity: {...} }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectParams {
    pub auth: AuthPayload,
    /// Who the client claims to be. Required for `token` and `none` modes;
    /// ignored in `trusted-proxy` mode where the proxy vouches instead.
    #[serde(default)]
    pub identity: Option<IdentityClaims>,
    #[serde(default)]
    pub client_info: Option<ClientInfo>,
}

/// Discriminated auth payload — mode determines which fields are present.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "kebab-case")]
pub enum AuthPayload {
    Token {
        token: String,
    },
    TrustedProxy {
        /// Stable subject from the upstream identity provider.
        forwarded_user: String,
        forwarded_email: String,
        #[serde(default)]
        forwarded_name: Option<String>,
    },
    None,
}

/// Identity asserted by the client: the authentication subject plus the
/// fields used to seed a profile on first sign-in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityClaims {
    pub subject: String,
    pub email: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ClientInfo {
    pub name: Option<String>,
    pub version: Option<String>,
    pub platform: Option<String>,
}

/// Server → Client: successful auth response payload.
/// Sent as: `RES hello-ok { protocol: 1, server: {...}, profile: {...}, ... }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HelloOk {
    pub protocol: u32,
    pub server: ServerInfo,
    pub profile: ProfileSummary,
    /// True when this connection created the profile.
    pub new_profile: bool,
    pub policy: ClientPolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerInfo {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProfileSummary {
    pub id: String,
    pub display_name: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ClientPolicy {
    pub max_message_size: usize,
    pub heartbeat_secs: u64,
}
