use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

// Protocol constants shared by the gateway and its clients
pub const PROTOCOL_VERSION: u32 = 1;
pub const DEFAULT_PORT: u16 = 8787;
pub const DEFAULT_BIND: &str = "127.0.0.1";
pub const MAX_PAYLOAD_BYTES: usize = 64 * 1024; // 64 KB hard cap per frame
pub const HANDSHAKE_TIMEOUT_MS: u64 = 10_000; // close if client doesn't auth in 10s
pub const HEARTBEAT_INTERVAL_SECS: u64 = 30; // tick event cadence
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// Top-level config (slotswap.toml + SLOTSWAP_* env overrides).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SlotswapConfig {
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default)]
    pub auth: AuthConfig,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            bind: DEFAULT_BIND.to_string(),
            auth: AuthConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "default_auth_mode")]
    pub mode: AuthMode,
    /// Shared bearer token; required when `mode = "token"`.
    pub token: Option<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            mode: AuthMode::Token,
            token: Some("change-me".to_string()),
        }
    }
}

/// How a WS client proves who it is during the `connect` handshake.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum AuthMode {
    /// Shared token plus self-declared identity claims.
    Token,
    /// An upstream auth proxy has already verified the user.
    TrustedProxy,
    /// Development only: identity claims are trusted as-is.
    None,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: String,
    /// How long a writer waits for the SQLite lock before giving up.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
        }
    }
}

fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}
fn default_auth_mode() -> AuthMode {
    AuthMode::Token
}
fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}
fn default_db_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.slotswap/slotswap.db", home)
}

impl SlotswapConfig {
    /// Load config from a TOML file with SLOTSWAP_* env var overrides.
    ///
    /// Checks in order:
    ///   1. Explicit path argument
    ///   2. ~/.slotswap/slotswap.toml
    ///
    /// A missing file is not an error; every field has a default.
    pub fn load(config_path: Option<&str>) -> crate::error::Result<Self> {
        let path = config_path
            .map(String::from)
            .unwrap_or_else(default_config_path);

        let config: SlotswapConfig = Figment::new()
            .merge(Toml::file(&path))
            .merge(Env::prefixed("SLOTSWAP_").split("__"))
            .extract()
            .map_err(|e| crate::error::SlotswapError::Config(e.to_string()))?;

        Ok(config)
    }

    /// `bind:port` string for the gateway listener.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.gateway.bind, self.gateway.port)
    }
}

fn default_config_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.slotswap/slotswap.toml", home)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_token_auth_on_localhost() {
        let config = SlotswapConfig::default();
        assert_eq!(config.gateway.auth.mode, AuthMode::Token);
        assert_eq!(config.listen_addr(), "127.0.0.1:8787");
        assert_eq!(config.database.busy_timeout_ms, DEFAULT_BUSY_TIMEOUT_MS);
    }

    #[test]
    fn load_reads_toml_and_fills_missing_fields() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            [gateway]
            port = 9100

            [gateway.auth]
            mode = "trusted-proxy"

            [database]
            path = "/tmp/slots.db"
            "#
        )
        .unwrap();

        let config = SlotswapConfig::load(file.path().to_str()).unwrap();
        assert_eq!(config.gateway.port, 9100);
        assert_eq!(config.gateway.bind, DEFAULT_BIND);
        assert_eq!(config.gateway.auth.mode, AuthMode::TrustedProxy);
        assert_eq!(config.database.path, "/tmp/slots.db");
        assert_eq!(config.database.busy_timeout_ms, DEFAULT_BUSY_TIMEOUT_MS);
    }

    #[test]
    fn load_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let config = SlotswapConfig::load(path.to_str()).unwrap();
        assert_eq!(config.gateway.port, DEFAULT_PORT);
    }

    #[test]
    fn load_rejects_unknown_auth_mode() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[gateway.auth]\nmode = \"carrier-pigeon\"").unwrap();
        assert!(SlotswapConfig::load(file.path().to_str()).is_err());
    }
}
