//! Command-line argument parsing.

use clap::Parser;

/// SlotSwap marketplace gateway.
#[derive(Parser, Debug, Clone)]
#[command(name = "slotswap-gateway")]
#[command(about = "WebSocket gateway for the SlotSwap scheduling marketplace")]
#[command(version)]
pub struct Cli {
    /// Config file. Falls back to $SLOTSWAP_CONFIG, then ~/.slotswap/slotswap.toml.
    #[arg(long, short)]
    pub config: Option<String>,

    /// Override `gateway.port` from the config file.
    #[arg(long)]
    pub port: Option<u16>,

    /// Override `database.path` from the config file.
    #[arg(long)]
    pub db: Option<String>,
}

impl Cli {
    /// Explicit flag first, then the environment.
    pub fn config_path(&self) -> Option<String> {
        self.config
            .clone()
            .or_else(|| std::env::var("SLOTSWAP_CONFIG").ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_overrides() {
        let cli = Cli::parse_from(["slotswap-gateway", "--config", "/tmp/s.toml", "--port", "9000"]);
        assert_eq!(cli.config.as_deref(), Some("/tmp/s.toml"));
        assert_eq!(cli.config_path().as_deref(), Some("/tmp/s.toml"));
        assert_eq!(cli.port, Some(9000));
        assert!(cli.db.is_none());
    }
}
