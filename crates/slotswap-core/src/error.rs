use thiserror::Error;

#[derive(Debug, Error)]
pub enum SlotswapError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Authentication failed: {0}")]
    AuthFailed(String),

    #[error("WebSocket protocol error: {0}")]
    Protocol(String),

    #[error("Method not found: {method}")]
    MethodNotFound { method: String },

    #[error("Invalid params: {0}")]
    InvalidParams(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Payload too large: {size} bytes (max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl SlotswapError {
    /// Short error code string sent to clients in WS RES frames.
    pub fn code(&self) -> &'static str {
        match self {
            SlotswapError::Config(_) => "CONFIG_ERROR",
            SlotswapError::AuthFailed(_) => "AUTH_FAILED",
            SlotswapError::Protocol(_) => "PROTOCOL_ERROR",
            SlotswapError::MethodNotFound { .. } => "METHOD_NOT_FOUND",
            SlotswapError::InvalidParams(_) => "INVALID_PARAMS",
            SlotswapError::Serialization(_) => "SERIALIZATION_ERROR",
            SlotswapError::Io(_) => "IO_ERROR",
            SlotswapError::PayloadTooLarge { .. } => "PAYLOAD_TOO_LARGE",
            SlotswapError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

pub type Result<T> = std::result::Result<T, SlotswapError>;
