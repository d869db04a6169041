use thiserror::Error;

/// Profile-layer errors. Kept separate from the swap errors so the gateway
/// can map them to WS error codes without coupling layers.
#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("Profile not found: {0}")]
    NotFound(String),

    /// The email is already bound to a different subject.
    #[error("Email already registered: {0}")]
    AlreadyExists(String),

    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    #[error("Database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),
}

impl ProfileError {
    pub fn code(&self) -> &'static str {
        match self {
            ProfileError::NotFound(_) => "NOT_FOUND",
            ProfileError::AlreadyExists(_) => "ALREADY_EXISTS",
            ProfileError::InvalidEmail(_) => "VALIDATION_ERROR",
            ProfileError::DatabaseError(_) => "DATABASE_ERROR",
        }
    }
}

pub type Result<T> = std::result::Result<T, ProfileError>;
