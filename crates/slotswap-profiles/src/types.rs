use serde::{Deserialize, Serialize};

/// A marketplace participant.
///
/// Read-mostly: written once on first sign-in, removed when the account
/// is deleted (which cascades to owned events and swap requests).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Authentication subject; opaque.
    pub id: String,
    pub display_name: String,
    /// Lower-cased, unique across profiles.
    pub email: String,
    pub created_at: String,
    pub updated_at: String,
}

impl Profile {
    pub fn profile_id(&self) -> slotswap_core::ProfileId {
        slotswap_core::ProfileId(self.id.clone())
    }
}
