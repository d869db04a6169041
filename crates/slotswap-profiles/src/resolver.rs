use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use rusqlite::Connection;
use tracing::{debug, info};

use crate::error::{ProfileError, Result};
use crate::identity::{create_profile, get_profile};
use crate::types::Profile;

/// Result of resolving an authenticated identity.
#[derive(Debug)]
pub enum ResolvedProfile {
    Known(Profile),
    /// Auto-created on first sign-in.
    NewlyCreated(Profile),
}

impl ResolvedProfile {
    pub fn profile(&self) -> &Profile {
        match self {
            ResolvedProfile::Known(p) => p,
            ResolvedProfile::NewlyCreated(p) => p,
        }
    }

    pub fn into_profile(self) -> Profile {
        match self {
            ResolvedProfile::Known(p) | ResolvedProfile::NewlyCreated(p) => p,
        }
    }

    pub fn is_new(&self) -> bool {
        matches!(self, ResolvedProfile::NewlyCreated(_))
    }
}

/// Translates authenticated identities into profiles.
///
/// Called once per WS handshake; the subject is the profile id, so the hot
/// path is a single primary-key lookup.
pub struct ProfileResolver {
    db: Arc<Mutex<Connection>>,
}

impl ProfileResolver {
    pub fn new(db: Arc<Mutex<Connection>>) -> Self {
        Self { db }
    }

    /// Resolve `subject` to its profile, creating it on first contact.
    ///
    /// An existing profile is returned unchanged even when `email` or
    /// `display_name` differ from what is stored.
    pub fn resolve(
        &self,
        subject: &str,
        email: &str,
        display_name: Option<&str>,
    ) -> Result<ResolvedProfile> {
        if subject.trim().is_empty() {
            return Err(ProfileError::NotFound("empty subject".to_string()));
        }

        let conn = self.conn();
        if let Some(profile) = get_profile(&conn, subject)? {
            debug!(subject, "known profile");
            return Ok(ResolvedProfile::Known(profile));
        }

        let profile = create_profile(&conn, subject, email, display_name)?;
        info!(subject, email = %profile.email, "new identity; profile created");
        Ok(ResolvedProfile::NewlyCreated(profile))
    }

    /// Look up a profile by id. Returns None if no profile exists.
    pub fn get_profile(&self, id: &str) -> Result<Option<Profile>> {
        let conn = self.conn();
        get_profile(&conn, id)
    }

    // A panicking holder cannot leave a half-written row behind: every
    // statement here is a single autocommit write.
    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.db.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
