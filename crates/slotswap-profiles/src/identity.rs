use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};

use crate::db::{row_to_profile, PROFILE_COLUMNS};
use crate::error::{ProfileError, Result};
use crate::types::Profile;

/// Insert a brand-new profile row keyed by the authentication subject.
///
/// The display name falls back to the local part of the email when the
/// identity provider did not supply one.
pub fn create_profile(
    conn: &Connection,
    subject: &str,
    email: &str,
    display_name: Option<&str>,
) -> Result<Profile> {
    let email = normalize_email(email)?;
    if let Some(existing) = find_profile_by_email(conn, &email)? {
        return Err(ProfileError::AlreadyExists(existing.email));
    }

    let display_name = display_name
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(String::from)
        .unwrap_or_else(|| default_display_name(&email));

    let now = Utc::now().to_rfc3339();
    let profile = Profile {
        id: subject.to_string(),
        display_name,
        email,
        created_at: now.clone(),
        updated_at: now,
    };
    conn.execute(
        "INSERT INTO profiles (id, display_name, email, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            profile.id,
            profile.display_name,
            profile.email,
            profile.created_at,
            profile.updated_at
        ],
    )?;
    Ok(profile)
}

/// Load a profile by id. Returns None instead of an error when absent so
/// callers decide whether missing is exceptional in their context.
pub fn get_profile(conn: &Connection, id: &str) -> Result<Option<Profile>> {
    let sql = format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE id = ?1");
    Ok(conn.query_row(&sql, params![id], row_to_profile).optional()?)
}

pub fn find_profile_by_email(conn: &Connection, email: &str) -> Result<Option<Profile>> {
    let sql = format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE email = ?1");
    let email = email.trim().to_lowercase();
    Ok(conn.query_row(&sql, params![email], row_to_profile).optional()?)
}

/// Remove a profile row. Foreign keys cascade to owned events and swap
/// requests, so callers holding pending negotiations must close them first.
pub fn delete_profile_row(conn: &Connection, id: &str) -> Result<()> {
    let n = conn.execute("DELETE FROM profiles WHERE id = ?1", params![id])?;
    if n == 0 {
        return Err(ProfileError::NotFound(id.to_string()));
    }
    Ok(())
}

// ── private helpers ───────────────────────────────────────────────────────────

fn normalize_email(email: &str) -> Result<String> {
    let email = email.trim().to_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(email),
        _ => Err(ProfileError::InvalidEmail(email)),
    }
}

fn default_display_name(email: &str) -> String {
    email.split('@').next().unwrap_or(email).to_string()
}
