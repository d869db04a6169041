use rusqlite::{Connection, Result};

use crate::types::Profile;

/// Column order shared by every profile SELECT in this crate.
pub(crate) const PROFILE_COLUMNS: &str = "id, display_name, email, created_at, updated_at";

/// Map a SELECT row (column order from PROFILE_COLUMNS) to a Profile.
pub(crate) fn row_to_profile(row: &rusqlite::Row<'_>) -> rusqlite::Result<Profile> {
    Ok(Profile {
        id: row.get(0)?,
        display_name: row.get(1)?,
        email: row.get(2)?,
        created_at: row.get(3)?,
        updated_at: row.get(4)?,
    })
}

/// Initialise the profiles table. Safe to call on every startup:
/// CREATE IF NOT EXISTS means it's idempotent.
///
/// Must run before `slotswap_swaps::db::init_db`, whose tables reference
/// `profiles(id)`.
pub fn init_db(conn: &Connection) -> Result<()> {
    // Emails are stored lower-cased; NOCASE keeps the UNIQUE check honest
    // for rows written by other tools.
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS profiles (
            id            TEXT PRIMARY KEY NOT NULL,
            display_name  TEXT NOT NULL,
            email         TEXT NOT NULL UNIQUE COLLATE NOCASE,
            created_at    TEXT NOT NULL,
            updated_at    TEXT NOT NULL
        );",
    )
}
