use rusqlite::Connection;

use crate::error::Result;

/// Initialise the `events` and `swap_requests` tables. Idempotent.
///
/// Requires the `profiles` table (`slotswap_profiles::db::init_db`) and a
/// connection with `foreign_keys=ON` for the cascades to fire.
pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS events (
            id          TEXT NOT NULL PRIMARY KEY,
            owner_id    TEXT NOT NULL REFERENCES profiles(id) ON DELETE CASCADE,
            title       TEXT NOT NULL CHECK (length(title) BETWEEN 1 AND 100),
            start_time  TEXT NOT NULL,   -- RFC3339, microseconds, UTC 'Z'
            end_time    TEXT NOT NULL,
            status      TEXT NOT NULL DEFAULT 'busy'
                        CHECK (status IN ('busy', 'swappable', 'swap_pending')),
            created_at  TEXT NOT NULL,
            updated_at  TEXT NOT NULL,
            CONSTRAINT valid_time_range CHECK (end_time > start_time)
        );

        CREATE INDEX IF NOT EXISTS idx_events_owner  ON events (owner_id, start_time);
        CREATE INDEX IF NOT EXISTS idx_events_status ON events (status, start_time);

        -- Event references go NULL when a resolved request's event is deleted;
        -- pending requests pin their events (SwapPending cannot be deleted).
        CREATE TABLE IF NOT EXISTS swap_requests (
            id                  TEXT NOT NULL PRIMARY KEY,
            requester_id        TEXT NOT NULL REFERENCES profiles(id) ON DELETE CASCADE,
            requester_event_id  TEXT REFERENCES events(id) ON DELETE SET NULL,
            owner_id            TEXT NOT NULL REFERENCES profiles(id) ON DELETE CASCADE,
            owner_event_id      TEXT REFERENCES events(id) ON DELETE SET NULL,
            status              TEXT NOT NULL DEFAULT 'pending'
                                CHECK (status IN ('pending', 'accepted', 'rejected')),
            created_at          TEXT NOT NULL,
            updated_at          TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_swap_requests_owner
            ON swap_requests (owner_id, created_at);
        CREATE INDEX IF NOT EXISTS idx_swap_requests_requester
            ON swap_requests (requester_id, created_at);

        -- At most one pending request per event on each side.
        CREATE UNIQUE INDEX IF NOT EXISTS idx_swap_requests_pending_requester_event
            ON swap_requests (requester_event_id) WHERE status = 'pending';
        CREATE UNIQUE INDEX IF NOT EXISTS idx_swap_requests_pending_owner_event
            ON swap_requests (owner_event_id) WHERE status = 'pending';
        ",
    )?;
    Ok(())
}
