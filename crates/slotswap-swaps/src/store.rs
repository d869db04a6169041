//! SQL for single rows of `events` and `swap_requests`.
//!
//! Plain functions over `&Connection` so the manager can compose them inside
//! one transaction (`Transaction` derefs to `Connection`).

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::error::Result;
use crate::types::{Event, SwapRequest, SwapStatus};

pub(crate) const EVENT_COLUMNS: &str =
    "id, owner_id, title, start_time, end_time, status, created_at, updated_at";

pub(crate) const REQUEST_COLUMNS: &str = "id, requester_id, requester_event_id, owner_id, \
     owner_event_id, status, created_at, updated_at";

/// Fixed-width encoding so `end_time > start_time` holds as a text compare.
pub(crate) fn fmt_instant(t: &DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn now() -> String {
    fmt_instant(&Utc::now())
}

pub(crate) fn instant_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

pub(crate) fn parsed_at<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: std::str::FromStr<Err = String>,
{
    let raw: String = row.get(idx)?;
    raw.parse()
        .map_err(|e: String| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, e.into()))
}

/// Map a row selected with EVENT_COLUMNS, starting at column `base`.
pub(crate) fn event_at(row: &Row<'_>, base: usize) -> rusqlite::Result<Event> {
    Ok(Event {
        id: row.get(base)?,
        owner_id: row.get(base + 1)?,
        title: row.get(base + 2)?,
        start_time: instant_at(row, base + 3)?,
        end_time: instant_at(row, base + 4)?,
        status: parsed_at(row, base + 5)?,
        created_at: row.get(base + 6)?,
        updated_at: row.get(base + 7)?,
    })
}

pub(crate) fn row_to_event(row: &Row<'_>) -> rusqlite::Result<Event> {
    event_at(row, 0)
}

/// Map a row selected with REQUEST_COLUMNS, starting at column `base`.
pub(crate) fn request_at(row: &Row<'_>, base: usize) -> rusqlite::Result<SwapRequest> {
    Ok(SwapRequest {
        id: row.get(base)?,
        requester_id: row.get(base + 1)?,
        requester_event_id: row.get(base + 2)?,
        owner_id: row.get(base + 3)?,
        owner_event_id: row.get(base + 4)?,
        status: parsed_at(row, base + 5)?,
        created_at: row.get(base + 6)?,
        updated_at: row.get(base + 7)?,
    })
}

pub(crate) fn row_to_request(row: &Row<'_>) -> rusqlite::Result<SwapRequest> {
    request_at(row, 0)
}

// ── events ────────────────────────────────────────────────────────────────────

pub(crate) fn insert_event(conn: &Connection, ev: &Event) -> Result<()> {
    conn.execute(
        "INSERT INTO events (id, owner_id, title, start_time, end_time, status, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            ev.id,
            ev.owner_id,
            ev.title,
            fmt_instant(&ev.start_time),
            fmt_instant(&ev.end_time),
            ev.status.to_string(),
            ev.created_at,
            ev.updated_at
        ],
    )?;
    Ok(())
}

pub(crate) fn get_event(conn: &Connection, id: &str) -> Result<Option<Event>> {
    let sql = format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = ?1");
    Ok(conn.query_row(&sql, params![id], row_to_event).optional()?)
}

/// Write owner, status, title and times back from `ev`, bumping `updated_at`.
pub(crate) fn save_event(conn: &Connection, ev: &mut Event) -> Result<()> {
    ev.updated_at = now();
    conn.execute(
        "UPDATE events
         SET owner_id = ?1, title = ?2, start_time = ?3, end_time = ?4,
             status = ?5, updated_at = ?6
         WHERE id = ?7",
        params![
            ev.owner_id,
            ev.title,
            fmt_instant(&ev.start_time),
            fmt_instant(&ev.end_time),
            ev.status.to_string(),
            ev.updated_at,
            ev.id
        ],
    )?;
    Ok(())
}

pub(crate) fn delete_event_row(conn: &Connection, id: &str) -> Result<()> {
    conn.execute("DELETE FROM events WHERE id = ?1", params![id])?;
    Ok(())
}

// ── swap requests ─────────────────────────────────────────────────────────────

pub(crate) fn insert_request(conn: &Connection, req: &SwapRequest) -> Result<()> {
    conn.execute(
        "INSERT INTO swap_requests
         (id, requester_id, requester_event_id, owner_id, owner_event_id, status, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            req.id,
            req.requester_id,
            req.requester_event_id,
            req.owner_id,
            req.owner_event_id,
            req.status.to_string(),
            req.created_at,
            req.updated_at
        ],
    )?;
    Ok(())
}

pub(crate) fn get_request(conn: &Connection, id: &str) -> Result<Option<SwapRequest>> {
    let sql = format!("SELECT {REQUEST_COLUMNS} FROM swap_requests WHERE id = ?1");
    Ok(conn.query_row(&sql, params![id], row_to_request).optional()?)
}

pub(crate) fn set_request_status(
    conn: &Connection,
    req: &mut SwapRequest,
    status: SwapStatus,
) -> Result<()> {
    req.status = status;
    req.updated_at = now();
    conn.execute(
        "UPDATE swap_requests SET status = ?1, updated_at = ?2 WHERE id = ?3",
        params![req.status.to_string(), req.updated_at, req.id],
    )?;
    Ok(())
}

/// Pending requests where `profile` is either party, oldest first.
pub(crate) fn pending_requests_involving(
    conn: &Connection,
    profile: &str,
) -> Result<Vec<SwapRequest>> {
    let sql = format!(
        "SELECT {REQUEST_COLUMNS} FROM swap_requests
         WHERE status = ?1 AND (requester_id = ?2 OR owner_id = ?2)
         ORDER BY created_at, id"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![SwapStatus::Pending.to_string(), profile], row_to_request)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}
