//! Consistency audit for the pairing invariant: an event is `swap_pending`
//! iff exactly one pending request references it.

use rusqlite::{params, Connection};
use serde::Serialize;
use tracing::{instrument, warn};

use crate::error::Result;
use crate::manager::SwapManager;
use crate::types::{EventStatus, SwapStatus};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InvariantViolation {
    /// Event status disagrees with the number of pending requests on it.
    EventStatusMismatch {
        event_id: String,
        status: String,
        pending_requests: i64,
    },
    /// A pending request whose event reference is gone.
    DanglingPendingRequest { request_id: String },
}

impl std::fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InvariantViolation::EventStatusMismatch {
                event_id,
                status,
                pending_requests,
            } => write!(
                f,
                "event {event_id} is {status} with {pending_requests} pending request(s)"
            ),
            InvariantViolation::DanglingPendingRequest { request_id } => {
                write!(f, "pending request {request_id} references a missing event")
            }
        }
    }
}

/// Scan the store for violations. Empty means consistent.
pub fn verify_invariants(conn: &Connection) -> Result<Vec<InvariantViolation>> {
    let pending = SwapStatus::Pending.to_string();
    let swap_pending = EventStatus::SwapPending.to_string();

    let mut stmt = conn.prepare(
        "SELECT id, status, n FROM (
             SELECT e.id AS id, e.status AS status,
                    (SELECT COUNT(*) FROM swap_requests r
                     WHERE r.status = ?1
                       AND (r.requester_event_id = e.id OR r.owner_event_id = e.id)) AS n
             FROM events e
         )
         WHERE (status = ?2 AND n <> 1) OR (status <> ?2 AND n <> 0)
         ORDER BY id",
    )?;
    let mismatches = stmt.query_map(params![pending, swap_pending], |row| {
        Ok(InvariantViolation::EventStatusMismatch {
            event_id: row.get(0)?,
            status: row.get(1)?,
            pending_requests: row.get(2)?,
        })
    })?;
    let mut violations = mismatches.collect::<rusqlite::Result<Vec<_>>>()?;

    let mut stmt = conn.prepare(
        "SELECT r.id FROM swap_requests r
         WHERE r.status = ?1
           AND (r.requester_event_id IS NULL OR r.owner_event_id IS NULL
                OR NOT EXISTS (SELECT 1 FROM events e WHERE e.id = r.requester_event_id)
                OR NOT EXISTS (SELECT 1 FROM events e WHERE e.id = r.owner_event_id))
         ORDER BY r.id",
    )?;
    let dangling = stmt.query_map(params![pending], |row| {
        Ok(InvariantViolation::DanglingPendingRequest {
            request_id: row.get(0)?,
        })
    })?;
    violations.extend(dangling.collect::<rusqlite::Result<Vec<_>>>()?);

    Ok(violations)
}

impl SwapManager {
    /// Run the audit and log each violation at `warn`.
    #[instrument(skip(self))]
    pub fn verify_invariants(&self) -> Result<Vec<InvariantViolation>> {
        let conn = self.conn();
        let violations = verify_invariants(&conn)?;
        for v in &violations {
            warn!(violation = %v, "swap invariant violated");
        }
        Ok(violations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("PRAGMA foreign_keys=ON;").unwrap();
        slotswap_profiles::db::init_db(&conn).unwrap();
        crate::db::init_db(&conn).unwrap();
        conn.execute_batch(
            "INSERT INTO profiles VALUES ('a', 'A', 'a@example.com', 'now', 'now');
             INSERT INTO events VALUES ('e1', 'a', 'T', '2026-01-01T09:00:00.000000Z',
                                        '2026-01-01T10:00:00.000000Z', 'busy', 'now', 'now');",
        )
        .unwrap();
        conn
    }

    #[test]
    fn clean_store_has_no_violations() {
        assert!(verify_invariants(&conn()).unwrap().is_empty());
    }

    #[test]
    fn stray_swap_pending_status_is_reported() {
        let conn = conn();
        conn.execute("UPDATE events SET status = 'swap_pending'", []).unwrap();
        let violations = verify_invariants(&conn).unwrap();
        assert_eq!(
            violations,
            vec![InvariantViolation::EventStatusMismatch {
                event_id: "e1".into(),
                status: "swap_pending".into(),
                pending_requests: 0,
            }]
        );
        assert_eq!(
            violations[0].to_string(),
            "event e1 is swap_pending with 0 pending request(s)"
        );
    }

    #[test]
    fn pending_request_with_cleared_event_is_dangling() {
        let conn = conn();
        conn.execute(
            "INSERT INTO swap_requests VALUES ('r1', 'a', NULL, 'a', 'e1', 'pending', 'now', 'now')",
            [],
        )
        .unwrap();
        let violations = verify_invariants(&conn).unwrap();
        assert!(violations.contains(&InvariantViolation::DanglingPendingRequest {
            request_id: "r1".into()
        }));
        // e1 is busy yet referenced by a pending request.
        assert!(violations.iter().any(|v| matches!(
            v,
            InvariantViolation::EventStatusMismatch { pending_requests: 1, .. }
        )));
    }
}
