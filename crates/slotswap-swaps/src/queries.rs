//! Read side: listings joined with profile names for display.

use rusqlite::{params, Connection, Row};
use slotswap_core::ProfileId;
use tracing::{debug, instrument};

use crate::error::Result;
use crate::manager::SwapManager;
use crate::store::{self, EVENT_COLUMNS};
use crate::types::{Event, EventBrief, EventStatus, MarketEvent, SwapRequestView};

/// Which side of a request the actor is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Requests the actor received (actor is the owner party).
    Incoming,
    /// Requests the actor sent.
    Outgoing,
}

impl SwapManager {
    /// The actor's events, earliest first.
    #[instrument(skip(self), fields(actor = %actor))]
    pub fn list_own_events(&self, actor: &ProfileId) -> Result<Vec<Event>> {
        let conn = self.conn();
        let sql = format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE owner_id = ?1 ORDER BY start_time, id"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![actor.as_str()], store::row_to_event)?;
        let events = rows.collect::<rusqlite::Result<Vec<_>>>()?;
        debug!(count = events.len(), "own events listed");
        Ok(events)
    }

    /// Other profiles' swappable events with owner names, earliest first.
    #[instrument(skip(self), fields(actor = %actor))]
    pub fn list_marketplace(&self, actor: &ProfileId) -> Result<Vec<MarketEvent>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT e.id, e.owner_id, e.title, e.start_time, e.end_time, e.status,
                    e.created_at, e.updated_at, p.display_name
             FROM events e
             JOIN profiles p ON p.id = e.owner_id
             WHERE e.status = ?1 AND e.owner_id <> ?2
             ORDER BY e.start_time, e.id",
        )?;
        let rows = stmt.query_map(
            params![EventStatus::Swappable.to_string(), actor.as_str()],
            |row| {
                Ok(MarketEvent {
                    event: store::event_at(row, 0)?,
                    owner_name: row.get(8)?,
                })
            },
        )?;
        let events = rows.collect::<rusqlite::Result<Vec<_>>>()?;
        debug!(count = events.len(), "marketplace listed");
        Ok(events)
    }

    /// Requests the actor received, newest first.
    pub fn list_incoming_requests(&self, actor: &ProfileId) -> Result<Vec<SwapRequestView>> {
        self.list_requests(actor, Direction::Incoming)
    }

    /// Requests the actor sent, newest first.
    pub fn list_outgoing_requests(&self, actor: &ProfileId) -> Result<Vec<SwapRequestView>> {
        self.list_requests(actor, Direction::Outgoing)
    }

    #[instrument(skip(self), fields(actor = %actor))]
    pub fn list_requests(
        &self,
        actor: &ProfileId,
        direction: Direction,
    ) -> Result<Vec<SwapRequestView>> {
        let conn = self.conn();
        let views = query_requests(&conn, actor, direction)?;
        debug!(count = views.len(), "swap requests listed");
        Ok(views)
    }
}

fn query_requests(
    conn: &Connection,
    actor: &ProfileId,
    direction: Direction,
) -> Result<Vec<SwapRequestView>> {
    let party = match direction {
        Direction::Incoming => "r.owner_id",
        Direction::Outgoing => "r.requester_id",
    };
    // Event references may be NULL on resolved requests; LEFT JOIN keeps them.
    let sql = format!(
        "SELECT r.id, r.requester_id, r.requester_event_id, r.owner_id, r.owner_event_id,
                r.status, r.created_at, r.updated_at,
                rp.display_name, op.display_name,
                re.id, re.title, re.start_time, re.end_time,
                oe.id, oe.title, oe.start_time, oe.end_time
         FROM swap_requests r
         JOIN profiles rp ON rp.id = r.requester_id
         JOIN profiles op ON op.id = r.owner_id
         LEFT JOIN events re ON re.id = r.requester_event_id
         LEFT JOIN events oe ON oe.id = r.owner_event_id
         WHERE {party} = ?1
         ORDER BY r.created_at DESC, r.id DESC"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![actor.as_str()], |row| {
        Ok(SwapRequestView {
            request: store::request_at(row, 0)?,
            requester_name: row.get(8)?,
            owner_name: row.get(9)?,
            requester_event: brief_at(row, 10)?,
            owner_event: brief_at(row, 14)?,
        })
    })?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

fn brief_at(row: &Row<'_>, base: usize) -> rusqlite::Result<Option<EventBrief>> {
    let id: Option<String> = row.get(base)?;
    let Some(id) = id else {
        return Ok(None);
    };
    Ok(Some(EventBrief {
        id,
        title: row.get(base + 1)?,
        start_time: store::instant_at(row, base + 2)?,
        end_time: store::instant_at(row, base + 3)?,
    }))
}
