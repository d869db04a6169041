use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use rusqlite::{Connection, Transaction, TransactionBehavior};
use slotswap_core::types::new_record_id;
use slotswap_core::ProfileId;
use slotswap_profiles::{identity, ProfileError};
use tracing::{debug, info, instrument};

use crate::access::{Access, AccessChecker};
use crate::error::{Result, SwapError};
use crate::machine::{EventTransition, Resolution};
use crate::store;
use crate::types::{Event, EventPatch, EventStatus, NewEvent, SwapRequest, SwapStatus};
use crate::validate;

/// Owns every write to `events` and `swap_requests`.
///
/// Each mutating operation is one `BEGIN IMMEDIATE` transaction: the write
/// lock is taken before preconditions are read, so two managers on the same
/// database file (or two processes) serialize on SQLite's lock and the
/// later one sees the earlier one's result. Within a process the `Mutex`
/// serializes callers sharing a connection.
pub struct SwapManager {
    db: Arc<Mutex<Connection>>,
}

impl SwapManager {
    /// Wrap an already-open connection whose schema has been initialised.
    pub fn new(conn: Connection) -> Result<Self> {
        Self::shared(Arc::new(Mutex::new(conn)))
    }

    /// Share a connection with other components (e.g. the profile resolver).
    pub fn shared(db: Arc<Mutex<Connection>>) -> Result<Self> {
        {
            let conn = db.lock().unwrap_or_else(PoisonError::into_inner);
            conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        }
        Ok(Self { db })
    }

    pub(crate) fn conn(&self) -> MutexGuard<'_, Connection> {
        // A holder that panicked mid-transaction has already rolled back
        // when its Transaction was dropped.
        self.db.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn write<T>(&self, f: impl FnOnce(&Transaction<'_>) -> Result<T>) -> Result<T> {
        let mut conn = self.conn();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let out = f(&tx)?;
        tx.commit()?;
        Ok(out)
    }

    // ── event authoring ──────────────────────────────────────────────────────

    /// Create a `Busy` event owned by `actor`.
    #[instrument(skip(self, input), fields(actor = %actor))]
    pub fn create_event(&self, actor: &ProfileId, input: NewEvent) -> Result<Event> {
        let title = validate::title(&input.title)?;
        let start_time = validate::stored_precision(input.start_time);
        let end_time = validate::stored_precision(input.end_time);
        validate::time_range(start_time, end_time)?;

        self.write(|tx| {
            if identity::get_profile(tx, actor.as_str())?.is_none() {
                return Err(ProfileError::NotFound(actor.to_string()).into());
            }
            let now = store::now();
            let event = Event {
                id: new_record_id(),
                owner_id: actor.to_string(),
                title,
                start_time,
                end_time,
                status: EventStatus::Busy,
                created_at: now.clone(),
                updated_at: now,
            };
            store::insert_event(tx, &event)?;
            info!(event_id = %event.id, "event created");
            Ok(event)
        })
    }

    /// Fetch an event the actor may see; hidden events are NotFound.
    #[instrument(skip(self), fields(actor = %actor))]
    pub fn get_event(&self, actor: &ProfileId, event_id: &str) -> Result<Event> {
        let conn = self.conn();
        let event = load_event(&conn, event_id)?;
        AccessChecker::event(actor, &event, Access::ReadEvent).require("event", event_id)?;
        debug!(status = %event.status, "event read");
        Ok(event)
    }

    /// Edit title and times. Refused while a negotiation holds the event.
    #[instrument(skip(self, patch), fields(actor = %actor))]
    pub fn update_event(&self, actor: &ProfileId, event_id: &str, patch: EventPatch) -> Result<Event> {
        let title = patch.title.as_deref().map(validate::title).transpose()?;

        self.write(|tx| {
            let mut event = load_event(tx, event_id)?;
            AccessChecker::event(actor, &event, Access::WriteEvent).require("event", event_id)?;
            if event.status.is_frozen() {
                return Err(SwapError::InvalidState(format!(
                    "event {event_id} is part of a pending swap request"
                )));
            }
            if patch.is_empty() {
                return Ok(event);
            }

            if let Some(title) = title {
                event.title = title;
            }
            let start = patch.start_time.map_or(event.start_time, validate::stored_precision);
            let end = patch.end_time.map_or(event.end_time, validate::stored_precision);
            validate::time_range(start, end)?;
            event.start_time = start;
            event.end_time = end;

            store::save_event(tx, &mut event)?;
            info!("event updated");
            Ok(event)
        })
    }

    /// `Busy -> Swappable`, owner only.
    #[instrument(skip(self), fields(actor = %actor))]
    pub fn mark_swappable(&self, actor: &ProfileId, event_id: &str) -> Result<Event> {
        self.owner_transition(actor, event_id, EventTransition::MarkSwappable)
    }

    /// `Swappable -> Busy`, owner only. A pending negotiation cannot be
    /// withdrawn this way.
    #[instrument(skip(self), fields(actor = %actor))]
    pub fn mark_busy(&self, actor: &ProfileId, event_id: &str) -> Result<Event> {
        self.owner_transition(actor, event_id, EventTransition::MarkBusy)
    }

    fn owner_transition(
        &self,
        actor: &ProfileId,
        event_id: &str,
        transition: EventTransition,
    ) -> Result<Event> {
        self.write(|tx| {
            let mut event = load_event(tx, event_id)?;
            AccessChecker::event(actor, &event, Access::WriteEvent).require("event", event_id)?;
            let from = event.status;
            event.status = from
                .next(transition)
                .ok_or_else(|| SwapError::event_transition(from, transition.action()))?;
            store::save_event(tx, &mut event)?;
            info!(%from, to = %event.status, "event status changed");
            Ok(event)
        })
    }

    /// Remove an event. Returns the deleted row.
    ///
    /// Resolved requests that referenced it keep their history with the
    /// event reference cleared.
    #[instrument(skip(self), fields(actor = %actor))]
    pub fn delete_event(&self, actor: &ProfileId, event_id: &str) -> Result<Event> {
        self.write(|tx| {
            let event = load_event(tx, event_id)?;
            AccessChecker::event(actor, &event, Access::WriteEvent).require("event", event_id)?;
            if event.status.is_frozen() {
                return Err(SwapError::InvalidState(format!(
                    "event {event_id} is part of a pending swap request"
                )));
            }
            store::delete_event_row(tx, event_id)?;
            info!(status = %event.status, "event deleted");
            Ok(event)
        })
    }

    // ── swap requests ────────────────────────────────────────────────────────

    /// Offer `requester_event_id` in exchange for `owner_event_id`.
    ///
    /// Both events move to `SwapPending` together with the insert of the
    /// `Pending` request.
    #[instrument(skip(self), fields(requester = %requester, owner = %owner))]
    pub fn create_swap_request(
        &self,
        requester: &ProfileId,
        requester_event_id: &str,
        owner_event_id: &str,
        owner: &ProfileId,
    ) -> Result<SwapRequest> {
        if requester == owner {
            return Err(SwapError::SelfSwap);
        }

        self.write(|tx| {
            let mut mine = load_event(tx, requester_event_id)?;
            let mut theirs = load_event(tx, owner_event_id)?;

            if !mine.is_owned_by(requester) {
                return Err(SwapError::Forbidden(format!(
                    "event {requester_event_id} is not yours to offer"
                )));
            }
            if !theirs.is_owned_by(owner) {
                return Err(SwapError::InvalidState(format!(
                    "event {owner_event_id} is no longer owned by {owner}"
                )));
            }
            for ev in [&mut mine, &mut theirs] {
                ev.status = ev.status.next(EventTransition::Offer).ok_or_else(|| {
                    SwapError::InvalidState(format!(
                        "event {} is {}, not swappable",
                        ev.id, ev.status
                    ))
                })?;
            }

            let now = store::now();
            let request = SwapRequest {
                id: new_record_id(),
                requester_id: requester.to_string(),
                requester_event_id: Some(mine.id.clone()),
                owner_id: owner.to_string(),
                owner_event_id: Some(theirs.id.clone()),
                status: SwapStatus::Pending,
                created_at: now.clone(),
                updated_at: now,
            };
            store::insert_request(tx, &request)?;
            store::save_event(tx, &mut mine)?;
            store::save_event(tx, &mut theirs)?;

            info!(request_id = %request.id, "swap request created");
            Ok(request)
        })
    }

    /// Exchange the two events' owners; both end `Busy`.
    #[instrument(skip(self), fields(actor = %actor))]
    pub fn accept_swap_request(&self, actor: &ProfileId, request_id: &str) -> Result<SwapRequest> {
        self.resolve(actor, request_id, Resolution::Accept)
    }

    /// Return both events to `Swappable`; ownership untouched.
    #[instrument(skip(self), fields(actor = %actor))]
    pub fn reject_swap_request(&self, actor: &ProfileId, request_id: &str) -> Result<SwapRequest> {
        self.resolve(actor, request_id, Resolution::Reject)
    }

    fn resolve(
        &self,
        actor: &ProfileId,
        request_id: &str,
        resolution: Resolution,
    ) -> Result<SwapRequest> {
        self.write(|tx| {
            let mut request = load_request(tx, request_id)?;
            AccessChecker::request(actor, &request, Access::ResolveRequest)
                .require("swap request", request_id)?;
            apply_resolution(tx, &mut request, resolution)?;
            info!(request_id, status = %request.status, "swap request resolved");
            Ok(request)
        })
    }

    // ── profiles ─────────────────────────────────────────────────────────────

    /// Delete the actor's own profile.
    ///
    /// Pending requests involving the profile are rejected first so the
    /// counterparties' events go back to `Swappable`; the cascade then
    /// removes the profile's events and requests. Returns the requests that
    /// were rejected, for notifying the other parties.
    #[instrument(skip(self), fields(actor = %actor))]
    pub fn delete_profile(&self, actor: &ProfileId, profile_id: &str) -> Result<Vec<SwapRequest>> {
        if actor != profile_id {
            return Err(SwapError::Forbidden(
                "a profile can only be deleted by its owner".to_string(),
            ));
        }

        self.write(|tx| {
            if identity::get_profile(tx, profile_id)?.is_none() {
                return Err(ProfileError::NotFound(profile_id.to_string()).into());
            }
            let mut closed = store::pending_requests_involving(tx, profile_id)?;
            for request in &mut closed {
                apply_resolution(tx, request, Resolution::Reject)?;
            }
            identity::delete_profile_row(tx, profile_id)?;
            info!(rejected = closed.len(), "profile deleted");
            Ok(closed)
        })
    }
}

// ── private helpers ───────────────────────────────────────────────────────────

fn load_event(conn: &Connection, id: &str) -> Result<Event> {
    store::get_event(conn, id)?.ok_or_else(|| SwapError::event_not_found(id))
}

fn load_request(conn: &Connection, id: &str) -> Result<SwapRequest> {
    store::get_request(conn, id)?.ok_or_else(|| SwapError::request_not_found(id))
}

/// Move a pending request and both its events along `resolution`.
fn apply_resolution(
    conn: &Connection,
    request: &mut SwapRequest,
    resolution: Resolution,
) -> Result<()> {
    let status = request.status.resolve(resolution).ok_or(SwapError::InvalidTransition {
        kind: "swap request",
        from: request.status.to_string(),
        action: resolution.action(),
    })?;

    let (Some(requester_event_id), Some(owner_event_id)) = (
        request.requester_event_id.clone(),
        request.owner_event_id.clone(),
    ) else {
        return Err(SwapError::InvalidState(format!(
            "swap request {} references a deleted event",
            request.id
        )));
    };

    let mut offered = load_event(conn, &requester_event_id)?;
    let mut wanted = load_event(conn, &owner_event_id)?;
    for ev in [&mut offered, &mut wanted] {
        ev.status = ev.status.next(resolution.event_transition()).ok_or_else(|| {
            SwapError::InvalidState(format!(
                "event {} is {} while its swap request is pending",
                ev.id, ev.status
            ))
        })?;
    }
    if resolution == Resolution::Accept {
        offered.owner_id = request.owner_id.clone();
        wanted.owner_id = request.requester_id.clone();
    }

    store::save_event(conn, &mut offered)?;
    store::save_event(conn, &mut wanted)?;
    store::set_request_status(conn, request, status)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn manager() -> SwapManager {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("PRAGMA foreign_keys=ON;").unwrap();
        slotswap_profiles::db::init_db(&conn).unwrap();
        crate::db::init_db(&conn).unwrap();
        for name in ["alice", "bob", "carol"] {
            identity::create_profile(&conn, name, &format!("{name}@example.com"), None).unwrap();
        }
        SwapManager::new(conn).unwrap()
    }

    fn new_event(title: &str) -> NewEvent {
        NewEvent {
            title: title.to_string(),
            start_time: Utc.with_ymd_and_hms(2026, 5, 4, 9, 0, 0).unwrap(),
            end_time: Utc.with_ymd_and_hms(2026, 5, 4, 10, 0, 0).unwrap(),
        }
    }

    #[test]
    fn create_event_starts_busy_and_trims_title() {
        let m = manager();
        let alice = ProfileId::from("alice");
        let ev = m.create_event(&alice, new_event("  Early shift ")).unwrap();
        assert_eq!(ev.status, EventStatus::Busy);
        assert_eq!(ev.title, "Early shift");
        assert_eq!(m.get_event(&alice, &ev.id).unwrap(), ev);
    }

    #[test]
    fn create_event_for_unknown_profile_is_not_found() {
        let m = manager();
        let err = m
            .create_event(&ProfileId::from("ghost"), new_event("x"))
            .unwrap_err();
        assert_eq!(err.code(), "NOT_FOUND");
    }

    #[test]
    fn mark_swappable_twice_is_invalid_transition() {
        let m = manager();
        let alice = ProfileId::from("alice");
        let ev = m.create_event(&alice, new_event("Shift")).unwrap();
        m.mark_swappable(&alice, &ev.id).unwrap();
        let err = m.mark_swappable(&alice, &ev.id).unwrap_err();
        assert_eq!(err.code(), "INVALID_TRANSITION");
    }

    #[test]
    fn non_owner_transition_is_forbidden() {
        let m = manager();
        let ev = m.create_event(&ProfileId::from("alice"), new_event("Shift")).unwrap();
        let err = m.mark_swappable(&ProfileId::from("bob"), &ev.id).unwrap_err();
        assert_eq!(err.code(), "FORBIDDEN");
    }

    #[test]
    fn busy_event_is_hidden_from_others() {
        let m = manager();
        let ev = m.create_event(&ProfileId::from("alice"), new_event("Shift")).unwrap();
        let err = m.get_event(&ProfileId::from("bob"), &ev.id).unwrap_err();
        assert_eq!(err.code(), "NOT_FOUND");
    }

    #[test]
    fn update_revalidates_range_against_stored_times() {
        let m = manager();
        let alice = ProfileId::from("alice");
        let ev = m.create_event(&alice, new_event("Shift")).unwrap();
        let patch = EventPatch {
            end_time: Some(ev.start_time),
            ..Default::default()
        };
        let err = m.update_event(&alice, &ev.id, patch).unwrap_err();
        assert_eq!(err.code(), "VALIDATION_ERROR");

        let patch = EventPatch {
            title: Some("Late shift".into()),
            ..Default::default()
        };
        let updated = m.update_event(&alice, &ev.id, patch).unwrap();
        assert_eq!(updated.title, "Late shift");
        assert_eq!(updated.end_time, ev.end_time);
    }

    #[test]
    fn self_swap_is_refused_before_lookup() {
        let m = manager();
        let alice = ProfileId::from("alice");
        let err = m
            .create_swap_request(&alice, "missing-1", "missing-2", &alice)
            .unwrap_err();
        assert!(matches!(err, SwapError::SelfSwap));
    }

    #[test]
    fn sub_microsecond_range_is_a_validation_error() {
        let m = manager();
        let start = Utc.with_ymd_and_hms(2026, 5, 4, 9, 0, 0).unwrap()
            + chrono::Duration::nanoseconds(100);
        let input = NewEvent {
            title: "Blink".into(),
            start_time: start,
            end_time: start + chrono::Duration::nanoseconds(400),
        };
        let err = m.create_event(&ProfileId::from("alice"), input).unwrap_err();
        assert_eq!(err.code(), "VALIDATION_ERROR");
    }

    #[test]
    fn returned_times_match_what_is_read_back() {
        let m = manager();
        let alice = ProfileId::from("alice");
        let start = Utc.with_ymd_and_hms(2026, 5, 4, 9, 0, 0).unwrap()
            + chrono::Duration::nanoseconds(1_500);
        let input = NewEvent {
            title: "Shift".into(),
            start_time: start,
            end_time: start + chrono::Duration::hours(1),
        };
        let ev = m.create_event(&alice, input).unwrap();
        assert_eq!(ev.start_time.timestamp_subsec_nanos(), 1_000);
        assert_eq!(m.get_event(&alice, &ev.id).unwrap(), ev);

        let patch = EventPatch {
            end_time: Some(ev.end_time + chrono::Duration::nanoseconds(2_750)),
            ..Default::default()
        };
        let updated = m.update_event(&alice, &ev.id, patch).unwrap();
        assert_eq!(updated.end_time, ev.end_time + chrono::Duration::microseconds(2));
        assert_eq!(m.get_event(&alice, &ev.id).unwrap(), updated);
    }

    #[test]
    fn only_the_owner_party_resolves() {
        let m = manager();
        let alice = ProfileId::from("alice");
        let bob = ProfileId::from("bob");
        let a = m.create_event(&alice, new_event("A")).unwrap();
        let b = m.create_event(&bob, new_event("B")).unwrap();
        m.mark_swappable(&alice, &a.id).unwrap();
        m.mark_swappable(&bob, &b.id).unwrap();
        let req = m.create_swap_request(&alice, &a.id, &b.id, &bob).unwrap();

        let err = m
            .accept_swap_request(&ProfileId::from("carol"), &req.id)
            .unwrap_err();
        assert_eq!(err.code(), "FORBIDDEN");
        let err = m.reject_swap_request(&alice, &req.id).unwrap_err();
        assert_eq!(err.code(), "FORBIDDEN");
        assert_eq!(m.accept_swap_request(&bob, &req.id).unwrap().status, SwapStatus::Accepted);
    }

    #[test]
    fn delete_profile_requires_self() {
        let m = manager();
        let err = m
            .delete_profile(&ProfileId::from("bob"), "alice")
            .unwrap_err();
        assert_eq!(err.code(), "FORBIDDEN");
    }
}
