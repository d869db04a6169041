//! End-to-end flows through `SwapManager` on an in-memory database.

mod common;

use common::{manager, pid, reload, swappable};
use slotswap_swaps::{Direction, EventStatus, SwapError, SwapStatus};

#[test]
fn accept_exchanges_owners_and_parks_both_events() {
    let m = manager(&["alice", "bob"]);
    let a = swappable(&m, "alice", "Mon early", 1);
    let b = swappable(&m, "bob", "Tue late", 2);

    let req = m
        .create_swap_request(&pid("alice"), &a.id, &b.id, &pid("bob"))
        .unwrap();
    assert_eq!(req.status, SwapStatus::Pending);
    for id in [&a.id, &b.id] {
        let ev = reload(&m, &["alice", "bob"], id).unwrap();
        assert_eq!(ev.status, EventStatus::SwapPending);
    }

    let done = m.accept_swap_request(&pid("bob"), &req.id).unwrap();
    assert_eq!(done.status, SwapStatus::Accepted);

    let a_now = reload(&m, &["alice", "bob"], &a.id).unwrap();
    let b_now = reload(&m, &["alice", "bob"], &b.id).unwrap();
    assert_eq!(a_now.owner_id, "bob");
    assert_eq!(b_now.owner_id, "alice");
    assert_eq!(a_now.status, EventStatus::Busy);
    assert_eq!(b_now.status, EventStatus::Busy);
    assert!(m.verify_invariants().unwrap().is_empty());
}

#[test]
fn reject_returns_both_to_market_without_moving_ownership() {
    let m = manager(&["alice", "bob"]);
    let a = swappable(&m, "alice", "Mon early", 1);
    let b = swappable(&m, "bob", "Tue late", 2);
    let req = m
        .create_swap_request(&pid("alice"), &a.id, &b.id, &pid("bob"))
        .unwrap();

    let done = m.reject_swap_request(&pid("bob"), &req.id).unwrap();
    assert_eq!(done.status, SwapStatus::Rejected);

    let a_now = reload(&m, &["alice"], &a.id).unwrap();
    let b_now = reload(&m, &["bob"], &b.id).unwrap();
    assert_eq!(a_now.status, EventStatus::Swappable);
    assert_eq!(b_now.status, EventStatus::Swappable);
    assert!(m.verify_invariants().unwrap().is_empty());
}

#[test]
fn resolved_request_cannot_be_resolved_again() {
    let m = manager(&["alice", "bob"]);
    let a = swappable(&m, "alice", "A", 1);
    let b = swappable(&m, "bob", "B", 2);
    let req = m
        .create_swap_request(&pid("alice"), &a.id, &b.id, &pid("bob"))
        .unwrap();
    m.reject_swap_request(&pid("bob"), &req.id).unwrap();

    let err = m.accept_swap_request(&pid("bob"), &req.id).unwrap_err();
    assert_eq!(err.code(), "INVALID_TRANSITION");
    assert_eq!(reload(&m, &["alice"], &a.id).unwrap().status, EventStatus::Swappable);
}

#[test]
fn requester_cannot_resolve_own_request() {
    let m = manager(&["alice", "bob"]);
    let a = swappable(&m, "alice", "A", 1);
    let b = swappable(&m, "bob", "B", 2);
    let req = m
        .create_swap_request(&pid("alice"), &a.id, &b.id, &pid("bob"))
        .unwrap();

    for err in [
        m.accept_swap_request(&pid("alice"), &req.id).unwrap_err(),
        m.reject_swap_request(&pid("alice"), &req.id).unwrap_err(),
    ] {
        assert!(matches!(err, SwapError::Forbidden(_)), "{err}");
    }
    assert_eq!(reload(&m, &["alice"], &a.id).unwrap().status, EventStatus::SwapPending);
}

#[test]
fn busy_target_fails_invalid_state_without_side_effects() {
    let m = manager(&["alice", "bob"]);
    let a = swappable(&m, "alice", "A", 1);
    let b = swappable(&m, "bob", "B", 2);
    m.mark_busy(&pid("bob"), &b.id).unwrap();

    let err = m
        .create_swap_request(&pid("alice"), &a.id, &b.id, &pid("bob"))
        .unwrap_err();
    assert_eq!(err.code(), "INVALID_STATE");

    assert_eq!(reload(&m, &["alice"], &a.id).unwrap().status, EventStatus::Swappable);
    assert_eq!(reload(&m, &["bob"], &b.id).unwrap().status, EventStatus::Busy);
    assert!(m.list_outgoing_requests(&pid("alice")).unwrap().is_empty());
}

#[test]
fn create_checks_run_in_documented_order() {
    let m = manager(&["alice", "bob", "carol"]);
    let a = swappable(&m, "alice", "A", 1);
    let b = swappable(&m, "bob", "B", 2);
    let c = swappable(&m, "carol", "C", 3);

    let missing = m
        .create_swap_request(&pid("alice"), &a.id, "no-such-event", &pid("bob"))
        .unwrap_err();
    assert_eq!(missing.code(), "NOT_FOUND");

    // Offering someone else's event.
    let not_mine = m
        .create_swap_request(&pid("alice"), &c.id, &b.id, &pid("bob"))
        .unwrap_err();
    assert_eq!(not_mine.code(), "FORBIDDEN");

    // Target owned by a different profile than named.
    let moved = m
        .create_swap_request(&pid("alice"), &a.id, &b.id, &pid("carol"))
        .unwrap_err();
    assert_eq!(moved.code(), "INVALID_STATE");

    let own = m
        .create_swap_request(&pid("alice"), &a.id, &b.id, &pid("alice"))
        .unwrap_err();
    assert_eq!(own.code(), "SELF_SWAP");
}

#[test]
fn pending_event_is_frozen() {
    let m = manager(&["alice", "bob"]);
    let a = swappable(&m, "alice", "A", 1);
    let b = swappable(&m, "bob", "B", 2);
    m.create_swap_request(&pid("alice"), &a.id, &b.id, &pid("bob"))
        .unwrap();

    assert_eq!(
        m.mark_busy(&pid("alice"), &a.id).unwrap_err().code(),
        "INVALID_TRANSITION"
    );
    assert_eq!(
        m.delete_event(&pid("bob"), &b.id).unwrap_err().code(),
        "INVALID_STATE"
    );
    let patch = slotswap_swaps::EventPatch {
        title: Some("renamed".into()),
        ..Default::default()
    };
    assert_eq!(
        m.update_event(&pid("alice"), &a.id, patch).unwrap_err().code(),
        "INVALID_STATE"
    );

    // Neither event can be offered again while the negotiation is open.
    let err = m
        .create_swap_request(&pid("bob"), &b.id, &a.id, &pid("alice"))
        .unwrap_err();
    assert_eq!(err.code(), "INVALID_STATE");
}

#[test]
fn deleting_event_after_resolution_keeps_request_history() {
    let m = manager(&["alice", "bob"]);
    let a = swappable(&m, "alice", "A", 1);
    let b = swappable(&m, "bob", "B", 2);
    let req = m
        .create_swap_request(&pid("alice"), &a.id, &b.id, &pid("bob"))
        .unwrap();
    m.accept_swap_request(&pid("bob"), &req.id).unwrap();

    // After the exchange, bob owns A.
    m.delete_event(&pid("bob"), &a.id).unwrap();

    let outgoing = m.list_outgoing_requests(&pid("alice")).unwrap();
    assert_eq!(outgoing.len(), 1);
    let view = &outgoing[0];
    assert_eq!(view.request.status, SwapStatus::Accepted);
    assert_eq!(view.request.requester_event_id, None);
    assert!(view.requester_event.is_none());
    assert_eq!(view.owner_event.as_ref().map(|e| e.title.as_str()), Some("B"));
    assert!(m.verify_invariants().unwrap().is_empty());
}

#[test]
fn marketplace_lists_only_other_profiles_swappable_events() {
    let m = manager(&["alice", "bob", "carol"]);
    let a = swappable(&m, "alice", "A", 1);
    let b = swappable(&m, "bob", "B", 3);
    let c = swappable(&m, "carol", "C", 2);
    m.mark_busy(&pid("carol"), &c.id).unwrap();
    let c2 = swappable(&m, "carol", "C2", 2);

    let market = m.list_marketplace(&pid("alice")).unwrap();
    let seen: Vec<_> = market
        .iter()
        .map(|e| (e.event.id.as_str(), e.owner_name.as_str()))
        .collect();
    assert_eq!(seen, vec![(c2.id.as_str(), "carol"), (b.id.as_str(), "bob")]);
    assert!(market.iter().all(|e| e.event.id != a.id));

    // Visible events can be fetched by others; busy ones cannot.
    assert!(m.get_event(&pid("alice"), &b.id).is_ok());
    assert_eq!(
        m.get_event(&pid("alice"), &c.id).unwrap_err().code(),
        "NOT_FOUND"
    );
}

#[test]
fn request_listings_join_names_and_events() {
    let m = manager(&["alice", "bob"]);
    let a = swappable(&m, "alice", "Offered", 1);
    let b = swappable(&m, "bob", "Wanted", 2);
    let req = m
        .create_swap_request(&pid("alice"), &a.id, &b.id, &pid("bob"))
        .unwrap();

    let incoming = m.list_requests(&pid("bob"), Direction::Incoming).unwrap();
    assert_eq!(incoming.len(), 1);
    let view = &incoming[0];
    assert_eq!(view.request.id, req.id);
    assert_eq!(view.requester_name, "alice");
    assert_eq!(view.owner_name, "bob");
    assert_eq!(view.requester_event.as_ref().unwrap().title, "Offered");
    assert_eq!(view.owner_event.as_ref().unwrap().title, "Wanted");

    assert!(m.list_incoming_requests(&pid("alice")).unwrap().is_empty());
    assert_eq!(m.list_outgoing_requests(&pid("alice")).unwrap().len(), 1);
}

#[test]
fn deleting_profile_releases_counterparty_events() {
    let m = manager(&["alice", "bob", "carol"]);
    let a = swappable(&m, "alice", "A", 1);
    let b = swappable(&m, "bob", "B", 2);
    let c = swappable(&m, "carol", "C", 3);
    let a2 = swappable(&m, "alice", "A2", 4);

    // alice is requester in one negotiation and owner party in another.
    m.create_swap_request(&pid("alice"), &a.id, &b.id, &pid("bob"))
        .unwrap();
    m.create_swap_request(&pid("carol"), &c.id, &a2.id, &pid("alice"))
        .unwrap();

    let closed = m.delete_profile(&pid("alice"), "alice").unwrap();
    assert_eq!(closed.len(), 2);
    assert!(closed.iter().all(|r| r.status == SwapStatus::Rejected));

    assert_eq!(reload(&m, &["bob"], &b.id).unwrap().status, EventStatus::Swappable);
    assert_eq!(reload(&m, &["carol"], &c.id).unwrap().status, EventStatus::Swappable);
    assert!(m.list_own_events(&pid("alice")).unwrap().is_empty());
    assert!(m.list_incoming_requests(&pid("bob")).unwrap().is_empty());
    assert!(m.verify_invariants().unwrap().is_empty());

    let err = m.delete_profile(&pid("alice"), "alice").unwrap_err();
    assert_eq!(err.code(), "NOT_FOUND");
}
