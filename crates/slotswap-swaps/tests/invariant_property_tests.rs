//! Property-based tests for the pairing invariant.
//!
//! Random sequences of operations, issued by random actors, are run against
//! a fresh store. Most operations in a sequence fail (wrong actor, wrong
//! status); that is intended. After every step the audit must come back
//! clean: each `swap_pending` event has exactly one pending request, and
//! no other event has any.

mod common;

use common::{manager, pid, slot};
use proptest::prelude::*;
use slotswap_swaps::{NewEvent, SwapManager};

const PROFILES: [&str; 3] = ["p0", "p1", "p2"];

#[derive(Debug, Clone)]
enum Op {
    Create { actor: usize, day: u32 },
    MarkSwappable { actor: usize, event: usize },
    MarkBusy { actor: usize, event: usize },
    Offer { actor: usize, mine: usize, theirs: usize },
    Accept { by_owner: bool, actor: usize, request: usize },
    Reject { by_owner: bool, actor: usize, request: usize },
    Delete { actor: usize, event: usize },
    DeleteProfile { actor: usize },
}

fn op_strategy() -> impl Strategy<Value = Op> {
    let actor = 0..PROFILES.len();
    prop_oneof![
        3 => (actor.clone(), 1u32..28).prop_map(|(actor, day)| Op::Create { actor, day }),
        4 => (actor.clone(), any::<usize>())
            .prop_map(|(actor, event)| Op::MarkSwappable { actor, event }),
        1 => (actor.clone(), any::<usize>()).prop_map(|(actor, event)| Op::MarkBusy { actor, event }),
        4 => (actor.clone(), any::<usize>(), any::<usize>())
            .prop_map(|(actor, mine, theirs)| Op::Offer { actor, mine, theirs }),
        2 => (any::<bool>(), actor.clone(), any::<usize>())
            .prop_map(|(by_owner, actor, request)| Op::Accept { by_owner, actor, request }),
        2 => (any::<bool>(), actor.clone(), any::<usize>())
            .prop_map(|(by_owner, actor, request)| Op::Reject { by_owner, actor, request }),
        1 => (actor.clone(), any::<usize>()).prop_map(|(actor, event)| Op::Delete { actor, event }),
        1 => actor.prop_map(|actor| Op::DeleteProfile { actor }),
    ]
}

/// Ids handed out so far; indices in `Op` are taken modulo their length.
#[derive(Default)]
struct Seen {
    events: Vec<String>,
    requests: Vec<(String, String)>,
}

fn pick<T>(items: &[T], i: usize) -> Option<&T> {
    if items.is_empty() {
        None
    } else {
        items.get(i % items.len())
    }
}

/// Current owner of an event, looked up through every owner's listing.
fn owner_of(m: &SwapManager, event_id: &str) -> Option<&'static str> {
    PROFILES.iter().copied().find(|p| {
        m.list_own_events(&pid(p))
            .map(|evs| evs.iter().any(|e| e.id == event_id))
            .unwrap_or(false)
    })
}

fn apply(m: &SwapManager, seen: &mut Seen, op: &Op) {
    match *op {
        Op::Create { actor, day } => {
            let (start_time, end_time) = slot(day);
            let input = NewEvent {
                title: format!("slot {day}"),
                start_time,
                end_time,
            };
            if let Ok(ev) = m.create_event(&pid(PROFILES[actor]), input) {
                seen.events.push(ev.id);
            }
        }
        Op::MarkSwappable { actor, event } => {
            if let Some(id) = pick(&seen.events, event) {
                let _ = m.mark_swappable(&pid(PROFILES[actor]), id);
            }
        }
        Op::MarkBusy { actor, event } => {
            if let Some(id) = pick(&seen.events, event) {
                let _ = m.mark_busy(&pid(PROFILES[actor]), id);
            }
        }
        Op::Offer { actor, mine, theirs } => {
            let (Some(mine), Some(theirs)) = (pick(&seen.events, mine), pick(&seen.events, theirs))
            else {
                return;
            };
            let Some(owner) = owner_of(m, theirs) else {
                return;
            };
            if let Ok(req) = m.create_swap_request(&pid(PROFILES[actor]), mine, theirs, &pid(owner)) {
                seen.requests.push((req.id, req.owner_id));
            }
        }
        Op::Accept { by_owner, actor, request } | Op::Reject { by_owner, actor, request } => {
            let Some((id, owner)) = pick(&seen.requests, request) else {
                return;
            };
            let who = if by_owner { owner.as_str() } else { PROFILES[actor] };
            let _ = match op {
                Op::Accept { .. } => m.accept_swap_request(&pid(who), id),
                _ => m.reject_swap_request(&pid(who), id),
            };
        }
        Op::Delete { actor, event } => {
            if let Some(id) = pick(&seen.events, event) {
                let _ = m.delete_event(&pid(PROFILES[actor]), id);
            }
        }
        Op::DeleteProfile { actor } => {
            let who = PROFILES[actor];
            let _ = m.delete_profile(&pid(who), who);
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn random_operations_keep_events_and_requests_paired(
        ops in prop::collection::vec(op_strategy(), 1..60)
    ) {
        let m = manager(&PROFILES);
        let mut seen = Seen::default();

        for (step, op) in ops.iter().enumerate() {
            apply(&m, &mut seen, op);
            let violations = m.verify_invariants().unwrap();
            prop_assert!(
                violations.is_empty(),
                "step {} ({:?}) left violations: {:?}",
                step,
                op,
                violations
            );
        }
    }

    #[test]
    fn accepted_swaps_conserve_events(
        ops in prop::collection::vec(op_strategy(), 1..60)
    ) {
        let m = manager(&PROFILES);
        let mut seen = Seen::default();

        // Without deletes, every created event must still have exactly one owner.
        for op in ops.iter().filter(|op| !matches!(op, Op::Delete { .. } | Op::DeleteProfile { .. })) {
            apply(&m, &mut seen, op);
        }
        for id in &seen.events {
            prop_assert!(owner_of(&m, id).is_some(), "event {} lost its owner", id);
        }
        let total: usize = PROFILES
            .iter()
            .map(|p| m.list_own_events(&pid(p)).unwrap().len())
            .sum();
        prop_assert_eq!(total, seen.events.len());
    }
}
