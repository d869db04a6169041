#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use rusqlite::Connection;
use slotswap_core::ProfileId;
use slotswap_profiles::identity::create_profile;
use slotswap_swaps::{Event, NewEvent, SwapManager};

/// Create both schemas on `conn` and one profile per name.
pub fn seed(conn: &Connection, names: &[&str]) {
    conn.execute_batch("PRAGMA foreign_keys=ON;").unwrap();
    slotswap_profiles::db::init_db(conn).unwrap();
    slotswap_swaps::db::init_db(conn).unwrap();
    for name in names {
        create_profile(conn, name, &format!("{name}@example.com"), None).unwrap();
    }
}

pub fn manager(names: &[&str]) -> SwapManager {
    let conn = Connection::open_in_memory().unwrap();
    seed(&conn, names);
    SwapManager::new(conn).unwrap()
}

pub fn pid(name: &str) -> ProfileId {
    ProfileId::from(name)
}

pub fn slot(day: u32) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = Utc.with_ymd_and_hms(2026, 6, day, 9, 0, 0).unwrap();
    (start, start + Duration::hours(1))
}

/// An event owned by `owner`, already marked swappable.
pub fn swappable(m: &SwapManager, owner: &str, title: &str, day: u32) -> Event {
    let (start_time, end_time) = slot(day);
    let ev = m
        .create_event(
            &pid(owner),
            NewEvent {
                title: title.to_string(),
                start_time,
                end_time,
            },
        )
        .unwrap();
    m.mark_swappable(&pid(owner), &ev.id).unwrap()
}

/// Load an event through its current owner's listing.
pub fn reload(m: &SwapManager, owners: &[&str], id: &str) -> Option<Event> {
    owners.iter().find_map(|o| {
        m.list_own_events(&pid(o))
            .unwrap()
            .into_iter()
            .find(|e| e.id == id)
    })
}
