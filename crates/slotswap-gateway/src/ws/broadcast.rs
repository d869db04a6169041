use std::sync::Arc;

use serde::Serialize;
use slotswap_core::ProfileId;
use tokio::sync::broadcast;

const BROADCAST_CAPACITY: usize = 256;

/// Who a push event is meant for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Audience {
    /// Every authenticated connection.
    All,
    /// Only connections authenticated as one of these profiles.
    Profiles(Vec<ProfileId>),
}

impl Audience {
    /// Should a connection authenticated as `profile` receive this?
    pub fn includes(&self, profile: &ProfileId) -> bool {
        match self {
            Audience::All => true,
            Audience::Profiles(ids) => ids.contains(profile),
        }
    }
}

/// A serialized event frame plus its audience.
#[derive(Debug)]
pub struct Notice {
    pub audience: Audience,
    pub frame: String,
}

/// Fan-out events to connected WS clients via tokio broadcast channel.
///
/// Every connection subscribes; each filters by its own profile id, so a
/// profile with several open connections gets the event on all of them.
pub struct EventBroadcaster {
    tx: broadcast::Sender<Arc<Notice>>,
}

impl EventBroadcaster {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(BROADCAST_CAPACITY);
        Self { tx }
    }

    /// New client subscribes to the broadcast stream.
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<Notice>> {
        self.tx.subscribe()
    }

    /// Push an event frame to matching subscribers.
    /// Silently drops if no subscribers exist.
    pub fn send(&self, audience: Audience, frame: &impl Serialize) {
        let frame = serde_json::to_string(frame).unwrap_or_default();
        let _ = self.tx.send(Arc::new(Notice { audience, frame }));
    }
}

impl Default for EventBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}
