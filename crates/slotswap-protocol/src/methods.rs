// Well-known WS method and event names.

// handshake
pub const CONNECT: &str = "connect";

// utility
pub const PING: &str = "ping";

// profile
pub const PROFILE_GET: &str = "profile.get";
pub const PROFILE_DELETE: &str = "profile.delete";

// events owned by the caller
pub const EVENTS_LIST: &str = "events.list";
pub const EVENTS_GET: &str = "events.get";
pub const EVENTS_CREATE: &str = "events.create";
pub const EVENTS_UPDATE: &str = "events.update";
pub const EVENTS_DELETE: &str = "events.delete";
pub const EVENTS_MARK_SWAPPABLE: &str = "events.mark_swappable";
pub const EVENTS_MARK_BUSY: &str = "events.mark_busy";

// other profiles' swappable events
pub const MARKET_LIST: &str = "market.list";

// swap requests
pub const SWAPS_CREATE: &str = "swaps.create";
pub const SWAPS_ACCEPT: &str = "swaps.accept";
pub const SWAPS_REJECT: &str = "swaps.reject";
pub const SWAPS_INCOMING: &str = "swaps.incoming";
pub const SWAPS_OUTGOING: &str = "swaps.outgoing";

// server push events
pub const EV_CONNECT_CHALLENGE: &str = "connect.challenge";
pub const EV_TICK: &str = "tick";
pub const EV_SWAP_CHANGED: &str = "swap.changed";
pub const EV_MARKET_CHANGED: &str = "market.changed";
