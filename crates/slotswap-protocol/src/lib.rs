//! `slotswap-protocol` — JSON frames spoken over the gateway WebSocket.

pub mod frames;
pub mod handshake;
pub mod methods;
pub mod params;
