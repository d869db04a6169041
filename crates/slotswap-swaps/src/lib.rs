//! `slotswap-swaps` — calendar events, swap requests and the state machine
//! that keeps them paired.
//!
//! All writes go through [`SwapManager`], which takes the acting profile as
//! an explicit argument on every call and runs each operation in a single
//! immediate SQLite transaction.

pub mod access;
pub mod audit;
pub mod db;
pub mod error;
pub mod machine;
pub mod manager;
pub mod queries;
mod store;
pub mod types;
pub mod validate;

pub use audit::InvariantViolation;
pub use error::{Result, SwapError};
pub use manager::SwapManager;
pub use queries::Direction;
pub use types::{
    Event, EventBrief, EventPatch, EventStatus, MarketEvent, NewEvent, SwapRequest,
    SwapRequestView, SwapStatus,
};
