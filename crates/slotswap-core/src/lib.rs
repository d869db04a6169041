//! `slotswap-core` — configuration, top-level errors and id types shared by
//! every SlotSwap crate.

pub mod config;
pub mod error;
pub mod types;

pub use config::SlotswapConfig;
pub use error::{Result, SlotswapError};
pub use types::{ConnId, ProfileId};
