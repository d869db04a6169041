//! `slotswap-profiles` — profile records and identity resolution.
//!
//! A profile is created the first time an authenticated identity connects
//! and is keyed by that identity's subject, so the profile id and the
//! authentication id are the same opaque string.

pub mod db;
pub mod error;
pub mod identity;
pub mod resolver;
pub mod types;

pub use error::{ProfileError, Result};
pub use resolver::{ProfileResolver, ResolvedProfile};
pub use types::Profile;
