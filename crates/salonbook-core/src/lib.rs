//! Salonbook Core — domain models, clock-time value types, and
//! repository trait definitions shared across all crates.
//!
//! This crate performs no I/O. Storage backends implement the traits
//! in [`repository`]; the booking services in `salonbook-booking` are
//! generic over them.

pub mod error;
pub mod models;
pub mod repository;
pub mod time;

pub use error::{SalonbookError, SalonbookResult};
pub use time::{TimeOfDay, Weekday};
