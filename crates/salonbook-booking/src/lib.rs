//! Salonbook Booking — slot generation, availability filtering, the
//! booking lifecycle state machine, and owner-side roster management.
//!
//! Services are generic over the repository traits in
//! `salonbook-core`, so this crate has no storage dependency; the
//! current actor is passed explicitly on every call.

pub mod availability;
pub mod config;
pub mod error;
pub mod reminder;
pub mod roster;
pub mod service;

pub use config::BookingConfig;
pub use error::BookingError;
pub use reminder::{Reminder, due_reminders};
pub use roster::RosterService;
pub use service::{Actor, AvailabilityQuery, AvailableSlots, BookingRequest, BookingService};
