//! Domain models for salonbook.
//!
//! These are the core types shared across all crates. Bookings embed a
//! snapshot of the services they were made for, so catalog edits never
//! rewrite history.

pub mod booking;
pub mod business;
pub mod notification;
pub mod service;
