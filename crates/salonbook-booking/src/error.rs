//! Booking-layer error types.

use salonbook_core::error::SalonbookError;
use salonbook_core::models::booking::BookingStatus;
use salonbook_core::time::{TimeOfDay, Weekday};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BookingError {
    #[error("{field} is required")]
    MissingField { field: &'static str },

    #[error("at least one service must be selected")]
    NoServices,

    #[error("{barber} is not working on {day}")]
    NotWorkingThatDay { barber: String, day: Weekday },

    #[error("{time} is outside {barber}'s working hours")]
    OutsideWorkingHours { barber: String, time: TimeOfDay },

    #[error("a booking cannot move from {from} to {to}")]
    InvalidTransition {
        from: BookingStatus,
        to: BookingStatus,
    },

    #[error("only the {party} may {action} this booking")]
    Forbidden {
        party: &'static str,
        action: &'static str,
    },

    #[error("rating must be between 1 and 5, got {0}")]
    RatingOutOfRange(u8),

    #[error("this booking already has a review")]
    AlreadyReviewed,

    #[error("only completed bookings can be reviewed")]
    NotCompleted,

    #[error("the staff roster is full ({cap} members)")]
    RosterFull { cap: usize },

    #[error("availability must list each weekday exactly once")]
    MalformedWeek,

    #[error("{day} starts at {start}, which is not before {end}")]
    EmptyWindow {
        day: Weekday,
        start: TimeOfDay,
        end: TimeOfDay,
    },

    #[error("price must not be negative")]
    NegativePrice,

    #[error("duration must be at least one minute")]
    ZeroDuration,
}

impl From<BookingError> for SalonbookError {
    fn from(err: BookingError) -> Self {
        SalonbookError::Validation {
            message: err.to_string(),
        }
    }
}
