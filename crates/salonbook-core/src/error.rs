//! Error types for the salonbook system.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SalonbookError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    /// A booking write lost the race for a slot: another active booking
    /// for the same staff member overlapped it inside the transaction.
    #[error("Slot conflict: {barber} is already booked on {date} at {time}")]
    SlotConflict {
        barber: String,
        date: String,
        time: String,
    },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type SalonbookResult<T> = Result<T, SalonbookError>;
