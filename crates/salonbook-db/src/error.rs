//! Database-specific error types and conversions.

use salonbook_core::error::SalonbookError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Stored row could not be decoded: {0}")]
    Decode(String),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Slot conflict: {barber} is already booked on {date} at {time}")]
    SlotConflict {
        barber: String,
        date: String,
        time: String,
    },
}

impl From<DbError> for SalonbookError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => SalonbookError::NotFound { entity, id },
            DbError::SlotConflict { barber, date, time } => {
                SalonbookError::SlotConflict { barber, date, time }
            }
            other => SalonbookError::Database(other.to_string()),
        }
    }
}
