//! Booking domain model and its status state machine.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::service::ServiceSnapshot;
use crate::time::TimeOfDay;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

impl BookingStatus {
    /// Active bookings occupy their slot for conflict purposes.
    pub fn is_active(&self) -> bool {
        matches!(self, BookingStatus::Pending | BookingStatus::Confirmed)
    }

    /// Completed and Cancelled are terminal.
    pub fn is_terminal(&self) -> bool {
        !self.is_active()
    }

    /// The allowed transitions: Pending -> Confirmed -> Completed, and
    /// either active state -> Cancelled.
    pub fn can_transition_to(&self, next: BookingStatus) -> bool {
        matches!(
            (self, next),
            (BookingStatus::Pending, BookingStatus::Confirmed)
                | (BookingStatus::Confirmed, BookingStatus::Completed)
                | (BookingStatus::Pending, BookingStatus::Cancelled)
                | (BookingStatus::Confirmed, BookingStatus::Cancelled)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "Pending",
            BookingStatus::Confirmed => "Confirmed",
            BookingStatus::Completed => "Completed",
            BookingStatus::Cancelled => "Cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Pending" => Some(BookingStatus::Pending),
            "Confirmed" => Some(BookingStatus::Confirmed),
            "Completed" => Some(BookingStatus::Completed),
            "Cancelled" => Some(BookingStatus::Cancelled),
            _ => None,
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which party cancelled a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CancelledBy {
    Customer,
    Owner,
}

impl CancelledBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            CancelledBy::Customer => "customer",
            CancelledBy::Owner => "owner",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "customer" => Some(CancelledBy::Customer),
            "owner" => Some(CancelledBy::Owner),
            _ => None,
        }
    }
}

/// A customer review attached to a completed booking. At most one per
/// booking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    /// Stars, `1..=5`.
    pub rating: u8,
    pub comment: Option<String>,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub business_id: Uuid,
    pub customer_name: String,
    pub customer_email: String,
    pub barber_name: String,
    /// Calendar day of the appointment, wall-clock local to the salon.
    pub date: NaiveDate,
    /// Slot start time.
    pub time: TimeOfDay,
    /// Frozen at creation: sum of snapshot durations, or the configured
    /// default when no snapshot carried one.
    pub duration_minutes: u32,
    pub services: Vec<ServiceSnapshot>,
    pub status: BookingStatus,
    pub cancelled_by: Option<CancelledBy>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub review: Option<Review>,
    pub created_at: DateTime<Utc>,
}

impl Booking {
    pub fn start_minutes(&self) -> u16 {
        self.time.minutes_from_midnight()
    }

    pub fn end_minutes(&self) -> u32 {
        self.start_minutes() as u32 + self.duration_minutes
    }
}

/// Repository input for the transactional insert. `duration_minutes`
/// is already resolved (snapshot sum or default) by the caller.
#[derive(Debug, Clone)]
pub struct CreateBooking {
    pub business_id: Uuid,
    pub customer_name: String,
    pub customer_email: String,
    pub barber_name: String,
    pub date: NaiveDate,
    pub time: TimeOfDay,
    pub duration_minutes: u32,
    pub services: Vec<ServiceSnapshot>,
}

/// Repository input for attaching a review; the review date is set by
/// the store at write time.
#[derive(Debug, Clone)]
pub struct CreateReview {
    pub rating: u8,
    pub comment: Option<String>,
}
