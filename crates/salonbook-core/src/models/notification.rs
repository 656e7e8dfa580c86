//! Notification records produced by booking lifecycle transitions.
//!
//! The core only writes these rows; delivery (push, polling, badges)
//! belongs to the clients reading them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What happened. Stored under the wire tags the mobile clients
/// already dispatch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotificationKind {
    /// A customer requested a booking (sent to the owner).
    Requested,
    /// The owner confirmed (sent to the customer).
    Confirmed,
    /// The owner marked the appointment done (sent to the customer).
    Completed,
    /// Either party cancelled (sent to the other).
    Cancelled,
    /// A review was submitted (sent to the owner).
    Review,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Requested => "booking",
            NotificationKind::Confirmed => "confirmed",
            NotificationKind::Completed => "completed",
            NotificationKind::Cancelled => "cancel",
            NotificationKind::Review => "review",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "booking" => Some(NotificationKind::Requested),
            "confirmed" => Some(NotificationKind::Confirmed),
            "completed" => Some(NotificationKind::Completed),
            "cancel" => Some(NotificationKind::Cancelled),
            "review" => Some(NotificationKind::Review),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    /// Business id for owner-facing notifications, customer email for
    /// customer-facing ones.
    pub recipient: String,
    pub kind: NotificationKind,
    pub message: String,
    pub booking_id: Uuid,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateNotification {
    pub recipient: String,
    pub kind: NotificationKind,
    pub message: String,
    pub booking_id: Uuid,
}
