//! Local reminder decisions.
//!
//! The core only decides *when* a one-shot reminder should fire and
//! *what* it should say; handing it to the device's notification
//! scheduler is the client's job. Appointment times are wall-clock
//! local to the salon and treated as UTC here (single-timezone
//! system).

use chrono::{DateTime, Duration, NaiveTime, Utc};
use salonbook_core::models::booking::Booking;
use uuid::Uuid;

/// A reminder ready to hand to a local notification scheduler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reminder {
    pub booking_id: Uuid,
    /// When the one-shot notification should fire: the appointment
    /// start.
    pub fire_at: DateTime<Utc>,
    pub body: String,
}

/// One reminder per active booking starting within the next
/// `window_hours`. Bookings are paired with their business's display
/// name, which the booking record itself does not carry.
pub fn due_reminders<'a, I>(bookings: I, now: DateTime<Utc>, window_hours: i64) -> Vec<Reminder>
where
    I: IntoIterator<Item = (&'a Booking, &'a str)>,
{
    let window = Duration::hours(window_hours);
    bookings
        .into_iter()
        .filter(|(booking, _)| booking.status.is_active())
        .filter_map(|(booking, business_name)| {
            let time = NaiveTime::from_hms_opt(
                u32::from(booking.time.hour),
                u32::from(booking.time.minute),
                0,
            )?;
            let start = booking.date.and_time(time).and_utc();
            if start <= now || start - now > window {
                return None;
            }
            let services = booking
                .services
                .iter()
                .map(|s| s.name.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            Some(Reminder {
                booking_id: booking.id,
                fire_at: start,
                body: format!(
                    "You have a booking at {} with {} for {} on {} at {}.",
                    business_name, booking.barber_name, services, booking.date, booking.time,
                ),
            })
        })
        .collect()
}
