//! Booking service configuration.

/// Configuration for the booking and roster services.
#[derive(Debug, Clone)]
pub struct BookingConfig {
    /// Minutes a booking occupies when its services carry no duration
    /// (default: 30).
    pub default_service_minutes: u32,
    /// Maximum staff roster size per business (default: 5). The table
    /// schema asserts the same cap.
    pub max_staff_members: usize,
    /// How far ahead a booking must start for a local reminder to be
    /// scheduled, in hours (default: 24).
    pub reminder_window_hours: i64,
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            default_service_minutes: 30,
            max_staff_members: 5,
            reminder_window_hours: 24,
        }
    }
}
