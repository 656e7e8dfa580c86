//! Slot generation, the overlap predicate, and the availability filter.
//!
//! Everything here is pure: the orchestrating services fetch rosters
//! and bookings, then hand plain slices in. Working-hour boundaries
//! are hour-granular — a 9 AM–5 PM window admits slots with hour in
//! `[9, 17)` regardless of the slot's minute.

use chrono::NaiveDate;
use salonbook_core::models::booking::Booking;
use salonbook_core::models::business::StaffMember;
use salonbook_core::models::service::ServiceSnapshot;
use salonbook_core::time::{TimeOfDay, Weekday};

/// First offerable slot of a business day.
pub const FIRST_SLOT: TimeOfDay = TimeOfDay { hour: 9, minute: 0 };

/// Last offerable slot of a business day (inclusive).
pub const LAST_SLOT: TimeOfDay = TimeOfDay {
    hour: 17,
    minute: 0,
};

/// Spacing between consecutive slots.
pub const SLOT_STEP_MINUTES: u16 = 15;

/// The universe of bookable start times for a business day: 9:00 AM
/// through 5:00 PM inclusive, every 15 minutes. Date-independent and
/// deterministic; availability is filtered out of this list.
pub fn business_day_slots() -> Vec<TimeOfDay> {
    (FIRST_SLOT.minutes_from_midnight()..=LAST_SLOT.minutes_from_midnight())
        .step_by(usize::from(SLOT_STEP_MINUTES))
        .map(|minutes| TimeOfDay {
            hour: (minutes / 60) as u8,
            minute: (minutes % 60) as u8,
        })
        .collect()
}

/// Half-open interval overlap over minutes-from-midnight. Touching
/// intervals (`a_end == b_start`) do not overlap, so back-to-back
/// bookings are permitted.
pub fn overlaps(a_start: u32, a_end: u32, b_start: u32, b_end: u32) -> bool {
    a_start < b_end && b_start < a_end
}

/// Minutes a booking for `services` occupies. Falls back to
/// `default_minutes` when the list is empty or carries no durations.
pub fn total_duration_minutes(services: &[ServiceSnapshot], default_minutes: u32) -> u32 {
    let total: u32 = services.iter().map(|s| s.duration_minutes).sum();
    if total == 0 { default_minutes } else { total }
}

/// Narrow `all_slots` to the ones actually offerable.
///
/// Until both a staff member and a date are chosen the UI is in
/// pre-selection mode and every slot passes through. Once chosen:
/// not working that weekday yields an empty list; otherwise slots
/// outside the working window are dropped, then slots whose
/// `[start, start + duration)` interval overlaps an existing active
/// booking for the same barber and date. Order is preserved.
pub fn filter_slots(
    all_slots: &[TimeOfDay],
    staff: Option<&StaffMember>,
    date: Option<NaiveDate>,
    requested: &[ServiceSnapshot],
    existing: &[Booking],
    default_minutes: u32,
) -> Vec<TimeOfDay> {
    let (Some(staff), Some(date)) = (staff, date) else {
        return all_slots.to_vec();
    };

    let Some((window_start, window_end)) = staff.working_window(Weekday::from_date(date)) else {
        return Vec::new();
    };

    let duration = total_duration_minutes(requested, default_minutes);

    all_slots
        .iter()
        .copied()
        .filter(|slot| slot.hour >= window_start.hour && slot.hour < window_end.hour)
        .filter(|slot| {
            let slot_start = u32::from(slot.minutes_from_midnight());
            let slot_end = slot_start + duration;
            !existing
                .iter()
                .filter(|booking| {
                    booking.status.is_active()
                        && booking.barber_name == staff.name
                        && booking.date == date
                })
                .any(|booking| {
                    overlaps(
                        slot_start,
                        slot_end,
                        u32::from(booking.start_minutes()),
                        booking.end_minutes(),
                    )
                })
        })
        .collect()
}

/// The inverse question: which staff members could take a booking at
/// `time` on `date`? Used by the barber picker once the customer has
/// fixed a slot first.
pub fn available_barbers<'a>(
    staff: &'a [StaffMember],
    date: NaiveDate,
    time: TimeOfDay,
) -> Vec<&'a StaffMember> {
    let day = Weekday::from_date(date);
    staff
        .iter()
        .filter(|member| {
            member
                .working_window(day)
                .is_some_and(|(start, end)| time.hour >= start.hour && time.hour < end.hour)
        })
        .collect()
}
