//! Business domain model: the root aggregate owning staff, services
//! and bookings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::time::{TimeOfDay, Weekday};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

/// One weekday's working hours for a staff member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaySchedule {
    pub day: Weekday,
    pub is_working: bool,
    pub start: TimeOfDay,
    pub end: TimeOfDay,
}

impl DaySchedule {
    /// The schedule new staff start from: every weekday present, none
    /// working, 9:00 AM to 5:00 PM once a day is switched on.
    pub fn default_week() -> Vec<DaySchedule> {
        Weekday::ALL
            .into_iter()
            .map(|day| DaySchedule {
                day,
                is_working: false,
                start: TimeOfDay { hour: 9, minute: 0 },
                end: TimeOfDay { hour: 17, minute: 0 },
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaffMember {
    pub id: Uuid,
    pub name: String,
    pub availability: Vec<DaySchedule>,
}

impl StaffMember {
    /// The working window for `day`, or `None` when the member is off
    /// that day. A weekday missing from `availability` counts as off.
    pub fn working_window(&self, day: Weekday) -> Option<(TimeOfDay, TimeOfDay)> {
        self.availability
            .iter()
            .find(|schedule| schedule.day == day && schedule.is_working)
            .map(|schedule| (schedule.start, schedule.end))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Business {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub location: GeoPoint,
    /// At most five members; enforced by the roster service and
    /// asserted again by the table schema.
    pub staff: Vec<StaffMember>,
    /// Mean rating over completed-and-reviewed bookings, one decimal.
    /// `0.0` until the first review lands.
    pub rating: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Business {
    pub fn staff_by_name(&self, name: &str) -> Option<&StaffMember> {
        self.staff.iter().find(|member| member.name == name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBusiness {
    pub name: String,
    pub address: String,
    pub location: GeoPoint,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateBusiness {
    pub name: Option<String>,
    pub address: Option<String>,
    pub location: Option<GeoPoint>,
}
