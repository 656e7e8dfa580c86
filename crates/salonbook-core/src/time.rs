//! Clock-time and weekday value types.
//!
//! Slot labels travel as 12-hour strings (`"9:00 AM"`, `"1:15 PM"`).
//! [`TimeOfDay`] is the single parsed form used everywhere else, so
//! hour arithmetic never touches the string representation.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize, de, ser};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseTimeError {
    #[error("expected a clock time like '9:00 AM', got '{0}'")]
    Malformed(String),

    #[error("clock hour must be 1..=12, got {0}")]
    HourOutOfRange(u8),

    #[error("minute must be 0..=59, got {0}")]
    MinuteOutOfRange(u8),

    #[error("expected AM or PM, got '{0}'")]
    UnknownMeridiem(String),
}

/// A time of day in 24-hour form.
///
/// `hour` is `0..=23`; midnight is `0:00` and parses from `"12:00 AM"`,
/// noon is `12:00` and parses from `"12:00 PM"`. Ordering is
/// chronological.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeOfDay {
    pub hour: u8,
    pub minute: u8,
}

impl TimeOfDay {
    // 23:59 is 1439 minutes, well within u16.
    pub const fn minutes_from_midnight(&self) -> u16 {
        self.hour as u16 * 60 + self.minute as u16
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let clock_hour = (self.hour + 11) % 12 + 1;
        let meridiem = if self.hour >= 12 { "PM" } else { "AM" };
        write!(f, "{}:{:02} {}", clock_hour, self.minute, meridiem)
    }
}

impl FromStr for TimeOfDay {
    type Err = ParseTimeError;

    /// Parses `H:MM AM/PM`. The meridiem is matched case-insensitively;
    /// [`fmt::Display`] always writes the canonical uppercase form.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || ParseTimeError::Malformed(s.to_string());

        let (clock, meridiem) = s.trim().split_once(' ').ok_or_else(malformed)?;
        let (hour, minute) = clock.split_once(':').ok_or_else(malformed)?;

        let hour: u8 = hour.parse().map_err(|_| malformed())?;
        let minute: u8 = minute.parse().map_err(|_| malformed())?;

        if !(1..=12).contains(&hour) {
            return Err(ParseTimeError::HourOutOfRange(hour));
        }
        if minute > 59 {
            return Err(ParseTimeError::MinuteOutOfRange(minute));
        }

        let hour = if meridiem.eq_ignore_ascii_case("AM") {
            if hour == 12 { 0 } else { hour }
        } else if meridiem.eq_ignore_ascii_case("PM") {
            if hour == 12 { 12 } else { hour + 12 }
        } else {
            return Err(ParseTimeError::UnknownMeridiem(meridiem.to_string()));
        };

        Ok(Self { hour, minute })
    }
}

impl<'de> Deserialize<'de> for TimeOfDay {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: de::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        FromStr::from_str(&s).map_err(de::Error::custom)
    }
}

impl Serialize for TimeOfDay {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: ser::Serializer,
    {
        serializer.serialize_str(self.to_string().as_str())
    }
}

/// Day of the week, Sunday-first to match the schedule editor and the
/// stored availability order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Weekday {
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl Weekday {
    pub const ALL: [Weekday; 7] = [
        Weekday::Sunday,
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
    ];

    pub fn from_date(date: NaiveDate) -> Self {
        match date.weekday() {
            chrono::Weekday::Sun => Weekday::Sunday,
            chrono::Weekday::Mon => Weekday::Monday,
            chrono::Weekday::Tue => Weekday::Tuesday,
            chrono::Weekday::Wed => Weekday::Wednesday,
            chrono::Weekday::Thu => Weekday::Thursday,
            chrono::Weekday::Fri => Weekday::Friday,
            chrono::Weekday::Sat => Weekday::Saturday,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Weekday::Sunday => "Sunday",
            Weekday::Monday => "Monday",
            Weekday::Tuesday => "Tuesday",
            Weekday::Wednesday => "Wednesday",
            Weekday::Thursday => "Thursday",
            Weekday::Friday => "Friday",
            Weekday::Saturday => "Saturday",
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    fn t(hour: u8, minute: u8) -> TimeOfDay {
        TimeOfDay { hour, minute }
    }

    #[test]
    fn parses_morning_and_afternoon() {
        assert_eq!("9:00 AM".parse::<TimeOfDay>().unwrap(), t(9, 0));
        assert_eq!("1:05 PM".parse::<TimeOfDay>().unwrap(), t(13, 5));
        assert_eq!("11:45 AM".parse::<TimeOfDay>().unwrap(), t(11, 45));
        assert_eq!("5:00 PM".parse::<TimeOfDay>().unwrap(), t(17, 0));
    }

    #[test]
    fn noon_and_midnight() {
        assert_eq!("12:00 AM".parse::<TimeOfDay>().unwrap(), t(0, 0));
        assert_eq!("12:00 PM".parse::<TimeOfDay>().unwrap(), t(12, 0));
        assert_eq!("12:30 AM".parse::<TimeOfDay>().unwrap(), t(0, 30));
    }

    #[test]
    fn lowercase_meridiem_accepted() {
        assert_eq!("9:15 am".parse::<TimeOfDay>().unwrap(), t(9, 15));
        assert_eq!("9:15 pm".parse::<TimeOfDay>().unwrap(), t(21, 15));
    }

    #[test]
    fn rejects_out_of_range_parts() {
        assert_eq!(
            "0:30 AM".parse::<TimeOfDay>(),
            Err(ParseTimeError::HourOutOfRange(0))
        );
        assert_eq!(
            "13:00 PM".parse::<TimeOfDay>(),
            Err(ParseTimeError::HourOutOfRange(13))
        );
        assert_eq!(
            "9:60 AM".parse::<TimeOfDay>(),
            Err(ParseTimeError::MinuteOutOfRange(60))
        );
        assert_eq!(
            "9:00 XM".parse::<TimeOfDay>(),
            Err(ParseTimeError::UnknownMeridiem("XM".into()))
        );
    }

    #[test]
    fn rejects_malformed_input() {
        for input in ["", "9:00", "9 AM", "nine:00 AM", "9:xx AM"] {
            assert!(
                matches!(
                    input.parse::<TimeOfDay>(),
                    Err(ParseTimeError::Malformed(_))
                ),
                "expected Malformed for {input:?}"
            );
        }
    }

    #[test]
    fn displays_canonical_labels() {
        assert_eq!(t(9, 0).to_string(), "9:00 AM");
        assert_eq!(t(0, 0).to_string(), "12:00 AM");
        assert_eq!(t(12, 0).to_string(), "12:00 PM");
        assert_eq!(t(13, 15).to_string(), "1:15 PM");
        assert_eq!(t(23, 45).to_string(), "11:45 PM");
    }

    #[test]
    fn display_round_trips_through_parse() {
        for hour in 0..24 {
            for minute in [0, 15, 30, 45] {
                let time = t(hour, minute);
                assert_eq!(time.to_string().parse::<TimeOfDay>().unwrap(), time);
            }
        }
    }

    #[test]
    fn ordering_is_chronological() {
        assert!(t(0, 0) < t(9, 0));
        assert!(t(9, 45) < t(10, 0));
        assert!(t(11, 59) < t(12, 0));
        assert!(t(12, 0) < t(17, 0));
    }

    #[test]
    fn minutes_from_midnight() {
        assert_eq!(t(0, 0).minutes_from_midnight(), 0);
        assert_eq!(t(9, 15).minutes_from_midnight(), 555);
        assert_eq!(t(23, 59).minutes_from_midnight(), 1439);
    }

    #[test]
    fn serde_uses_the_slot_label_form() {
        let json = serde_json::to_string(&t(13, 30)).unwrap();
        assert_eq!(json, "\"1:30 PM\"");
        let back: TimeOfDay = serde_json::from_str(&json).unwrap();
        assert_eq!(back, t(13, 30));
    }

    #[test]
    fn weekday_from_date() {
        // 2025-03-16 is a Sunday.
        let sunday = NaiveDate::from_ymd_opt(2025, 3, 16).unwrap();
        assert_eq!(Weekday::from_date(sunday), Weekday::Sunday);
        assert_eq!(
            Weekday::from_date(sunday.succ_opt().unwrap()),
            Weekday::Monday
        );
        assert_eq!(
            Weekday::from_date(NaiveDate::from_ymd_opt(2025, 3, 22).unwrap()),
            Weekday::Saturday
        );
    }

    #[test]
    fn weekday_serde_uses_full_names() {
        assert_eq!(
            serde_json::to_string(&Weekday::Wednesday).unwrap(),
            "\"Wednesday\""
        );
        let back: Weekday = serde_json::from_str("\"Sunday\"").unwrap();
        assert_eq!(back, Weekday::Sunday);
    }
}
