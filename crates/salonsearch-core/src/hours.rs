use chrono::{DateTime, Datelike, NaiveTime, TimeZone};
use serde::Serialize;

const DAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

/// Opening window for one salon on one day of the week.
///
/// `day_of_week` counts from 0 = Sunday to 6 = Saturday. A closed day carries
/// `is_closed = true` and its times are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperatingHours {
    pub salon_id: i64,
    pub day_of_week: i16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open_time: Option<NaiveTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub close_time: Option<NaiveTime>,
    pub is_closed: bool,
}

impl OperatingHours {
    #[must_use]
    pub fn day_name(&self) -> &'static str {
        usize::try_from(self.day_of_week)
            .ok()
            .and_then(|d| DAY_NAMES.get(d))
            .copied()
            .unwrap_or("")
    }

    /// `"09:00 - 18:00"`, or `"Closed"` for closed days and incomplete windows.
    #[must_use]
    pub fn display_hours(&self) -> String {
        match (self.is_closed, self.open_time, self.close_time) {
            (false, Some(open), Some(close)) => {
                format!("{} - {}", open.format("%H:%M"), close.format("%H:%M"))
            }
            _ => "Closed".to_string(),
        }
    }

    /// True when `at` falls on this entry's weekday and inside
    /// `[open_time, close_time]`, both ends inclusive.
    #[must_use]
    pub fn is_open_at<Tz: TimeZone>(&self, at: &DateTime<Tz>) -> bool {
        if self.is_closed {
            return false;
        }
        let (Some(open), Some(close)) = (self.open_time, self.close_time) else {
            return false;
        };
        if i64::from(self.day_of_week) != i64::from(at.weekday().num_days_from_sunday()) {
            return false;
        }

        let now = at.time();
        open <= now && now <= close
    }
}
