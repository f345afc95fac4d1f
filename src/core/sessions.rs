use chrono::Weekday;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::JournalError;

/// Trading sessions as fixed local-hour windows `[start, end)`.
///
/// Asia, London and New York tile the day and are used for breakdowns.
/// `Thin` (00-06) overlaps Asia and only exists as a filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Session {
    Asia,
    London,
    NewYork,
    Thin,
}

impl Session {
    pub const CHART: [Session; 3] = [Session::Asia, Session::London, Session::NewYork];

    pub fn hours(&self) -> (u32, u32) {
        match self {
            Session::Asia => (0, 9),
            Session::London => (9, 17),
            Session::NewYork => (17, 24),
            Session::Thin => (0, 6),
        }
    }

    pub fn contains(&self, hour: u32) -> bool {
        let (start, end) = self.hours();
        hour >= start && hour < end
    }

    /// Breakdown session for a local hour. Every hour maps to exactly one.
    pub fn for_hour(hour: u32) -> Session {
        Session::CHART
            .into_iter()
            .find(|s| s.contains(hour))
            .unwrap_or(Session::NewYork)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Session::Asia => "Asia",
            Session::London => "London",
            Session::NewYork => "New York",
            Session::Thin => "Thin",
        }
    }
}

impl fmt::Display for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for Session {
    type Err = JournalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asia" | "tokyo" => Ok(Session::Asia),
            "london" | "europe" => Ok(Session::London),
            "ny" | "newyork" | "new_york" => Ok(Session::NewYork),
            "thin" => Ok(Session::Thin),
            _ => Err(JournalError::InvalidFilterValue {
                key: "session".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

/// Weekday bucket order shared by every weekday breakdown.
pub const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

pub fn is_weekend(day: Weekday) -> bool {
    matches!(day, Weekday::Sat | Weekday::Sun)
}
