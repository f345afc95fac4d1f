use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Time context for every time-dependent computation.
///
/// `broker` is the zone naive export timestamps are written in. `local` is the zone
/// weekday, hour, session, date and month buckets are evaluated in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeBasis {
    pub broker: Tz,
    pub local: Tz,
}

impl Default for TimeBasis {
    fn default() -> Self {
        Self {
            broker: Tz::UTC,
            local: Tz::UTC,
        }
    }
}

impl TimeBasis {
    pub fn new(broker: Tz, local: Tz) -> Self {
        Self { broker, local }
    }

    /// Parse an export timestamp. Strings with an explicit offset are taken as-is,
    /// naive ones are read in the broker zone. Returns `None` when unparseable.
    pub fn parse(&self, raw: &str) -> Option<DateTime<Utc>> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }

        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc));
        }

        let naive = parse_naive(&normalize_date_separators(raw))?;
        self.broker
            .from_local_datetime(&naive)
            .earliest()
            // Wall-clock times skipped by a DST jump resolve to the first valid instant after.
            .or_else(|| {
                self.broker
                    .from_local_datetime(&(naive + Duration::hours(1)))
                    .earliest()
            })
            .map(|dt| dt.with_timezone(&Utc))
    }

    pub fn to_local(&self, dt: DateTime<Utc>) -> DateTime<Tz> {
        dt.with_timezone(&self.local)
    }
}

// MT4 exports use "2024.01.15 10:00:00", some brokers "2024/01/15".
fn normalize_date_separators(raw: &str) -> String {
    raw.char_indices()
        .map(|(i, c)| if i < 10 && (c == '.' || c == '/') { '-' } else { c })
        .collect()
}

fn parse_naive(s: &str) -> Option<NaiveDateTime> {
    for fmt in NAIVE_FORMATS {
        if let Ok(n) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(n);
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}
