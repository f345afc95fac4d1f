use chrono::{Datelike, NaiveDate, Timelike, Weekday};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::core::sessions::{is_weekend, Session};
use crate::core::timestamps::TimeBasis;
use crate::error::{JournalError, Result};
use crate::models::{Side, Trade};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PnlFilter {
    Win,
    Loss,
}

impl FromStr for PnlFilter {
    type Err = JournalError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "win" => Ok(PnlFilter::Win),
            "loss" => Ok(PnlFilter::Loss),
            _ => Err(invalid("pnl", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeekdayFilter {
    Day(Weekday),
    Weekdays,
    Weekend,
}

impl WeekdayFilter {
    pub fn matches(&self, day: Weekday) -> bool {
        match self {
            WeekdayFilter::Day(d) => *d == day,
            WeekdayFilter::Weekdays => !is_weekend(day),
            WeekdayFilter::Weekend => is_weekend(day),
        }
    }
}

impl FromStr for WeekdayFilter {
    type Err = JournalError;

    /// Accepts `weekdays`, `weekend`, a day number (0 = Sunday .. 6 = Saturday)
    /// or a day name.
    fn from_str(s: &str) -> Result<Self> {
        let v = s.trim().to_ascii_lowercase();
        match v.as_str() {
            "weekdays" => return Ok(WeekdayFilter::Weekdays),
            "weekend" => return Ok(WeekdayFilter::Weekend),
            _ => {}
        }
        if let Ok(n) = v.parse::<u32>() {
            return match n {
                0 => Ok(WeekdayFilter::Day(Weekday::Sun)),
                1..=6 => Weekday::try_from((n - 1) as u8)
                    .map(WeekdayFilter::Day)
                    .map_err(|_| invalid("weekday", s)),
                _ => Err(invalid("weekday", s)),
            };
        }
        v.parse::<Weekday>()
            .map(WeekdayFilter::Day)
            .map_err(|_| invalid("weekday", s))
    }
}

/// Composable trade predicates, combined with AND. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterCriteria {
    pub symbol: Option<String>,
    pub side: Option<Side>,
    pub pnl: Option<PnlFilter>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub weekday: Option<WeekdayFilter>,
    pub session: Option<Session>,
}

impl FilterCriteria {
    /// Build from flat query pairs (`symbol`, `side`, `pnl`, `from`, `to`, `weekday`,
    /// `session`). Empty values leave the key unset.
    pub fn from_pairs<'a, I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut criteria = FilterCriteria::default();
        for (key, value) in pairs {
            let value = value.trim();
            if value.is_empty() {
                continue;
            }
            match key.trim() {
                "symbol" => criteria.symbol = Some(value.to_ascii_uppercase()),
                "side" => criteria.side = Some(value.parse()?),
                "pnl" => criteria.pnl = Some(value.parse()?),
                "from" => criteria.from = Some(parse_date("from", value)?),
                "to" => criteria.to = Some(parse_date("to", value)?),
                "weekday" => criteria.weekday = Some(value.parse()?),
                "session" => criteria.session = Some(value.parse()?),
                other => return Err(JournalError::UnknownFilter(other.to_string())),
            }
        }
        Ok(criteria)
    }

    pub fn is_empty(&self) -> bool {
        *self == FilterCriteria::default()
    }

    fn needs_time(&self) -> bool {
        self.from.is_some() || self.to.is_some() || self.weekday.is_some() || self.session.is_some()
    }

    pub fn matches(&self, trade: &Trade, basis: &TimeBasis) -> bool {
        if let Some(symbol) = &self.symbol {
            if !trade.pair().eq_ignore_ascii_case(symbol) {
                return false;
            }
        }
        if let Some(side) = self.side {
            if trade.side() != side {
                return false;
            }
        }
        match self.pnl {
            Some(PnlFilter::Win) if !trade.is_win() => return false,
            Some(PnlFilter::Loss) if !trade.is_loss() => return false,
            _ => {}
        }

        if !self.needs_time() {
            return true;
        }
        // Time predicates cannot be satisfied without a usable entry time.
        let Some(entry) = trade.entry_time(basis) else {
            return false;
        };
        let local = basis.to_local(entry);
        let date = local.date_naive();

        if self.from.is_some_and(|from| date < from) || self.to.is_some_and(|to| date > to) {
            return false;
        }
        if let Some(w) = self.weekday {
            if !w.matches(local.weekday()) {
                return false;
            }
        }
        if let Some(s) = self.session {
            if !s.contains(local.hour()) {
                return false;
            }
        }
        true
    }

    pub fn apply(&self, trades: &[Trade], basis: &TimeBasis) -> Vec<Trade> {
        trades
            .iter()
            .filter(|t| self.matches(t, basis))
            .cloned()
            .collect()
    }
}

fn parse_date(key: &str, value: &str) -> Result<NaiveDate> {
    let head = value.get(..10).unwrap_or(value);
    NaiveDate::parse_from_str(&head.replace(['.', '/'], "-"), "%Y-%m-%d")
        .map_err(|_| invalid(key, value))
}

fn invalid(key: &str, value: &str) -> JournalError {
    JournalError::InvalidFilterValue {
        key: key.to_string(),
        value: value.to_string(),
    }
}
