use chrono::{Datelike, Timelike, Weekday};
use serde::{Deserialize, Serialize};

use crate::core::timestamps::TimeBasis;
use crate::models::trade::UNCLASSIFIED;
use crate::models::Trade;

/// Most recent same-pair, same-side trades considered for one lookup.
pub const CANDIDATE_LIMIT: usize = 200;
/// Results returned at most.
pub const RESULT_LIMIT: usize = 50;
/// Score a candidate needs to count as a close match.
pub const MIN_SCORE: u32 = 30;
/// Close matches needed before weaker candidates are dropped.
const MIN_CLOSE_MATCHES: usize = 3;

const SLOT_POINTS: u32 = 10;
const WEEKDAY_POINTS: u32 = 10;
const HOLDING_POINTS: u32 = 10;
const R_POINTS: u32 = 10;
const SETUP_POINTS: u32 = 10;

/// Coarse time-of-day band of the entry hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeSlot {
    AsiaMorning,
    AsiaAfternoon,
    EuropeEarly,
    EuropeLate,
    NewYork,
}

impl TimeSlot {
    pub fn for_hour(hour: u32) -> Self {
        match hour {
            0..=8 => TimeSlot::AsiaMorning,
            9..=14 => TimeSlot::AsiaAfternoon,
            15..=17 => TimeSlot::EuropeEarly,
            18..=20 => TimeSlot::EuropeLate,
            _ => TimeSlot::NewYork,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HoldBand {
    /// Under an hour.
    Short,
    /// One to four hours.
    Medium,
    Long,
}

impl HoldBand {
    pub fn for_minutes(minutes: i64) -> Self {
        if minutes < 60 {
            HoldBand::Short
        } else if minutes < 240 {
            HoldBand::Medium
        } else {
            HoldBand::Long
        }
    }
}

/// Outcome band in multiples of the stop distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RBand {
    NoStop,
    /// R <= -3
    BelowMinus3,
    /// -3 < R <= -1
    Minus3To1,
    /// -1 < R < 0
    Minus1To0,
    /// 0 <= R < 1
    Zero1,
    /// 1 <= R < 3
    One3,
    /// R >= 3
    Above3,
}

impl RBand {
    pub fn for_r(r: Option<f64>) -> Self {
        match r {
            None => RBand::NoStop,
            Some(r) if r <= -3.0 => RBand::BelowMinus3,
            Some(r) if r <= -1.0 => RBand::Minus3To1,
            Some(r) if r < 0.0 => RBand::Minus1To0,
            Some(r) if r < 1.0 => RBand::Zero1,
            Some(r) if r < 3.0 => RBand::One3,
            Some(_) => RBand::Above3,
        }
    }
}

/// Price move to close in units of the stop distance, signed by side.
/// `None` without a non-zero stop distance.
pub fn stop_r_multiple(t: &Trade) -> Option<f64> {
    let open = t.open_price?;
    let close = t.close_price?;
    let stop = t.stop_price.filter(|s| *s != 0.0)?;
    let risk = (open - stop).abs();
    if risk == 0.0 {
        return None;
    }
    Some(t.side().favourable_move(open, close) / risk)
}

/// Features compared between two trades.
#[derive(Debug, Clone)]
struct Profile {
    slot: Option<TimeSlot>,
    weekday: Option<Weekday>,
    hold: Option<HoldBand>,
    r_band: RBand,
    setup: Option<String>,
}

impl Profile {
    fn of(t: &Trade, basis: &TimeBasis) -> Self {
        let opened = t.open_at(basis).map(|dt| basis.to_local(dt));
        let setup = t.setup_label();
        Profile {
            slot: opened.map(|dt| TimeSlot::for_hour(dt.hour())),
            weekday: opened.map(|dt| dt.weekday()),
            hold: t.holding_minutes(basis).map(HoldBand::for_minutes),
            r_band: RBand::for_r(stop_r_multiple(t)),
            setup: (setup != UNCLASSIFIED).then_some(setup),
        }
    }

    fn score(&self, other: &Profile) -> u32 {
        fn same<T: PartialEq>(a: &Option<T>, b: &Option<T>) -> bool {
            a.is_some() && a == b
        }

        let mut score = 0;
        if same(&self.slot, &other.slot) {
            score += SLOT_POINTS;
        }
        if same(&self.weekday, &other.weekday) {
            score += WEEKDAY_POINTS;
        }
        if same(&self.hold, &other.hold) {
            score += HOLDING_POINTS;
        }
        if self.r_band == other.r_band {
            score += R_POINTS;
        }
        if same(&self.setup, &other.setup) {
            score += SETUP_POINTS;
        }
        score
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarTrade {
    pub id: String,
    pub open_time: Option<String>,
    pub close_time: Option<String>,
    pub profit: f64,
    pub pips: Option<f64>,
    pub r_value: Option<f64>,
    pub score: u32,
    pub setup: String,
}

/// Past trades resembling `base`: same pair and side, scored on entry time slot,
/// weekday, holding band, R band and setup.
///
/// Only the most recent [`CANDIDATE_LIMIT`] candidates by close time are scored.
/// Results are ordered by score (ties keep recency order). When at least three
/// reach [`MIN_SCORE`] only those are kept; otherwise every candidate is returned
/// so a thin history still shows something. Capped at [`RESULT_LIMIT`].
pub fn similar_trades(base: &Trade, trades: &[Trade], basis: &TimeBasis) -> Vec<SimilarTrade> {
    let pair = base.pair().to_ascii_uppercase();
    let side = base.side();

    let mut candidates: Vec<(Option<_>, &Trade)> = trades
        .iter()
        .filter(|t| t.id() != base.id())
        .filter(|t| t.side() == side && t.pair().eq_ignore_ascii_case(&pair))
        .map(|t| (t.exit_time(basis), t))
        .collect();
    // Newest first, undated last.
    candidates.sort_by(|a, b| b.0.cmp(&a.0));
    candidates.truncate(CANDIDATE_LIMIT);

    let reference = Profile::of(base, basis);
    let mut scored: Vec<SimilarTrade> = candidates
        .into_iter()
        .map(|(_, t)| SimilarTrade {
            id: t.id().to_string(),
            open_time: t.open_time.clone(),
            close_time: t.close_raw().map(str::to_string),
            profit: t.profit(),
            pips: t.pips(),
            r_value: stop_r_multiple(t),
            score: reference.score(&Profile::of(t, basis)),
            setup: t.setup_label(),
        })
        .collect();
    scored.sort_by(|a, b| b.score.cmp(&a.score));

    let close = scored.iter().filter(|s| s.score >= MIN_SCORE).count();
    if close >= MIN_CLOSE_MATCHES {
        scored.truncate(close);
    }
    scored.truncate(RESULT_LIMIT);
    scored
}
