use chrono::{Datelike, Timelike};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::analytics::kpis::{r_multiple, reference_loss};
use crate::core::buckets::{holding_bucket, BucketEdges, HOLDING_LABELS};
use crate::core::sessions::{weekday_name, Session, WEEK};
use crate::core::timestamps::TimeBasis;
use crate::models::{Ratio, Side, Trade};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Weekday,
    Hour,
    Session,
    Pair,
    Setup,
    Direction,
    HoldingTime,
    RMultiple,
    Month,
    ProfitRange,
}

impl Dimension {
    pub const ALL: [Dimension; 10] = [
        Dimension::Weekday,
        Dimension::Hour,
        Dimension::Session,
        Dimension::Pair,
        Dimension::Setup,
        Dimension::Direction,
        Dimension::HoldingTime,
        Dimension::RMultiple,
        Dimension::Month,
        Dimension::ProfitRange,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Dimension::Weekday => "weekday",
            Dimension::Hour => "hour",
            Dimension::Session => "session",
            Dimension::Pair => "pair",
            Dimension::Setup => "setup",
            Dimension::Direction => "direction",
            Dimension::HoldingTime => "holding_time",
            Dimension::RMultiple => "r_multiple",
            Dimension::Month => "month",
            Dimension::ProfitRange => "profit_range",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Aggregate for one key of one dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupStats {
    pub key: String,
    pub count: usize,
    pub wins: usize,
    pub losses: usize,
    pub total_profit: f64,
    pub average_profit: f64,
    pub win_rate: f64,
    pub profit_factor: Ratio,
}

/// All groups of one dimension. `excluded` counts trades that could not be keyed
/// (no usable timestamp, invalid pair, undefined R), so that
/// `sum(count) + excluded` equals the input length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Breakdown {
    pub dimension: Dimension,
    pub groups: Vec<GroupStats>,
    pub excluded: usize,
}

impl Breakdown {
    pub fn group(&self, key: &str) -> Option<&GroupStats> {
        self.groups.iter().find(|g| g.key == key)
    }

    pub fn counted(&self) -> usize {
        self.groups.iter().map(|g| g.count).sum()
    }

    /// Non-empty groups by summed profit, highest first, capped at `n`.
    pub fn top_by_profit(&self, n: usize) -> Vec<GroupStats> {
        self.ranked(n, |g| g.total_profit)
    }

    /// Non-empty groups by absolute summed profit, largest first, capped at `n`.
    pub fn top_by_abs_profit(&self, n: usize) -> Vec<GroupStats> {
        self.ranked(n, |g| g.total_profit.abs())
    }

    fn ranked(&self, n: usize, score: impl Fn(&GroupStats) -> f64) -> Vec<GroupStats> {
        let mut out: Vec<GroupStats> = self.groups.iter().filter(|g| g.count > 0).cloned().collect();
        // Stable sort: ties keep bucket order.
        out.sort_by(|a, b| score(b).total_cmp(&score(a)));
        out.truncate(n);
        out
    }
}

/// Loss total for one key, used for drawdown contribution charts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LossShare {
    pub key: String,
    pub loss: f64,
    pub count: usize,
}

/// Groups trades along every [`Dimension`].
pub struct BreakdownAnalyzer {
    pub basis: TimeBasis,
    pub r_edges: BucketEdges,
    pub profit_edges: BucketEdges,
}

impl Default for BreakdownAnalyzer {
    fn default() -> Self {
        Self::new(TimeBasis::default())
    }
}

impl BreakdownAnalyzer {
    pub fn new(basis: TimeBasis) -> Self {
        Self {
            basis,
            r_edges: BucketEdges::r_multiple_default(),
            profit_edges: BucketEdges::profit_default(),
        }
    }

    pub fn with_edges(mut self, r_edges: BucketEdges, profit_edges: BucketEdges) -> Self {
        self.r_edges = r_edges;
        self.profit_edges = profit_edges;
        self
    }

    pub fn analyze(&self, trades: &[Trade]) -> Vec<Breakdown> {
        Dimension::ALL
            .iter()
            .map(|dim| self.breakdown(trades, *dim))
            .collect()
    }

    pub fn breakdown(&self, trades: &[Trade], dimension: Dimension) -> Breakdown {
        let reference = reference_loss(trades);
        let mut keys: Vec<String> = self.fixed_keys(dimension);
        let mut index: HashMap<String, usize> =
            keys.iter().enumerate().map(|(i, k)| (k.clone(), i)).collect();
        let mut buckets: Vec<Vec<&Trade>> = vec![Vec::new(); keys.len()];
        let mut excluded = 0;

        for t in trades {
            let Some(key) = self.extract_key(t, dimension, reference) else {
                excluded += 1;
                continue;
            };
            let slot = *index.entry(key.clone()).or_insert_with(|| {
                keys.push(key);
                buckets.push(Vec::new());
                keys.len() - 1
            });
            buckets[slot].push(t);
        }

        let mut groups: Vec<GroupStats> = keys
            .iter()
            .zip(&buckets)
            .map(|(key, members)| compute_stats(key, members))
            .collect();
        if self.fixed_keys(dimension).is_empty() {
            groups.sort_by(|a, b| a.key.cmp(&b.key));
        }

        Breakdown {
            dimension,
            groups,
            excluded,
        }
    }

    /// Summed absolute loss per key over losing trades, largest first.
    pub fn loss_contribution(&self, trades: &[Trade], dimension: Dimension) -> Vec<LossShare> {
        let reference = reference_loss(trades);
        let mut shares: HashMap<String, LossShare> = HashMap::new();
        for t in trades.iter().filter(|t| t.is_loss()) {
            if let Some(key) = self.extract_key(t, dimension, reference) {
                let entry = shares.entry(key.clone()).or_insert(LossShare {
                    key,
                    loss: 0.0,
                    count: 0,
                });
                entry.loss += t.profit().abs();
                entry.count += 1;
            }
        }
        let mut out: Vec<LossShare> = shares.into_values().collect();
        out.sort_by(|a, b| b.loss.total_cmp(&a.loss).then_with(|| a.key.cmp(&b.key)));
        out
    }

    /// Every key of a fixed dimension in display order; empty for dynamic ones.
    fn fixed_keys(&self, dimension: Dimension) -> Vec<String> {
        match dimension {
            Dimension::Weekday => WEEK.iter().map(|d| weekday_name(*d).to_string()).collect(),
            Dimension::Hour => (0..24).map(|h| format!("{:02}", h)).collect(),
            Dimension::Session => Session::CHART.iter().map(|s| s.label().to_string()).collect(),
            Dimension::Direction => Side::ALL.iter().map(|s| s.as_str().to_string()).collect(),
            Dimension::HoldingTime => HOLDING_LABELS.iter().map(|l| l.to_string()).collect(),
            Dimension::RMultiple => self.r_edges.labels("R"),
            Dimension::ProfitRange => self.profit_edges.labels(""),
            Dimension::Pair | Dimension::Setup | Dimension::Month => Vec::new(),
        }
    }

    fn extract_key(&self, t: &Trade, dimension: Dimension, reference: Option<f64>) -> Option<String> {
        let basis = &self.basis;
        match dimension {
            Dimension::Weekday => {
                let local = basis.to_local(t.entry_time(basis)?);
                Some(weekday_name(local.weekday()).to_string())
            }
            Dimension::Hour => {
                let local = basis.to_local(t.entry_time(basis)?);
                Some(format!("{:02}", local.hour()))
            }
            Dimension::Session => {
                let local = basis.to_local(t.entry_time(basis)?);
                Some(Session::for_hour(local.hour()).label().to_string())
            }
            Dimension::Pair => t
                .has_valid_pair()
                .then(|| t.pair().to_ascii_uppercase()),
            Dimension::Setup => Some(t.setup_label()),
            Dimension::Direction => Some(t.side().as_str().to_string()),
            Dimension::HoldingTime => {
                let minutes = t.holding_minutes(basis)?;
                Some(HOLDING_LABELS[holding_bucket(minutes)].to_string())
            }
            Dimension::RMultiple => {
                let r = r_multiple(t, reference?)?;
                let labels = self.r_edges.labels("R");
                labels.get(self.r_edges.index_of(r)).cloned()
            }
            Dimension::Month => {
                let local = basis.to_local(t.exit_time(basis)?);
                Some(local.format("%Y-%m").to_string())
            }
            Dimension::ProfitRange => {
                let labels = self.profit_edges.labels("");
                labels.get(self.profit_edges.index_of(t.profit())).cloned()
            }
        }
    }
}

fn compute_stats(key: &str, trades: &[&Trade]) -> GroupStats {
    let count = trades.len();
    let wins = trades.iter().filter(|t| t.is_win()).count();
    let losses = trades.iter().filter(|t| t.is_loss()).count();
    let total_profit: f64 = trades.iter().map(|t| t.profit()).sum();
    let gross_profit: f64 = trades.iter().map(|t| t.profit()).filter(|p| *p > 0.0).sum();
    let gross_loss: f64 = trades.iter().map(|t| t.profit()).filter(|p| *p < 0.0).sum();

    let (average_profit, win_rate) = if count > 0 {
        (total_profit / count as f64, wins as f64 / count as f64)
    } else {
        (0.0, 0.0)
    };

    GroupStats {
        key: key.to_string(),
        count,
        wins,
        losses,
        total_profit,
        average_profit,
        win_rate,
        profit_factor: Ratio::of(gross_profit, gross_loss),
    }
}
