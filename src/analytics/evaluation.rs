//! Monthly scorecard: five axes scored 0-10 and an overall trader level.

use chrono::Timelike;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::analytics::breakdown::{BreakdownAnalyzer, Dimension};
use crate::analytics::kpis::Kpis;
use crate::core::timestamps::TimeBasis;
use crate::models::{round_to, Trade};

/// Local entry hours counted as the trader's preferred window (European session).
const PREFERRED_HOURS: std::ops::RangeInclusive<u32> = 9..=16;
/// Losses up to this multiple of the average loss count as cut on plan.
const LOSS_CUT_TOLERANCE: f64 = 1.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rating {
    Excellent,
    Good,
    Fair,
    NeedsWork,
}

impl Rating {
    pub fn from_score(score: f64) -> Self {
        if score >= 9.0 {
            Rating::Excellent
        } else if score >= 7.0 {
            Rating::Good
        } else if score >= 5.0 {
            Rating::Fair
        } else {
            Rating::NeedsWork
        }
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rating::Excellent => write!(f, "excellent"),
            Rating::Good => write!(f, "good"),
            Rating::Fair => write!(f, "fair"),
            Rating::NeedsWork => write!(f, "needs work"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TraderLevel {
    S,
    A,
    B,
    C,
    D,
}

impl TraderLevel {
    pub fn from_score(overall: f64) -> Self {
        if overall >= 9.0 {
            TraderLevel::S
        } else if overall >= 7.5 {
            TraderLevel::A
        } else if overall >= 6.0 {
            TraderLevel::B
        } else if overall >= 4.0 {
            TraderLevel::C
        } else {
            TraderLevel::D
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            TraderLevel::S => "professional",
            TraderLevel::A => "advanced",
            TraderLevel::B => "intermediate",
            TraderLevel::C => "novice",
            TraderLevel::D => "beginner",
        }
    }
}

impl fmt::Display for TraderLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} ({})", self, self.title())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Scores {
    pub overall: f64,
    pub entry_skill: f64,
    pub drawdown_control: f64,
    pub risk_reward: f64,
    pub risk_management: f64,
    pub profit_stability: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvaluationDetails {
    /// Percent.
    pub win_rate: f64,
    /// Percent of trades opened in the preferred window.
    pub session_match_rate: f64,
    pub max_drawdown: f64,
    /// Max drawdown as a percent of summed absolute profit.
    pub drawdown_ratio: f64,
    pub reward_risk: f64,
    pub average_win: f64,
    /// Magnitude.
    pub average_loss: f64,
    /// Percent of losing trades cut within tolerance of the average loss.
    pub loss_cut_rate: f64,
    /// Magnitude of the worst losing trade.
    pub max_loss: f64,
    pub months: usize,
    pub positive_months: usize,
    pub average_monthly_profit: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyEvaluation {
    pub scores: Scores,
    pub ratings: [Rating; 5],
    pub details: EvaluationDetails,
    pub level: TraderLevel,
}

impl MonthlyEvaluation {
    /// Score `month` (the trades under review) against `history` (all trades, used
    /// for month-over-month stability).
    pub fn compute(month: &[Trade], history: &[Trade], basis: &TimeBasis) -> Self {
        if month.is_empty() {
            return MonthlyEvaluation {
                scores: Scores::default(),
                ratings: [Rating::NeedsWork; 5],
                details: EvaluationDetails::default(),
                level: TraderLevel::D,
            };
        }

        let k = Kpis::compute(month, basis);
        let win_rate = k.win_rate * 100.0;

        let preferred = month
            .iter()
            .filter_map(|t| t.entry_time(basis))
            .filter(|at| PREFERRED_HOURS.contains(&basis.to_local(*at).hour()))
            .count();
        let session_match_rate = preferred as f64 / month.len() as f64 * 100.0;

        let average_loss = k.average_loss.abs();
        let reward_risk = k.payoff_ratio.unwrap_or(0.0);
        let losses: Vec<f64> = month
            .iter()
            .map(Trade::profit)
            .filter(|p| *p < 0.0)
            .map(f64::abs)
            .collect();
        let loss_cut_rate = if losses.is_empty() {
            100.0
        } else {
            let on_plan = losses
                .iter()
                .filter(|l| **l <= average_loss * LOSS_CUT_TOLERANCE)
                .count();
            on_plan as f64 / losses.len() as f64 * 100.0
        };
        let max_loss = losses.iter().copied().fold(0.0, f64::max);

        let monthly = BreakdownAnalyzer::new(*basis).breakdown(history, Dimension::Month);
        let months = monthly.groups.len();
        let positive_months = monthly.groups.iter().filter(|g| g.total_profit > 0.0).count();
        let average_monthly_profit = if months > 0 {
            monthly.groups.iter().map(|g| g.total_profit).sum::<f64>() / months as f64
        } else {
            0.0
        };

        let entry = clamp_score(win_rate / 10.0 + session_match_rate / 20.0);
        let drawdown = clamp_score(10.0 - k.drawdown_ratio / 2.0);
        let rr = clamp_score(reward_risk * 3.0);
        let risk = clamp_score(loss_cut_rate / 10.0);
        let stability = if months > 0 {
            clamp_score(positive_months as f64 / months as f64 * 10.0)
        } else {
            0.0
        };
        let overall = (entry + drawdown + rr + risk + stability) / 5.0;

        MonthlyEvaluation {
            scores: Scores {
                overall: round_to(overall, 1),
                entry_skill: round_to(entry, 1),
                drawdown_control: round_to(drawdown, 1),
                risk_reward: round_to(rr, 1),
                risk_management: round_to(risk, 1),
                profit_stability: round_to(stability, 1),
            },
            ratings: [
                Rating::from_score(entry),
                Rating::from_score(drawdown),
                Rating::from_score(rr),
                Rating::from_score(risk),
                Rating::from_score(stability),
            ],
            details: EvaluationDetails {
                win_rate: round_to(win_rate, 1),
                session_match_rate: round_to(session_match_rate, 1),
                max_drawdown: k.max_drawdown,
                drawdown_ratio: round_to(k.drawdown_ratio, 1),
                reward_risk: round_to(reward_risk, 2),
                average_win: k.average_win,
                average_loss,
                loss_cut_rate: round_to(loss_cut_rate, 1),
                max_loss,
                months,
                positive_months,
                average_monthly_profit,
            },
            level: TraderLevel::from_score(overall),
        }
    }
}

fn clamp_score(score: f64) -> f64 {
    score.clamp(0.0, 10.0)
}

/// Trades whose local close month is `year_month` (`"YYYY-MM"`).
pub fn trades_in_month(trades: &[Trade], year_month: &str, basis: &TimeBasis) -> Vec<Trade> {
    trades
        .iter()
        .filter(|t| {
            t.exit_time(basis)
                .map(|at| basis.to_local(at).format("%Y-%m").to_string() == year_month)
                .unwrap_or(false)
        })
        .cloned()
        .collect()
}
