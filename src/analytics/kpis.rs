use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::timestamps::TimeBasis;
use crate::models::{Ratio, Trade};

/// Headline statistics for a (filtered) trade list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Kpis {
    pub trade_count: usize,
    pub win_count: usize,
    pub loss_count: usize,
    pub breakeven_count: usize,
    pub win_rate: f64,

    pub total_profit: f64,
    pub gross_profit: f64,
    pub gross_loss: f64,
    pub profit_factor: Ratio,
    /// Expectancy: average profit per trade.
    pub average_profit: f64,
    pub average_win: f64,
    /// Average losing trade, negative (0 without losses).
    pub average_loss: f64,
    pub payoff_ratio: Option<f64>,
    pub best_trade: f64,
    pub worst_trade: f64,
    pub average_r_multiple: Option<f64>,

    pub max_drawdown: f64,
    /// Max drawdown as a percentage of the summed absolute profit.
    pub drawdown_ratio: f64,
    pub sharpe_ratio: f64,

    pub average_pips_signed: f64,
    pub average_pips_unsigned: f64,
    pub pips_sample: usize,
    pub average_holding_minutes: Option<f64>,

    pub total_commission: f64,
    pub total_swap: f64,
    pub net_profit: f64,
}

impl Kpis {
    pub fn compute(trades: &[Trade], basis: &TimeBasis) -> Self {
        let trade_count = trades.len();
        if trade_count == 0 {
            return Kpis::default();
        }

        let profits: Vec<f64> = trades.iter().map(Trade::profit).collect();
        let win_count = profits.iter().filter(|p| **p > 0.0).count();
        let loss_count = profits.iter().filter(|p| **p < 0.0).count();

        let total_profit = total_profit(trades);
        let gross_profit = gross_profit(trades);
        let gross_loss = gross_loss(trades);

        let average_win = if win_count > 0 {
            gross_profit / win_count as f64
        } else {
            0.0
        };
        let average_loss = reference_loss(trades).unwrap_or(0.0);
        let payoff_ratio = (average_loss < 0.0).then(|| average_win / average_loss.abs());

        let max_drawdown = max_drawdown(trades, basis);
        let abs_total: f64 = profits.iter().map(|p| p.abs()).sum();
        let drawdown_ratio = if abs_total > 0.0 {
            max_drawdown / abs_total * 100.0
        } else {
            0.0
        };

        let holds: Vec<i64> = trades
            .iter()
            .filter_map(|t| t.holding_minutes(basis))
            .collect();
        let average_holding_minutes = (!holds.is_empty())
            .then(|| holds.iter().sum::<i64>() as f64 / holds.len() as f64);

        let average_profit = average_profit(trades);

        Kpis {
            trade_count,
            win_count,
            loss_count,
            breakeven_count: trade_count - win_count - loss_count,
            win_rate: win_rate(trades),
            total_profit,
            gross_profit,
            gross_loss,
            profit_factor: profit_factor(trades),
            average_profit,
            average_win,
            average_loss,
            payoff_ratio,
            best_trade: profits.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            worst_trade: profits.iter().copied().fold(f64::INFINITY, f64::min),
            average_r_multiple: (average_loss < 0.0).then(|| average_profit / average_loss.abs()),
            max_drawdown,
            drawdown_ratio,
            sharpe_ratio: sharpe_ratio(trades),
            average_pips_signed: average_pips_signed(trades),
            average_pips_unsigned: average_pips_unsigned(trades),
            pips_sample: trades.iter().filter(|t| t.pips().is_some()).count(),
            average_holding_minutes,
            total_commission: trades.iter().filter_map(|t| t.commission).sum(),
            total_swap: trades.iter().filter_map(|t| t.swap).sum(),
            net_profit: trades.iter().map(Trade::net_profit).sum(),
        }
    }
}

pub fn total_profit(trades: &[Trade]) -> f64 {
    trades.iter().map(Trade::profit).sum()
}

pub fn gross_profit(trades: &[Trade]) -> f64 {
    trades.iter().map(Trade::profit).filter(|p| *p > 0.0).sum()
}

/// Absolute sum of losing profits.
pub fn gross_loss(trades: &[Trade]) -> f64 {
    trades
        .iter()
        .map(Trade::profit)
        .filter(|p| *p < 0.0)
        .sum::<f64>()
        .abs()
}

pub fn win_rate(trades: &[Trade]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    trades.iter().filter(|t| t.is_win()).count() as f64 / trades.len() as f64
}

pub fn average_profit(trades: &[Trade]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    total_profit(trades) / trades.len() as f64
}

pub fn profit_factor(trades: &[Trade]) -> Ratio {
    Ratio::of(gross_profit(trades), gross_loss(trades))
}

/// Average losing trade (negative), the usual 1R reference. `None` without losses.
pub fn reference_loss(trades: &[Trade]) -> Option<f64> {
    let losses: Vec<f64> = trades
        .iter()
        .map(Trade::profit)
        .filter(|p| *p < 0.0)
        .collect();
    (!losses.is_empty()).then(|| losses.iter().sum::<f64>() / losses.len() as f64)
}

/// Profit in units of `|reference_loss|`; `None` when the reference is zero.
pub fn r_multiple(trade: &Trade, reference_loss: f64) -> Option<f64> {
    let risk = reference_loss.abs();
    (risk > 0.0).then(|| trade.profit() / risk)
}

/// Mean signed pips over trades with pips available. For expectancy-style figures.
pub fn average_pips_signed(trades: &[Trade]) -> f64 {
    mean(trades.iter().filter_map(Trade::pips))
}

/// Mean absolute pips over trades with pips available. For "pips moved" figures.
pub fn average_pips_unsigned(trades: &[Trade]) -> f64 {
    mean(trades.iter().filter_map(Trade::pips).map(f64::abs))
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if n == 0 {
        0.0
    } else {
        sum / n as f64
    }
}

/// Per-trade Sharpe-like ratio: mean profit over sample standard deviation.
pub fn sharpe_ratio(trades: &[Trade]) -> f64 {
    if trades.len() < 2 {
        return 0.0;
    }
    let n = trades.len() as f64;
    let avg = average_profit(trades);
    let variance = trades
        .iter()
        .map(|t| (t.profit() - avg).powi(2))
        .sum::<f64>()
        / (n - 1.0);
    let std_dev = variance.sqrt();
    if std_dev > 0.0 {
        avg / std_dev
    } else {
        0.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquityPoint {
    pub at: DateTime<Utc>,
    pub trade_id: String,
    pub profit: f64,
    pub equity: f64,
    pub peak: f64,
    pub drawdown: f64,
}

/// Trades with a usable close time, in close order (ties keep input order).
pub fn chronological<'a>(trades: &'a [Trade], basis: &TimeBasis) -> Vec<(DateTime<Utc>, &'a Trade)> {
    let mut timed: Vec<(DateTime<Utc>, &Trade)> = trades
        .iter()
        .filter_map(|t| t.exit_time(basis).map(|at| (at, t)))
        .collect();
    timed.sort_by_key(|(at, _)| *at);
    timed
}

/// Cumulative equity from zero. The running peak also starts at zero, so early
/// losses count as drawdown.
pub fn equity_curve(trades: &[Trade], basis: &TimeBasis) -> Vec<EquityPoint> {
    let mut equity = 0.0;
    let mut peak = 0.0_f64;
    chronological(trades, basis)
        .into_iter()
        .map(|(at, t)| {
            equity += t.profit();
            peak = peak.max(equity);
            EquityPoint {
                at,
                trade_id: t.id().to_string(),
                profit: t.profit(),
                equity,
                peak,
                drawdown: peak - equity,
            }
        })
        .collect()
}

pub fn max_drawdown(trades: &[Trade], basis: &TimeBasis) -> f64 {
    equity_curve(trades, basis)
        .iter()
        .map(|p| p.drawdown)
        .fold(0.0, f64::max)
}
