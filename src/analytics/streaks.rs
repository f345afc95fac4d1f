use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::analytics::kpis::chronological;
use crate::core::timestamps::TimeBasis;
use crate::models::Trade;

/// Maximal runs of consecutive wins (positive length) and losses (negative length),
/// in close-time order. A breakeven trade ends the current run and starts none.
/// Trades without a usable close time are skipped.
pub fn streaks(trades: &[Trade], basis: &TimeBasis) -> Vec<i64> {
    let mut runs = Vec::new();
    let mut current: i64 = 0;

    for (_, t) in chronological(trades, basis) {
        let profit = t.profit();
        let step = if profit > 0.0 {
            1
        } else if profit < 0.0 {
            -1
        } else {
            0
        };

        if step == 0 || (current != 0 && current.signum() != step) {
            if current != 0 {
                runs.push(current);
            }
            current = step;
        } else {
            current += step;
        }
    }
    if current != 0 {
        runs.push(current);
    }
    runs
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StreakSummary {
    pub max_win_streak: usize,
    pub max_loss_streak: usize,
    /// Close time of the trade that completed the longest winning run.
    pub max_win_streak_end: Option<DateTime<Utc>>,
    pub max_loss_streak_end: Option<DateTime<Utc>>,
    /// Signed length of the run in progress at the last trade (0 after a breakeven).
    pub current: i64,
}

impl StreakSummary {
    pub fn compute(trades: &[Trade], basis: &TimeBasis) -> Self {
        let mut summary = StreakSummary::default();
        let mut current: i64 = 0;

        for (at, t) in chronological(trades, basis) {
            let profit = t.profit();
            if profit > 0.0 {
                current = if current > 0 { current + 1 } else { 1 };
                if current as usize > summary.max_win_streak {
                    summary.max_win_streak = current as usize;
                    summary.max_win_streak_end = Some(at);
                }
            } else if profit < 0.0 {
                current = if current < 0 { current - 1 } else { -1 };
                if current.unsigned_abs() as usize > summary.max_loss_streak {
                    summary.max_loss_streak = current.unsigned_abs() as usize;
                    summary.max_loss_streak_end = Some(at);
                }
            } else {
                current = 0;
            }
        }
        summary.current = current;
        summary
    }
}
