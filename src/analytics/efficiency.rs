use serde::{Deserialize, Serialize};

use crate::core::timestamps::TimeBasis;
use crate::models::Trade;

/// Realized pips over maximum favourable excursion, for winning trades.
///
/// `None` when the trade did not win, has no pips, or the excursion is missing or
/// not positive.
pub fn exit_efficiency(trade: &Trade) -> Option<f64> {
    let pips = winning_pips(trade)?;
    let mfe = trade.mfe_pips.filter(|m| *m > 0.0)?;
    Some(pips / mfe)
}

fn winning_pips(trade: &Trade) -> Option<f64> {
    trade.pips().filter(|p| *p > 0.0)
}

fn losing_pips(trade: &Trade) -> Option<f64> {
    trade.pips().filter(|p| *p < 0.0)
}

/// Per-trade execution quality. All values are fractions (0.8 = 80%) except
/// `time_efficiency` (pips per hour) and `stop_r_multiple`; `None` means
/// "not applicable or not enough data".
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TradeEfficiency {
    pub exit_efficiency: Option<f64>,
    /// Share of the favourable excursion left on the table.
    pub missed_potential: Option<f64>,
    /// Realized pips over the maximum gain reachable, including after exit.
    pub potential_capture: Option<f64>,
    /// Realized loss over maximum adverse excursion, for losing trades.
    pub stop_efficiency: Option<f64>,
    pub time_efficiency: Option<f64>,
    /// Realized pips over planned take-profit distance.
    pub opportunity_rate: Option<f64>,
    /// Realized pips over stop distance.
    pub stop_r_multiple: Option<f64>,
    pub planned_reward_risk: Option<f64>,
}

impl TradeEfficiency {
    pub fn compute(trade: &Trade, basis: &TimeBasis) -> Self {
        let win = winning_pips(trade);

        let missed_potential = win.and_then(|pips| {
            let mfe = trade.mfe_pips.filter(|m| *m > 0.0)?;
            Some((mfe - pips) / mfe)
        });

        let potential_capture = win.and_then(|pips| {
            let max_gain = trade.max_possible_gain_pips.filter(|m| *m > 0.0)?;
            Some(pips / max_gain)
        });

        let stop_efficiency = losing_pips(trade).and_then(|pips| {
            let mae = trade.mae_pips.filter(|m| *m < 0.0)?;
            Some(pips.abs() / mae.abs())
        });

        let time_efficiency = trade.pips().and_then(|pips| {
            let minutes = trade.holding_minutes(basis).filter(|m| *m > 0)?;
            Some(pips / (minutes as f64 / 60.0))
        });

        let opportunity_rate = win.and_then(|pips| {
            let planned = trade.planned_tp_pips.filter(|p| *p > 0.0)?;
            Some(pips / planned)
        });

        let stop_r_multiple = trade
            .pips()
            .and_then(|pips| Some(pips / trade.stop_distance_pips()?));

        TradeEfficiency {
            exit_efficiency: exit_efficiency(trade),
            missed_potential,
            potential_capture,
            stop_efficiency,
            time_efficiency,
            opportunity_rate,
            stop_r_multiple,
            planned_reward_risk: trade.planned_reward_risk(),
        }
    }
}

/// Mean exit efficiency over the winning trades that carry an excursion.
pub fn average_exit_efficiency(trades: &[Trade]) -> Option<f64> {
    let values: Vec<f64> = trades.iter().filter_map(exit_efficiency).collect();
    (!values.is_empty()).then(|| values.iter().sum::<f64>() / values.len() as f64)
}
