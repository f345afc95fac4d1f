use serde::{Deserialize, Serialize};

use crate::analytics::breakdown::{Breakdown, GroupStats};
use crate::analytics::kpis::Kpis;
use crate::models::Ratio;

/// Three-line coach note shown next to a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoachComment {
    pub insight: String,
    pub attention: String,
    pub next_action: String,
}

/// Overall performance note.
pub fn dashboard_comment(k: &Kpis) -> CoachComment {
    let gross = k.total_profit;
    let win_pct = k.win_rate * 100.0;

    let insight = if gross > 0.0 {
        format!(
            "Total P&L is {} and still positive. Win rate {:.1}% with PF {} is a steady result.",
            yen(gross),
            win_pct,
            k.profit_factor
        )
    } else {
        format!(
            "Total P&L is currently {}. Looking for improvements across {} trades.",
            yen(gross),
            k.trade_count
        )
    };

    let attention = if k.max_drawdown > gross.abs() * 0.5 {
        format!(
            "Max drawdown is {}, on the large side. Review risk per trade.",
            yen(k.max_drawdown)
        )
    } else if k.win_rate < 0.4 {
        format!(
            "Win rate is {:.1}%, a little low. Aim to cut losses short and let winners run.",
            win_pct
        )
    } else if below(k.profit_factor, 1.2) {
        format!(
            "Profit factor is {}. Look for ways to let profits extend.",
            k.profit_factor
        )
    } else {
        "Results are stable. Keep this pace.".to_string()
    };

    let next_action = if gross > 0.0 {
        "Check which hours and pairs work best for you and concentrate there."
    } else {
        "Start by finding your winning pattern in the hour and pair breakdowns."
    };

    CoachComment {
        insight,
        attention,
        next_action: next_action.to_string(),
    }
}

/// Money-management note, driven by drawdown relative to cumulative P&L.
pub fn balance_comment(k: &Kpis) -> CoachComment {
    let gross = k.total_profit;
    let dd = k.max_drawdown;

    let (insight, attention, next_action) = if gross > 0.0 && dd < gross * 0.3 {
        (
            format!(
                "Cumulative P&L is {} with drawdown held to {}. Money management looks good.",
                yen(gross),
                yen(dd)
            ),
            "Keep this up while building further gains.",
            "Focus on your best pairs and hours, and consider optimizing lot size.",
        )
    } else if dd > gross.abs() {
        (
            format!("Max drawdown of {} exceeds cumulative P&L.", yen(dd)),
            "Risk management needs attention now. Review the risk taken per trade.",
            "Start by keeping each stop within 1-2% of account equity.",
        )
    } else {
        (
            format!("Cumulative P&L is currently {}.", yen(gross)),
            "Look at when and why drawdowns happen so the same mistakes are not repeated.",
            "Check the trades made during drawdowns and plan to avoid that pattern.",
        )
    };

    CoachComment {
        insight,
        attention: attention.to_string(),
        next_action: next_action.to_string(),
    }
}

/// Best and worst hour of entry.
pub fn time_axis_comment(hours: &Breakdown) -> CoachComment {
    let (best, worst) = standouts(hours);
    let label = |g: &GroupStats| format!("{}:00", g.key);

    let Some(best) = best.filter(|g| g.total_profit > 0.0) else {
        return CoachComment {
            insight: "Not enough trades per hour yet. Keep trading to see the pattern.".to_string(),
            attention: "At least 10 trades per hour make the breakdown reliable.".to_string(),
            next_action: "Try different hours and find the ones that suit you.".to_string(),
        };
    };

    let attention = match worst.filter(|g| g.total_profit < 0.0) {
        Some(w) => format!("On the other hand, {} lost {}.", label(w), yen(w.total_profit.abs())),
        None => "Look for the same pattern in other hours.".to_string(),
    };
    let next_action = match worst {
        Some(w) => format!(
            "For now, focus on {} and only watch the market at {}.",
            label(best),
            label(w)
        ),
        None => format!("For now, focus on {} and trade it more often.", label(best)),
    };

    CoachComment {
        insight: format!(
            "Your best results come at {} (+{}).",
            label(best),
            yen(best.total_profit)
        ),
        attention,
        next_action,
    }
}

/// Best and worst currency pair.
pub fn pair_comment(pairs: &Breakdown) -> CoachComment {
    let (best, worst) = standouts(pairs);

    let Some(best) = best.filter(|g| g.total_profit > 0.0) else {
        return CoachComment {
            insight: "Not enough trades per pair yet. Keep building data to learn each pair.".to_string(),
            attention: "Every pair has its own volatility and rhythm.".to_string(),
            next_action: "Start with one or two pairs and learn them well.".to_string(),
        };
    };

    let attention = match worst.filter(|g| g.total_profit < 0.0) {
        Some(w) => format!("{} lost {}.", w.key, yen(w.total_profit.abs())),
        None => "Check whether the same pattern works on other pairs.".to_string(),
    };
    let next_action = match worst {
        Some(w) => format!("Center your trading on {} and hold off on {} for now.", best.key, w.key),
        None => format!("Center your trading on {} and expand to other pairs carefully.", best.key),
    };

    CoachComment {
        insight: format!("{} gives your best results (+{}).", best.key, yen(best.total_profit)),
        attention,
        next_action,
    }
}

/// Average win against average loss.
pub fn risk_comment(k: &Kpis) -> CoachComment {
    let rr = if k.average_win != 0.0 && k.average_loss != 0.0 {
        (k.average_win / k.average_loss).abs()
    } else {
        0.0
    };

    let (insight, attention, next_action) = if rr > 1.5 {
        (
            format!(
                "Average win {} against average loss {} gives a reward/risk of {:.2}, a good ratio.",
                yen(k.average_win),
                yen(k.average_loss),
                rr
            ),
            "Hold this ratio and lift the win rate step by step for steadier results.",
            "Review trades regularly to check you are not taking profit too early.",
        )
    } else if rr < 1.0 {
        (
            format!(
                "Average win is {} and average loss is {}.",
                yen(k.average_win),
                yen(k.average_loss.abs())
            ),
            "Reward/risk below 1.0 needs a high win rate. Aim for small losses and large wins.",
            "Practice cutting losses early and taking profit late.",
        )
    } else {
        (
            format!("Reward/risk is around {:.2}.", rr),
            "The balance is not bad, but there is room to improve.",
            "Review take-profit levels and let profits run while the trend lasts.",
        )
    };

    CoachComment {
        insight,
        attention: attention.to_string(),
        next_action: next_action.to_string(),
    }
}

/// Best and worst setup tag.
pub fn strategy_comment(setups: &Breakdown) -> CoachComment {
    let (best, worst) = standouts(setups);

    let Some(best) = best.filter(|g| g.total_profit > 0.0) else {
        return CoachComment {
            insight: "Setup data is still building. Keep recording to see which setups work.".to_string(),
            attention: "Tagging setups consistently makes this breakdown more accurate.".to_string(),
            next_action: "Tag every trade with its setup and track which ones work.".to_string(),
        };
    };

    let attention = match worst.filter(|g| g.total_profit < 0.0) {
        Some(w) => format!("On the other hand, the {} setup lost {}.", w.key, yen(w.total_profit.abs())),
        None => "Keep refining this setup.".to_string(),
    };

    CoachComment {
        insight: format!(
            "The {} setup has your best record (+{}).",
            best.key,
            yen(best.total_profit)
        ),
        attention,
        next_action: format!(
            "Focus on the {} setup and write down its entry and exit rules so it can be repeated.",
            best.key
        ),
    }
}

/// Most and least profitable non-empty groups; no worst when only one group traded.
fn standouts(b: &Breakdown) -> (Option<&GroupStats>, Option<&GroupStats>) {
    let traded = || b.groups.iter().filter(|g| g.count > 0);
    let best = traded().fold(None, |acc: Option<&GroupStats>, g| match acc {
        Some(a) if a.total_profit >= g.total_profit => Some(a),
        _ => Some(g),
    });
    let worst = traded().fold(None, |acc: Option<&GroupStats>, g| match acc {
        Some(a) if a.total_profit <= g.total_profit => Some(a),
        _ => Some(g),
    });
    let worst = worst.filter(|w| best.map(|top| top.key != w.key).unwrap_or(false));
    (best, worst)
}

fn below(pf: Ratio, threshold: f64) -> bool {
    pf.value().map(|v| v < threshold).unwrap_or(false)
}

/// Rounded yen amount with thousands separators, e.g. `-12,345 JPY`.
pub fn yen(amount: f64) -> String {
    let rounded = amount.round() as i64;
    let digits = rounded.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    let sign = if rounded < 0 { "-" } else { "" };
    format!("{sign}{grouped} JPY")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::breakdown::{BreakdownAnalyzer, Dimension};
    use crate::core::timestamps::TimeBasis;
    use crate::models::{Side, Trade};
    use crate::test_helpers::{at, series, trade};

    fn kpis(profits: &[f64]) -> Kpis {
        Kpis::compute(&series(profits), &TimeBasis::default())
    }

    fn tagged(rows: &[(&str, &str, &str, f64)]) -> Vec<Trade> {
        rows.iter()
            .enumerate()
            .map(|(i, (pair, setup, open, p))| {
                let mut t = at(trade(&i.to_string(), pair, Side::Long, *p), open, open);
                t.setup = Some(setup.to_string());
                t
            })
            .collect()
    }

    fn by(trades: &[Trade], dimension: Dimension) -> Breakdown {
        BreakdownAnalyzer::default().breakdown(trades, dimension)
    }

    #[test]
    fn yen_groups_thousands() {
        assert_eq!(yen(0.0), "0 JPY");
        assert_eq!(yen(999.4), "999 JPY");
        assert_eq!(yen(1234567.0), "1,234,567 JPY");
        assert_eq!(yen(-12345.6), "-12,346 JPY");
    }

    #[test]
    fn stable_profitable_record() {
        // DD 100 vs gross 1000, WR 75%, PF 11
        let c = dashboard_comment(&kpis(&[500.0, -100.0, 300.0, 300.0]));
        assert!(c.insight.starts_with("Total P&L is 1,000 JPY and still positive"));
        assert_eq!(c.attention, "Results are stable. Keep this pace.");
        assert!(c.next_action.starts_with("Check which hours"));
    }

    #[test]
    fn drawdown_warning_takes_priority() {
        let c = dashboard_comment(&kpis(&[100.0, -400.0, 350.0]));
        assert!(c.attention.starts_with("Max drawdown is 400 JPY"));
    }

    #[test]
    fn low_win_rate() {
        // gross 1000, DD 300 < 500, WR 1/4
        let c = dashboard_comment(&kpis(&[-100.0, -100.0, -100.0, 1300.0]));
        assert!(c.attention.starts_with("Win rate is 25.0%"));
    }

    #[test]
    fn thin_profit_factor() {
        // L W L W ... L: 11 losses of 10, 10 wins of 13. DD 10, gross 20, WR 10/21, PF 1.18
        let profits: Vec<f64> = (0..21).map(|i| if i % 2 == 0 { -10.0 } else { 13.0 }).collect();
        let c = dashboard_comment(&kpis(&profits));
        assert_eq!(c.attention, "Profit factor is 1.18. Look for ways to let profits extend.");
    }

    #[test]
    fn unbounded_profit_factor_is_not_low() {
        let c = dashboard_comment(&kpis(&[100.0, 200.0]));
        assert_eq!(c.attention, "Results are stable. Keep this pace.");
        assert!(c.insight.contains("PF ∞"));
    }

    #[test]
    fn losing_record() {
        let c = dashboard_comment(&kpis(&[-100.0, 50.0]));
        assert!(c.insight.starts_with("Total P&L is currently -50 JPY"));
        assert!(c.next_action.starts_with("Start by finding"));
    }

    #[test]
    fn balance_branches() {
        let good = balance_comment(&kpis(&[1000.0, -100.0, 500.0]));
        assert!(good.insight.contains("Money management looks good"));

        let bad = balance_comment(&kpis(&[100.0, -500.0, 200.0]));
        assert!(bad.insight.starts_with("Max drawdown of 500 JPY"));

        let mid = balance_comment(&kpis(&[1000.0, -500.0, 600.0]));
        assert_eq!(mid.insight, "Cumulative P&L is currently 1,100 JPY.");
    }

    #[test]
    fn time_axis_names_best_and_worst_hour() {
        let trades = tagged(&[
            ("EURUSD", "Breakout", "2024-01-15 09:10:00", 1200.0),
            ("EURUSD", "Breakout", "2024-01-15 09:40:00", 300.0),
            ("EURUSD", "Breakout", "2024-01-15 14:05:00", -800.0),
            ("EURUSD", "Breakout", "2024-01-15 21:00:00", 100.0),
        ]);
        let c = time_axis_comment(&by(&trades, Dimension::Hour));
        assert_eq!(c.insight, "Your best results come at 09:00 (+1,500 JPY).");
        assert_eq!(c.attention, "On the other hand, 14:00 lost 800 JPY.");
        assert_eq!(
            c.next_action,
            "For now, focus on 09:00 and only watch the market at 14:00."
        );
    }

    #[test]
    fn time_axis_without_losing_hour() {
        let trades = tagged(&[
            ("EURUSD", "Breakout", "2024-01-15 09:00:00", 500.0),
            ("EURUSD", "Breakout", "2024-01-15 10:00:00", 200.0),
        ]);
        let c = time_axis_comment(&by(&trades, Dimension::Hour));
        assert_eq!(c.attention, "Look for the same pattern in other hours.");
        assert!(c.next_action.ends_with("only watch the market at 10:00."));

        let single = tagged(&[("EURUSD", "Breakout", "2024-01-15 09:00:00", 500.0)]);
        let c = time_axis_comment(&by(&single, Dimension::Hour));
        assert_eq!(c.next_action, "For now, focus on 09:00 and trade it more often.");
    }

    #[test]
    fn time_axis_without_profitable_hour() {
        let trades = tagged(&[("EURUSD", "Breakout", "2024-01-15 09:00:00", -500.0)]);
        let c = time_axis_comment(&by(&trades, Dimension::Hour));
        assert!(c.insight.starts_with("Not enough trades per hour"));
        assert!(time_axis_comment(&by(&[], Dimension::Hour)).attention.contains("10 trades"));
    }

    #[test]
    fn pair_comment_branches() {
        let trades = tagged(&[
            ("GBPJPY", "Breakout", "2024-01-15 09:00:00", 2500.0),
            ("EURUSD", "Breakout", "2024-01-15 10:00:00", 400.0),
            ("USDJPY", "Breakout", "2024-01-15 11:00:00", -1200.0),
        ]);
        let c = pair_comment(&by(&trades, Dimension::Pair));
        assert_eq!(c.insight, "GBPJPY gives your best results (+2,500 JPY).");
        assert_eq!(c.attention, "USDJPY lost 1,200 JPY.");
        assert_eq!(
            c.next_action,
            "Center your trading on GBPJPY and hold off on USDJPY for now."
        );

        let single = tagged(&[("GBPJPY", "Breakout", "2024-01-15 09:00:00", 2500.0)]);
        let c = pair_comment(&by(&single, Dimension::Pair));
        assert_eq!(c.attention, "Check whether the same pattern works on other pairs.");
        assert!(c.next_action.contains("expand to other pairs carefully"));

        let losing = tagged(&[("GBPJPY", "Breakout", "2024-01-15 09:00:00", -10.0)]);
        let c = pair_comment(&by(&losing, Dimension::Pair));
        assert!(c.next_action.starts_with("Start with one or two pairs"));
    }

    #[test]
    fn risk_comment_branches() {
        // avg win 400, avg loss -200
        let good = risk_comment(&kpis(&[400.0, -200.0, 400.0]));
        assert_eq!(
            good.insight,
            "Average win 400 JPY against average loss -200 JPY gives a reward/risk of 2.00, a good ratio."
        );

        let poor = risk_comment(&kpis(&[100.0, -300.0]));
        assert_eq!(poor.insight, "Average win is 100 JPY and average loss is 300 JPY.");
        assert!(poor.attention.starts_with("Reward/risk below 1.0"));

        let middle = risk_comment(&kpis(&[120.0, -100.0]));
        assert_eq!(middle.insight, "Reward/risk is around 1.20.");

        // No losses: ratio undefined, treated as 0.
        let no_losses = risk_comment(&kpis(&[100.0, 50.0]));
        assert!(no_losses.attention.starts_with("Reward/risk below 1.0"));
    }

    #[test]
    fn strategy_comment_branches() {
        let trades = tagged(&[
            ("EURUSD", "Pullback", "2024-01-15 09:00:00", 900.0),
            ("EURUSD", "Breakout", "2024-01-15 10:00:00", -300.0),
            ("EURUSD", "Range", "2024-01-15 11:00:00", 100.0),
        ]);
        let c = strategy_comment(&by(&trades, Dimension::Setup));
        assert_eq!(c.insight, "The Pullback setup has your best record (+900 JPY).");
        assert_eq!(c.attention, "On the other hand, the Breakout setup lost 300 JPY.");
        assert!(c.next_action.starts_with("Focus on the Pullback setup"));

        let winners = tagged(&[
            ("EURUSD", "Pullback", "2024-01-15 09:00:00", 900.0),
            ("EURUSD", "Range", "2024-01-15 11:00:00", 100.0),
        ]);
        let c = strategy_comment(&by(&winners, Dimension::Setup));
        assert_eq!(c.attention, "Keep refining this setup.");

        let c = strategy_comment(&by(&[], Dimension::Setup));
        assert!(c.insight.starts_with("Setup data is still building"));
    }
}
