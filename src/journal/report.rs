use serde::Serialize;
use tracing::{debug, info};

use crate::analytics::breakdown::{Breakdown, BreakdownAnalyzer, Dimension, GroupStats, LossShare};
use crate::analytics::efficiency::average_exit_efficiency;
use crate::analytics::evaluation::{trades_in_month, MonthlyEvaluation};
use crate::analytics::kpis::{equity_curve, EquityPoint, Kpis};
use crate::analytics::streaks::{streaks, StreakSummary};
use crate::core::buckets::BucketEdges;
use crate::core::filters::FilterCriteria;
use crate::core::timestamps::TimeBasis;
use crate::journal::commentary::{
    balance_comment, dashboard_comment, pair_comment, risk_comment, strategy_comment,
    time_axis_comment, yen, CoachComment,
};
use crate::journal::loader::Journal;

/// Knobs for one report run.
#[derive(Debug, Clone)]
pub struct ReportOptions {
    pub basis: TimeBasis,
    pub top_n: usize,
    pub r_edges: BucketEdges,
    pub profit_edges: BucketEdges,
    /// `YYYY-MM` to score; the latest month with trades when unset.
    pub month: Option<String>,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            basis: TimeBasis::default(),
            top_n: 5,
            r_edges: BucketEdges::r_multiple_default(),
            profit_edges: BucketEdges::profit_default(),
            month: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Evaluated {
    pub month: String,
    pub evaluation: MonthlyEvaluation,
}

/// Everything the journal shows for one filtered view of the trade history.
#[derive(Debug, Clone, Serialize)]
pub struct JournalReport {
    pub filters: FilterCriteria,
    pub ledger_rows: usize,
    pub filtered_out: usize,
    pub kpis: Kpis,
    pub streaks: StreakSummary,
    pub streak_runs: Vec<i64>,
    pub breakdowns: Vec<Breakdown>,
    pub top_pairs: Vec<GroupStats>,
    pub top_setups: Vec<GroupStats>,
    pub loss_by_weekday: Vec<LossShare>,
    pub loss_by_pair: Vec<LossShare>,
    pub average_exit_efficiency: Option<f64>,
    pub evaluation: Option<Evaluated>,
    pub coach: CoachComment,
    pub balance: CoachComment,
    pub time_axis: CoachComment,
    pub pairs: CoachComment,
    pub risk: CoachComment,
    pub setups: CoachComment,
    pub equity_curve: Vec<EquityPoint>,
}

impl JournalReport {
    pub fn build(journal: &Journal, filters: &FilterCriteria, opts: &ReportOptions) -> Self {
        let basis = &opts.basis;
        let trades = filters.apply(&journal.trades, basis);
        let filtered_out = journal.trades.len() - trades.len();
        if !filters.is_empty() {
            info!(
                "Filters kept {} of {} trades",
                trades.len(),
                journal.trades.len()
            );
        }

        let analyzer = BreakdownAnalyzer::new(*basis)
            .with_edges(opts.r_edges.clone(), opts.profit_edges.clone());
        let breakdowns = analyzer.analyze(&trades);
        for b in &breakdowns {
            if b.excluded > 0 {
                debug!("{}: {} trades could not be bucketed", b.dimension, b.excluded);
            }
        }

        let top = |dimension: Dimension| {
            breakdowns
                .iter()
                .find(|b| b.dimension == dimension)
                .map(|b| b.top_by_profit(opts.top_n))
                .unwrap_or_default()
        };
        let top_pairs = top(Dimension::Pair);
        let top_setups = top(Dimension::Setup);

        let month = opts.month.clone().or_else(|| latest_month(&breakdowns));
        let evaluation = month.map(|month| {
            let current = trades_in_month(&trades, &month, basis);
            Evaluated {
                evaluation: MonthlyEvaluation::compute(&current, &trades, basis),
                month,
            }
        });

        let comment_on = |dimension: Dimension, comment: fn(&Breakdown) -> CoachComment| {
            match breakdowns.iter().find(|b| b.dimension == dimension) {
                Some(b) => comment(b),
                None => comment(&analyzer.breakdown(&trades, dimension)),
            }
        };
        let time_axis = comment_on(Dimension::Hour, time_axis_comment);
        let pairs = comment_on(Dimension::Pair, pair_comment);
        let setups = comment_on(Dimension::Setup, strategy_comment);

        let kpis = Kpis::compute(&trades, basis);
        info!(
            "Report: {} trades, P&L {:+.0}, win rate {:.1}%, PF {}",
            kpis.trade_count,
            kpis.total_profit,
            kpis.win_rate * 100.0,
            kpis.profit_factor
        );

        JournalReport {
            filters: filters.clone(),
            ledger_rows: journal.ledger.len(),
            filtered_out,
            streaks: StreakSummary::compute(&trades, basis),
            streak_runs: streaks(&trades, basis),
            top_pairs,
            top_setups,
            loss_by_weekday: analyzer.loss_contribution(&trades, Dimension::Weekday),
            loss_by_pair: analyzer.loss_contribution(&trades, Dimension::Pair),
            average_exit_efficiency: average_exit_efficiency(&trades),
            evaluation,
            coach: dashboard_comment(&kpis),
            balance: balance_comment(&kpis),
            time_axis,
            pairs,
            risk: risk_comment(&kpis),
            setups,
            equity_curve: equity_curve(&trades, basis),
            breakdowns,
            kpis,
        }
    }

    pub fn breakdown(&self, dimension: Dimension) -> Option<&Breakdown> {
        self.breakdowns.iter().find(|b| b.dimension == dimension)
    }

    pub fn print_summary(&self) {
        let k = &self.kpis;

        println!("\n{}", "=".repeat(70));
        println!("  TRADING JOURNAL REPORT");
        println!("{}", "=".repeat(70));
        if let (Some(first), Some(last)) = (self.equity_curve.first(), self.equity_curve.last()) {
            println!(
                "  Period:      {} to {}",
                first.at.format("%Y-%m-%d"),
                last.at.format("%Y-%m-%d")
            );
        }
        if self.ledger_rows > 0 || self.filtered_out > 0 {
            println!(
                "  Skipped:     {} ledger rows, {} filtered out",
                self.ledger_rows, self.filtered_out
            );
        }
        println!();
        println!("  PERFORMANCE");
        println!("  ───────────────────────────────────");
        println!("  P&L:         {}", yen(k.total_profit));
        println!("  Net:         {}", yen(k.net_profit));
        println!("  Swap:        {}", yen(k.total_swap));
        println!("  Commission:  {}", yen(k.total_commission));
        println!();
        println!("  TRADES");
        println!("  ───────────────────────────────────");
        println!("  Total:       {}", k.trade_count);
        println!(
            "  Win/Loss/BE: {} / {} / {}",
            k.win_count, k.loss_count, k.breakeven_count
        );
        println!("  Win Rate:    {:.1}%", k.win_rate * 100.0);
        println!("  Avg Win:     {}", yen(k.average_win));
        println!("  Avg Loss:    {}", yen(k.average_loss));
        println!("  Best:        {}", yen(k.best_trade));
        println!("  Worst:       {}", yen(k.worst_trade));
        println!("  Expectancy:  {}", yen(k.average_profit));
        println!("  Profit Factor: {}", k.profit_factor);
        if let Some(payoff) = k.payoff_ratio {
            println!("  Payoff:      {:.2}", payoff);
        }
        if k.pips_sample > 0 {
            println!(
                "  Avg Pips:    {:+.1} signed, {:.1} moved ({} trades)",
                k.average_pips_signed, k.average_pips_unsigned, k.pips_sample
            );
        }
        if let Some(minutes) = k.average_holding_minutes {
            println!("  Avg Hold:    {:.0} min", minutes);
        }
        println!();
        println!("  RISK");
        println!("  ───────────────────────────────────");
        println!("  Max DD:      {} ({:.1}% of turnover)", yen(k.max_drawdown), k.drawdown_ratio);
        println!("  Sharpe:      {:.2}", k.sharpe_ratio);
        if let Some(r) = k.average_r_multiple {
            println!("  Avg R:       {:+.2}R", r);
        }
        println!(
            "  Streaks:     {} wins / {} losses (current {:+})",
            self.streaks.max_win_streak, self.streaks.max_loss_streak, self.streaks.current
        );
        if let Some(eff) = self.average_exit_efficiency {
            println!("  Exit Eff.:   {:.1}%", eff * 100.0);
        }

        for dimension in [Dimension::Weekday, Dimension::Session, Dimension::HoldingTime] {
            if let Some(b) = self.breakdown(dimension) {
                print_groups(&dimension.as_str().to_uppercase().replace('_', " "), &b.groups);
            }
        }
        print_groups(&format!("TOP {} PAIRS", self.top_pairs.len()), &self.top_pairs);
        print_groups(&format!("TOP {} SETUPS", self.top_setups.len()), &self.top_setups);

        if !self.loss_by_weekday.is_empty() {
            println!();
            println!("  LOSSES BY WEEKDAY");
            println!("  ───────────────────────────────────");
            for share in &self.loss_by_weekday {
                println!("  {:<12} {:>3} trades  {}", share.key, share.count, yen(-share.loss));
            }
        }

        if let Some(e) = &self.evaluation {
            let s = &e.evaluation.scores;
            println!();
            println!("  MONTHLY EVALUATION ({})", e.month);
            println!("  ───────────────────────────────────");
            println!("  Overall:     {:.1}  level {}", s.overall, e.evaluation.level);
            println!("  Entry:       {:.1}", s.entry_skill);
            println!("  Drawdown:    {:.1}", s.drawdown_control);
            println!("  Reward/Risk: {:.1}", s.risk_reward);
            println!("  Risk Mgmt:   {:.1}", s.risk_management);
            println!("  Stability:   {:.1}", s.profit_stability);
        }

        println!();
        println!("  COACH");
        println!("  ───────────────────────────────────");
        println!("  {}", self.coach.insight);
        println!("  {}", self.coach.attention);
        println!("  {}", self.coach.next_action);
        println!("  {}", self.balance.attention);
        for note in [&self.time_axis, &self.pairs, &self.setups, &self.risk] {
            println!("  {}", note.insight);
        }
        println!("{}", "=".repeat(70));
    }
}

fn print_groups(title: &str, groups: &[GroupStats]) {
    if groups.iter().all(|g| g.count == 0) {
        return;
    }
    println!();
    println!("  {}", title);
    println!("  ───────────────────────────────────");
    for g in groups.iter().filter(|g| g.count > 0) {
        println!(
            "  {:<12} {:>3} trades  WR {:>5.1}%  PF {:>5}  {}",
            g.key,
            g.count,
            g.win_rate * 100.0,
            g.profit_factor,
            yen(g.total_profit)
        );
    }
}

/// Month keys sort lexically, so the last group is the latest.
fn latest_month(breakdowns: &[Breakdown]) -> Option<String> {
    breakdowns
        .iter()
        .find(|b| b.dimension == Dimension::Month)
        .and_then(|b| b.groups.last())
        .map(|g| g.key.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Side;
    use crate::test_helpers::{at, series, trade};

    fn journal() -> Journal {
        let mut rows = series(&[500.0, -200.0, 300.0]);
        rows.push(at(
            trade("t4", "USDJPY", Side::Short, -100.0),
            "2024-02-05 22:00:00",
            "2024-02-06 01:00:00",
        ));
        let mut deposit = trade("d1", "DEPOSIT", Side::Long, 100000.0);
        deposit.datetime = Some("2024-01-01 00:00:00".to_string());
        rows.push(deposit);
        Journal::from_rows(rows)
    }

    #[test]
    fn report_excludes_ledger_and_partitions() {
        let j = journal();
        let r = JournalReport::build(&j, &FilterCriteria::default(), &ReportOptions::default());
        assert_eq!(r.ledger_rows, 1);
        assert_eq!(r.kpis.trade_count, 4);
        assert_eq!(r.kpis.total_profit, 500.0);
        for b in &r.breakdowns {
            assert_eq!(b.counted() + b.excluded, 4, "{}", b.dimension);
        }
        assert_eq!(r.equity_curve.len(), 4);
        assert_eq!(r.streak_runs, vec![1, -1, 1, -1]);
    }

    #[test]
    fn filters_narrow_every_section() {
        let j = journal();
        let filters = FilterCriteria::from_pairs([("symbol", "eurusd")]).unwrap();
        let r = JournalReport::build(&j, &filters, &ReportOptions::default());
        assert_eq!(r.filtered_out, 1);
        assert_eq!(r.kpis.trade_count, 3);
        assert!((r.kpis.win_rate - 2.0 / 3.0).abs() < 1e-9);
        assert_eq!(r.top_pairs.len(), 1);
        assert_eq!(r.top_pairs[0].key, "EURUSD");
        assert_eq!(r.loss_by_pair[0].loss, 200.0);
    }

    #[test]
    fn evaluates_latest_month_by_default() {
        let r = JournalReport::build(&journal(), &FilterCriteria::default(), &ReportOptions::default());
        let e = r.evaluation.unwrap();
        assert_eq!(e.month, "2024-02");
        assert_eq!(e.evaluation.details.months, 2);

        let opts = ReportOptions {
            month: Some("2024-01".to_string()),
            ..Default::default()
        };
        let r = JournalReport::build(&journal(), &FilterCriteria::default(), &opts);
        let e = r.evaluation.unwrap();
        assert_eq!(e.month, "2024-01");
        assert!((e.evaluation.details.win_rate - 66.7).abs() < 1e-9);
    }

    #[test]
    fn coach_notes_follow_breakdowns() {
        let r = JournalReport::build(&journal(), &FilterCriteria::default(), &ReportOptions::default());
        // EURUSD nets +600, USDJPY -100.
        assert_eq!(r.pairs.insight, "EURUSD gives your best results (+600 JPY).");
        assert_eq!(r.pairs.attention, "USDJPY lost 100 JPY.");
        // 09:00 +500 is the best hour, 10:00 -200 the worst.
        assert_eq!(r.time_axis.insight, "Your best results come at 09:00 (+500 JPY).");
        assert_eq!(r.time_axis.attention, "On the other hand, 10:00 lost 200 JPY.");
        assert!(r.setups.insight.starts_with("The Unclassified setup"));
        // avg win 400, avg loss -150
        assert!(r.risk.insight.contains("reward/risk of 2.67"));
    }

    #[test]
    fn empty_journal_has_no_evaluation() {
        let r = JournalReport::build(&Journal::default(), &FilterCriteria::default(), &ReportOptions::default());
        assert_eq!(r.kpis.trade_count, 0);
        assert!(r.evaluation.is_none());
        assert!(r.equity_curve.is_empty());
        assert_eq!(r.average_exit_efficiency, None);
    }

    #[test]
    fn rebuild_is_identical() {
        let j = journal();
        let a = JournalReport::build(&j, &FilterCriteria::default(), &ReportOptions::default());
        let b = JournalReport::build(&j, &FilterCriteria::default(), &ReportOptions::default());
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }
}
