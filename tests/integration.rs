mod common;

use chrono_tz::Tz;

use fx_journal::analytics::kpis::{max_drawdown, r_multiple, reference_loss};
use fx_journal::analytics::{similar_trades, BreakdownAnalyzer, Dimension, Kpis, StreakSummary};
use fx_journal::core::{FilterCriteria, TimeBasis};
use fx_journal::error::JournalError;
use fx_journal::journal::{load_trades, parse_trades, JournalReport, ReportOptions};
use fx_journal::models::{Ratio, Side};

use common::{make_trade, make_week, write_temp};

fn three_trades() -> Vec<fx_journal::models::Trade> {
    vec![
        make_trade("1", "EURUSD", Side::Long, 500.0, "2024-03-04 09:00:00", "2024-03-04 10:00:00"),
        make_trade("2", "EURUSD", Side::Long, -200.0, "2024-03-05 09:00:00", "2024-03-05 10:00:00"),
        make_trade("3", "EURUSD", Side::Long, 300.0, "2024-03-06 09:00:00", "2024-03-06 10:00:00"),
    ]
}

#[test]
fn test_headline_kpis() {
    let trades = three_trades();
    let k = Kpis::compute(&trades, &TimeBasis::default());

    assert_eq!(k.trade_count, 3);
    assert!((k.win_rate - 2.0 / 3.0).abs() < 1e-9);
    assert_eq!(k.total_profit, 600.0);
    assert_eq!(k.profit_factor, Ratio::Finite(4.0));
    assert_eq!(k.max_drawdown, 200.0);

    let reference = reference_loss(&trades).unwrap();
    assert_eq!(reference, -200.0);
    assert_eq!(r_multiple(&trades[0], reference), Some(2.5));
}

#[test]
fn test_all_breakeven_is_not_unbounded() {
    let trades: Vec<_> = (0..4)
        .map(|i| make_trade(&i.to_string(), "GBPUSD", Side::Short, 0.0, "2024-03-04 09:00", "2024-03-04 09:10"))
        .collect();
    let k = Kpis::compute(&trades, &TimeBasis::default());
    assert_eq!(k.win_rate, 0.0);
    assert_eq!(k.profit_factor, Ratio::Finite(0.0));
    assert_eq!(k.breakeven_count, 4);
    assert_eq!(k.max_drawdown, 0.0);
}

#[test]
fn test_empty_list_is_total() {
    let k = Kpis::compute(&[], &TimeBasis::default());
    assert_eq!(k.win_rate, 0.0);
    assert_eq!(k.average_profit, 0.0);
    assert_eq!(k.profit_factor, Ratio::Finite(0.0));
    assert!(StreakSummary::compute(&[], &TimeBasis::default()).current == 0);
}

#[test]
fn test_loss_free_profit_factor_is_unbounded() {
    let trades: Vec<_> = three_trades().into_iter().filter(|t| t.is_win()).collect();
    let k = Kpis::compute(&trades, &TimeBasis::default());
    assert!(k.profit_factor.is_unbounded());
    assert_eq!(k.profit_factor.to_string(), "∞");
    // Non-decreasing equity never draws down.
    assert_eq!(max_drawdown(&trades, &TimeBasis::default()), 0.0);
}

#[test]
fn test_monday_bucket() {
    let trades = make_week();
    let weekday = BreakdownAnalyzer::default().breakdown(&trades, Dimension::Weekday);

    assert_eq!(weekday.groups.len(), 7);
    assert_eq!(weekday.groups[0].key, "Monday");
    let monday = weekday.group("Monday").unwrap();
    assert_eq!(monday.count, 3);
    assert_eq!(monday.total_profit, 70.0);
    assert!((monday.win_rate - 2.0 / 3.0).abs() < 1e-9);
    assert_eq!(weekday.counted(), 10);
}

#[test]
fn test_every_dimension_partitions_input() {
    let mut trades = make_week();
    trades.push(make_trade("bad", "EURUSD", Side::Long, 10.0, "not a date", "also not"));
    let analyzer = BreakdownAnalyzer::default();
    for b in analyzer.analyze(&trades) {
        assert_eq!(b.counted() + b.excluded, trades.len(), "{}", b.dimension);
    }
    let hour = analyzer.breakdown(&trades, Dimension::Hour);
    assert_eq!(hour.excluded, 1);
    assert_eq!(hour.groups.len(), 24);
}

#[test]
fn test_local_timezone_moves_buckets() {
    // Broker exports in UTC, trader reads the journal in Tokyo (+09:00).
    let basis = TimeBasis::new(Tz::UTC, Tz::Asia__Tokyo);
    let trades = make_week();
    let analyzer = BreakdownAnalyzer::new(basis);

    let weekday = analyzer.breakdown(&trades, Dimension::Weekday);
    let monday = weekday.group("Monday").unwrap();
    // 15:00 UTC Monday is 00:00 Tuesday in Tokyo.
    assert_eq!(monday.count, 2);
    assert_eq!(monday.total_profit, 50.0);
    assert_eq!(weekday.group("Friday").unwrap().count, 1);

    let session = analyzer.breakdown(&trades, Dimension::Session);
    assert_eq!(session.counted(), 10);
}

#[test]
fn test_filters_combine_with_and() {
    let trades = make_week();
    let basis = TimeBasis::default();

    let monday_wins = FilterCriteria::from_pairs([("weekday", "1"), ("pnl", "win")]).unwrap();
    let kept = monday_wins.apply(&trades, &basis);
    assert_eq!(kept.len(), 2);
    assert_eq!(Kpis::compute(&kept, &basis).total_profit, 120.0);

    let london = FilterCriteria::from_pairs([("session", "london"), ("from", "2024-01-16")]).unwrap();
    let ids: Vec<String> = london.apply(&trades, &basis).into_iter().map(|t| t.id).collect();
    assert_eq!(ids, vec!["r1", "r4", "r7"]);

    let weekend = FilterCriteria::from_pairs([("weekday", "weekend")]).unwrap();
    assert!(weekend.apply(&trades, &basis).is_empty());
}

#[test]
fn test_unknown_filter_key_is_rejected() {
    let err = FilterCriteria::from_pairs([("broker", "x")]).unwrap_err();
    assert!(matches!(err, JournalError::UnknownFilter(k) if k == "broker"));
}

#[test]
fn test_pips_match_prices() {
    let mut t = make_trade("p", "USDJPY", Side::Short, 4500.0, "2024-01-15 10:00", "2024-01-15 11:00");
    t.open_price = Some(148.250);
    t.close_price = Some(148.100);
    assert_eq!(t.pips_from_prices(), Some(15.0));
    t.pips = Some(15.0);
    assert!(t.pips_consistent());
    t.pips = Some(-15.0);
    assert!(!t.pips_consistent());
}

#[test]
fn test_report_from_file() {
    let json = r#"[
        {"ticket": 1, "pair": "EURUSD", "action": "buy", "size": 0.1,
         "openTime": "2024.03.04 09:00:00", "closeTime": "2024.03.04 10:00:00",
         "openPrice": 1.08500, "closePrice": 1.08750, "profitYen": 500,
         "mfePips": 50, "setup": "Breakout"},
        {"ticket": 2, "pair": "EURUSD", "action": "buy", "size": 0.1,
         "openTime": "2024.03.05 09:00:00", "closeTime": "2024.03.05 10:00:00",
         "profitYen": -200, "memo": "late pullback entry"},
        {"ticket": 3, "pair": "EURUSD", "action": "buy", "size": 0.1,
         "openTime": "2024.03.06 09:00:00", "closeTime": "2024.03.06 10:00:00",
         "profitYen": 300, "swap": -20, "commission": 30},
        {"ticket": 4, "item": "Deposit", "profitYen": 1000000, "closeTime": "2024.03.01 00:00:00"}
    ]"#;
    let path = write_temp("report.json", json);
    let journal = load_trades(&path).unwrap();
    assert_eq!(journal.trades.len(), 3);
    assert_eq!(journal.ledger.len(), 1);

    let report = JournalReport::build(&journal, &FilterCriteria::default(), &ReportOptions::default());
    assert_eq!(report.ledger_rows, 1);
    assert_eq!(report.kpis.total_profit, 600.0);
    assert_eq!(report.kpis.net_profit, 550.0);
    assert_eq!(report.kpis.profit_factor, Ratio::Finite(4.0));
    assert_eq!(report.streak_runs, vec![1, -1, 1]);
    assert_eq!(report.average_exit_efficiency, Some(0.5));

    let setup = report.breakdown(Dimension::Setup).unwrap();
    assert_eq!(setup.group("Breakout").unwrap().count, 1);
    assert_eq!(setup.group("Pullback").unwrap().count, 1);
    assert_eq!(setup.group("Unclassified").unwrap().count, 1);

    let evaluated = report.evaluation.as_ref().unwrap();
    assert_eq!(evaluated.month, "2024-03");
    assert_eq!(evaluated.evaluation.details.session_match_rate, 100.0);

    // Same input, same bytes.
    let again = JournalReport::build(&journal, &FilterCriteria::default(), &ReportOptions::default());
    assert_eq!(
        serde_json::to_string(&report).unwrap(),
        serde_json::to_string(&again).unwrap()
    );
}

#[test]
fn test_missing_file() {
    let err = load_trades(std::env::temp_dir().join("fx-journal-missing/none.json")).unwrap_err();
    assert!(matches!(err, JournalError::Io { .. }));
}

#[test]
fn test_similar_trades_from_database_export() {
    // Database exports repeat each value under its current and legacy name.
    let row = |id: u32, day: u32, profit: i32| {
        format!(
            r#"{{"id": "{id}", "ticket": "{id}", "pair": "EURUSD", "symbol": "EURUSD",
               "side": "LONG", "action": "LONG", "volume": 0.1,
               "openTime": "2024-01-{day:02} 10:00:00", "datetime": "2024-01-{day:02} 10:20:00",
               "profitYen": {profit}, "profit": {profit}}}"#
        )
    };
    // 15th, 22nd and 29th are Mondays; the 16th is a Tuesday.
    let json = format!(
        "[{}, {}, {}, {}, {}]",
        row(1, 15, 100),
        row(2, 22, -40),
        row(3, 29, 60),
        row(4, 8, 10),
        row(5, 16, 20)
    );
    let trades = parse_trades(&json, "db.json").unwrap();
    assert_eq!(trades[0].id(), "1");
    assert_eq!(trades[0].side(), Side::Long);

    let basis = TimeBasis::default();
    let out = similar_trades(&trades[0], &trades, &basis);
    let ids: Vec<&str> = out.iter().map(|s| s.id.as_str()).collect();
    // Mondays share slot, weekday, hold and the no-stop band; the Tuesday misses weekday.
    assert_eq!(ids, vec!["3", "2", "4", "5"]);
    let scores: Vec<u32> = out.iter().map(|s| s.score).collect();
    assert_eq!(scores, vec![40, 40, 40, 30]);
    assert_eq!(out[0].close_time.as_deref(), Some("2024-01-29 10:20:00"));
}
