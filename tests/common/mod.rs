#![allow(dead_code)]

use fx_journal::models::{Side, Trade};

/// A closed trade with naive broker timestamps.
pub fn make_trade(id: &str, pair: &str, side: Side, profit: f64, open: &str, close: &str) -> Trade {
    Trade {
        id: id.to_string(),
        pair: Some(pair.to_string()),
        side: Some(side),
        volume: Some(0.1),
        open_time: Some(open.to_string()),
        close_time: Some(close.to_string()),
        profit_yen: Some(profit),
        ..Default::default()
    }
}

/// Ten EURUSD trades: three on Monday 2024-01-15 (+100, -50, +20) and seven spread
/// over Tuesday to Thursday.
pub fn make_week() -> Vec<Trade> {
    let monday = [(100.0, "09"), (-50.0, "12"), (20.0, "15")];
    let rest = [
        (200.0, "2024-01-16", "10"),
        (-80.0, "2024-01-16", "18"),
        (40.0, "2024-01-17", "02"),
        (-120.0, "2024-01-17", "11"),
        (60.0, "2024-01-17", "20"),
        (30.0, "2024-01-18", "08"),
        (-10.0, "2024-01-18", "16"),
    ];

    let mut trades: Vec<Trade> = monday
        .iter()
        .enumerate()
        .map(|(i, (p, h))| {
            make_trade(
                &format!("m{}", i + 1),
                "EURUSD",
                Side::Long,
                *p,
                &format!("2024-01-15 {}:00:00", h),
                &format!("2024-01-15 {}:45:00", h),
            )
        })
        .collect();
    trades.extend(rest.iter().enumerate().map(|(i, (p, d, h))| {
        make_trade(
            &format!("r{}", i + 1),
            "EURUSD",
            Side::Long,
            *p,
            &format!("{} {}:00:00", d, h),
            &format!("{} {}:30:00", d, h),
        )
    }));
    trades
}

/// Write `json` to a fresh file under the system temp dir.
pub fn write_temp(name: &str, json: &str) -> std::path::PathBuf {
    let dir = std::env::temp_dir().join(format!("fx-journal-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join(name);
    std::fs::write(&path, json).unwrap();
    path
}
