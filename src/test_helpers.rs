use chrono::{Duration, NaiveDateTime};

use crate::models::{Side, Trade};

const BASE: &str = "2024-01-15 09:00:00";

/// A trade with only identity, pair, side and profit set.
pub fn trade(id: &str, pair: &str, side: Side, profit: f64) -> Trade {
    Trade {
        id: id.to_string(),
        pair: Some(pair.to_string()),
        side: Some(side),
        volume: Some(0.1),
        profit_yen: Some(profit),
        ..Default::default()
    }
}

/// Attach raw open/close timestamps.
pub fn at(mut t: Trade, open: &str, close: &str) -> Trade {
    t.open_time = Some(open.to_string());
    t.close_time = Some(close.to_string());
    t
}

/// EURUSD trades from a profit sequence, opened hourly from 2024-01-15 09:00 (a
/// Monday) and each held for 30 minutes.
pub fn series(profits: &[f64]) -> Vec<Trade> {
    let base = NaiveDateTime::parse_from_str(BASE, "%Y-%m-%d %H:%M:%S").unwrap();
    profits
        .iter()
        .enumerate()
        .map(|(i, &p)| {
            let open = base + Duration::hours(i as i64);
            let close = open + Duration::minutes(30);
            at(
                trade(&format!("t{}", i + 1), "EURUSD", Side::Long, p),
                &open.format("%Y-%m-%d %H:%M:%S").to_string(),
                &close.format("%Y-%m-%d %H:%M:%S").to_string(),
            )
        })
        .collect()
}
