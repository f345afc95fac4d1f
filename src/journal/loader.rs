use serde::Deserialize;
use serde_json::Value;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::error::{JournalError, Result};
use crate::models::Trade;

#[derive(Deserialize)]
struct Wrapped {
    trades: Vec<Trade>,
}

/// Trade rows split from ledger rows (deposits, withdrawals, credits, bonuses).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Journal {
    pub trades: Vec<Trade>,
    pub ledger: Vec<Trade>,
}

impl Journal {
    pub fn from_rows(rows: Vec<Trade>) -> Self {
        let (trades, ledger): (Vec<Trade>, Vec<Trade>) =
            rows.into_iter().partition(Trade::has_valid_pair);
        Journal { trades, ledger }
    }
}

/// Decode a JSON export held in memory. `source` names it in errors.
///
/// Exports come either as a bare array or wrapped as `{"trades": [...]}`.
pub fn parse_trades(json: &str, source: &str) -> Result<Vec<Trade>> {
    let decode_err = |e| JournalError::Decode {
        path: source.to_string(),
        source: e,
    };

    // Decode from the text again so errors keep their line and column.
    let peek: Value = serde_json::from_str(json).map_err(decode_err)?;
    if peek.get("trades").is_some() {
        let wrapped: Wrapped = serde_json::from_str(json).map_err(decode_err)?;
        Ok(wrapped.trades)
    } else {
        serde_json::from_str(json).map_err(decode_err)
    }
}

/// Read a trade export and separate ledger rows from trades.
pub fn load_trades(path: impl AsRef<Path>) -> Result<Journal> {
    let path = path.as_ref();
    let name = path.display().to_string();

    let raw = std::fs::read_to_string(path).map_err(|e| JournalError::Io {
        path: name.clone(),
        source: e,
    })?;
    let rows = parse_trades(&raw, &name)?;
    let journal = Journal::from_rows(rows);

    info!(
        "Loaded {} trades from {} ({} ledger rows skipped)",
        journal.trades.len(),
        name,
        journal.ledger.len()
    );
    for row in &journal.ledger {
        debug!("Ledger row {} ({})", row.id(), row.pair());
    }

    let inconsistent = journal.trades.iter().filter(|t| !t.pips_consistent()).count();
    if inconsistent > 0 {
        warn!(
            "{} trades carry pips that disagree with their side and prices",
            inconsistent
        );
    }

    Ok(journal)
}
