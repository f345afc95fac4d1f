use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::JournalError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    #[default]
    #[serde(alias = "long", alias = "Long", alias = "BUY", alias = "buy")]
    Long,
    #[serde(alias = "short", alias = "Short", alias = "SELL", alias = "sell")]
    Short,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Long => write!(f, "LONG"),
            Side::Short => write!(f, "SHORT"),
        }
    }
}

impl Side {
    pub const ALL: [Side; 2] = [Side::Long, Side::Short];

    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Long => "LONG",
            Side::Short => "SHORT",
        }
    }

    /// Signed price move in the trade's favour for a given open/close.
    pub fn favourable_move(self, open: f64, close: f64) -> f64 {
        match self {
            Side::Long => close - open,
            Side::Short => open - close,
        }
    }
}

impl FromStr for Side {
    type Err = JournalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "LONG" | "BUY" => Ok(Side::Long),
            "SHORT" | "SELL" => Ok(Side::Short),
            _ => Err(JournalError::InvalidFilterValue {
                key: "side".to_string(),
                value: s.to_string(),
            }),
        }
    }
}
