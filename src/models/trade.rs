use chrono::{DateTime, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};

use crate::core::timestamps::TimeBasis;
use crate::models::{round_to, Side};

pub const UNKNOWN_PAIR: &str = "UNKNOWN";
pub const UNCLASSIFIED: &str = "Unclassified";

// Ledger rows exported alongside trades.
const NON_TRADE_KEYWORDS: &[&str] = &[
    "DEPOSIT",
    "CREDIT",
    "BONUS",
    "WITHDRAWAL",
    "WITHDRAW",
    "BALANCE",
    "TRANSFER",
    "PAYMENT",
    "COMMISSION",
    "FEE",
    "REBATE",
    "ADJUSTMENT",
    "CORRECTION",
    "CD-ECS-BWR",
];

// (needle, label) checked in order against memo/comment text.
const SETUP_KEYWORDS: &[(&str, &str)] = &[
    ("breakout", "Breakout"),
    ("pullback", "Pullback"),
    ("reversal", "Reversal"),
    ("trend", "Trend"),
    ("range", "Range"),
    ("scalp", "Scalp"),
];

/// One closed position as exported from the journal.
///
/// Field names follow the export (camelCase). Rows often carry a legacy column next
/// to its current name (`id`/`ticket`, `side`/`action`, `volume`/`size`,
/// `closeTime`/`datetime`, `pair`/`symbol`/`item`, `profitYen`/`profit`), so each
/// name gets its own field and the accessors pick the first one present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trade {
    #[serde(default, deserialize_with = "id_from_any")]
    pub id: String,
    #[serde(default, deserialize_with = "ticket_from_any")]
    pub ticket: Option<String>,
    #[serde(default)]
    pub pair: Option<String>,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub item: Option<String>,
    #[serde(default, deserialize_with = "side_from_any")]
    pub side: Option<Side>,
    #[serde(default, deserialize_with = "side_from_any")]
    pub action: Option<Side>,
    #[serde(default)]
    pub volume: Option<f64>,
    #[serde(default)]
    pub size: Option<f64>,
    #[serde(default)]
    pub open_time: Option<String>,
    #[serde(default)]
    pub close_time: Option<String>,
    #[serde(default)]
    pub datetime: Option<String>,
    #[serde(default)]
    pub open_price: Option<f64>,
    #[serde(default)]
    pub close_price: Option<f64>,
    #[serde(default, alias = "sl")]
    pub stop_price: Option<f64>,
    #[serde(default, alias = "tp")]
    pub target_price: Option<f64>,
    #[serde(default)]
    pub profit_yen: Option<f64>,
    #[serde(default)]
    pub profit: Option<f64>,
    #[serde(default)]
    pub pips: Option<f64>,
    #[serde(default)]
    pub commission: Option<f64>,
    #[serde(default)]
    pub swap: Option<f64>,
    #[serde(default, alias = "strategy")]
    pub setup: Option<String>,
    #[serde(default)]
    pub memo: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default, alias = "mfe_pips")]
    pub mfe_pips: Option<f64>,
    #[serde(default, alias = "mae_pips")]
    pub mae_pips: Option<f64>,
    #[serde(default, alias = "max_possible_gain_pips")]
    pub max_possible_gain_pips: Option<f64>,
    #[serde(default, alias = "planned_tp_pips")]
    pub planned_tp_pips: Option<f64>,
}

fn id_from_any<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(ticket_from_any(d)?.unwrap_or_default())
}

// Broker tickets arrive as numbers or strings.
fn ticket_from_any<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Int(i64),
        Float(f64),
    }

    Ok(Option::<RawId>::deserialize(d)?.map(|raw| match raw {
        RawId::Text(s) => s,
        RawId::Int(n) => n.to_string(),
        RawId::Float(n) => n.to_string(),
    }))
}

// Blank sides are treated as absent; anything else must name a side.
fn side_from_any<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Side>, D::Error> {
    match Option::<String>::deserialize(d)? {
        Some(raw) if !raw.trim().is_empty() => raw
            .parse::<Side>()
            .map(Some)
            .map_err(|_| de::Error::unknown_variant(&raw, &["LONG", "SHORT", "BUY", "SELL"])),
        _ => Ok(None),
    }
}

impl Trade {
    /// `id`, else the legacy `ticket`.
    pub fn id(&self) -> &str {
        if !self.id.trim().is_empty() {
            return &self.id;
        }
        self.ticket.as_deref().unwrap_or("")
    }

    /// `side`, else the legacy `action`, else LONG.
    pub fn side(&self) -> Side {
        self.side.or(self.action).unwrap_or_default()
    }

    /// Lot size from `volume`, else `size`, else 0.
    pub fn volume(&self) -> f64 {
        self.volume.or(self.size).unwrap_or(0.0)
    }

    /// Raw close timestamp from `closeTime`, else `datetime`.
    pub fn close_raw(&self) -> Option<&str> {
        [&self.close_time, &self.datetime]
            .into_iter()
            .flatten()
            .map(|s| s.as_str())
            .find(|s| !s.trim().is_empty())
    }

    /// Currency pair from the first non-empty of `pair`, `symbol`, `item`.
    pub fn pair(&self) -> &str {
        [&self.pair, &self.symbol, &self.item]
            .into_iter()
            .flatten()
            .map(|s| s.trim())
            .find(|s| !s.is_empty())
            .unwrap_or(UNKNOWN_PAIR)
    }

    pub fn has_valid_pair(&self) -> bool {
        is_valid_currency_pair(self.pair())
    }

    pub fn is_jpy(&self) -> bool {
        self.pair().to_ascii_uppercase().ends_with("JPY")
    }

    pub fn pip_multiplier(&self) -> f64 {
        if self.is_jpy() {
            100.0
        } else {
            10000.0
        }
    }

    pub fn price_decimals(&self) -> usize {
        if self.is_jpy() {
            3
        } else {
            5
        }
    }

    pub fn format_price(&self, price: f64) -> String {
        format!("{:.*}", self.price_decimals(), price)
    }

    /// Realized profit. `profitYen` wins over the legacy `profit` column; the two are
    /// never added together.
    pub fn profit(&self) -> f64 {
        self.profit_yen.or(self.profit).unwrap_or(0.0)
    }

    pub fn is_win(&self) -> bool {
        self.profit() > 0.0
    }

    pub fn is_loss(&self) -> bool {
        self.profit() < 0.0
    }

    /// Trading cost: commission charged minus swap received.
    pub fn cost(&self) -> f64 {
        self.commission.unwrap_or(0.0) - self.swap.unwrap_or(0.0)
    }

    pub fn net_profit(&self) -> f64 {
        self.profit() - self.cost()
    }

    /// Explicit pips when exported, otherwise derived from prices.
    pub fn pips(&self) -> Option<f64> {
        self.pips.or_else(|| self.pips_from_prices())
    }

    pub fn pips_from_prices(&self) -> Option<f64> {
        let (open, close) = (self.open_price?, self.close_price?);
        let pips = self.side().favourable_move(open, close) * self.pip_multiplier();
        Some(round_to(pips, 1))
    }

    /// Whether an explicit pips value agrees in sign with the side and price move.
    /// Trades lacking either side of the comparison are considered consistent.
    pub fn pips_consistent(&self) -> bool {
        let (Some(explicit), Some(open), Some(close)) =
            (self.pips, self.open_price, self.close_price)
        else {
            return true;
        };
        let moved = self.side().favourable_move(open, close);
        if explicit > 0.0 {
            moved > 0.0
        } else if explicit < 0.0 {
            moved < 0.0
        } else {
            round_to(moved * self.pip_multiplier(), 1) == 0.0
        }
    }

    pub fn open_at(&self, basis: &TimeBasis) -> Option<DateTime<Utc>> {
        self.open_time.as_deref().and_then(|s| basis.parse(s))
    }

    /// Close timestamp; the ordering key for equity curves and streaks.
    pub fn exit_time(&self, basis: &TimeBasis) -> Option<DateTime<Utc>> {
        self.close_raw().and_then(|s| basis.parse(s))
    }

    /// Open timestamp, falling back to the close when the export has no open column.
    /// Used for weekday/hour/session buckets and filters.
    pub fn entry_time(&self, basis: &TimeBasis) -> Option<DateTime<Utc>> {
        self.open_at(basis).or_else(|| self.exit_time(basis))
    }

    /// Whole minutes held, clamped at zero. `None` if either timestamp is unusable.
    pub fn holding_minutes(&self, basis: &TimeBasis) -> Option<i64> {
        let open = self.open_at(basis)?;
        let close = self.exit_time(basis)?;
        let millis = (close - open).num_milliseconds();
        Some(millis.div_euclid(60_000).max(0))
    }

    /// Strategy label: explicit tag, else a keyword found in memo/comment,
    /// else [`UNCLASSIFIED`].
    pub fn setup_label(&self) -> String {
        if let Some(tag) = self.setup.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            return tag.to_string();
        }
        let text = [&self.comment, &self.memo]
            .into_iter()
            .flatten()
            .map(|s| s.to_lowercase())
            .collect::<Vec<_>>()
            .join(" ");
        SETUP_KEYWORDS
            .iter()
            .find(|(needle, _)| text.contains(needle))
            .map(|(_, label)| label.to_string())
            .unwrap_or_else(|| UNCLASSIFIED.to_string())
    }

    /// Distance from entry to stop, in pips.
    pub fn stop_distance_pips(&self) -> Option<f64> {
        let risk = (self.open_price? - self.stop_price?).abs() * self.pip_multiplier();
        (risk > 0.0).then_some(risk)
    }

    /// Planned reward:risk from stop and target, rounded to 2 dp.
    pub fn planned_reward_risk(&self) -> Option<f64> {
        let risk = self.stop_distance_pips()?;
        let reward = (self.target_price? - self.open_price?).abs() * self.pip_multiplier();
        Some(round_to(reward / risk, 2))
    }
}

/// Whether a symbol looks like a tradable instrument rather than a ledger row.
///
/// Accepts six-letter pairs (EURUSD, XAUUSD) and index symbols of two to four
/// letters followed by two or three digits (US30, GER40, NAS100).
pub fn is_valid_currency_pair(symbol: &str) -> bool {
    let s = symbol.trim().to_ascii_uppercase();
    if s.is_empty() || s.contains('-') || s.contains(' ') {
        return false;
    }
    if NON_TRADE_KEYWORDS.iter().any(|k| s.contains(k)) {
        return false;
    }
    if !s.is_ascii() {
        return false;
    }

    let letters = s.chars().take_while(|c| c.is_ascii_uppercase()).count();
    let digits = s.len() - letters;
    let tail_numeric = s[letters..].chars().all(|c| c.is_ascii_digit());

    (letters == 6 && digits == 0)
        || ((2..=4).contains(&letters) && (2..=3).contains(&digits) && tail_numeric)
}
