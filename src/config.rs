use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::core::buckets::BucketEdges;
use crate::core::timestamps::TimeBasis;
use crate::error::{JournalError, Result};
use crate::journal::report::ReportOptions;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for ReportFormat {
    type Err = JournalError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(ReportFormat::Text),
            "json" => Ok(ReportFormat::Json),
            _ => Err(JournalError::InvalidConfig {
                key: "REPORT_FORMAT".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub trades_file: String,

    // Timezones: naive export timestamps are broker time, buckets use local time
    pub broker_tz: Tz,
    pub local_tz: Tz,

    // Report
    pub top_n: usize,
    pub r_edges: BucketEdges,
    pub profit_edges: BucketEdges,
    pub month: Option<String>,
    pub report_format: ReportFormat,

    // Logging
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let env = |key: &str, default: &str| -> String {
            std::env::var(key).unwrap_or_else(|_| default.to_string())
        };

        Config {
            trades_file: env("TRADES_FILE", "trades.json"),
            broker_tz: env("BROKER_TZ", "UTC").parse().unwrap_or(Tz::UTC),
            local_tz: env("LOCAL_TZ", "Asia/Tokyo").parse().unwrap_or(Tz::Asia__Tokyo),
            top_n: env("TOP_N", "5").parse().unwrap_or(5),
            r_edges: BucketEdges::parse_list(&env("R_BUCKET_EDGES", ""))
                .ok()
                .filter(|e| !e.edges().is_empty())
                .unwrap_or_else(BucketEdges::r_multiple_default),
            profit_edges: BucketEdges::parse_list(&env("PROFIT_BUCKET_EDGES", ""))
                .ok()
                .filter(|e| !e.edges().is_empty())
                .unwrap_or_else(BucketEdges::profit_default),
            month: Some(env("REPORT_MONTH", "")).filter(|m| !m.trim().is_empty()),
            report_format: env("REPORT_FORMAT", "text").parse().unwrap_or_default(),
            log_level: env("LOG_LEVEL", "info"),
        }
    }

    pub fn time_basis(&self) -> TimeBasis {
        TimeBasis::new(self.broker_tz, self.local_tz)
    }

    pub fn report_options(&self) -> ReportOptions {
        ReportOptions {
            basis: self.time_basis(),
            top_n: self.top_n,
            r_edges: self.r_edges.clone(),
            profit_edges: self.profit_edges.clone(),
            month: self.month.clone(),
        }
    }
}
