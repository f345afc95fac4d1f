use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use fx_journal::config::{Config, ReportFormat};
use fx_journal::core::FilterCriteria;
use fx_journal::journal::{load_trades, JournalReport};

/// fx-journal [TRADES_JSON] [--json] [key=value ...]
fn main() -> Result<()> {
    let mut cfg = Config::from_env();

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&cfg.log_level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut pairs = Vec::new();
    for arg in &args {
        if arg == "--json" {
            cfg.report_format = ReportFormat::Json;
        } else if let Some((key, value)) = arg.split_once('=') {
            pairs.push((key, value));
        } else {
            cfg.trades_file = arg.clone();
        }
    }
    let filters = FilterCriteria::from_pairs(pairs).context("invalid filter argument")?;

    info!(
        "Trade file {} (broker {}, local {})",
        cfg.trades_file, cfg.broker_tz, cfg.local_tz
    );
    let journal = load_trades(&cfg.trades_file)?;
    let report = JournalReport::build(&journal, &filters, &cfg.report_options());

    match cfg.report_format {
        ReportFormat::Text => report.print_summary(),
        ReportFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    Ok(())
}
