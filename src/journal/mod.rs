pub mod commentary;
pub mod loader;
pub mod report;

pub use commentary::{
    balance_comment, dashboard_comment, pair_comment, risk_comment, strategy_comment,
    time_axis_comment, CoachComment,
};
pub use loader::{load_trades, parse_trades, Journal};
pub use report::{JournalReport, ReportOptions};
