pub mod breakdown;
pub mod efficiency;
pub mod evaluation;
pub mod kpis;
pub mod similarity;
pub mod streaks;

pub use breakdown::{Breakdown, BreakdownAnalyzer, Dimension, GroupStats, LossShare};
pub use efficiency::{average_exit_efficiency, exit_efficiency, TradeEfficiency};
pub use evaluation::{MonthlyEvaluation, Rating, TraderLevel};
pub use kpis::{EquityPoint, Kpis};
pub use similarity::{similar_trades, SimilarTrade};
pub use streaks::{streaks, StreakSummary};
