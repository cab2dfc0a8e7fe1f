//! Stats module - aggregation, correlation and derived scores

pub mod aggregate;
mod calculator;
pub mod score;
pub mod summary;

pub use calculator::{DescriptiveStats, HistogramBin, LinearFit, StatsCalculator};
pub use summary::StatisticsSummary;
