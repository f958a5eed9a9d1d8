pub mod engine;
/// Comparison metrics and run summary.
pub mod kpi;
/// Named dispatch rules and the grid-charge ceiling.
pub mod policy;
pub mod power_balance;
/// Hourly solar, load, and price arrays.
pub mod profile;
pub mod types;

pub use engine::{DispatchSimulator, simulate};
pub use kpi::{ComparisonMetrics, ComparisonResult, RunSummary};
pub use profile::DayProfiles;
