//! Single-site microgrid simulator comparing a passive and a battery-aware
//! dispatch strategy over one day of solar, load, and time-of-use prices.

pub mod config;
pub mod devices;
pub mod error;
pub mod io;
/// Profile generation, dispatch engine, and comparison metrics.
pub mod sim;
/// Time-of-use periods, prices, and the regulator rate table.
pub mod tariff;

pub use error::{SimError, SimResult};

/// Validates a scenario and runs the full comparison.
///
/// # Errors
///
/// Returns the first validation failure; no simulation step runs in that case.
pub fn run_scenario(scenario: &config::ScenarioConfig) -> SimResult<sim::ComparisonResult> {
    let config = scenario.validate()?;
    Ok(sim::simulate(&config))
}
