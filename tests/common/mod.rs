//! Shared test fixtures for integration tests.
#![allow(dead_code)]

use microgrid_sim::config::ScenarioConfig;
use microgrid_sim::sim::kpi::ComparisonResult;
use microgrid_sim::sim::power_balance::record_residual_kw;
use microgrid_sim::sim::simulate;
use microgrid_sim::sim::types::{SimulationConfig, StrategyResult};

/// Tolerance for the hourly energy balance.
pub const BALANCE_TOL: f64 = 1e-6;

/// Validates a raw scenario, panicking with the offending field on failure.
pub fn validated(raw: &ScenarioConfig) -> SimulationConfig {
    match raw.validate() {
        Ok(cfg) => cfg,
        Err(e) => panic!("scenario should validate: {e}"),
    }
}

/// Default scenario (10 kWh, 5 kW sunny, 7 kW peak, 4.00/6.50/8.50).
pub fn default_config() -> SimulationConfig {
    validated(&ScenarioConfig::default())
}

/// Runs both strategies for a raw scenario.
pub fn run(raw: &ScenarioConfig) -> ComparisonResult {
    simulate(&validated(raw))
}

/// Runs the named preset.
pub fn run_preset(name: &str) -> ComparisonResult {
    let raw = ScenarioConfig::from_preset(name).expect("preset should exist");
    run(&raw)
}

/// Default scenario with a different battery capacity.
pub fn with_capacity(base: &ScenarioConfig, capacity_kwh: f64) -> ScenarioConfig {
    let mut raw = base.clone();
    raw.battery.capacity_kwh = capacity_kwh;
    raw
}

/// Asserts every hour of a run balances and stays within SoC bounds.
pub fn assert_run_invariants(run: &StrategyResult, cfg: &SimulationConfig) {
    assert_eq!(run.records.len(), 24, "{} should cover 24 hours", run.strategy);
    for r in &run.records {
        let residual = record_residual_kw(r);
        assert!(
            residual.abs() <= BALANCE_TOL,
            "{} hour {}: residual {residual:e}",
            run.strategy,
            r.hour
        );
        assert!(
            r.soc >= cfg.battery.min_soc && r.soc <= cfg.battery.max_soc,
            "{} hour {}: soc {} outside [{}, {}]",
            run.strategy,
            r.hour,
            r.soc,
            cfg.battery.min_soc,
            cfg.battery.max_soc
        );
        assert!(r.grid_kw >= 0.0 && r.charge_kw >= 0.0 && r.discharge_kw >= 0.0);
        assert!(r.curtailed_kw >= 0.0);
    }
}
