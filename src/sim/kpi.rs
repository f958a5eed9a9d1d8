//! Post-hoc comparison metrics from a Baseline and a Smart run.

use std::fmt;

use serde::Serialize;

use super::types::{AnomalyFlags, EcoWeights, SimulationConfig, StrategyResult};

/// Relative reduction from `before` to `after`, in percent.
///
/// Zero when `before` is not positive. May be negative.
fn reduction_percent(before: f64, after: f64) -> f64 {
    if before > 0.0 {
        (before - after) / before * 100.0
    } else {
        0.0
    }
}

fn clamp_percent(x: f64) -> f64 {
    x.clamp(0.0, 100.0)
}

/// Metrics comparing the Smart run against the Baseline run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ComparisonMetrics {
    pub baseline_cost: f64,
    pub smart_cost: f64,
    pub baseline_grid_kwh: f64,
    pub smart_grid_kwh: f64,
    /// Cost reduction of Smart over Baseline (%, may be negative).
    pub cost_saved_percent: f64,
    /// Grid energy reduction of Smart over Baseline (%, may be negative).
    pub grid_reduced_percent: f64,
    /// Share of clear-sky solar the Smart run put to use (0..=100).
    ///
    /// Weather losses count as unused solar: a cloudy day scores lower than a
    /// sunny one even when nothing is curtailed.
    pub solar_utilization: f64,
    /// Battery throughput relative to two full swings of capacity (0..=100).
    pub battery_utilization: f64,
    /// Weighted composite of the four metrics above (0..=100).
    pub eco_score: f64,
}

impl ComparisonMetrics {
    /// Derives all metrics from the two runs.
    ///
    /// # Arguments
    ///
    /// * `baseline` - Baseline run
    /// * `smart` - Smart run
    /// * `battery_capacity_kwh` - Capacity used for battery utilization
    /// * `clear_sky_solar_kwh` - Day's solar energy under a clear sky
    /// * `weights` - Eco-score weights
    pub fn from_results(
        baseline: &StrategyResult,
        smart: &StrategyResult,
        battery_capacity_kwh: f64,
        clear_sky_solar_kwh: f64,
        weights: &EcoWeights,
    ) -> Self {
        let b = &baseline.totals;
        let s = &smart.totals;

        let cost_saved_percent = reduction_percent(b.cost, s.cost);
        let grid_reduced_percent = reduction_percent(b.grid_kwh, s.grid_kwh);

        let solar_utilization = if clear_sky_solar_kwh > 0.0 {
            clamp_percent((s.solar_kwh - s.curtailed_kwh) / clear_sky_solar_kwh * 100.0)
        } else {
            0.0
        };

        let battery_utilization = if battery_capacity_kwh > 0.0 {
            clamp_percent((s.charge_kwh + s.discharge_kwh) / (2.0 * battery_capacity_kwh) * 100.0)
        } else {
            0.0
        };

        let eco_score = eco_score(
            weights,
            cost_saved_percent,
            grid_reduced_percent,
            solar_utilization,
            battery_utilization,
        );

        Self {
            baseline_cost: b.cost,
            smart_cost: s.cost,
            baseline_grid_kwh: b.grid_kwh,
            smart_grid_kwh: s.grid_kwh,
            cost_saved_percent,
            grid_reduced_percent,
            solar_utilization,
            battery_utilization,
            eco_score,
        }
    }
}

/// Weighted mean of the clamped component percentages, clamped to `[0, 100]`.
pub fn eco_score(
    weights: &EcoWeights,
    cost_saved: f64,
    grid_reduced: f64,
    solar_utilization: f64,
    battery_utilization: f64,
) -> f64 {
    let total = weights.cost + weights.grid + weights.solar + weights.battery;
    if total <= 0.0 {
        return 0.0;
    }
    let sum = weights.cost * clamp_percent(cost_saved)
        + weights.grid * clamp_percent(grid_reduced)
        + weights.solar * clamp_percent(solar_utilization)
        + weights.battery * clamp_percent(battery_utilization);
    clamp_percent(sum / total)
}

impl fmt::Display for ComparisonMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Comparison Report ---")?;
        writeln!(
            f,
            "Cost:                  {:.2} -> {:.2}",
            self.baseline_cost, self.smart_cost
        )?;
        writeln!(
            f,
            "Grid energy:           {:.2} -> {:.2} kWh",
            self.baseline_grid_kwh, self.smart_grid_kwh
        )?;
        writeln!(f, "Cost saved:            {:.1}%", self.cost_saved_percent)?;
        writeln!(f, "Grid reduced:          {:.1}%", self.grid_reduced_percent)?;
        writeln!(f, "Solar utilization:     {:.1}%", self.solar_utilization)?;
        writeln!(f, "Battery utilization:   {:.1}%", self.battery_utilization)?;
        write!(f, "Eco score:             {:.1}", self.eco_score)
    }
}

/// Both ledgers with the metrics and anomaly flags derived from them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonResult {
    pub config: SimulationConfig,
    pub baseline: StrategyResult,
    pub smart: StrategyResult,
    pub metrics: ComparisonMetrics,
    /// Anomaly flags of the Smart run.
    pub flags: AnomalyFlags,
}

impl ComparisonResult {
    pub fn new(
        config: SimulationConfig,
        baseline: StrategyResult,
        smart: StrategyResult,
        clear_sky_solar_kwh: f64,
    ) -> Self {
        let metrics = ComparisonMetrics::from_results(
            &baseline,
            &smart,
            config.battery.capacity_kwh,
            clear_sky_solar_kwh,
            &config.scoring,
        );
        let flags = smart.flags;
        Self {
            config,
            baseline,
            smart,
            metrics,
            flags,
        }
    }

    /// The flattened view consumed by hint generators.
    pub fn summary(&self) -> RunSummary {
        RunSummary {
            eco_score: self.metrics.eco_score,
            cost_saved_percent: self.metrics.cost_saved_percent,
            grid_reduced_percent: self.metrics.grid_reduced_percent,
            battery_utilization: self.metrics.battery_utilization,
            solar_utilization: self.metrics.solar_utilization,
            battery_empty_during_peak: self.flags.battery_empty_during_peak,
            charging_during_peak: self.flags.charging_during_peak,
            battery_full_during_solar: self.flags.battery_full_during_solar,
        }
    }
}

impl fmt::Display for ComparisonResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.metrics)?;
        if !self.flags.any() {
            return write!(f, "Flags:                 none");
        }
        write!(
            f,
            "Flags:                 empty_during_peak={} charging_during_peak={} full_during_solar={}",
            self.flags.battery_empty_during_peak,
            self.flags.charging_during_peak,
            self.flags.battery_full_during_solar
        )
    }
}

/// Headline metrics and anomaly flags of one comparison.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RunSummary {
    pub eco_score: f64,
    pub cost_saved_percent: f64,
    pub grid_reduced_percent: f64,
    pub battery_utilization: f64,
    pub solar_utilization: f64,
    pub battery_empty_during_peak: bool,
    pub charging_during_peak: bool,
    pub battery_full_during_solar: bool,
}
