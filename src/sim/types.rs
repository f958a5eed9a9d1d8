//! Core simulation types: validated configuration, hourly ledger rows, and
//! per-strategy results.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::tariff::{TariffSchedule, TouPeriod};

/// Number of hourly steps in one simulated day.
pub const HOURS_PER_DAY: usize = 24;

/// Weather condition applied uniformly to the day's solar curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Weather {
    Sunny,
    Cloudy,
}

impl Weather {
    /// Fraction of clear-sky output the array delivers.
    pub fn efficiency_factor(self) -> f64 {
        match self {
            Self::Sunny => 1.0,
            Self::Cloudy => 0.5,
        }
    }
}

impl FromStr for Weather {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sunny" => Ok(Self::Sunny),
            "cloudy" => Ok(Self::Cloudy),
            other => Err(format!("must be \"sunny\" or \"cloudy\", got \"{other}\"")),
        }
    }
}

/// Battery parameters after validation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BatterySpec {
    /// Usable nameplate capacity (kWh).
    pub capacity_kwh: f64,
    /// Round-trip efficiency (0.5..=1.0).
    pub round_trip_efficiency: f64,
    /// Lower SoC bound as a fraction of capacity.
    pub min_soc: f64,
    /// Upper SoC bound as a fraction of capacity.
    pub max_soc: f64,
    /// SoC at midnight.
    pub initial_soc: f64,
}

impl BatterySpec {
    /// One-way efficiency applied on both charge and discharge.
    pub fn one_way_efficiency(&self) -> f64 {
        self.round_trip_efficiency.sqrt()
    }
}

/// Weights of the eco-score composite.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EcoWeights {
    pub cost: f64,
    pub grid: f64,
    pub solar: f64,
    pub battery: f64,
}

impl Default for EcoWeights {
    fn default() -> Self {
        Self {
            cost: 0.40,
            grid: 0.30,
            solar: 0.20,
            battery: 0.10,
        }
    }
}

/// Validated, immutable simulation parameters.
///
/// Only [`crate::config::ScenarioConfig::validate`] produces this, so every
/// field is known to be inside its documented bound.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationConfig {
    pub battery: BatterySpec,
    /// Solar array nameplate (kW).
    pub solar_capacity_kw: f64,
    pub weather: Weather,
    /// Maximum of the daily load curve (kW).
    pub peak_load_kw: f64,
    pub tariff: TariffSchedule,
    pub scoring: EcoWeights,
}

/// Dispatch strategy under comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// Passive: solar serves load, grid covers the rest, battery untouched.
    Baseline,
    /// Battery-aware dispatch with peak shaving and opportunistic charging.
    Smart,
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Baseline => f.write_str("baseline"),
            Self::Smart => f.write_str("smart"),
        }
    }
}

/// One simulated hour. Flows are kW held for one hour, so numerically kWh.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlyRecord {
    /// Hour of day (0-23).
    pub hour: usize,
    pub period: TouPeriod,
    /// Solar generation after weather derating (kW).
    pub solar_kw: f64,
    /// Load demand (kW).
    pub load_kw: f64,
    /// Energy price applicable to this hour.
    pub price: f64,
    /// Battery SoC after the hour (fraction).
    pub soc: f64,
    /// Grid import serving load and battery (kW, >= 0).
    pub grid_kw: f64,
    /// Net battery flow (kW; positive = charging).
    pub battery_kw: f64,
    /// Bus-side energy into the battery (kW, >= 0).
    pub charge_kw: f64,
    /// Bus-side energy out of the battery (kW, >= 0).
    pub discharge_kw: f64,
    /// Solar discarded because load was met and the battery could not absorb it (kW).
    pub curtailed_kw: f64,
}

impl HourlyRecord {
    /// Cost of this hour's grid import.
    pub fn cost(&self) -> f64 {
        self.grid_kw * self.price
    }
}

impl fmt::Display for HourlyRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "h={:>2} {:<9} | solar={:>5.2} load={:>5.2} grid={:>5.2} kW \
             bat={:>+6.2} kW (SoC={:>5.1}%) curtail={:>5.2} | price={:.2} cost={:>6.2}",
            self.hour,
            self.period.to_string(),
            self.solar_kw,
            self.load_kw,
            self.grid_kw,
            self.battery_kw,
            self.soc * 100.0,
            self.curtailed_kw,
            self.price,
            self.cost(),
        )
    }
}

/// Flags describing questionable battery behaviour over a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AnomalyFlags {
    /// A peak hour left the battery at `min_soc` while load still came from grid.
    pub battery_empty_during_peak: bool,
    /// A peak hour showed positive net battery charge.
    pub charging_during_peak: bool,
    /// Solar was curtailed because the battery sat at `max_soc`.
    pub battery_full_during_solar: bool,
}

impl AnomalyFlags {
    pub fn any(&self) -> bool {
        self.battery_empty_during_peak || self.charging_during_peak || self.battery_full_during_solar
    }
}

/// Day totals for one strategy (kWh unless noted).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct StrategyTotals {
    pub solar_kwh: f64,
    pub load_kwh: f64,
    pub grid_kwh: f64,
    /// Sum of hourly `grid * price`.
    pub cost: f64,
    pub curtailed_kwh: f64,
    pub charge_kwh: f64,
    pub discharge_kwh: f64,
}

impl StrategyTotals {
    pub fn from_records(records: &[HourlyRecord]) -> Self {
        records.iter().fold(Self::default(), |mut t, r| {
            t.solar_kwh += r.solar_kw;
            t.load_kwh += r.load_kw;
            t.grid_kwh += r.grid_kw;
            t.cost += r.cost();
            t.curtailed_kwh += r.curtailed_kw;
            t.charge_kwh += r.charge_kw;
            t.discharge_kwh += r.discharge_kw;
            t
        })
    }
}

/// Complete 24-hour ledger of one strategy.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrategyResult {
    pub strategy: StrategyKind,
    pub records: Vec<HourlyRecord>,
    pub totals: StrategyTotals,
    pub flags: AnomalyFlags,
}

impl StrategyResult {
    pub fn new(strategy: StrategyKind, records: Vec<HourlyRecord>, flags: AnomalyFlags) -> Self {
        let totals = StrategyTotals::from_records(&records);
        Self {
            strategy,
            records,
            totals,
            flags,
        }
    }
}
