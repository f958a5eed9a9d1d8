//! TOML-based scenario configuration, presets, and validation.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};
use crate::sim::types::{BatterySpec, EcoWeights, SimulationConfig, Weather};
use crate::tariff::{RateTable, TariffSchedule, TouWindows};

/// Raw, unvalidated scenario parameters.
///
/// All fields have defaults matching the default scenario. Load from TOML
/// with [`ScenarioConfig::from_toml_file`], pick a preset with
/// [`ScenarioConfig::from_preset`], then call [`ScenarioConfig::validate`]
/// to obtain a [`SimulationConfig`].
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    /// Battery storage parameters.
    #[serde(default)]
    pub battery: BatteryConfig,
    /// Solar array parameters.
    #[serde(default)]
    pub solar: SolarConfig,
    /// Load curve parameters.
    #[serde(default)]
    pub load: LoadConfig,
    /// Tariff selection and manual prices.
    #[serde(default)]
    pub tariff: TariffConfig,
    /// Eco-score weights.
    #[serde(default)]
    pub scoring: ScoringConfig,
}

/// Battery storage parameters.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct BatteryConfig {
    /// Capacity (kWh, 1-100).
    pub capacity_kwh: f64,
    /// Round-trip efficiency (0.5-1.0).
    pub round_trip_efficiency: f64,
    /// Lower SoC bound (0.0-0.5).
    pub min_soc: f64,
    /// Upper SoC bound (0.5-1.0).
    pub max_soc: f64,
    /// SoC at midnight (0.2-1.0, within the SoC bounds).
    pub initial_soc: f64,
}

impl Default for BatteryConfig {
    fn default() -> Self {
        Self {
            capacity_kwh: 10.0,
            round_trip_efficiency: 0.90,
            min_soc: 0.20,
            max_soc: 1.00,
            initial_soc: 0.50,
        }
    }
}

/// Solar array parameters.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct SolarConfig {
    /// Nameplate (kW, 3-7).
    pub capacity_kw: f64,
    /// `"sunny"` or `"cloudy"`.
    pub weather: String,
}

impl Default for SolarConfig {
    fn default() -> Self {
        Self {
            capacity_kw: 5.0,
            weather: "sunny".to_string(),
        }
    }
}

/// Load curve parameters.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoadConfig {
    /// Maximum of the daily load curve (kW, 1-20).
    pub peak_kw: f64,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self { peak_kw: 7.0 }
    }
}

/// Tariff selection.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct TariffConfig {
    /// `"manual"` or `"derc"`.
    pub mode: String,
    /// Off-peak price per kWh (manual mode, 2-10).
    pub off_peak_price: f64,
    /// Standard price per kWh (manual mode, 3-12).
    pub standard_price: f64,
    /// Peak price per kWh (manual mode, 5-15).
    pub peak_price: f64,
    /// Rate table season (derc mode).
    pub season: String,
    /// Rate table utility code (derc mode).
    pub utility: String,
    /// End of the off-peak window (exclusive hour).
    pub off_peak_end_hour: usize,
    /// Start of the peak window (inclusive hour).
    pub peak_start_hour: usize,
    /// End of the peak window (exclusive hour).
    pub peak_end_hour: usize,
}

impl Default for TariffConfig {
    fn default() -> Self {
        let windows = TouWindows::default();
        Self {
            mode: "manual".to_string(),
            off_peak_price: 4.00,
            standard_price: 6.50,
            peak_price: 8.50,
            season: "summer".to_string(),
            utility: "TPDDL".to_string(),
            off_peak_end_hour: windows.off_peak_end_hour,
            peak_start_hour: windows.peak_start_hour,
            peak_end_hour: windows.peak_end_hour,
        }
    }
}

/// Eco-score weights.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScoringConfig {
    pub cost_weight: f64,
    pub grid_weight: f64,
    pub solar_weight: f64,
    pub battery_weight: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        let w = EcoWeights::default();
        Self {
            cost_weight: w.cost,
            grid_weight: w.grid,
            solar_weight: w.solar,
            battery_weight: w.battery,
        }
    }
}

/// Checks that `value` is finite and inside `[lo, hi]`.
fn check_range(field: &str, value: f64, lo: f64, hi: f64) -> SimResult<()> {
    if !value.is_finite() {
        return Err(SimError::invalid(field, "must be a finite number"));
    }
    if !(lo..=hi).contains(&value) {
        return Err(SimError::invalid(
            field,
            format!("must be in [{lo}, {hi}], got {value}"),
        ));
    }
    Ok(())
}

impl ScenarioConfig {
    /// Available preset names.
    pub const PRESETS: &[&str] = &[
        "default",
        "full_battery",
        "empty_at_peak",
        "cloudy_small_battery",
        "derc_summer",
    ];

    /// Small battery starting full under a large sunny array: surplus solar
    /// has nowhere to go.
    pub fn full_battery() -> Self {
        let mut cfg = Self::default();
        cfg.battery.capacity_kwh = 1.0;
        cfg.battery.initial_soc = 1.0;
        cfg.solar.capacity_kw = 7.0;
        cfg
    }

    /// Battery starting at its floor with a heavy evening load.
    pub fn empty_at_peak() -> Self {
        let mut cfg = Self::default();
        cfg.battery.initial_soc = cfg.battery.min_soc;
        cfg.load.peak_kw = 20.0;
        cfg
    }

    /// Overcast day with a minimal battery.
    pub fn cloudy_small_battery() -> Self {
        let mut cfg = Self::default();
        cfg.battery.capacity_kwh = 1.0;
        cfg.solar.weather = "cloudy".to_string();
        cfg
    }

    /// Regulator summer schedule for the default utility.
    pub fn derc_summer() -> Self {
        let mut cfg = Self::default();
        cfg.tariff.mode = "derc".to_string();
        cfg
    }

    /// Loads a scenario from a named preset.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` if the preset name is unknown.
    pub fn from_preset(name: &str) -> SimResult<Self> {
        match name {
            "default" => Ok(Self::default()),
            "full_battery" => Ok(Self::full_battery()),
            "empty_at_peak" => Ok(Self::empty_at_peak()),
            "cloudy_small_battery" => Ok(Self::cloudy_small_battery()),
            "derc_summer" => Ok(Self::derc_summer()),
            _ => Err(SimError::invalid(
                "preset",
                format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            )),
        }
    }

    /// Parses a scenario from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> SimResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            SimError::invalid("scenario", format!("cannot read \"{}\": {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a scenario from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> SimResult<Self> {
        toml::from_str(s).map_err(|e| SimError::invalid("toml", e.to_string()))
    }

    /// Renders the scenario back to TOML.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` if serialization fails.
    pub fn to_toml_string(&self) -> SimResult<String> {
        toml::to_string(self).map_err(|e| SimError::invalid("toml", e.to_string()))
    }

    /// Validates against the built-in rate table.
    ///
    /// # Errors
    ///
    /// See [`ScenarioConfig::validate_with`].
    pub fn validate(&self) -> SimResult<SimulationConfig> {
        let table = RateTable::builtin()?;
        self.validate_with(&table)
    }

    /// Range-checks every field and resolves the tariff.
    ///
    /// Fails fast on the first offending field.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` naming the field for any bound violation
    /// or unrecognized mode string, and `UnknownTariffSchedule` when a `derc`
    /// (season, utility) pair is missing from `table`.
    pub fn validate_with(&self, table: &RateTable) -> SimResult<SimulationConfig> {
        let battery = self.validate_battery()?;

        check_range("solar.capacity_kw", self.solar.capacity_kw, 3.0, 7.0)?;
        let weather: Weather = self
            .solar
            .weather
            .parse()
            .map_err(|msg: String| SimError::invalid("solar.weather", msg))?;

        check_range("load.peak_kw", self.load.peak_kw, 1.0, 20.0)?;

        let tariff = self.validate_tariff(table)?;
        let scoring = self.validate_scoring()?;

        Ok(SimulationConfig {
            battery,
            solar_capacity_kw: self.solar.capacity_kw,
            weather,
            peak_load_kw: self.load.peak_kw,
            tariff,
            scoring,
        })
    }

    fn validate_battery(&self) -> SimResult<BatterySpec> {
        let b = &self.battery;
        check_range("battery.capacity_kwh", b.capacity_kwh, 1.0, 100.0)?;
        check_range(
            "battery.round_trip_efficiency",
            b.round_trip_efficiency,
            0.5,
            1.0,
        )?;
        check_range("battery.min_soc", b.min_soc, 0.0, 0.5)?;
        check_range("battery.max_soc", b.max_soc, 0.5, 1.0)?;
        if b.max_soc <= b.min_soc {
            return Err(SimError::invalid(
                "battery.max_soc",
                "must be > battery.min_soc",
            ));
        }
        check_range("battery.initial_soc", b.initial_soc, 0.2, 1.0)?;
        if !(b.min_soc..=b.max_soc).contains(&b.initial_soc) {
            return Err(SimError::invalid(
                "battery.initial_soc",
                format!("must be within [{}, {}]", b.min_soc, b.max_soc),
            ));
        }

        Ok(BatterySpec {
            capacity_kwh: b.capacity_kwh,
            round_trip_efficiency: b.round_trip_efficiency,
            min_soc: b.min_soc,
            max_soc: b.max_soc,
            initial_soc: b.initial_soc,
        })
    }

    fn validate_tariff(&self, table: &RateTable) -> SimResult<TariffSchedule> {
        let t = &self.tariff;
        let windows = TouWindows {
            off_peak_end_hour: t.off_peak_end_hour,
            peak_start_hour: t.peak_start_hour,
            peak_end_hour: t.peak_end_hour,
        };
        if windows.off_peak_end_hour == 0 {
            return Err(SimError::invalid("tariff.off_peak_end_hour", "must be > 0"));
        }
        if windows.off_peak_end_hour > windows.peak_start_hour {
            return Err(SimError::invalid(
                "tariff.off_peak_end_hour",
                "must be <= tariff.peak_start_hour",
            ));
        }
        if windows.peak_start_hour >= windows.peak_end_hour {
            return Err(SimError::invalid(
                "tariff.peak_start_hour",
                "must be < tariff.peak_end_hour",
            ));
        }
        if windows.peak_end_hour > 24 {
            return Err(SimError::invalid("tariff.peak_end_hour", "must be <= 24"));
        }

        match t.mode.trim().to_ascii_lowercase().as_str() {
            "manual" => {
                check_range("tariff.off_peak_price", t.off_peak_price, 2.0, 10.0)?;
                check_range("tariff.standard_price", t.standard_price, 3.0, 12.0)?;
                check_range("tariff.peak_price", t.peak_price, 5.0, 15.0)?;
                Ok(TariffSchedule::manual(
                    t.off_peak_price,
                    t.standard_price,
                    t.peak_price,
                    windows,
                ))
            }
            "derc" => {
                let entry = table.lookup(&t.season, &t.utility)?;
                Ok(TariffSchedule::from_rate_entry(entry, windows))
            }
            other => Err(SimError::invalid(
                "tariff.mode",
                format!("must be \"manual\" or \"derc\", got \"{other}\""),
            )),
        }
    }

    fn validate_scoring(&self) -> SimResult<EcoWeights> {
        let s = &self.scoring;
        let weights = [
            ("scoring.cost_weight", s.cost_weight),
            ("scoring.grid_weight", s.grid_weight),
            ("scoring.solar_weight", s.solar_weight),
            ("scoring.battery_weight", s.battery_weight),
        ];
        for (field, w) in weights {
            if !w.is_finite() || w < 0.0 {
                return Err(SimError::invalid(field, "must be a finite number >= 0"));
            }
        }
        if weights.iter().map(|(_, w)| w).sum::<f64>() <= 0.0 {
            return Err(SimError::invalid("scoring", "weights must not all be zero"));
        }
        Ok(EcoWeights {
            cost: s.cost_weight,
            grid: s.grid_weight,
            solar: s.solar_weight,
            battery: s.battery_weight,
        })
    }
}
