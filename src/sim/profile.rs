//! Hourly input arrays derived once per simulation from the validated config.

use serde::Serialize;
use tracing::debug;

use crate::devices::{BaseLoad, HourlyProfile, SolarPv};
use crate::tariff::TouPeriod;

use super::types::{HOURS_PER_DAY, SimulationConfig};

/// The parallel hourly arrays consumed by both dispatch runs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayProfiles {
    /// Solar generation after weather derating (kW).
    pub solar_kw: Vec<f64>,
    /// Solar generation the array would deliver under a clear sky (kW).
    pub clear_sky_solar_kw: Vec<f64>,
    /// Load demand (kW).
    pub load_kw: Vec<f64>,
    /// Price per kWh.
    pub price: Vec<f64>,
    /// Tariff period of each hour.
    pub periods: Vec<TouPeriod>,
}

impl DayProfiles {
    /// Generates solar, load, and price arrays for one day.
    ///
    /// Pure function of `config`: calling it twice yields identical arrays.
    pub fn generate(config: &SimulationConfig) -> Self {
        let pv = SolarPv::new(config.solar_capacity_kw, config.weather);
        let load = BaseLoad::new(
            config.peak_load_kw,
            config.tariff.windows.peak_center_hour(),
        );

        let solar_kw = pv.day_profile();
        let load_kw = load.day_profile();
        for (device, series) in [(pv.device_type(), &solar_kw), (load.device_type(), &load_kw)] {
            debug!(device, kwh = series.iter().sum::<f64>(), "profile generated");
        }

        Self {
            solar_kw,
            clear_sky_solar_kw: pv.clear_sky().day_profile(),
            load_kw,
            price: config.tariff.hourly_prices(HOURS_PER_DAY),
            periods: (0..HOURS_PER_DAY)
                .map(|h| config.tariff.period_at(h))
                .collect(),
        }
    }

    /// Number of hourly steps.
    pub fn len(&self) -> usize {
        self.load_kw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.load_kw.is_empty()
    }

    /// Total clear-sky solar energy over the day (kWh).
    pub fn clear_sky_solar_kwh(&self) -> f64 {
        self.clear_sky_solar_kw.iter().sum()
    }
}
