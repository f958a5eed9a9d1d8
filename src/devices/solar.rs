use crate::devices::types::{HourlyProfile, daylight_frac};
use crate::sim::types::Weather;

/// First daylight hour (inclusive).
pub const SUNRISE_HOUR: usize = 6;
/// End of daylight (exclusive).
pub const SUNSET_HOUR: usize = 18;

/// A solar PV array with a half-sine generation profile.
///
/// Generation is zero outside the daylight window and peaks at solar noon at
/// `kw_peak` scaled by the weather factor. There is no noise: the same
/// parameters always produce the same curve.
#[derive(Debug, Clone)]
pub struct SolarPv {
    /// Nameplate output in kilowatts under clear sky.
    pub kw_peak: f64,

    /// Fraction of clear-sky output delivered (1.0 sunny, 0.5 cloudy).
    pub weather_factor: f64,

    /// Hour when sunrise occurs (inclusive).
    pub sunrise_idx: usize,

    /// Hour when sunset occurs (exclusive).
    pub sunset_idx: usize,
}

impl SolarPv {
    /// Creates an array with the standard 06:00-18:00 daylight window.
    ///
    /// # Arguments
    ///
    /// * `kw_peak` - Nameplate output in kilowatts
    /// * `weather` - Weather applied to the whole day
    pub fn new(kw_peak: f64, weather: Weather) -> Self {
        Self {
            kw_peak: kw_peak.max(0.0),
            weather_factor: weather.efficiency_factor(),
            sunrise_idx: SUNRISE_HOUR,
            sunset_idx: SUNSET_HOUR,
        }
    }

    /// The same array under a clear sky.
    pub fn clear_sky(&self) -> Self {
        Self {
            weather_factor: 1.0,
            ..self.clone()
        }
    }
}

impl HourlyProfile for SolarPv {
    fn kw_at(&self, hour: usize) -> f64 {
        self.kw_peak * self.weather_factor * daylight_frac(hour, self.sunrise_idx, self.sunset_idx)
    }

    fn device_type(&self) -> &'static str {
        "SolarPV"
    }
}
