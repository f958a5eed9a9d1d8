//! Common types and traits for device profile components.

use crate::sim::types::HOURS_PER_DAY;

/// A device whose power is a deterministic function of the hour of day.
///
/// Solar and load both implement this so the profile generator can treat
/// them uniformly.
pub trait HourlyProfile {
    /// Returns the power at the given hour of day in kilowatts (>= 0).
    fn kw_at(&self, hour: usize) -> f64;

    /// Returns a human-readable type name for the device.
    fn device_type(&self) -> &'static str;

    /// Samples the device over one full day.
    fn day_profile(&self) -> Vec<f64> {
        (0..HOURS_PER_DAY).map(|h| self.kw_at(h)).collect()
    }
}

/// Half-sine daylight fraction for an hour of day.
///
/// Zero outside `[sunrise, sunset)`, rising from zero at sunrise to 1.0 at
/// the midpoint of the window.
///
/// # Arguments
///
/// * `hour` - Hour of day (taken modulo 24)
/// * `sunrise` - First daylight hour (inclusive)
/// * `sunset` - End of daylight (exclusive)
pub fn daylight_frac(hour: usize, sunrise: usize, sunset: usize) -> f64 {
    let h = hour % HOURS_PER_DAY;
    if h < sunrise || h >= sunset || sunset <= sunrise {
        return 0.0;
    }
    let x = (h - sunrise) as f64 / (sunset - sunrise) as f64;
    (std::f64::consts::PI * x).sin().max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_outside_window() {
        for h in (0..6).chain(18..24) {
            assert_eq!(daylight_frac(h, 6, 18), 0.0, "hour {h}");
        }
    }

    #[test]
    fn peaks_at_noon_and_is_symmetric() {
        assert!((daylight_frac(12, 6, 18) - 1.0).abs() < 1e-12);
        assert!((daylight_frac(9, 6, 18) - daylight_frac(15, 6, 18)).abs() < 1e-12);
        assert!(daylight_frac(7, 6, 18) < daylight_frac(8, 6, 18));
    }

    #[test]
    fn degenerate_window_is_dark() {
        assert_eq!(daylight_frac(12, 18, 6), 0.0);
    }
}
