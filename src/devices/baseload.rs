use crate::devices::types::HourlyProfile;
use crate::sim::types::HOURS_PER_DAY;

/// Overnight floor as a fraction of the un-normalized shape.
const BASE_FRACTION: f64 = 0.30;
const MORNING_CENTER_HOUR: f64 = 8.0;
const MORNING_AMPLITUDE: f64 = 0.35;
const MORNING_WIDTH_HOURS: f64 = 1.5;
const EVENING_AMPLITUDE: f64 = 0.65;
const EVENING_WIDTH_HOURS: f64 = 1.8;

/// A household load with a morning rise and a larger evening peak.
///
/// The shape is the sum of a constant floor and two Gaussian bumps on a
/// 24-hour circle, then normalized so the largest hourly sample equals
/// `peak_kw`.
///
/// # Examples
///
/// ```
/// use microgrid_sim::devices::baseload::BaseLoad;
/// use microgrid_sim::devices::types::HourlyProfile;
///
/// let load = BaseLoad::new(7.0, 20.0);
/// assert!((load.kw_at(20) - 7.0).abs() < 1e-9);
/// assert!(load.kw_at(12) < load.kw_at(8));
/// ```
#[derive(Debug, Clone)]
pub struct BaseLoad {
    /// Maximum hourly demand in kilowatts.
    pub peak_kw: f64,

    /// Hour the evening bump is centred on.
    pub evening_center_hour: f64,

    /// Largest raw shape value over the day, used for normalization.
    shape_max: f64,
}

impl BaseLoad {
    /// Creates a load curve.
    ///
    /// # Arguments
    ///
    /// * `peak_kw` - Maximum hourly demand in kilowatts
    /// * `evening_center_hour` - Centre of the evening peak, normally the middle
    ///   of the peak-price window
    pub fn new(peak_kw: f64, evening_center_hour: f64) -> Self {
        let shape_max = (0..HOURS_PER_DAY)
            .map(|h| raw_shape(h, evening_center_hour))
            .fold(0.0_f64, f64::max);
        Self {
            peak_kw: peak_kw.max(0.0),
            evening_center_hour,
            shape_max,
        }
    }
}

/// Shortest distance between two hours on the 24-hour circle.
fn circular_distance(a: f64, b: f64) -> f64 {
    let d = (a - b).abs() % HOURS_PER_DAY as f64;
    d.min(HOURS_PER_DAY as f64 - d)
}

fn bump(hour: f64, center: f64, width: f64) -> f64 {
    let d = circular_distance(hour, center);
    (-(d * d) / (2.0 * width * width)).exp()
}

fn raw_shape(hour: usize, evening_center: f64) -> f64 {
    let h = hour as f64;
    BASE_FRACTION
        + MORNING_AMPLITUDE * bump(h, MORNING_CENTER_HOUR, MORNING_WIDTH_HOURS)
        + EVENING_AMPLITUDE * bump(h, evening_center, EVENING_WIDTH_HOURS)
}

impl HourlyProfile for BaseLoad {
    fn kw_at(&self, hour: usize) -> f64 {
        if self.shape_max <= 0.0 {
            return 0.0;
        }
        self.peak_kw * raw_shape(hour % HOURS_PER_DAY, self.evening_center_hour) / self.shape_max
    }

    fn device_type(&self) -> &'static str {
        "BaseLoad"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maximum_equals_peak() {
        for peak in [1.0, 7.0, 20.0] {
            let profile = BaseLoad::new(peak, 20.0).day_profile();
            let max = profile.iter().copied().fold(0.0_f64, f64::max);
            assert!((max - peak).abs() < 1e-9, "peak {peak}: max {max}");
        }
    }

    #[test]
    fn evening_peak_inside_peak_window() {
        let profile = BaseLoad::new(7.0, 20.0).day_profile();
        let argmax = profile
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(h, _)| h);
        assert_eq!(argmax, Some(20));
    }

    #[test]
    fn has_morning_rise() {
        let load = BaseLoad::new(7.0, 20.0);
        assert!(load.kw_at(8) > load.kw_at(4));
        assert!(load.kw_at(8) > load.kw_at(12));
    }

    #[test]
    fn always_positive() {
        let load = BaseLoad::new(1.0, 20.0);
        assert!(load.day_profile().iter().all(|kw| *kw > 0.0));
    }

    #[test]
    fn circular_distance_wraps_midnight() {
        assert_eq!(circular_distance(23.0, 1.0), 2.0);
        assert_eq!(circular_distance(0.0, 20.0), 4.0);
    }
}
