//! Time-of-use tariff: period boundaries and per-hour prices.

pub mod derc;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use derc::{RateEntry, RateTable};

/// Time-of-use pricing period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TouPeriod {
    OffPeak,
    Standard,
    Peak,
}

impl fmt::Display for TouPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::OffPeak => "off_peak",
            Self::Standard => "standard",
            Self::Peak => "peak",
        };
        f.write_str(s)
    }
}

/// Period boundaries in hours of day.
///
/// Off-peak is `[0, off_peak_end_hour)`, peak is `[peak_start_hour, peak_end_hour)`,
/// and every other hour (including the late evening after peak) is standard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TouWindows {
    pub off_peak_end_hour: usize,
    pub peak_start_hour: usize,
    pub peak_end_hour: usize,
}

impl Default for TouWindows {
    fn default() -> Self {
        Self {
            off_peak_end_hour: 6,
            peak_start_hour: 18,
            peak_end_hour: 22,
        }
    }
}

impl TouWindows {
    /// Classifies an hour of day (taken modulo 24).
    pub fn period_at(&self, hour: usize) -> TouPeriod {
        let h = hour % 24;
        if h < self.off_peak_end_hour {
            TouPeriod::OffPeak
        } else if (self.peak_start_hour..self.peak_end_hour).contains(&h) {
            TouPeriod::Peak
        } else {
            TouPeriod::Standard
        }
    }

    /// Midpoint of the peak window, used to centre the evening load peak.
    pub fn peak_center_hour(&self) -> f64 {
        (self.peak_start_hour + self.peak_end_hour) as f64 / 2.0
    }

    /// Hours of day belonging to the peak window.
    pub fn peak_hours(&self) -> std::ops::Range<usize> {
        self.peak_start_hour..self.peak_end_hour
    }
}

/// Where the three period prices came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum TariffSource {
    Manual,
    Derc { season: String, utility: String },
}

/// Resolved three-tier tariff.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TariffSchedule {
    pub off_peak_price: f64,
    pub standard_price: f64,
    pub peak_price: f64,
    pub windows: TouWindows,
    pub source: TariffSource,
}

impl TariffSchedule {
    /// Builds a schedule from explicitly supplied prices.
    pub fn manual(off_peak: f64, standard: f64, peak: f64, windows: TouWindows) -> Self {
        Self {
            off_peak_price: off_peak,
            standard_price: standard,
            peak_price: peak,
            windows,
            source: TariffSource::Manual,
        }
    }

    /// Builds a schedule from a rate table row.
    pub fn from_rate_entry(entry: &RateEntry, windows: TouWindows) -> Self {
        Self {
            off_peak_price: entry.off_peak_price,
            standard_price: entry.standard_price,
            peak_price: entry.peak_price,
            windows,
            source: TariffSource::Derc {
                season: entry.season.clone(),
                utility: entry.utility.clone(),
            },
        }
    }

    pub fn period_at(&self, hour: usize) -> TouPeriod {
        self.windows.period_at(hour)
    }

    pub fn price_of(&self, period: TouPeriod) -> f64 {
        match period {
            TouPeriod::OffPeak => self.off_peak_price,
            TouPeriod::Standard => self.standard_price,
            TouPeriod::Peak => self.peak_price,
        }
    }

    /// Price applicable at an hour of day.
    pub fn price_at(&self, hour: usize) -> f64 {
        self.price_of(self.period_at(hour))
    }

    /// Per-hour prices for `hours` steps starting at midnight.
    pub fn hourly_prices(&self, hours: usize) -> Vec<f64> {
        (0..hours).map(|h| self.price_at(h)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schedule() -> TariffSchedule {
        TariffSchedule::manual(4.0, 6.5, 8.5, TouWindows::default())
    }

    #[test]
    fn default_period_boundaries() {
        let w = TouWindows::default();
        for h in 0..6 {
            assert_eq!(w.period_at(h), TouPeriod::OffPeak, "hour {h}");
        }
        for h in 6..18 {
            assert_eq!(w.period_at(h), TouPeriod::Standard, "hour {h}");
        }
        for h in 18..22 {
            assert_eq!(w.period_at(h), TouPeriod::Peak, "hour {h}");
        }
        assert_eq!(w.period_at(22), TouPeriod::Standard);
        assert_eq!(w.period_at(23), TouPeriod::Standard);
    }

    #[test]
    fn prices_follow_periods() {
        let prices = schedule().hourly_prices(24);
        assert_eq!(prices.len(), 24);
        assert_eq!(prices[0], 4.0);
        assert_eq!(prices[5], 4.0);
        assert_eq!(prices[6], 6.5);
        assert_eq!(prices[18], 8.5);
        assert_eq!(prices[21], 8.5);
        assert_eq!(prices[23], 6.5);
        assert!(prices.iter().all(|p| *p > 0.0));
    }

    #[test]
    fn custom_windows_shift_peak() {
        let w = TouWindows {
            off_peak_end_hour: 5,
            peak_start_hour: 17,
            peak_end_hour: 23,
        };
        assert_eq!(w.period_at(5), TouPeriod::Standard);
        assert_eq!(w.period_at(17), TouPeriod::Peak);
        assert_eq!(w.period_at(22), TouPeriod::Peak);
        assert_eq!(w.peak_center_hour(), 20.0);
    }

    #[test]
    fn rate_entry_schedule_records_source() {
        let table = RateTable::builtin().expect("builtin table should parse");
        let entry = table.lookup("winter", "NDMC").expect("pair should exist");
        let s = TariffSchedule::from_rate_entry(entry, TouWindows::default());
        assert_eq!(s.price_at(19), entry.peak_price);
        assert_eq!(
            s.source,
            TariffSource::Derc {
                season: "winter".into(),
                utility: "NDMC".into()
            }
        );
    }
}
