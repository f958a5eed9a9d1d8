//! Regulator-published time-of-day rate table keyed by season and utility.

use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};

/// Rate table shipped with the crate.
const BUILTIN_RATES: &str = include_str!("../../data/derc_rates.toml");

/// One (season, utility) row of the rate table, prices per kWh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RateEntry {
    pub season: String,
    pub utility: String,
    pub off_peak_price: f64,
    pub standard_price: f64,
    pub peak_price: f64,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RateTableFile {
    schedule: Vec<RateEntry>,
}

/// Static reference table of time-of-day tariffs.
#[derive(Debug, Clone)]
pub struct RateTable {
    entries: Vec<RateEntry>,
}

impl RateTable {
    /// Parses the built-in rate table.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` if the embedded table is malformed.
    pub fn builtin() -> SimResult<Self> {
        Self::from_toml_str(BUILTIN_RATES)
    }

    /// Parses a rate table from TOML with one `[[schedule]]` array entry per row.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` if the TOML is invalid or any price is
    /// not strictly positive.
    pub fn from_toml_str(s: &str) -> SimResult<Self> {
        let file: RateTableFile =
            toml::from_str(s).map_err(|e| SimError::invalid("tariff.rate_table", e.to_string()))?;

        for entry in &file.schedule {
            let prices = [entry.off_peak_price, entry.standard_price, entry.peak_price];
            if prices.iter().any(|p| !p.is_finite() || *p <= 0.0) {
                return Err(SimError::invalid(
                    "tariff.rate_table",
                    format!(
                        "prices for {}/{} must be finite and > 0",
                        entry.season, entry.utility
                    ),
                ));
            }
        }

        Ok(Self {
            entries: file.schedule,
        })
    }

    /// Looks up the entry for a season and utility code, ignoring case and
    /// surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns `UnknownTariffSchedule` when no row matches.
    pub fn lookup(&self, season: &str, utility: &str) -> SimResult<&RateEntry> {
        let season_key = season.trim();
        let utility_key = utility.trim();
        self.entries
            .iter()
            .find(|e| {
                e.season.eq_ignore_ascii_case(season_key)
                    && e.utility.eq_ignore_ascii_case(utility_key)
            })
            .ok_or_else(|| SimError::UnknownTariffSchedule {
                season: season.to_string(),
                utility: utility.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_table_parses() {
        let table = RateTable::builtin().expect("builtin table should parse");
        for season in ["summer", "winter"] {
            for utility in ["TPDDL", "BRPL", "BYPL", "NDMC"] {
                assert!(table.lookup(season, utility).is_ok(), "{season}/{utility}");
            }
        }
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let table = RateTable::builtin().expect("builtin table should parse");
        let entry = table.lookup(" Summer", "tpddl").expect("pair should exist");
        assert_eq!(entry.utility, "TPDDL");
        assert!(entry.off_peak_price < entry.standard_price);
        assert!(entry.standard_price < entry.peak_price);
    }

    #[test]
    fn unknown_pair_is_reported() {
        let table = RateTable::builtin().expect("builtin table should parse");
        let err = table.lookup("monsoon", "TPDDL").unwrap_err();
        assert_eq!(
            err,
            SimError::UnknownTariffSchedule {
                season: "monsoon".into(),
                utility: "TPDDL".into(),
            }
        );
    }

    #[test]
    fn non_positive_price_rejected() {
        let toml = r#"
[[schedule]]
season = "summer"
utility = "X"
off_peak_price = 0.0
standard_price = 5.0
peak_price = 6.0
"#;
        let err = RateTable::from_toml_str(toml).unwrap_err();
        assert_eq!(err.field(), Some("tariff.rate_table"));
    }
}
