//! Seeded sweep over random valid scenarios checking the dispatch invariants.

mod common;

use rand::{Rng, SeedableRng, rngs::StdRng};

use microgrid_sim::config::ScenarioConfig;
use microgrid_sim::tariff::TouPeriod;

const SEED: u64 = 42;
const CASES: usize = 200;

fn random_scenario(rng: &mut StdRng) -> ScenarioConfig {
    let mut raw = ScenarioConfig::default();

    raw.battery.capacity_kwh = rng.random_range(1.0..=100.0);
    raw.battery.round_trip_efficiency = rng.random_range(0.5..=1.0);
    raw.battery.min_soc = rng.random_range(0.0..=0.2);
    raw.battery.max_soc = rng.random_range(0.5..=1.0);
    raw.battery.initial_soc = rng.random_range(0.2..=raw.battery.max_soc);

    raw.solar.capacity_kw = rng.random_range(3.0..=7.0);
    let weather = if rng.random_bool(0.5) { "sunny" } else { "cloudy" };
    raw.solar.weather = weather.to_string();
    raw.load.peak_kw = rng.random_range(1.0..=20.0);

    if rng.random_bool(0.25) {
        raw.tariff.mode = "derc".to_string();
        let season = if rng.random_bool(0.5) { "summer" } else { "winter" };
        raw.tariff.season = season.to_string();
        raw.tariff.utility = ["TPDDL", "BRPL", "BYPL", "NDMC"][rng.random_range(0..4)].to_string();
    } else {
        raw.tariff.off_peak_price = rng.random_range(2.0..=10.0);
        raw.tariff.standard_price = rng.random_range(3.0..=12.0);
        raw.tariff.peak_price = rng.random_range(5.0..=15.0);
    }
    raw
}

#[test]
fn random_scenarios_conserve_energy_and_respect_bounds() {
    let mut rng = StdRng::seed_from_u64(SEED);
    for case in 0..CASES {
        let raw = random_scenario(&mut rng);
        let result = common::run(&raw);
        let cfg = &result.config;

        common::assert_run_invariants(&result.baseline, cfg);
        common::assert_run_invariants(&result.smart, cfg);

        for r in &result.baseline.records {
            assert_eq!(r.soc, cfg.battery.initial_soc, "case {case} hour {}", r.hour);
        }
        for r in &result.smart.records {
            if r.discharge_kw > 0.0 {
                assert_eq!(r.period, TouPeriod::Peak, "case {case} hour {}", r.hour);
            }
            if r.period == TouPeriod::Peak {
                assert!(r.battery_kw <= 0.0, "case {case} hour {}", r.hour);
            }
        }
        assert!(!result.flags.charging_during_peak, "case {case}");

        let m = &result.metrics;
        assert!((0.0..=100.0).contains(&m.eco_score), "case {case}: {m:?}");
        assert!((0.0..=100.0).contains(&m.solar_utilization), "case {case}: {m:?}");
        assert!((0.0..=100.0).contains(&m.battery_utilization), "case {case}: {m:?}");
    }
}

#[test]
fn random_scenarios_are_deterministic() {
    let mut rng = StdRng::seed_from_u64(SEED + 1);
    for _ in 0..20 {
        let raw = random_scenario(&mut rng);
        assert_eq!(common::run(&raw), common::run(&raw));
    }
}
