//! Hour-by-hour dispatch of one strategy over a generated day.

use tracing::{debug, info, warn};

use crate::devices::Battery;

use super::kpi::ComparisonResult;
use super::policy::{Allocation, HourBalance, Rule, rules_for};
use super::power_balance::{BALANCE_TOLERANCE_KW, record_residual_kw};
use super::profile::DayProfiles;
use super::types::{
    AnomalyFlags, BatterySpec, HourlyRecord, SimulationConfig, StrategyKind, StrategyResult,
};
use crate::tariff::TouPeriod;

/// State carried from one hour to the next within a single run.
///
/// SoC and the anomaly flags are the only cross-hour coupling; everything
/// else is recomputed from the profiles each hour.
#[derive(Debug, Clone)]
pub struct RunState {
    pub battery: Battery,
    pub flags: AnomalyFlags,
    watch_anomalies: bool,
}

impl RunState {
    /// Fresh state at midnight. Anomalies are only tracked for the Smart run.
    pub fn new(spec: &BatterySpec, strategy: StrategyKind) -> Self {
        Self {
            battery: Battery::new(spec),
            flags: AnomalyFlags::default(),
            watch_anomalies: strategy == StrategyKind::Smart,
        }
    }

    /// Updates the anomaly flags from a settled hour.
    pub fn observe(&mut self, balance: &HourBalance) {
        if !self.watch_anomalies {
            return;
        }
        let peak = balance.period == TouPeriod::Peak;

        if peak
            && balance.grid_to_load_kw > 0.0
            && self.battery.is_empty()
            && !self.flags.battery_empty_during_peak
        {
            warn!(hour = balance.hour, "battery empty during peak, load drawn from grid");
            self.flags.battery_empty_during_peak = true;
        }

        if peak && balance.battery_kw() > 0.0 && !self.flags.charging_during_peak {
            warn!(hour = balance.hour, "battery charging during peak");
            self.flags.charging_during_peak = true;
        }

        if balance.excess_solar_kw > 0.0
            && balance.curtailed_kw > 0.0
            && self.battery.is_full()
            && !self.flags.battery_full_during_solar
        {
            warn!(
                hour = balance.hour,
                curtailed_kw = balance.curtailed_kw,
                "battery full, solar curtailed"
            );
            self.flags.battery_full_during_solar = true;
        }
    }
}

/// Pushes a rule's allocation through the battery and returns what it took.
///
/// The battery may accept or deliver less than asked when a request meets a
/// SoC bound; the shortfall stays in the hour's balance for later rules.
fn settle(wanted: Allocation, battery: &mut Battery) -> Allocation {
    Allocation {
        solar_to_battery: battery.charge(wanted.solar_to_battery),
        grid_to_battery: battery.charge(wanted.grid_to_battery),
        battery_to_load: battery.discharge(wanted.battery_to_load),
        ..wanted
    }
}

/// Runs dispatch strategies over one day of profiles.
///
/// Borrows the validated config and the pre-generated profiles; every call to
/// [`DispatchSimulator::run`] starts from fresh state, so the Baseline and
/// Smart runs share nothing mutable.
pub struct DispatchSimulator<'a> {
    config: &'a SimulationConfig,
    profiles: &'a DayProfiles,
}

impl<'a> DispatchSimulator<'a> {
    pub fn new(config: &'a SimulationConfig, profiles: &'a DayProfiles) -> Self {
        Self { config, profiles }
    }

    /// Executes one hour against `state` and returns its ledger row.
    ///
    /// # Arguments
    ///
    /// * `hour` - Hour of day, indexes the profiles
    /// * `rules` - Ordered rule list of the strategy
    /// * `state` - Cross-hour run state, updated in place
    pub fn step(&self, hour: usize, rules: &[Rule], state: &mut RunState) -> HourlyRecord {
        let p = self.profiles;
        let mut balance = HourBalance::open(hour, p.periods[hour], p.solar_kw[hour], p.load_kw[hour]);

        for rule in rules {
            let wanted = rule.allocate(&balance, &state.battery);
            if wanted.is_empty() {
                continue;
            }
            let settled = settle(wanted, &mut state.battery);
            debug!(
                hour,
                rule = rule.name(),
                ?settled,
                soc = state.battery.soc,
                "rule applied"
            );
            balance.apply(&settled);
        }
        debug_assert!(balance.is_settled(), "hour {hour} left unsettled: {balance:?}");

        state.observe(&balance);

        let record = HourlyRecord {
            hour,
            period: balance.period,
            solar_kw: balance.solar_kw,
            load_kw: balance.load_kw,
            price: p.price[hour],
            soc: state.battery.soc,
            grid_kw: balance.grid_kw(),
            battery_kw: balance.battery_kw(),
            charge_kw: balance.charge_kw,
            discharge_kw: balance.discharge_kw,
            curtailed_kw: balance.curtailed_kw,
        };
        debug_assert!(
            record_residual_kw(&record).abs() <= BALANCE_TOLERANCE_KW,
            "hour {hour} does not balance: {record:?}"
        );
        record
    }

    /// Runs a strategy across the whole day.
    pub fn run(&self, strategy: StrategyKind) -> StrategyResult {
        let rules = rules_for(strategy, self.config, self.profiles);
        let mut state = RunState::new(&self.config.battery, strategy);

        let records: Vec<HourlyRecord> = (0..self.profiles.len())
            .map(|hour| self.step(hour, &rules, &mut state))
            .collect();

        let result = StrategyResult::new(strategy, records, state.flags);
        info!(
            strategy = %strategy,
            grid_kwh = result.totals.grid_kwh,
            cost = result.totals.cost,
            curtailed_kwh = result.totals.curtailed_kwh,
            final_soc = state.battery.soc,
            "strategy run complete"
        );
        result
    }
}

/// Generates the day, runs both strategies, and derives the comparison.
pub fn simulate(config: &SimulationConfig) -> ComparisonResult {
    let profiles = DayProfiles::generate(config);
    let sim = DispatchSimulator::new(config, &profiles);
    let baseline = sim.run(StrategyKind::Baseline);
    let smart = sim.run(StrategyKind::Smart);
    let result = ComparisonResult::new(config.clone(), baseline, smart, profiles.clear_sky_solar_kwh());
    info!(
        eco_score = result.metrics.eco_score,
        cost_saved_percent = result.metrics.cost_saved_percent,
        grid_reduced_percent = result.metrics.grid_reduced_percent,
        "comparison complete"
    );
    result
}
