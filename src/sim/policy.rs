//! Ordered dispatch rules applied to each simulated hour.
//!
//! A strategy is a fixed list of [`Rule`]s. The engine walks the list in
//! order, asks each rule for an [`Allocation`] given the hour's running
//! [`HourBalance`] and the battery, settles it against the battery, and folds
//! it into the balance. Priority is the list order and nothing else.

use crate::devices::Battery;
use crate::devices::battery::SOC_EPSILON;
use crate::tariff::TouPeriod;

use super::profile::DayProfiles;
use super::types::{SimulationConfig, StrategyKind};

/// Energy flows one rule assigns during one hour (kWh, bus side).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Allocation {
    pub solar_to_load: f64,
    pub solar_to_battery: f64,
    pub battery_to_load: f64,
    pub grid_to_load: f64,
    pub grid_to_battery: f64,
    pub curtailed: f64,
}

impl Allocation {
    /// True when the rule moved no energy.
    pub fn is_empty(&self) -> bool {
        self.solar_to_load <= 0.0
            && self.solar_to_battery <= 0.0
            && self.battery_to_load <= 0.0
            && self.grid_to_load <= 0.0
            && self.grid_to_battery <= 0.0
            && self.curtailed <= 0.0
    }
}

/// Running state of one hour while rules are applied.
///
/// Opens with the whole load unserved and the whole solar output unassigned;
/// after the last rule of a complete strategy both are zero.
#[derive(Debug, Clone, PartialEq)]
pub struct HourBalance {
    pub hour: usize,
    pub period: TouPeriod,
    pub solar_kw: f64,
    pub load_kw: f64,
    /// Load not yet served.
    pub remaining_load_kw: f64,
    /// Solar not yet assigned to load, battery, or curtailment.
    pub unassigned_solar_kw: f64,
    pub grid_to_load_kw: f64,
    pub grid_to_battery_kw: f64,
    pub charge_kw: f64,
    pub discharge_kw: f64,
    pub curtailed_kw: f64,
    /// Solar left after direct use, before battery charging.
    pub excess_solar_kw: f64,
    /// Set once any solar went into the battery this hour.
    pub solar_charged: bool,
}

impl HourBalance {
    pub fn open(hour: usize, period: TouPeriod, solar_kw: f64, load_kw: f64) -> Self {
        Self {
            hour,
            period,
            solar_kw,
            load_kw,
            remaining_load_kw: load_kw,
            unassigned_solar_kw: solar_kw,
            grid_to_load_kw: 0.0,
            grid_to_battery_kw: 0.0,
            charge_kw: 0.0,
            discharge_kw: 0.0,
            curtailed_kw: 0.0,
            excess_solar_kw: (solar_kw - load_kw).max(0.0),
            solar_charged: false,
        }
    }

    /// Folds a settled allocation into the balance.
    pub fn apply(&mut self, a: &Allocation) {
        self.remaining_load_kw -= a.solar_to_load + a.battery_to_load + a.grid_to_load;
        self.unassigned_solar_kw -= a.solar_to_load + a.solar_to_battery + a.curtailed;
        // Absorb rounding left by subtracting a value from itself in pieces.
        self.remaining_load_kw = self.remaining_load_kw.max(0.0);
        self.unassigned_solar_kw = self.unassigned_solar_kw.max(0.0);

        self.grid_to_load_kw += a.grid_to_load;
        self.grid_to_battery_kw += a.grid_to_battery;
        self.charge_kw += a.solar_to_battery + a.grid_to_battery;
        self.discharge_kw += a.battery_to_load;
        self.curtailed_kw += a.curtailed;
        if a.solar_to_battery > 0.0 {
            self.solar_charged = true;
        }
    }

    /// Total grid import this hour.
    pub fn grid_kw(&self) -> f64 {
        self.grid_to_load_kw + self.grid_to_battery_kw
    }

    /// Net battery flow (positive = charging).
    pub fn battery_kw(&self) -> f64 {
        self.charge_kw - self.discharge_kw
    }

    pub fn is_settled(&self) -> bool {
        self.remaining_load_kw <= 0.0 && self.unassigned_solar_kw <= 0.0
    }
}

/// A named dispatch rule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Rule {
    /// Solar serves load first.
    DirectSolarUse,
    /// Leftover solar charges the battery up to its headroom.
    SolarToBattery,
    /// Peak hours draw on stored energy before the grid.
    PeakDischarge,
    /// Off-peak hours top the battery up from the grid toward `ceiling_soc`.
    OffPeakGridCharge { ceiling_soc: f64 },
    /// The grid covers whatever load is left.
    GridFallback,
    /// Whatever solar is left is discarded.
    CurtailSurplus,
}

impl Rule {
    pub fn name(&self) -> &'static str {
        match self {
            Self::DirectSolarUse => "direct_solar_use",
            Self::SolarToBattery => "solar_to_battery",
            Self::PeakDischarge => "peak_discharge",
            Self::OffPeakGridCharge { .. } => "off_peak_grid_charge",
            Self::GridFallback => "grid_fallback",
            Self::CurtailSurplus => "curtail_surplus",
        }
    }

    /// Energy this rule would move given the hour so far.
    ///
    /// Rules never mutate anything; the engine settles the allocation
    /// against the battery and applies it.
    pub fn allocate(&self, balance: &HourBalance, battery: &Battery) -> Allocation {
        match *self {
            Self::DirectSolarUse => direct_solar_use(balance),
            Self::SolarToBattery => solar_to_battery(balance, battery),
            Self::PeakDischarge => peak_discharge(balance, battery),
            Self::OffPeakGridCharge { ceiling_soc } => {
                off_peak_grid_charge(balance, battery, ceiling_soc)
            }
            Self::GridFallback => Allocation {
                grid_to_load: balance.remaining_load_kw,
                ..Allocation::default()
            },
            Self::CurtailSurplus => Allocation {
                curtailed: balance.unassigned_solar_kw,
                ..Allocation::default()
            },
        }
    }
}

fn direct_solar_use(balance: &HourBalance) -> Allocation {
    Allocation {
        solar_to_load: balance.unassigned_solar_kw.min(balance.remaining_load_kw),
        ..Allocation::default()
    }
}

fn solar_to_battery(balance: &HourBalance, battery: &Battery) -> Allocation {
    if balance.unassigned_solar_kw <= 0.0 || battery.is_full() {
        return Allocation::default();
    }
    Allocation {
        solar_to_battery: balance
            .unassigned_solar_kw
            .min(battery.charge_acceptance_kw()),
        ..Allocation::default()
    }
}

fn peak_discharge(balance: &HourBalance, battery: &Battery) -> Allocation {
    if balance.period != TouPeriod::Peak
        || balance.remaining_load_kw <= 0.0
        || battery.is_empty()
    {
        return Allocation::default();
    }
    Allocation {
        battery_to_load: balance.remaining_load_kw.min(battery.deliverable_kw()),
        ..Allocation::default()
    }
}

fn off_peak_grid_charge(balance: &HourBalance, battery: &Battery, ceiling_soc: f64) -> Allocation {
    if balance.solar_charged
        || balance.period != TouPeriod::OffPeak
        || battery.soc >= ceiling_soc - SOC_EPSILON
    {
        return Allocation::default();
    }
    let to_ceiling_kw = (ceiling_soc - battery.soc) * battery.capacity_kwh / battery.eta_c;
    Allocation {
        grid_to_battery: to_ceiling_kw.min(battery.charge_acceptance_kw()),
        ..Allocation::default()
    }
}

/// SoC the Smart run grid-charges toward in off-peak hours.
///
/// Returns `None` when grid charging cannot pay off, i.e. an off-peak kWh
/// after round-trip losses costs at least as much as a peak kWh. Otherwise
/// the ceiling covers the peak window's unmet load, less the solar surplus
/// the battery will still absorb before the peak starts, never beyond the
/// usable window.
pub fn grid_charge_ceiling(config: &SimulationConfig, profiles: &DayProfiles) -> Option<f64> {
    let spec = &config.battery;
    let tariff = &config.tariff;
    if spec.capacity_kwh <= 0.0
        || tariff.off_peak_price / spec.round_trip_efficiency >= tariff.peak_price
    {
        return None;
    }

    let eta = spec.one_way_efficiency();
    let windows = tariff.windows;
    let hours = profiles.len();
    let net_load = |h: usize| profiles.load_kw[h] - profiles.solar_kw[h];

    let peak_need_kwh: f64 = windows
        .peak_hours()
        .filter(|h| *h < hours)
        .map(|h| net_load(h).max(0.0))
        .sum();
    let solar_stored_kwh: f64 = (windows.off_peak_end_hour..windows.peak_start_hour.min(hours))
        .map(|h| (-net_load(h)).max(0.0) * eta)
        .sum();

    let usable_kwh = (spec.max_soc - spec.min_soc) * spec.capacity_kwh;
    let target_kwh = ((peak_need_kwh / eta).min(usable_kwh) - solar_stored_kwh).max(0.0);
    Some((spec.min_soc + target_kwh / spec.capacity_kwh).min(spec.max_soc))
}

/// The ordered rule list of a strategy.
pub fn rules_for(
    strategy: StrategyKind,
    config: &SimulationConfig,
    profiles: &DayProfiles,
) -> Vec<Rule> {
    match strategy {
        StrategyKind::Baseline => vec![Rule::DirectSolarUse, Rule::GridFallback, Rule::CurtailSurplus],
        StrategyKind::Smart => {
            let mut rules = vec![Rule::DirectSolarUse, Rule::SolarToBattery, Rule::PeakDischarge];
            if let Some(ceiling_soc) = grid_charge_ceiling(config, profiles) {
                rules.push(Rule::OffPeakGridCharge { ceiling_soc });
            }
            rules.extend([Rule::GridFallback, Rule::CurtailSurplus]);
            rules
        }
    }
}
