use crate::sim::types::BatterySpec;

/// Tolerance for treating a SoC as sitting on one of its bounds.
pub const SOC_EPSILON: f64 = 1e-9;

/// A battery energy storage system tracking its state of charge.
///
/// `Battery` is the SoC controller of the smart dispatch run. Flows passed to
/// [`Battery::charge`] and [`Battery::discharge`] are bus-side energies for
/// one hour; efficiency losses are applied inside, so the stored energy
/// changes by `charge * eta_c` or `discharge / eta_d`.
///
/// SoC never leaves `[min_soc, max_soc]`: requests beyond the available
/// headroom or stored energy are truncated, and a request that exactly
/// exhausts the headroom lands the SoC on the bound.
#[derive(Debug, Clone)]
pub struct Battery {
    /// Battery capacity in kilowatt-hours.
    pub capacity_kwh: f64,

    /// State of charge as a fraction of capacity.
    pub soc: f64,

    /// Lower SoC bound.
    pub min_soc: f64,

    /// Upper SoC bound.
    pub max_soc: f64,

    /// Charging efficiency (0..1.0).
    pub eta_c: f64,

    /// Discharging efficiency (0..1.0).
    pub eta_d: f64,
}

impl Battery {
    /// Creates a battery at its initial SoC.
    ///
    /// Round-trip efficiency is split evenly into charge and discharge legs.
    pub fn new(spec: &BatterySpec) -> Self {
        let eta = spec.one_way_efficiency();
        Self {
            capacity_kwh: spec.capacity_kwh,
            soc: spec.initial_soc,
            min_soc: spec.min_soc,
            max_soc: spec.max_soc,
            eta_c: eta,
            eta_d: eta,
        }
    }

    /// Stored energy that can still be added before `max_soc` (kWh).
    pub fn headroom_kwh(&self) -> f64 {
        ((self.max_soc - self.soc) * self.capacity_kwh).max(0.0)
    }

    /// Stored energy above `min_soc` (kWh).
    pub fn available_kwh(&self) -> f64 {
        ((self.soc - self.min_soc) * self.capacity_kwh).max(0.0)
    }

    /// Largest bus-side charge the battery accepts this hour (kW).
    pub fn charge_acceptance_kw(&self) -> f64 {
        self.headroom_kwh() / self.eta_c
    }

    /// Largest bus-side discharge the battery can deliver this hour (kW).
    pub fn deliverable_kw(&self) -> f64 {
        self.available_kwh() * self.eta_d
    }

    pub fn is_full(&self) -> bool {
        self.soc >= self.max_soc - SOC_EPSILON
    }

    pub fn is_empty(&self) -> bool {
        self.soc <= self.min_soc + SOC_EPSILON
    }

    /// Charges with `kw` of bus-side energy and returns the amount accepted.
    pub fn charge(&mut self, kw: f64) -> f64 {
        if kw <= 0.0 {
            return 0.0;
        }
        let acceptance = self.charge_acceptance_kw();
        if kw >= acceptance {
            self.soc = self.max_soc;
            return acceptance;
        }
        self.soc += kw * self.eta_c / self.capacity_kwh;
        self.keep_in_bounds();
        kw
    }

    /// Discharges `kw` of bus-side energy and returns the amount delivered.
    pub fn discharge(&mut self, kw: f64) -> f64 {
        if kw <= 0.0 {
            return 0.0;
        }
        let deliverable = self.deliverable_kw();
        if kw >= deliverable {
            self.soc = self.min_soc;
            return deliverable;
        }
        self.soc -= kw / (self.eta_d * self.capacity_kwh);
        self.keep_in_bounds();
        kw
    }

    fn keep_in_bounds(&mut self) {
        debug_assert!(
            self.soc >= self.min_soc - SOC_EPSILON && self.soc <= self.max_soc + SOC_EPSILON,
            "SoC {} escaped [{}, {}]",
            self.soc,
            self.min_soc,
            self.max_soc
        );
        self.soc = self.soc.clamp(self.min_soc, self.max_soc);
    }
}
