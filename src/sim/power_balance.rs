//! Hourly energy balance of the microgrid bus.

use super::types::HourlyRecord;

/// Largest residual accepted as a balanced hour (kW).
pub const BALANCE_TOLERANCE_KW: f64 = 1e-6;

/// Computes the bus residual `sources - sinks` for one hour.
///
/// Sources are solar, grid import and battery discharge. Sinks are load,
/// battery charge and curtailed solar. A correctly dispatched hour returns
/// zero up to rounding.
///
/// # Arguments
///
/// * `solar_kw` - Solar generation
/// * `grid_kw` - Grid import (load and battery charging)
/// * `discharge_kw` - Bus-side battery discharge
/// * `load_kw` - Load demand
/// * `charge_kw` - Bus-side battery charge
/// * `curtailed_kw` - Discarded solar
pub fn bus_residual_kw(
    solar_kw: f64,
    grid_kw: f64,
    discharge_kw: f64,
    load_kw: f64,
    charge_kw: f64,
    curtailed_kw: f64,
) -> f64 {
    (solar_kw + grid_kw + discharge_kw) - (load_kw + charge_kw + curtailed_kw)
}

/// Bus residual of a finished ledger row.
pub fn record_residual_kw(record: &HourlyRecord) -> f64 {
    bus_residual_kw(
        record.solar_kw,
        record.grid_kw,
        record.discharge_kw,
        record.load_kw,
        record.charge_kw,
        record.curtailed_kw,
    )
}

/// Whether a ledger row balances within [`BALANCE_TOLERANCE_KW`].
pub fn is_balanced(record: &HourlyRecord) -> bool {
    record_residual_kw(record).abs() <= BALANCE_TOLERANCE_KW
}
