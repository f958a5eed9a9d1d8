//! Device models: solar array, household load, and battery storage.

/// Household two-peak load profile.
pub mod baseload;
/// Stationary battery storage and SoC bookkeeping.
pub mod battery;
/// Solar photovoltaic generation model.
pub mod solar;
pub mod types;

// Re-export the main types for convenience
pub use baseload::BaseLoad;
pub use battery::Battery;
pub use solar::SolarPv;
pub use types::HourlyProfile;
