//! Service layer of the b3 timeseries tools.
//!
//! Shared by the CLI and by scripted pipelines: file conversion between the
//! wide and stacked layouts, inspection of stacked files, and the heat demand
//! and vehicle charging profile preparations.

pub mod config;
pub mod convert;
pub mod error;
pub mod heat_demand;
pub mod query;
pub mod vehicle_charging;

// Re-export key types for convenience
pub use config::{HeatDemandConfig, VehicleChargingConfig, load_config};
pub use error::{AppError, AppResult};
pub use heat_demand::{
    Consumer, HeatLoadModel, HeatRunContext, ProfileRequest, YearlyDemand, calculate_heat_load,
    find_regional_files, prepare_heat_demand, stack_heat_load, write_heat_demand,
    year_from_file_name, yearly_heat_demand,
};
pub use query::{IndexGroupSummary, StackedSummary, check, summarize};
pub use vehicle_charging::{
    ChargingWindow, charging_profile, prepare_vehicle_charging, region_and_year, smooth_profiles,
    stack_charging_profile, write_vehicle_charging,
};
