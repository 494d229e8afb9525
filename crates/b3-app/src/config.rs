//! Configuration of the heat demand and vehicle charging preparations.
//!
//! The heat demand preparation is configured in YAML:
//!
//! ```yaml
//! weather_dir: raw/weatherdata
//! holidays_path: raw/holidays.csv
//! scalars_path: raw/scalars.csv
//! output_path: results/_resources/load_profile_heat.csv
//! regions: [BB, BE]
//! scenario: base
//! carriers: [heat_central, heat_decentral]
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HeatDemandConfig {
    /// Directory of weather files, one per region and year.
    pub weather_dir: PathBuf,
    pub holidays_path: PathBuf,
    pub scalars_path: PathBuf,
    pub output_path: PathBuf,
    #[serde(default = "default_regions")]
    pub regions: Vec<String>,
    #[serde(default = "default_scenario")]
    pub scenario: String,
    #[serde(default = "default_carriers")]
    pub carriers: Vec<String>,
}

fn default_regions() -> Vec<String> {
    vec!["BB".to_string(), "BE".to_string()]
}

fn default_scenario() -> String {
    "base".to_string()
}

fn default_carriers() -> Vec<String> {
    vec!["heat_central".to_string(), "heat_decentral".to_string()]
}

impl HeatDemandConfig {
    pub fn validate(&self) -> AppResult<()> {
        if self.regions.is_empty() {
            return Err(AppError::Config("at least one region is required".to_string()));
        }
        if self.carriers.is_empty() {
            return Err(AppError::Config("at least one carrier is required".to_string()));
        }
        if self.scenario.trim().is_empty() {
            return Err(AppError::Config("scenario must not be empty".to_string()));
        }
        if let Some(blank) = self
            .regions
            .iter()
            .chain(&self.carriers)
            .find(|s| s.trim().is_empty())
        {
            return Err(AppError::Config(format!(
                "region and carrier names must not be blank, got '{blank}'"
            )));
        }
        Ok(())
    }
}

/// Inputs and options of the vehicle charging preparation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VehicleChargingConfig {
    /// Directory of simBEV exports named `<prefix>_<kind>_<Region>_<year>.csv`.
    pub input_dir: PathBuf,
    pub output_path: PathBuf,
    /// Spread home and work charging evenly over their daily windows.
    #[serde(default = "default_balanced")]
    pub balanced: bool,
    /// Region names used in file names, mapped to region codes.
    #[serde(default = "default_region_codes")]
    pub region_codes: BTreeMap<String, String>,
}

fn default_balanced() -> bool {
    true
}

fn default_region_codes() -> BTreeMap<String, String> {
    BTreeMap::from([
        ("Berlin".to_string(), "B".to_string()),
        ("Brandenburg".to_string(), "BB".to_string()),
    ])
}

impl VehicleChargingConfig {
    /// Balanced preparation with the default region codes.
    pub fn new(input_dir: impl Into<PathBuf>, output_path: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_path: output_path.into(),
            balanced: default_balanced(),
            region_codes: default_region_codes(),
        }
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.region_codes.is_empty() {
            return Err(AppError::Config("at least one region code is required".to_string()));
        }
        if let Some((name, _)) = self
            .region_codes
            .iter()
            .find(|(name, code)| name.trim().is_empty() || code.trim().is_empty())
        {
            return Err(AppError::Config(format!(
                "region names and codes must not be blank, got '{name}'"
            )));
        }
        Ok(())
    }
}

/// Load and validate a configuration file.
pub fn load_config(path: &Path) -> AppResult<HeatDemandConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| AppError::ConfigRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    let config: HeatDemandConfig = serde_yaml::from_str(&content)
        .map_err(|e| AppError::Config(format!("Failed to parse config YAML: {}", e)))?;
    config.validate()?;
    Ok(config)
}
