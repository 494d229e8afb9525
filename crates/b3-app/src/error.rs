//! Error types for the b3-app service layer.

use std::path::PathBuf;

use b3_core::CoreError;
use b3_data::DataError;
use b3_timeseries::TimeseriesError;

/// Application error type wrapping the lower layers and the failures of the
/// heat demand preparation.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Data(#[from] DataError),

    #[error(transparent)]
    Timeseries(#[from] TimeseriesError),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Failed to read config file: {path}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Config error: {0}")]
    Config(String),

    #[error("No files of region '{region}' in directory {dir}")]
    NoRegionalFiles { region: String, dir: PathBuf },

    #[error("No input files in directory {dir}")]
    NoInputFiles { dir: PathBuf },

    #[error("File name '{name}' does not follow '<prefix>_<kind>_<Region>_<year>.csv'")]
    ChargingFileName { name: String },

    #[error("Unknown region '{region}' in file name '{name}'")]
    UnknownRegion { name: String, region: String },

    #[error(
        "File name '{name}' must contain exactly one year between 1990 and 2050, found {found}"
    )]
    AmbiguousYear { name: String, found: usize },

    #[error("Year {year} has no calendar date")]
    YearOutOfRange { year: i32 },

    #[error("Unit mismatch in {carrier} demands of region {region}: {units:?}")]
    UnitMismatch {
        carrier: String,
        region: String,
        units: Vec<String>,
    },

    #[error(
        "No '{consumer}' demand for carrier {carrier}, region {region} and scenario {scenario}"
    )]
    MissingDemand {
        consumer: String,
        carrier: String,
        region: String,
        scenario: String,
    },

    #[error("Heat load model failed: {0}")]
    Model(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for b3-app operations.
pub type AppResult<T> = Result<T, AppError>;
