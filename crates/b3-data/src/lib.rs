//! b3-data: CSV interchange for wide and stacked timeseries tables, the
//! b3 scalar / timeseries schemas and the raw inputs of the preparations.

pub mod b3_schema;
pub mod calendar;
pub mod charging;
pub mod scalars;
pub mod stacked_csv;
pub mod wide_csv;

pub use b3_schema::{
    B3_TIMESERIES_COLUMNS, B3TimeseriesRow, format_header, load_b3_timeseries, read_b3_timeseries,
    save_b3_timeseries, write_b3_timeseries,
};
pub use calendar::{
    HolidayRow, load_holidays, load_numeric_column, read_holidays, read_numeric_column,
};
pub use charging::{load_charging_csv, parse_decimal_comma, read_charging_csv};
pub use scalars::{ScalarRow, filter_scalars, load_b3_scalars, read_b3_scalars};
pub use stacked_csv::{
    ROW_ID_COLUMN, load_stacked_csv, read_stacked_csv, save_stacked_csv, write_stacked_csv,
};
pub use wide_csv::{WIDE_INDEX_COLUMN, load_wide_csv, read_wide_csv, save_wide_csv, write_wide_csv};

use b3_core::CoreError;
use b3_timeseries::TimeseriesError;

pub type DataResult<T> = Result<T, DataError>;

#[derive(thiserror::Error, Debug)]
pub enum DataError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Timeseries(#[from] TimeseriesError),

    #[error("Missing column '{column}'")]
    MissingColumn { column: String },

    #[error("Unexpected column '{column}'")]
    UnexpectedColumn { column: String },

    #[error("Row {row}, column '{column}': {source}")]
    InvalidField {
        row: usize,
        column: String,
        source: CoreError,
    },

    #[error("Unknown scalar field '{0}'")]
    UnknownField(String),
}

impl DataError {
    /// Field-level parse failure; `row` counts data rows from 1.
    fn field(row: usize, column: &str, source: CoreError) -> Self {
        DataError::InvalidField {
            row,
            column: column.to_string(),
            source,
        }
    }
}
