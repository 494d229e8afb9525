//! b3-timeseries: lossless conversion between wide and stacked timeseries tables.
//!
//! A *wide* table has one column per named series over a shared, evenly
//! spaced time index. A *stacked* table has one row per series carrying the
//! index bounds, the resolution and the serialized values. [`stack`] and
//! [`unstack`] convert between the two; `unstack(stack(t)) == t` for every
//! table with at least one column.

pub mod codec;
pub mod series;
pub mod stacked;
pub mod wide;

pub use b3_core::{CoreError, Resolution, TimeIndex, Timestamp, Value};
pub use codec::{stack, stack_series, unstack, unstack_grouped};
pub use series::{SeriesSyntaxError, decode_series, encode_series};
pub use stacked::{STACKED_COLUMNS, StackedRow, StackedTable};
pub use wide::{Column, Series, WideTable};

pub type TimeseriesResult<T> = Result<T, TimeseriesError>;

/// Error category, mirroring how callers are expected to react.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Columns or rows do not describe one consistent table.
    InputShape,
    /// Identifiers collide so the result would be ambiguous.
    Ambiguity,
    /// A field could not be read.
    Parse,
    /// Values are well-formed but unusable for the requested operation.
    Value,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum TimeseriesError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Column '{column}' has {found} values but the time index has {expected}")]
    LengthMismatch {
        column: String,
        expected: usize,
        found: usize,
    },

    #[error("Column '{column}' has a different time index than column '{reference}'")]
    IndexMismatch { column: String, reference: String },

    #[error("Duplicate column name: {name}")]
    DuplicateName { name: String },

    #[error("Stacked rows describe {groups} different time indexes, expected one")]
    InconsistentIndex { groups: usize },

    #[error("Time index of row '{var_name}' cannot be reconstructed: {source}")]
    UnreconstructableIndex { var_name: String, source: CoreError },

    #[error("Stacked table has no rows to reconstruct a time index from")]
    EmptyStackedTable,

    #[error("Invalid series for '{var_name}': {source}")]
    InvalidSeries {
        var_name: String,
        source: SeriesSyntaxError,
    },

    #[error("Column '{column}' has no non-zero total to normalize by")]
    ZeroSum { column: String },

    #[error("Cannot resample from {from} to {to}: not a whole multiple")]
    IncompatibleResolution { from: Resolution, to: Resolution },
}

impl TimeseriesError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TimeseriesError::Core(err) => match err {
                CoreError::InvalidTimestamp { .. }
                | CoreError::InvalidNumber { .. }
                | CoreError::InvalidResolution { .. }
                | CoreError::NonFinite { .. } => ErrorKind::Parse,
                CoreError::IndexTooShort { .. }
                | CoreError::UnevenIndex { .. }
                | CoreError::NotIncreasing { .. }
                | CoreError::UnalignedBounds { .. }
                | CoreError::IndexOverflow => ErrorKind::InputShape,
            },
            TimeseriesError::LengthMismatch { .. }
            | TimeseriesError::IndexMismatch { .. }
            | TimeseriesError::InconsistentIndex { .. }
            | TimeseriesError::UnreconstructableIndex { .. }
            | TimeseriesError::EmptyStackedTable
            | TimeseriesError::IncompatibleResolution { .. } => ErrorKind::InputShape,
            TimeseriesError::DuplicateName { .. } => ErrorKind::Ambiguity,
            TimeseriesError::InvalidSeries { .. } => ErrorKind::Parse,
            TimeseriesError::ZeroSum { .. } => ErrorKind::Value,
        }
    }
}
