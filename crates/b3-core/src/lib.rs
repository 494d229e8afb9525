//! b3-core: shared foundation for the b3 timeseries tools.
//!
//! Contains:
//! - error (shared error type)
//! - numeric (value type, finiteness checks, value text form)
//! - resolution (fixed-length index step and its offset-alias text form)
//! - timestamp (canonical timestamp text form)
//! - time_index (evenly spaced time index)

pub mod error;
pub mod numeric;
pub mod resolution;
pub mod time_index;
pub mod timestamp;

// Re-exports: nice ergonomics for downstream crates
pub use error::{CoreError, CoreResult};
pub use numeric::*;
pub use resolution::Resolution;
pub use time_index::TimeIndex;
pub use timestamp::{format_timestamp, parse_timestamp};

/// Timestamp type used for every time index entry.
pub type Timestamp = chrono::NaiveDateTime;
