use thiserror::Error;

pub type CoreResult<T> = Result<T, CoreError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Non-finite numeric value for {what}: {value}")]
    NonFinite { what: &'static str, value: f64 },

    #[error("Invalid number '{text}'")]
    InvalidNumber { text: String },

    #[error("Invalid timestamp '{text}'")]
    InvalidTimestamp { text: String },

    #[error("Invalid resolution '{text}': {reason}")]
    InvalidResolution { text: String, reason: &'static str },

    #[error("Time index needs at least {needed} entries to infer its resolution, got {len}")]
    IndexTooShort { needed: usize, len: usize },

    #[error(
        "Time index is not evenly spaced: step at position {position} is {found_s}s, expected {expected_s}s"
    )]
    UnevenIndex {
        position: usize,
        expected_s: i64,
        found_s: i64,
    },

    #[error("Time index is not strictly increasing at position {position}")]
    NotIncreasing { position: usize },

    #[error("Time index bounds {start} .. {stop} do not align with resolution {resolution}")]
    UnalignedBounds {
        start: String,
        stop: String,
        resolution: String,
    },

    #[error("Time index overflows the supported date range")]
    IndexOverflow,
}
