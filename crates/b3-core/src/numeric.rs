use crate::CoreError;

/// Floating point type used for every series value
pub type Real = f64;

/// A series entry; `None` marks a missing value.
pub type Value = Option<Real>;

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, CoreError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(CoreError::NonFinite { what, value: v })
    }
}

/// Tokens read as a missing value.
pub const MISSING_TOKENS: &[&str] = &["null", "nan", "NaN", "None"];

/// Parse one value token; missing-value tokens give `None`.
///
/// Non-finite numbers are rejected, missing values are spelled out.
pub fn parse_value(text: &str) -> Result<Value, CoreError> {
    let token = text.trim();
    if MISSING_TOKENS.contains(&token) {
        return Ok(None);
    }
    let value: Real = token.parse().map_err(|_| CoreError::InvalidNumber {
        text: token.to_string(),
    })?;
    ensure_finite(value, "value").map(Some)
}

/// Magnitude below which integral values are written as integers.
const INTEGRAL_LIMIT: Real = 1e15;

/// Shortest text form of `v` that parses back to the same value.
///
/// Integral values below 1e15 in magnitude are written without a fractional
/// part (`3` rather than `3.0`). Negative zero keeps its sign as `-0`.
pub fn format_value(v: Real) -> String {
    if v == 0.0 && v.is_sign_negative() {
        "-0".to_string()
    } else if v.fract() == 0.0 && v.abs() < INTEGRAL_LIMIT {
        format!("{}", v as i64)
    } else {
        format!("{v:?}")
    }
}

/// Sum of the present values, or `None` when every entry is missing.
pub fn sum_present(values: &[Value]) -> Option<Real> {
    values
        .iter()
        .flatten()
        .fold(None, |acc, v| Some(acc.unwrap_or(0.0) + v))
}
