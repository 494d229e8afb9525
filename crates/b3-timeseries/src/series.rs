//! Text encoding of a value sequence as a single field.
//!
//! Encoded form: `[1,2.5,null]`. Integral values below 1e15 in magnitude are
//! written without a fractional part; all other values use the shortest
//! representation that parses back to the same `f64`.

use b3_core::{CoreError, Value, format_value, parse_value};

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum SeriesSyntaxError {
    #[error("series must be enclosed in '[' and ']'")]
    MissingBrackets,

    #[error("invalid value '{token}' at position {position}")]
    InvalidValue { position: usize, token: String },

    #[error("non-finite value '{token}' at position {position}")]
    NonFinite { position: usize, token: String },
}

pub fn encode_series(values: &[Value]) -> String {
    let mut out = String::with_capacity(values.len() * 4 + 2);
    out.push('[');
    for (i, value) in values.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        match value {
            None => out.push_str("null"),
            Some(v) => out.push_str(&format_value(*v)),
        }
    }
    out.push(']');
    out
}

pub fn decode_series(text: &str) -> Result<Vec<Value>, SeriesSyntaxError> {
    let inner = text
        .trim()
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .ok_or(SeriesSyntaxError::MissingBrackets)?;

    if inner.trim().is_empty() {
        return Ok(Vec::new());
    }

    inner
        .split(',')
        .enumerate()
        .map(|(position, raw)| {
            let token = raw.trim().to_string();
            parse_value(&token).map_err(|err| match err {
                CoreError::NonFinite { .. } => SeriesSyntaxError::NonFinite { position, token },
                _ => SeriesSyntaxError::InvalidValue { position, token },
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integral_values_have_no_fraction() {
        assert_eq!(encode_series(&[Some(1.0), Some(2.0), Some(3.0)]), "[1,2,3]");
        assert_eq!(encode_series(&[Some(-4.0)]), "[-4]");
    }

    #[test]
    fn fractional_and_missing_values() {
        assert_eq!(encode_series(&[Some(0.1), None, Some(2.5)]), "[0.1,null,2.5]");
        assert_eq!(encode_series(&[Some(1e300)]), "[1e300]");
        assert_eq!(encode_series(&[]), "[]");
    }

    #[test]
    fn decodes_python_style_lists() {
        let values = decode_series("[1.0, nan, 2.5, None]").unwrap();
        assert_eq!(values, vec![Some(1.0), None, Some(2.5), None]);
        assert_eq!(decode_series(" [ ] ").unwrap(), Vec::<Value>::new());
    }

    #[test]
    fn rejects_malformed_text() {
        assert_eq!(
            decode_series("1,2,3").unwrap_err(),
            SeriesSyntaxError::MissingBrackets
        );
        assert_eq!(
            decode_series("[1,,3]").unwrap_err(),
            SeriesSyntaxError::InvalidValue {
                position: 1,
                token: String::new()
            }
        );
        assert!(matches!(
            decode_series("[1,inf]").unwrap_err(),
            SeriesSyntaxError::NonFinite { position: 1, .. }
        ));
    }

    #[test]
    fn negative_zero_survives_encoding() {
        let text = encode_series(&[Some(-0.0), Some(0.0)]);
        assert_eq!(text, "[-0,0]");
        let values = decode_series(&text).unwrap();
        assert!(values[0].unwrap().is_sign_negative());
        assert!(values[1].unwrap().is_sign_positive());
    }

    #[test]
    fn precision_survives() {
        let values = vec![Some(0.1 + 0.2), Some(1.0 / 3.0), Some(123456789.123456789), Some(5e-324)];
        assert_eq!(decode_series(&encode_series(&values)).unwrap(), values);
    }
}
