//! Numeric attribute values
//!
//! Ratings and scores are held as `f64` for arithmetic but written back the
//! way the input wrote them: integral values without a fractional part, so
//! `"residual_rating": 8` does not come back as `8.0`.

use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Number, Value};
use std::fmt;

/// Largest magnitude at which every integer is exactly representable
const MAX_EXACT: f64 = 9_007_199_254_740_992.0;

/// JSON value for `v`, integral when `v` has no fractional part
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn number_value(v: f64) -> Value {
    if v.fract() == 0.0 && v.abs() <= MAX_EXACT {
        Value::from(v as i64)
    } else {
        Number::from_f64(v).map_or(Value::Null, Value::Number)
    }
}

/// `serialize_with` helper for optional numeric fields
///
/// # Errors
/// Propagates the serializer's error.
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn serialize_opt_f64<S: Serializer>(
    value: &Option<f64>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match value {
        Some(v) if v.fract() == 0.0 && v.abs() <= MAX_EXACT => serializer.serialize_i64(*v as i64),
        Some(v) => serializer.serialize_f64(*v),
        None => serializer.serialize_none(),
    }
}

/// Attribute that exports write either as a number or as text
///
/// Control `effectiveness` is `85` in some exports and `"High"` in others.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Measure {
    Number(Number),
    Text(String),
}

impl Measure {
    /// Numeric value, parsing text when it holds a number
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => n.as_f64(),
            Self::Text(s) => s.trim().parse().ok(),
        }
    }
}

impl fmt::Display for Measure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for Measure {
    fn from(v: f64) -> Self {
        match number_value(v) {
            Value::Number(n) => Self::Number(n),
            _ => Self::Text(v.to_string()),
        }
    }
}

impl From<&str> for Measure {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn integral_values_stay_integral() {
        assert_eq!(number_value(8.0), json!(8));
        assert_eq!(number_value(-3.0), json!(-3));
        assert_eq!(number_value(7.5), json!(7.5));
        assert_eq!(number_value(f64::NAN), Value::Null);
    }

    #[test]
    fn measure_accepts_number_or_text() {
        let number: Measure = serde_json::from_value(json!(85)).unwrap();
        let text: Measure = serde_json::from_value(json!("High")).unwrap();

        assert_eq!(number.as_f64(), Some(85.0));
        assert_eq!(text.as_f64(), None);
        assert_eq!(serde_json::to_value(&number).unwrap(), json!(85));
        assert_eq!(text.to_string(), "High");
        assert_eq!(Measure::from("72").as_f64(), Some(72.0));
    }
}
