//! Amount handling: strict parsing of user input, lenient decoding of server data.

use regex::Regex;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::sync::LazyLock;

/// `$1,234.50`, `1234.5`, `.75`, `-3` (sign is captured so it can be reported)
static AMOUNT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\$?\s*(?P<num>-?(?:(?:\d{1,3}(?:,\d{3})+|\d+)(?:\.\d+)?|\.\d+))$")
        .expect("amount pattern compiles")
});

/// Why a typed amount was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AmountError {
    #[error("amount is empty")]
    Empty,

    #[error("amount \"{0}\" is not a number")]
    NotANumber(String),

    #[error("amount \"{0}\" is negative")]
    Negative(String),
}

/// Parse an amount typed by the user.
///
/// Accepts an optional leading `$` and thousands separators. Anything that does
/// not produce a finite, non-negative number is rejected.
pub fn parse_amount(input: &str) -> Result<f64, AmountError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(AmountError::Empty);
    }

    let caps = AMOUNT_RE
        .captures(trimmed)
        .ok_or_else(|| AmountError::NotANumber(trimmed.to_string()))?;

    let value: f64 = caps["num"]
        .replace(',', "")
        .parse()
        .map_err(|_| AmountError::NotANumber(trimmed.to_string()))?;

    if !value.is_finite() {
        return Err(AmountError::NotANumber(trimmed.to_string()));
    }
    if value < 0.0 {
        return Err(AmountError::Negative(trimmed.to_string()));
    }

    // -0 parses fine; normalise it
    Ok(value + 0.0)
}

/// Coerce whatever the server sent into a number. Non-numeric values count as zero.
pub fn coerce_amount(value: &Value) -> f64 {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    n.filter(|n| n.is_finite()).unwrap_or(0.0)
}

/// Serde adapter for record amounts: missing, null or garbage become `0.0`.
pub fn deserialize_lenient<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().map_or(0.0, coerce_amount))
}

/// Render an amount for tables and legends: whole numbers without decimals,
/// everything else with two.
pub fn format_amount(amount: f64) -> String {
    if amount.fract() == 0.0 {
        format!("{amount:.0}")
    } else {
        format!("{amount:.2}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_plain_and_decorated() {
        assert_eq!(parse_amount("50"), Ok(50.0));
        assert_eq!(parse_amount(" 12.5 "), Ok(12.5));
        assert_eq!(parse_amount("$1,234.50"), Ok(1234.5));
        assert_eq!(parse_amount(".75"), Ok(0.75));
        assert_eq!(parse_amount("-0"), Ok(0.0));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(parse_amount(""), Err(AmountError::Empty));
        assert_eq!(parse_amount("   "), Err(AmountError::Empty));
        assert_eq!(
            parse_amount("12abc"),
            Err(AmountError::NotANumber("12abc".to_string()))
        );
        assert_eq!(
            parse_amount("1,23"),
            Err(AmountError::NotANumber("1,23".to_string()))
        );
        assert_eq!(
            parse_amount("NaN"),
            Err(AmountError::NotANumber("NaN".to_string()))
        );
        assert_eq!(
            parse_amount("-5"),
            Err(AmountError::Negative("-5".to_string()))
        );
    }

    #[test]
    fn test_coerce_amount() {
        assert_eq!(coerce_amount(&json!(80)), 80.0);
        assert_eq!(coerce_amount(&json!(12.25)), 12.25);
        assert_eq!(coerce_amount(&json!("30")), 30.0);
        assert_eq!(coerce_amount(&json!("thirty")), 0.0);
        assert_eq!(coerce_amount(&json!(null)), 0.0);
        assert_eq!(coerce_amount(&json!(true)), 0.0);
        assert_eq!(coerce_amount(&json!({"amount": 3})), 0.0);
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(80.0), "80");
        assert_eq!(format_amount(12.5), "12.50");
        assert_eq!(format_amount(0.0), "0");
    }
}
