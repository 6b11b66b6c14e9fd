//! Exact-decimal money helpers.
//!
//! All monetary values are `rust_decimal::Decimal` (never binary floating point).
//! Persisted amounts carry a fixed scale of two decimal places.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Scale of every persisted monetary field (and of VAT percentages).
pub const MONEY_SCALE: u32 = 2;

/// Raw numeric input as it arrives from a caller: a JSON number or a string.
///
/// Parsing is deferred to [`parse_decimal`] so malformed input can be reported
/// as a validation error for the specific field instead of a transport error.
/// Any other JSON shape (bool, array, object) lands in `Other` and never parses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DecimalInput {
    Number(serde_json::Number),
    Text(String),
    Other(serde_json::Value),
}

impl DecimalInput {
    /// Literal text of a number or string input; `None` for any other shape.
    pub fn as_text(&self) -> Option<String> {
        match self {
            DecimalInput::Number(n) => Some(n.to_string()),
            DecimalInput::Text(s) => Some(s.trim().to_string()),
            DecimalInput::Other(_) => None,
        }
    }

    /// Exact decimal value of the input.
    ///
    /// Input the exact parser cannot represent (more than 28 fractional digits,
    /// exponents, overflow) is rejected rather than rounded.
    pub fn to_exact(&self) -> Result<Decimal, DecimalError> {
        let text = self.as_text().ok_or(DecimalError::NotANumber)?;
        if text.is_empty() {
            return Err(DecimalError::NotANumber);
        }
        Decimal::from_str_exact(&text).map_err(|_| DecimalError::NotANumber)
    }
}

impl From<Decimal> for DecimalInput {
    fn from(value: Decimal) -> Self {
        DecimalInput::Text(value.to_string())
    }
}

impl From<&str> for DecimalInput {
    fn from(value: &str) -> Self {
        DecimalInput::Text(value.to_string())
    }
}

impl From<i64> for DecimalInput {
    fn from(value: i64) -> Self {
        DecimalInput::Number(value.into())
    }
}

/// Reasons a raw value is not an acceptable exact decimal.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecimalError {
    #[error("invalid decimal value")]
    NotANumber,

    #[error("ensure that there are no more than {0} decimal places")]
    TooManyDecimalPlaces(u32),

    #[error("ensure that there are no more than {0} digits before the decimal point")]
    TooManyDigits(u32),

    #[error("value must not be negative")]
    Negative,
}

/// Parse a raw value into an exact decimal with at most `decimal_places`
/// fractional digits and `max_digits` digits in total.
///
/// The result is rescaled to exactly `decimal_places`.
pub fn parse_decimal(
    input: &DecimalInput,
    max_digits: u32,
    decimal_places: u32,
) -> Result<Decimal, DecimalError> {
    let value = input.to_exact()?;
    check_bounds(value, max_digits, decimal_places)?;
    Ok(to_scale(value, decimal_places))
}

/// Validate an already-typed decimal against the same digit bounds as [`parse_decimal`].
pub fn check_bounds(value: Decimal, max_digits: u32, decimal_places: u32) -> Result<(), DecimalError> {
    if value.normalize().scale() > decimal_places {
        return Err(DecimalError::TooManyDecimalPlaces(decimal_places));
    }

    let whole_digits = max_digits.saturating_sub(decimal_places);
    let limit = Decimal::from_i128_with_scale(10i128.pow(whole_digits), 0);
    if value.abs().trunc() >= limit {
        return Err(DecimalError::TooManyDigits(whole_digits));
    }
    Ok(())
}

/// Like [`parse_decimal`], additionally rejecting negative values.
pub fn parse_non_negative(
    input: &DecimalInput,
    max_digits: u32,
    decimal_places: u32,
) -> Result<Decimal, DecimalError> {
    let value = parse_decimal(input, max_digits, decimal_places)?;
    if value.is_sign_negative() && !value.is_zero() {
        return Err(DecimalError::Negative);
    }
    Ok(value)
}

/// Round (banker's rounding) and pad `value` to exactly `scale` decimal places.
pub fn to_scale(value: Decimal, scale: u32) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(scale, RoundingStrategy::MidpointNearestEven);
    rounded.rescale(scale);
    rounded
}

/// Round and pad a monetary amount to [`MONEY_SCALE`].
pub fn to_money_scale(value: Decimal) -> Decimal {
    to_scale(value, MONEY_SCALE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn zero_renders_with_two_decimals() {
        assert_eq!(to_money_scale(Decimal::ZERO).to_string(), "0.00");
    }

    #[test]
    fn money_scale_uses_bankers_rounding() {
        assert_eq!(to_money_scale(dec("0.125")).to_string(), "0.12");
        assert_eq!(to_money_scale(dec("0.135")).to_string(), "0.14");
        assert_eq!(to_money_scale(dec("57")).to_string(), "57.00");
    }

    #[test]
    fn parses_strings_and_json_numbers() {
        let from_text = parse_decimal(&DecimalInput::from("100.5"), 12, 2).unwrap();
        assert_eq!(from_text.to_string(), "100.50");

        let number: DecimalInput = serde_json::from_str("19").unwrap();
        assert_eq!(parse_decimal(&number, 5, 2).unwrap().to_string(), "19.00");

        let number: DecimalInput = serde_json::from_str("12.75").unwrap();
        assert_eq!(parse_decimal(&number, 5, 2).unwrap().to_string(), "12.75");
    }

    #[test]
    fn rejects_non_numeric_text() {
        for raw in ["abc", "", "  ", "12,50", "1.2.3"] {
            let err = parse_decimal(&DecimalInput::from(raw), 12, 2).unwrap_err();
            assert_eq!(err, DecimalError::NotANumber, "input {raw:?}");
        }
    }

    #[test]
    fn rejects_extra_decimal_places_but_tolerates_trailing_zeros() {
        let err = parse_decimal(&DecimalInput::from("1.005"), 12, 2).unwrap_err();
        assert_eq!(err, DecimalError::TooManyDecimalPlaces(2));

        let ok = parse_decimal(&DecimalInput::from("1.500"), 12, 2).unwrap();
        assert_eq!(ok.to_string(), "1.50");
    }

    #[test]
    fn non_negative_parse_rejects_negative_values() {
        let err = parse_non_negative(&DecimalInput::from("-0.01"), 12, 2).unwrap_err();
        assert_eq!(err, DecimalError::Negative);
        assert!(parse_non_negative(&DecimalInput::from("0"), 12, 2).is_ok());
    }

    #[test]
    fn rejects_too_many_whole_digits() {
        let err = parse_decimal(&DecimalInput::from("1000"), 5, 2).unwrap_err();
        assert_eq!(err, DecimalError::TooManyDigits(3));
        assert!(parse_decimal(&DecimalInput::from("999.99"), 5, 2).is_ok());
    }

    #[test]
    fn precision_beyond_the_exact_parser_is_rejected_not_rounded() {
        let raw = DecimalInput::from("1.00000000000000000000000000001");
        assert_eq!(parse_decimal(&raw, 12, 2).unwrap_err(), DecimalError::NotANumber);
    }

    #[test]
    fn non_scalar_json_is_not_a_number() {
        for json in ["true", "[1]", "{\"amount\": 1}"] {
            let raw: DecimalInput = serde_json::from_str(json).unwrap();
            assert!(matches!(raw, DecimalInput::Other(_)), "input {json}");
            assert_eq!(parse_decimal(&raw, 12, 2).unwrap_err(), DecimalError::NotANumber);
        }
    }
}
