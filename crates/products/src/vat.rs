//! VAT percentage value object.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use facturas_core::{DecimalError, DecimalInput, ValueObject, check_bounds, parse_decimal, to_scale};

pub const VAT_MAX_DIGITS: u32 = 5;
pub const VAT_DECIMAL_PLACES: u32 = 2;

/// Default VAT percentage applied when neither the line nor the product sets one.
pub const DEFAULT_VAT: VatRate = VatRate(Decimal::from_parts(1900, 0, 0, false, 2));

/// VAT percentage (e.g. `19.00` means 19 %), two decimals of precision.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VatRate(Decimal);

impl VatRate {
    pub fn new(percentage: Decimal) -> Result<Self, DecimalError> {
        if percentage.is_sign_negative() && !percentage.is_zero() {
            return Err(DecimalError::Negative);
        }
        check_bounds(percentage, VAT_MAX_DIGITS, VAT_DECIMAL_PLACES)?;
        Ok(Self(to_scale(percentage, VAT_DECIMAL_PLACES)))
    }

    pub fn parse(input: &DecimalInput) -> Result<Self, DecimalError> {
        let value = parse_decimal(input, VAT_MAX_DIGITS, VAT_DECIMAL_PLACES)?;
        Self::new(value)
    }

    pub fn percentage(&self) -> Decimal {
        self.0
    }

    /// The rate as a fraction (`19.00` → `0.19`).
    pub fn as_fraction(&self) -> Decimal {
        self.0 / Decimal::ONE_HUNDRED
    }
}

impl Default for VatRate {
    fn default() -> Self {
        DEFAULT_VAT
    }
}

impl fmt::Display for VatRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl ValueObject for VatRate {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_vat_is_nineteen_percent() {
        assert_eq!(DEFAULT_VAT.to_string(), "19.00");
        assert_eq!(DEFAULT_VAT.as_fraction(), Decimal::new(19, 2));
    }

    #[test]
    fn parse_pads_to_two_decimals() {
        let vat = VatRate::parse(&DecimalInput::from("5")).unwrap();
        assert_eq!(vat.to_string(), "5.00");
    }

    #[test]
    fn rejects_negative_and_oversized_rates() {
        assert!(VatRate::parse(&DecimalInput::from("-1")).is_err());
        assert!(VatRate::parse(&DecimalInput::from("1000")).is_err());
        assert!(VatRate::parse(&DecimalInput::from("19.005")).is_err());
        assert!(VatRate::parse(&DecimalInput::from("0")).is_ok());
    }
}
