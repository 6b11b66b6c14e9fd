//! Invoice total calculator.
//!
//! Totals are a derived projection of an invoice's line items:
//!
//! ```text
//! line_exclusive = unit_price * quantity
//! line_tax       = line_exclusive * vat_percentage / 100
//! subtotal       = Σ line_exclusive
//! total_tax      = Σ line_tax
//! total          = subtotal + total_tax
//! ```
//!
//! Sums are exact. `subtotal` and `total_tax` are rounded to two decimals once,
//! at the end, and `total` is the sum of the rounded parts so that
//! `total == subtotal + total_tax` always holds exactly.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use facturas_core::to_money_scale;

use crate::line_item::LineItem;

/// Derived monetary fields of an invoice (scale 2).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceTotals {
    pub subtotal: Decimal,
    pub total_tax: Decimal,
    pub total: Decimal,
}

impl InvoiceTotals {
    pub fn zero() -> Self {
        let zero = to_money_scale(Decimal::ZERO);
        Self {
            subtotal: zero,
            total_tax: zero,
            total: zero,
        }
    }
}

impl Default for InvoiceTotals {
    fn default() -> Self {
        Self::zero()
    }
}

/// Compute invoice totals over the full set of an invoice's line items.
///
/// An empty set yields `0.00` for every field.
pub fn calculate_totals<'a, I>(items: I) -> InvoiceTotals
where
    I: IntoIterator<Item = &'a LineItem>,
{
    let (subtotal, total_tax) = items.into_iter().fold(
        (Decimal::ZERO, Decimal::ZERO),
        |(subtotal, total_tax), item| {
            (
                subtotal + item.line_total_exclusive(),
                total_tax + item.line_tax(),
            )
        },
    );

    let subtotal = to_money_scale(subtotal);
    let total_tax = to_money_scale(total_tax);
    InvoiceTotals {
        subtotal,
        total_tax,
        total: subtotal + total_tax,
    }
}
