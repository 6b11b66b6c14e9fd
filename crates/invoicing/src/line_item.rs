use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use facturas_core::{CompanyId, Entity, TenantOwned, ValueObject};
use facturas_products::{ProductId, UnitPrice, VatRate};

use crate::invoice::InvoiceId;

facturas_core::entity_id!(
    /// Line item identifier (tenant-scoped via `company_id`).
    LineItemId,
    "LineItemId"
);

/// Upper bound of a line quantity (a positive 32-bit signed integer column).
pub const QUANTITY_MAX: u32 = i32::MAX as u32;

/// Positive integer quantity.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quantity(u32);

impl Quantity {
    /// Returns `None` for zero or values above [`QUANTITY_MAX`].
    pub fn new(value: u32) -> Option<Self> {
        (value > 0 && value <= QUANTITY_MAX).then_some(Self(value))
    }

    pub fn get(&self) -> u32 {
        self.0
    }
}

impl ValueObject for Quantity {}

/// One product line within an invoice.
///
/// `unit_price` and `vat_percentage` are the *effective* values fixed at
/// admission time; they never follow later changes to the product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    id: LineItemId,
    company_id: CompanyId,
    invoice_id: InvoiceId,
    product_id: ProductId,
    line_no: u32,
    description: String,
    unit_price: UnitPrice,
    vat_percentage: VatRate,
    quantity: Quantity,
    created_at: DateTime<Utc>,
}

impl LineItem {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: LineItemId,
        company_id: CompanyId,
        invoice_id: InvoiceId,
        product_id: ProductId,
        line_no: u32,
        description: String,
        unit_price: UnitPrice,
        vat_percentage: VatRate,
        quantity: Quantity,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            company_id,
            invoice_id,
            product_id,
            line_no,
            description,
            unit_price,
            vat_percentage,
            quantity,
            created_at,
        }
    }

    pub fn id_typed(&self) -> LineItemId {
        self.id
    }

    pub fn invoice_id(&self) -> InvoiceId {
        self.invoice_id
    }

    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    /// 1-based position of the line within its invoice.
    pub fn line_no(&self) -> u32 {
        self.line_no
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn unit_price(&self) -> UnitPrice {
        self.unit_price
    }

    pub fn vat_percentage(&self) -> VatRate {
        self.vat_percentage
    }

    pub fn quantity(&self) -> Quantity {
        self.quantity
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// `unit_price * quantity` (exact).
    pub fn line_total_exclusive(&self) -> Decimal {
        self.unit_price.amount() * Decimal::from(self.quantity.get())
    }

    /// `line_total_exclusive * vat / 100` (exact, unrounded).
    pub fn line_tax(&self) -> Decimal {
        self.line_total_exclusive() * self.vat_percentage.as_fraction()
    }

    pub fn line_total_inclusive(&self) -> Decimal {
        self.line_total_exclusive() + self.line_tax()
    }

    pub(crate) fn with_values(
        &self,
        description: String,
        unit_price: UnitPrice,
        vat_percentage: VatRate,
        quantity: Quantity,
    ) -> Self {
        Self {
            description,
            unit_price,
            vat_percentage,
            quantity,
            ..self.clone()
        }
    }
}

impl Entity for LineItem {
    type Id = LineItemId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl TenantOwned for LineItem {
    fn company_id(&self) -> CompanyId {
        self.company_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantity_must_be_positive_and_bounded() {
        assert!(Quantity::new(0).is_none());
        assert!(Quantity::new(1).is_some());
        assert!(Quantity::new(QUANTITY_MAX).is_some());
        assert!(Quantity::new(QUANTITY_MAX + 1).is_none());
    }

    #[test]
    fn zero_vat_line_has_no_tax() {
        let line = LineItem::new(
            LineItemId::new(),
            CompanyId::new(),
            InvoiceId::new(),
            ProductId::new(),
            1,
            "Soporte".to_string(),
            UnitPrice::new(Decimal::new(12_50, 2)).unwrap(),
            VatRate::new(Decimal::ZERO).unwrap(),
            Quantity::new(4).unwrap(),
            Utc::now(),
        );
        assert_eq!(line.line_total_exclusive(), Decimal::new(50_00, 2));
        assert!(line.line_tax().is_zero());
        assert_eq!(line.line_total_inclusive(), line.line_total_exclusive());
    }
}
