//! Line item admission.
//!
//! The only path by which a line item comes into existence or changes. It
//! rejects anything the total calculator must never see (non-positive or
//! fractional quantities, malformed decimals, products of another company)
//! and resolves omitted price/VAT from the product.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use facturas_core::{DecimalError, DecimalInput, DomainError, TenantOwned};
use facturas_products::{Product, ProductId, UnitPrice, VatRate};

use crate::invoice::Invoice;
use crate::line_item::{LineItem, LineItemId, Quantity};

/// Raw line item as submitted by a caller.
///
/// Every field is kept raw so a malformed item is rejected by admission, with
/// its position, instead of failing the whole request body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItemDraft {
    #[serde(default, deserialize_with = "raw_id")]
    pub product_id: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub quantity: Option<DecimalInput>,
    #[serde(default)]
    pub unit_price: Option<DecimalInput>,
    #[serde(default)]
    pub vat_percentage: Option<DecimalInput>,
}

impl LineItemDraft {
    pub fn for_product(product_id: ProductId, quantity: Option<DecimalInput>) -> Self {
        Self {
            product_id: Some(product_id.to_string()),
            description: String::new(),
            quantity,
            unit_price: None,
            vat_percentage: None,
        }
    }

    /// The referenced product id.
    ///
    /// An id that does not parse cannot name a product of this company, so it
    /// is reported like any other product the tenant does not own.
    pub fn parsed_product_id(&self) -> Result<ProductId, AdmissionError> {
        match self.product_id.as_deref().map(str::trim) {
            None | Some("") => Err(AdmissionError::MissingProduct),
            Some(raw) => raw.parse().map_err(|_| AdmissionError::ProductNotOwned),
        }
    }
}

// Accepts any JSON shape; non-strings keep their JSON text and fail to parse later.
fn raw_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.map(|v| match v {
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    }))
}

/// Partial update of a line item; `None` leaves the field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LineItemChanges {
    pub description: Option<String>,
    pub quantity: Option<DecimalInput>,
    pub unit_price: Option<DecimalInput>,
    pub vat_percentage: Option<DecimalInput>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AdmissionError {
    #[error("quantity: this field is required")]
    MissingQuantity,

    #[error("quantity: must be an integer")]
    QuantityNotInteger,

    #[error("quantity: must be greater than 0")]
    QuantityNotPositive,

    #[error("quantity: must be at most 2147483647")]
    QuantityTooLarge,

    #[error("{field}: {reason}")]
    InvalidDecimal {
        field: &'static str,
        reason: DecimalError,
    },

    #[error("product_id: this field is required")]
    MissingProduct,

    #[error("product_id: product not owned by tenant")]
    ProductNotOwned,

    #[error("line item belongs to another invoice")]
    InvoiceMismatch,
}

impl From<AdmissionError> for DomainError {
    fn from(value: AdmissionError) -> Self {
        match value {
            AdmissionError::InvoiceMismatch => DomainError::invariant(value.to_string()),
            other => DomainError::validation(other.to_string()),
        }
    }
}

/// Parse a raw quantity into a positive integer.
///
/// Integral decimals such as `3.0` are accepted; `2.5` is not.
pub fn parse_quantity(raw: Option<&DecimalInput>) -> Result<Quantity, AdmissionError> {
    let value = raw
        .ok_or(AdmissionError::MissingQuantity)?
        .to_exact()
        .map_err(|_| AdmissionError::QuantityNotInteger)?;
    if !value.fract().is_zero() {
        return Err(AdmissionError::QuantityNotInteger);
    }
    if value <= Decimal::ZERO {
        return Err(AdmissionError::QuantityNotPositive);
    }

    value
        .to_u32()
        .and_then(Quantity::new)
        .ok_or(AdmissionError::QuantityTooLarge)
}

/// Admit a new line item for `invoice`.
///
/// `product` is whatever the caller's tenant-scoped lookup returned; its
/// company must match the invoice's. Omitted price and VAT are copied from the
/// product (or the default VAT), fixing them for the life of the line.
pub fn admit_line_item(
    invoice: &Invoice,
    product: &Product,
    draft: &LineItemDraft,
    line_no: u32,
    id: LineItemId,
    now: DateTime<Utc>,
) -> Result<LineItem, AdmissionError> {
    let product_id = draft.parsed_product_id()?;
    if product.company_id() != invoice.company_id() || product.id_typed() != product_id {
        return Err(AdmissionError::ProductNotOwned);
    }

    let quantity = parse_quantity(draft.quantity.as_ref())?;
    let unit_price = match &draft.unit_price {
        Some(raw) => parse_price(raw)?,
        None => product.unit_price(),
    };
    let vat_percentage = match &draft.vat_percentage {
        Some(raw) => parse_vat(raw)?,
        None => product.effective_vat(),
    };

    let description = match draft.description.trim() {
        "" => product.name().to_string(),
        text => text.to_string(),
    };

    Ok(LineItem::new(
        id,
        invoice.company_id(),
        invoice.id_typed(),
        product.id_typed(),
        line_no,
        description,
        unit_price,
        vat_percentage,
        quantity,
        now,
    ))
}

/// Re-validate a line item with `changes` merged in.
///
/// The line stays on its invoice and product; only quantity, overrides and
/// description move.
pub fn revise_line_item(
    invoice: &Invoice,
    item: &LineItem,
    changes: &LineItemChanges,
) -> Result<LineItem, AdmissionError> {
    if item.invoice_id() != invoice.id_typed() || item.company_id() != invoice.company_id() {
        return Err(AdmissionError::InvoiceMismatch);
    }

    let quantity = match &changes.quantity {
        Some(raw) => parse_quantity(Some(raw))?,
        None => item.quantity(),
    };
    let unit_price = match &changes.unit_price {
        Some(raw) => parse_price(raw)?,
        None => item.unit_price(),
    };
    let vat_percentage = match &changes.vat_percentage {
        Some(raw) => parse_vat(raw)?,
        None => item.vat_percentage(),
    };
    let description = changes
        .description
        .clone()
        .unwrap_or_else(|| item.description().to_string());

    Ok(item.with_values(description, unit_price, vat_percentage, quantity))
}

fn parse_price(raw: &DecimalInput) -> Result<UnitPrice, AdmissionError> {
    UnitPrice::parse(raw).map_err(|reason| AdmissionError::InvalidDecimal {
        field: "unit_price",
        reason,
    })
}

fn parse_vat(raw: &DecimalInput) -> Result<VatRate, AdmissionError> {
    VatRate::parse(raw).map_err(|reason| AdmissionError::InvalidDecimal {
        field: "vat_percentage",
        reason,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use facturas_core::CompanyId;
    use facturas_parties::{Client, ClientId, NewClient};
    use facturas_products::NewProduct;

    use crate::invoice::InvoiceId;

    struct Fixture {
        invoice: Invoice,
        product: Product,
    }

    fn fixture(vat: Option<&str>) -> Fixture {
        let company = CompanyId::new();
        let now = Utc::now();
        let client = Client::register(
            company,
            ClientId::new(),
            NewClient {
                name: "Cliente Demo".to_string(),
                ..NewClient::default()
            },
            now,
        )
        .unwrap();
        let invoice =
            Invoice::open(company, InvoiceId::new(), &client, String::new(), None, now).unwrap();
        let product = Product::create(
            company,
            ProductId::new(),
            NewProduct {
                name: "Producto Demo".to_string(),
                description: String::new(),
                unit_price: DecimalInput::from("100.00"),
                vat_percentage: vat.map(DecimalInput::from),
            },
            now,
        )
        .unwrap();
        Fixture { invoice, product }
    }

    fn draft(product: &Product, quantity: Option<DecimalInput>) -> LineItemDraft {
        LineItemDraft::for_product(product.id_typed(), quantity)
    }

    fn qty(n: i64) -> Option<DecimalInput> {
        Some(DecimalInput::from(n))
    }

    fn admit(f: &Fixture, draft: &LineItemDraft) -> Result<LineItem, AdmissionError> {
        admit_line_item(&f.invoice, &f.product, draft, 1, LineItemId::new(), Utc::now())
    }

    #[test]
    fn omitted_price_and_vat_come_from_the_product() {
        let f = fixture(Some("10.00"));
        let item = admit(&f, &draft(&f.product, qty(3))).unwrap();
        assert_eq!(item.unit_price().amount().to_string(), "100.00");
        assert_eq!(item.vat_percentage().percentage().to_string(), "10.00");
        assert_eq!(item.quantity().get(), 3);
        assert_eq!(item.description(), "Producto Demo");
    }

    #[test]
    fn product_without_vat_falls_back_to_default() {
        let f = fixture(None);
        let item = admit(&f, &draft(&f.product, qty(1))).unwrap();
        assert_eq!(item.vat_percentage().percentage().to_string(), "19.00");
    }

    #[test]
    fn zero_vat_on_product_is_kept() {
        let f = fixture(Some("0"));
        let item = admit(&f, &draft(&f.product, qty(1))).unwrap();
        assert!(item.vat_percentage().percentage().is_zero());
    }

    #[test]
    fn overrides_win_over_product_values() {
        let f = fixture(None);
        let mut d = draft(&f.product, qty(2));
        d.unit_price = Some(DecimalInput::from("80.5"));
        d.vat_percentage = Some(DecimalInput::from("4"));
        let item = admit(&f, &d).unwrap();
        assert_eq!(item.unit_price().amount().to_string(), "80.50");
        assert_eq!(item.vat_percentage().percentage().to_string(), "4.00");
    }

    #[test]
    fn rejects_bad_quantities() {
        let f = fixture(None);
        let cases: [(Option<DecimalInput>, AdmissionError); 5] = [
            (None, AdmissionError::MissingQuantity),
            (qty(0), AdmissionError::QuantityNotPositive),
            (qty(-1), AdmissionError::QuantityNotPositive),
            (Some(DecimalInput::from("2.5")), AdmissionError::QuantityNotInteger),
            (Some(DecimalInput::from("tres")), AdmissionError::QuantityNotInteger),
        ];
        for (raw, expected) in cases {
            assert_eq!(admit(&f, &draft(&f.product, raw)).unwrap_err(), expected);
        }
    }

    #[test]
    fn quantity_messages_are_field_scoped() {
        assert_eq!(
            AdmissionError::QuantityNotPositive.to_string(),
            "quantity: must be greater than 0"
        );
        assert_eq!(
            AdmissionError::QuantityNotInteger.to_string(),
            "quantity: must be an integer"
        );
    }

    #[test]
    fn integral_decimal_quantity_is_accepted() {
        let q = parse_quantity(Some(&DecimalInput::from("3.0"))).unwrap();
        assert_eq!(q.get(), 3);

        let too_big = DecimalInput::from("2147483648");
        assert_eq!(
            parse_quantity(Some(&too_big)).unwrap_err(),
            AdmissionError::QuantityTooLarge
        );
    }

    #[test]
    fn malformed_overrides_are_invalid_decimals() {
        let f = fixture(None);
        let mut d = draft(&f.product, qty(1));
        d.unit_price = Some(DecimalInput::from("cien"));
        let err = admit(&f, &d).unwrap_err();
        assert_eq!(
            err,
            AdmissionError::InvalidDecimal {
                field: "unit_price",
                reason: DecimalError::NotANumber,
            }
        );
        assert_eq!(err.to_string(), "unit_price: invalid decimal value");
    }

    #[test]
    fn product_of_another_company_is_rejected() {
        let f = fixture(None);
        let foreign = fixture(None).product;
        let err = admit_line_item(
            &f.invoice,
            &foreign,
            &draft(&foreign, qty(1)),
            1,
            LineItemId::new(),
            Utc::now(),
        )
        .unwrap_err();
        assert_eq!(err, AdmissionError::ProductNotOwned);
    }

    #[test]
    fn revision_revalidates_merged_values() {
        let f = fixture(None);
        let item = admit(&f, &draft(&f.product, qty(3))).unwrap();

        let changes = LineItemChanges {
            quantity: qty(0),
            ..LineItemChanges::default()
        };
        assert_eq!(
            revise_line_item(&f.invoice, &item, &changes).unwrap_err(),
            AdmissionError::QuantityNotPositive
        );

        let changes = LineItemChanges {
            quantity: qty(5),
            ..LineItemChanges::default()
        };
        let revised = revise_line_item(&f.invoice, &item, &changes).unwrap();
        assert_eq!(revised.quantity().get(), 5);
        assert_eq!(revised.unit_price(), item.unit_price());
        assert_eq!(revised.id_typed(), item.id_typed());
    }

    #[test]
    fn revision_cannot_cross_invoices() {
        let f = fixture(None);
        let item = admit(&f, &draft(&f.product, qty(1))).unwrap();
        let other = fixture(None).invoice;
        assert_eq!(
            revise_line_item(&other, &item, &LineItemChanges::default()).unwrap_err(),
            AdmissionError::InvoiceMismatch
        );
    }

    #[test]
    fn quantity_beyond_exact_precision_is_not_an_integer() {
        let raw = DecimalInput::from("2.00000000000000000000000000001");
        assert_eq!(
            parse_quantity(Some(&raw)).unwrap_err(),
            AdmissionError::QuantityNotInteger
        );
    }

    #[test]
    fn unit_price_beyond_exact_precision_is_an_invalid_decimal() {
        let f = fixture(None);
        let mut d = draft(&f.product, qty(1));
        d.unit_price = Some(DecimalInput::from("1.00000000000000000000000000001"));
        assert_eq!(
            admit(&f, &d).unwrap_err().to_string(),
            "unit_price: invalid decimal value"
        );
    }

    #[test]
    fn structurally_bad_fields_still_deserialize() {
        let f = fixture(None);
        let d: LineItemDraft = serde_json::from_value(serde_json::json!({
            "quantity": true,
            "unit_price": [1],
        }))
        .unwrap();
        assert_eq!(d.product_id, None);
        assert_eq!(admit(&f, &d).unwrap_err(), AdmissionError::MissingProduct);
        assert_eq!(
            AdmissionError::MissingProduct.to_string(),
            "product_id: this field is required"
        );

        let mut d = draft(&f.product, None);
        d.quantity = serde_json::from_str("true").unwrap();
        assert_eq!(admit(&f, &d).unwrap_err(), AdmissionError::QuantityNotInteger);
    }

    #[test]
    fn malformed_product_id_is_not_owned() {
        let f = fixture(None);
        let d: LineItemDraft =
            serde_json::from_value(serde_json::json!({ "product_id": 42, "quantity": 1 }))
                .unwrap();
        assert_eq!(d.product_id.as_deref(), Some("42"));
        assert_eq!(admit(&f, &d).unwrap_err(), AdmissionError::ProductNotOwned);
    }
}
