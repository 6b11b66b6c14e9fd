//! JSON mapping of domain records.
//!
//! Request bodies deserialize straight into the domain input types
//! (`NewClient`, `InvoiceDraft`, ...). Monetary values and VAT percentages
//! are rendered as strings with exactly two decimals.

use rust_decimal::Decimal;
use serde_json::{Value, json};

use facturas_core::to_money_scale;
use facturas_infra::InvoiceDetail;
use facturas_invoicing::{Invoice, InvoiceTotals, LineItem};
use facturas_parties::{Client, Company};
use facturas_products::Product;

pub fn money(value: Decimal) -> String {
    to_money_scale(value).to_string()
}

pub fn company_to_json(c: &Company) -> Value {
    json!({
        "id": c.id_typed().to_string(),
        "company_name": c.company_name(),
        "tax_identification_number": c.tax_identification_number(),
        "address": c.address(),
        "phone_number": c.phone_number(),
        "email": c.email(),
        "website_link": c.website_link(),
        "created_at": c.created_at().to_rfc3339(),
    })
}

pub fn client_to_json(c: &Client) -> Value {
    json!({
        "id": c.id_typed().to_string(),
        "name": c.name(),
        "email": c.email(),
        "phone_number": c.phone_number(),
        "address": c.address(),
        "tax_identification_number": c.tax_identification_number(),
        "created_at": c.created_at().to_rfc3339(),
    })
}

pub fn product_to_json(p: &Product) -> Value {
    json!({
        "id": p.id_typed().to_string(),
        "name": p.name(),
        "description": p.description(),
        "unit_price": money(p.unit_price().amount()),
        "vat_percentage": money(p.effective_vat().percentage()),
        "created_at": p.created_at().to_rfc3339(),
    })
}

pub fn totals_to_json(t: InvoiceTotals) -> Value {
    json!({
        "subtotal": money(t.subtotal),
        "total_tax": money(t.total_tax),
        "total": money(t.total),
    })
}

/// Per-line amounts are rendered so the displayed inclusive total is the
/// sum of the displayed exclusive total and tax.
pub fn line_item_to_json(item: &LineItem) -> Value {
    let exclusive = to_money_scale(item.line_total_exclusive());
    let tax = to_money_scale(item.line_tax());
    json!({
        "id": item.id_typed().to_string(),
        "invoice_id": item.invoice_id().to_string(),
        "product_id": item.product_id().to_string(),
        "line_no": item.line_no(),
        "description": item.description(),
        "quantity": item.quantity().get(),
        "unit_price": money(item.unit_price().amount()),
        "vat_percentage": money(item.vat_percentage().percentage()),
        "line_total_exclusive": money(exclusive),
        "line_tax": money(tax),
        "line_total_inclusive": money(exclusive + tax),
    })
}

/// Invoice header without its items (list views).
pub fn invoice_to_json(inv: &Invoice) -> Value {
    let totals = inv.totals();
    json!({
        "id": inv.id_typed().to_string(),
        "client_id": inv.client_id().to_string(),
        "invoice_date": inv.invoice_date().to_string(),
        "number": inv.number(),
        "notes": inv.notes(),
        "subtotal": money(totals.subtotal),
        "total_tax": money(totals.total_tax),
        "total": money(totals.total),
        "created_at": inv.created_at().to_rfc3339(),
    })
}

pub fn invoice_detail_to_json(detail: &InvoiceDetail) -> Value {
    let mut body = invoice_to_json(&detail.invoice);
    body["items"] = Value::Array(detail.items.iter().map(line_item_to_json).collect());
    body
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use facturas_core::CompanyId;
    use facturas_invoicing::{InvoiceId, LineItemId, Quantity};
    use facturas_products::{ProductId, UnitPrice, VatRate};

    #[test]
    fn money_always_has_two_decimals() {
        assert_eq!(money(Decimal::ZERO), "0.00");
        assert_eq!(money(Decimal::new(357, 0)), "357.00");
        assert_eq!(money(Decimal::new(5, 3)), "0.00");
        assert_eq!(money(Decimal::new(15, 3)), "0.02");
    }

    #[test]
    fn line_inclusive_total_adds_up_from_rendered_parts() {
        let item = LineItem::new(
            LineItemId::new(),
            CompanyId::new(),
            InvoiceId::new(),
            ProductId::new(),
            1,
            "Tornillo".to_string(),
            UnitPrice::new(Decimal::new(5, 2)).unwrap(),
            VatRate::new(Decimal::new(10, 0)).unwrap(),
            Quantity::new(1).unwrap(),
            Utc::now(),
        );
        let body = line_item_to_json(&item);
        assert_eq!(body["line_total_exclusive"], "0.05");
        assert_eq!(body["line_tax"], "0.00");
        assert_eq!(body["line_total_inclusive"], "0.05");
    }
}
