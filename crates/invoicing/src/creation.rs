//! Invoice creation.
//!
//! Creating an invoice is one unit: header, every line item, then the totals.
//! The functions here are the pure halves of that unit; the surrounding
//! transaction lives with the store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use facturas_core::{CompanyId, DomainError};
use facturas_parties::{Client, ClientId};
use facturas_products::{Product, ProductId};

use crate::admission::{AdmissionError, LineItemDraft, admit_line_item};
use crate::invoice::{Invoice, InvoiceId};
use crate::line_item::{LineItem, LineItemId};

/// Invoice submitted together with its line items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceDraft {
    pub client_id: ClientId,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub number: Option<String>,
    #[serde(default)]
    pub items: Vec<LineItemDraft>,
}

/// Rejection of one item of a batch, by its 0-based position in the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemError {
    pub position: usize,
    pub error: AdmissionError,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CreationError {
    #[error("items: an invoice needs at least one item")]
    NoItems,

    #[error(transparent)]
    Header(#[from] DomainError),

    #[error("{} item(s) rejected", .0.len())]
    ItemsRejected(Vec<ItemError>),
}

/// Validate the header of `draft` and open an empty invoice.
///
/// `client` is the result of the caller's tenant-scoped lookup of
/// `draft.client_id`.
pub fn open_invoice(
    company_id: CompanyId,
    id: InvoiceId,
    client: &Client,
    draft: &InvoiceDraft,
    now: DateTime<Utc>,
) -> Result<Invoice, CreationError> {
    if draft.items.is_empty() {
        return Err(CreationError::NoItems);
    }
    if client.id_typed() != draft.client_id {
        return Err(DomainError::validation("client_id: client not owned by tenant").into());
    }
    let invoice = Invoice::open(
        company_id,
        id,
        client,
        draft.notes.clone(),
        draft.number.as_deref(),
        now,
    )?;
    Ok(invoice)
}

/// Admit every draft independently, numbering lines from 1.
///
/// `resolve` is the tenant-scoped product lookup; a product it cannot see is
/// reported the same way as a product of another company. Either every item is
/// admitted or all failures are returned together.
pub fn admit_items<F>(
    invoice: &Invoice,
    drafts: &[LineItemDraft],
    resolve: F,
    now: DateTime<Utc>,
) -> Result<Vec<LineItem>, Vec<ItemError>>
where
    F: Fn(ProductId) -> Option<Product>,
{
    let mut admitted = Vec::with_capacity(drafts.len());
    let mut rejected = Vec::new();

    for (position, draft) in drafts.iter().enumerate() {
        let line_no = u32::try_from(position + 1).unwrap_or(u32::MAX);
        let outcome = draft
            .parsed_product_id()
            .and_then(|id| resolve(id).ok_or(AdmissionError::ProductNotOwned))
            .and_then(|product| {
                admit_line_item(invoice, &product, draft, line_no, LineItemId::new(), now)
            });

        match outcome {
            Ok(item) => admitted.push(item),
            Err(error) => rejected.push(ItemError { position, error }),
        }
    }

    if rejected.is_empty() {
        Ok(admitted)
    } else {
        Err(rejected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use facturas_core::DecimalInput;
    use facturas_parties::NewClient;
    use facturas_products::NewProduct;

    use crate::totals::calculate_totals;

    fn client(company: CompanyId) -> Client {
        let data = NewClient {
            name: "Cliente Demo".to_string(),
            ..NewClient::default()
        };
        Client::register(company, ClientId::new(), data, Utc::now()).unwrap()
    }

    fn product(company: CompanyId, price: &str) -> Product {
        let data = NewProduct {
            name: "Producto Demo".to_string(),
            description: String::new(),
            unit_price: DecimalInput::from(price),
            vat_percentage: Some(DecimalInput::from("19.00")),
        };
        Product::create(company, ProductId::new(), data, Utc::now()).unwrap()
    }

    fn line(product: &Product, quantity: i64) -> LineItemDraft {
        LineItemDraft::for_product(product.id_typed(), Some(DecimalInput::from(quantity)))
    }

    fn draft(client: &Client, items: Vec<LineItemDraft>) -> InvoiceDraft {
        InvoiceDraft {
            client_id: client.id_typed(),
            notes: String::new(),
            number: None,
            items,
        }
    }

    #[test]
    fn empty_item_list_is_rejected() {
        let company = CompanyId::new();
        let c = client(company);
        let err = open_invoice(company, InvoiceId::new(), &c, &draft(&c, vec![]), Utc::now())
            .unwrap_err();
        assert_eq!(err, CreationError::NoItems);
    }

    #[test]
    fn client_of_another_company_is_rejected() {
        let company = CompanyId::new();
        let p = product(company, "1.00");
        let foreign = client(CompanyId::new());
        let err = open_invoice(
            company,
            InvoiceId::new(),
            &foreign,
            &draft(&foreign, vec![line(&p, 1)]),
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, CreationError::Header(DomainError::Validation(_))));
    }

    #[test]
    fn admits_all_items_and_numbers_lines() {
        let company = CompanyId::new();
        let c = client(company);
        let p = product(company, "100.00");
        let catalog: HashMap<ProductId, Product> = [(p.id_typed(), p.clone())].into();

        let d = draft(&c, vec![line(&p, 3), line(&p, 1)]);
        let invoice = open_invoice(company, InvoiceId::new(), &c, &d, Utc::now()).unwrap();
        let items =
            admit_items(&invoice, &d.items, |id| catalog.get(&id).cloned(), Utc::now()).unwrap();

        assert_eq!(items.iter().map(LineItem::line_no).collect::<Vec<_>>(), vec![1, 2]);
        let totals = calculate_totals(&items);
        assert_eq!(totals.total.to_string(), "476.00");
    }

    #[test]
    fn reports_every_failing_position() {
        let company = CompanyId::new();
        let c = client(company);
        let p = product(company, "10.00");
        let unknown = product(CompanyId::new(), "10.00");
        let catalog: HashMap<ProductId, Product> = [(p.id_typed(), p.clone())].into();

        let d = draft(&c, vec![line(&p, 1), line(&p, 0), line(&unknown, 2)]);
        let invoice = open_invoice(company, InvoiceId::new(), &c, &d, Utc::now()).unwrap();
        let errors =
            admit_items(&invoice, &d.items, |id| catalog.get(&id).cloned(), Utc::now())
                .unwrap_err();

        assert_eq!(
            errors,
            vec![
                ItemError {
                    position: 1,
                    error: AdmissionError::QuantityNotPositive,
                },
                ItemError {
                    position: 2,
                    error: AdmissionError::ProductNotOwned,
                },
            ]
        );
    }

    #[test]
    fn item_without_product_is_attributed_to_its_position() {
        let company = CompanyId::new();
        let c = client(company);
        let p = product(company, "10.00");
        let catalog: HashMap<ProductId, Product> = [(p.id_typed(), p.clone())].into();

        let d: InvoiceDraft = serde_json::from_value(serde_json::json!({
            "client_id": c.id_typed().to_string(),
            "items": [
                { "product_id": p.id_typed().to_string(), "quantity": 1 },
                { "quantity": 1 },
                { "product_id": "not-an-id", "quantity": {"n": 1} },
            ],
        }))
        .unwrap();
        let invoice = open_invoice(company, InvoiceId::new(), &c, &d, Utc::now()).unwrap();
        let errors =
            admit_items(&invoice, &d.items, |id| catalog.get(&id).cloned(), Utc::now())
                .unwrap_err();

        assert_eq!(
            errors,
            vec![
                ItemError {
                    position: 1,
                    error: AdmissionError::MissingProduct,
                },
                ItemError {
                    position: 2,
                    error: AdmissionError::ProductNotOwned,
                },
            ]
        );
    }
}
