//! Application-level orchestration.
//!
//! `InvoicingService` runs each operation as one store transaction:
//!
//! ```text
//! load (tenant-scoped) → validate/admit → persist → recompute totals → commit
//! ```
//!
//! Any error inside the transaction discards every write made by it. Totals
//! are recomputed inside the same transaction as the line item mutation that
//! invalidated them. No operation is retried.

use chrono::Utc;
use thiserror::Error;
use tracing::{info, instrument, warn};

use facturas_core::{CompanyId, DomainError};
use facturas_invoicing::{
    AdmissionError, CreationError, Invoice, InvoiceChanges, InvoiceDraft, InvoiceId,
    InvoiceTotals, ItemError, LineItem, LineItemChanges, LineItemDraft, LineItemId, admit_items,
    admit_line_item, calculate_totals, open_invoice, revise_line_item,
};
use facturas_parties::{Client, ClientChanges, ClientId, Company, NewClient, NewCompany};
use facturas_products::{NewProduct, Product, ProductChanges, ProductId};

use crate::store::{InvoicingStore, StoreError, StoreTx};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// Malformed or inconsistent request; nothing was written.
    #[error("validation failed: {0}")]
    Validation(String),

    /// One or more items of a batch failed admission; nothing was written.
    #[error("{} item(s) rejected", .0.len())]
    ItemsRejected(Vec<ItemError>),

    #[error("not found")]
    NotFound,

    /// A delete would orphan referencing records, or a reference is dangling.
    #[error("referential integrity: {0}")]
    ReferentialIntegrity(String),

    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    #[error("unauthorized")]
    Unauthorized,

    #[error("store error: {0}")]
    Store(String),
}

impl From<StoreError> for ServiceError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NotFound => ServiceError::NotFound,
            StoreError::ReferentialIntegrity(msg) => ServiceError::ReferentialIntegrity(msg),
            other => ServiceError::Store(other.to_string()),
        }
    }
}

impl From<DomainError> for ServiceError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::Validation(msg) | DomainError::InvalidId(msg) => {
                ServiceError::Validation(msg)
            }
            DomainError::Conflict(msg) => ServiceError::Validation(msg),
            DomainError::InvariantViolation(msg) => ServiceError::InvariantViolation(msg),
            DomainError::ReferentialIntegrity(msg) => ServiceError::ReferentialIntegrity(msg),
            DomainError::NotFound => ServiceError::NotFound,
            DomainError::Unauthorized => ServiceError::Unauthorized,
        }
    }
}

impl From<AdmissionError> for ServiceError {
    fn from(value: AdmissionError) -> Self {
        DomainError::from(value).into()
    }
}

impl From<CreationError> for ServiceError {
    fn from(value: CreationError) -> Self {
        match value {
            CreationError::NoItems => ServiceError::Validation(value.to_string()),
            CreationError::Header(err) => err.into(),
            CreationError::ItemsRejected(items) => ServiceError::ItemsRejected(items),
        }
    }
}

/// An invoice with its line items (ordered by line number).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceDetail {
    pub invoice: Invoice,
    pub items: Vec<LineItem>,
}

fn client_not_owned() -> ServiceError {
    ServiceError::Validation("client_id: client not owned by tenant".to_string())
}

/// Recompute an invoice's totals from its stored line items and persist them.
fn recompute<T: StoreTx>(
    tx: &mut T,
    company_id: CompanyId,
    invoice: &Invoice,
) -> Result<Invoice, ServiceError> {
    let items = tx.line_items(company_id, invoice.id_typed());
    let updated = invoice.with_totals(calculate_totals(&items));
    tx.put_invoice(company_id, updated.clone())?;
    Ok(updated)
}

pub struct InvoicingService<S> {
    pub(crate) store: S,
}

impl<S: InvoicingStore> InvoicingService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    // Companies

    #[instrument(skip(self, data), err)]
    pub fn register_company(&self, data: NewCompany) -> Result<Company, ServiceError> {
        let company = Company::register(CompanyId::new(), data, Utc::now())?;
        let stored = company.clone();
        self.store
            .write::<_, ServiceError, _>(|tx| Ok(tx.insert_company(stored)?))?;
        info!(company_id = %company.id_typed(), "company registered");
        Ok(company)
    }

    pub fn company(&self, company_id: CompanyId) -> Result<Company, ServiceError> {
        self.store
            .read(|tx| tx.company(company_id))?
            .ok_or(ServiceError::NotFound)
    }

    /// Delete a company together with its clients, products and invoices.
    #[instrument(skip(self), fields(company_id = %company_id), err)]
    pub fn delete_company(&self, company_id: CompanyId) -> Result<(), ServiceError> {
        self.store
            .write::<_, ServiceError, _>(|tx| Ok(tx.delete_company(company_id)?))?;
        info!("company deleted");
        Ok(())
    }

    // Clients

    #[instrument(skip(self, data), fields(company_id = %company_id), err)]
    pub fn create_client(
        &self,
        company_id: CompanyId,
        data: NewClient,
    ) -> Result<Client, ServiceError> {
        let client = Client::register(company_id, ClientId::new(), data, Utc::now())?;
        let stored = client.clone();
        self.store
            .write::<_, ServiceError, _>(|tx| Ok(tx.put_client(company_id, stored)?))?;
        Ok(client)
    }

    pub fn list_clients(&self, company_id: CompanyId) -> Result<Vec<Client>, ServiceError> {
        Ok(self.store.read(|tx| tx.clients(company_id))?)
    }

    pub fn get_client(&self, company_id: CompanyId, id: ClientId) -> Result<Client, ServiceError> {
        self.store
            .read(|tx| tx.client(company_id, id))?
            .ok_or(ServiceError::NotFound)
    }

    #[instrument(skip(self, changes), fields(company_id = %company_id, client_id = %id), err)]
    pub fn update_client(
        &self,
        company_id: CompanyId,
        id: ClientId,
        changes: ClientChanges,
    ) -> Result<Client, ServiceError> {
        self.store.write::<_, ServiceError, _>(|tx| {
            let current = tx.client(company_id, id).ok_or(ServiceError::NotFound)?;
            let updated = current.update(changes)?;
            tx.put_client(company_id, updated.clone())?;
            Ok(updated)
        })
    }

    #[instrument(skip(self), fields(company_id = %company_id, client_id = %id), err)]
    pub fn delete_client(&self, company_id: CompanyId, id: ClientId) -> Result<(), ServiceError> {
        self.store
            .write::<_, ServiceError, _>(|tx| Ok(tx.delete_client(company_id, id)?))
    }

    // Products

    #[instrument(skip(self, data), fields(company_id = %company_id), err)]
    pub fn create_product(
        &self,
        company_id: CompanyId,
        data: NewProduct,
    ) -> Result<Product, ServiceError> {
        let product = Product::create(company_id, ProductId::new(), data, Utc::now())?;
        let stored = product.clone();
        self.store
            .write::<_, ServiceError, _>(|tx| Ok(tx.put_product(company_id, stored)?))?;
        Ok(product)
    }

    pub fn list_products(&self, company_id: CompanyId) -> Result<Vec<Product>, ServiceError> {
        Ok(self.store.read(|tx| tx.products(company_id))?)
    }

    pub fn get_product(
        &self,
        company_id: CompanyId,
        id: ProductId,
    ) -> Result<Product, ServiceError> {
        self.store
            .read(|tx| tx.product(company_id, id))?
            .ok_or(ServiceError::NotFound)
    }

    /// Line items already issued keep the price and VAT they were admitted with.
    #[instrument(skip(self, changes), fields(company_id = %company_id, product_id = %id), err)]
    pub fn update_product(
        &self,
        company_id: CompanyId,
        id: ProductId,
        changes: ProductChanges,
    ) -> Result<Product, ServiceError> {
        self.store.write::<_, ServiceError, _>(|tx| {
            let current = tx.product(company_id, id).ok_or(ServiceError::NotFound)?;
            let updated = current.update(changes)?;
            tx.put_product(company_id, updated.clone())?;
            Ok(updated)
        })
    }

    #[instrument(skip(self), fields(company_id = %company_id, product_id = %id), err)]
    pub fn delete_product(&self, company_id: CompanyId, id: ProductId) -> Result<(), ServiceError> {
        self.store
            .write::<_, ServiceError, _>(|tx| Ok(tx.delete_product(company_id, id)?))
    }

    // Invoices

    /// Create an invoice and all of its items in one transaction.
    ///
    /// Every item is admitted independently; if any fails, all failures are
    /// reported by position and nothing is persisted. Totals are computed once,
    /// after the last item is stored.
    #[instrument(
        skip(self, draft),
        fields(company_id = %company_id, item_count = draft.items.len()),
        err
    )]
    pub fn create_invoice(
        &self,
        company_id: CompanyId,
        draft: InvoiceDraft,
    ) -> Result<InvoiceDetail, ServiceError> {
        if draft.items.is_empty() {
            return Err(CreationError::NoItems.into());
        }
        let now = Utc::now();

        let result = self.store.write::<_, ServiceError, _>(|tx| {
            let client = tx
                .client(company_id, draft.client_id)
                .ok_or_else(client_not_owned)?;
            let invoice = open_invoice(company_id, InvoiceId::new(), &client, &draft, now)?;
            tx.put_invoice(company_id, invoice.clone())?;

            let items = admit_items(
                &invoice,
                &draft.items,
                |product_id| tx.product(company_id, product_id),
                now,
            )
            .map_err(ServiceError::ItemsRejected)?;
            for item in &items {
                tx.put_line_item(company_id, item.clone())?;
            }

            let invoice = recompute(tx, company_id, &invoice)?;
            let items = tx.line_items(company_id, invoice.id_typed());
            Ok(InvoiceDetail { invoice, items })
        });

        match &result {
            Ok(detail) => info!(
                invoice_id = %detail.invoice.id_typed(),
                total = %detail.invoice.totals().total,
                "invoice created"
            ),
            Err(ServiceError::ItemsRejected(rejected)) => {
                warn!(rejected = rejected.len(), "invoice batch rejected")
            }
            Err(_) => {}
        }
        result
    }

    pub fn list_invoices(&self, company_id: CompanyId) -> Result<Vec<Invoice>, ServiceError> {
        Ok(self.store.read(|tx| tx.invoices(company_id))?)
    }

    pub fn get_invoice(
        &self,
        company_id: CompanyId,
        id: InvoiceId,
    ) -> Result<InvoiceDetail, ServiceError> {
        self.store
            .read(|tx| {
                tx.invoice(company_id, id).map(|invoice| InvoiceDetail {
                    items: tx.line_items(company_id, id),
                    invoice,
                })
            })?
            .ok_or(ServiceError::NotFound)
    }

    /// Edit header fields. Totals are untouched: they only depend on items.
    #[instrument(skip(self, changes), fields(company_id = %company_id, invoice_id = %id), err)]
    pub fn update_invoice(
        &self,
        company_id: CompanyId,
        id: InvoiceId,
        changes: InvoiceChanges,
    ) -> Result<Invoice, ServiceError> {
        self.store.write::<_, ServiceError, _>(|tx| {
            let mut invoice = tx.invoice(company_id, id).ok_or(ServiceError::NotFound)?;
            if let Some(client_id) = changes.client_id {
                let client = tx
                    .client(company_id, client_id)
                    .ok_or_else(client_not_owned)?;
                invoice = invoice.reassign_client(&client)?;
            }
            let invoice = invoice.revise(changes.notes, changes.number.as_deref())?;
            tx.put_invoice(company_id, invoice.clone())?;
            Ok(invoice)
        })
    }

    #[instrument(skip(self), fields(company_id = %company_id, invoice_id = %id), err)]
    pub fn delete_invoice(&self, company_id: CompanyId, id: InvoiceId) -> Result<(), ServiceError> {
        self.store
            .write::<_, ServiceError, _>(|tx| Ok(tx.delete_invoice(company_id, id)?))
    }

    // Line items

    /// Admit one line item into an existing invoice and refresh its totals.
    #[instrument(
        skip(self, draft),
        fields(company_id = %company_id, invoice_id = %invoice_id, product_id = ?draft.product_id),
        err
    )]
    pub fn admit_line_item(
        &self,
        company_id: CompanyId,
        invoice_id: InvoiceId,
        draft: LineItemDraft,
    ) -> Result<LineItem, ServiceError> {
        self.store.write::<_, ServiceError, _>(|tx| {
            let invoice = tx
                .invoice(company_id, invoice_id)
                .ok_or(ServiceError::NotFound)?;
            let product = tx
                .product(company_id, draft.parsed_product_id()?)
                .ok_or(AdmissionError::ProductNotOwned)?;
            let line_no = tx
                .line_items(company_id, invoice_id)
                .iter()
                .map(LineItem::line_no)
                .max()
                .unwrap_or(0)
                + 1;

            let item = admit_line_item(
                &invoice,
                &product,
                &draft,
                line_no,
                LineItemId::new(),
                Utc::now(),
            )?;
            tx.put_line_item(company_id, item.clone())?;
            recompute(tx, company_id, &invoice)?;
            Ok(item)
        })
    }

    #[instrument(
        skip(self, changes),
        fields(company_id = %company_id, invoice_id = %invoice_id, item_id = %item_id),
        err
    )]
    pub fn update_line_item(
        &self,
        company_id: CompanyId,
        invoice_id: InvoiceId,
        item_id: LineItemId,
        changes: LineItemChanges,
    ) -> Result<LineItem, ServiceError> {
        self.store.write::<_, ServiceError, _>(|tx| {
            let invoice = tx
                .invoice(company_id, invoice_id)
                .ok_or(ServiceError::NotFound)?;
            let current = tx
                .line_item(company_id, invoice_id, item_id)
                .ok_or(ServiceError::NotFound)?;

            let item = revise_line_item(&invoice, &current, &changes)?;
            tx.put_line_item(company_id, item.clone())?;
            recompute(tx, company_id, &invoice)?;
            Ok(item)
        })
    }

    /// Remove a line item; the invoice may end up with no items at all.
    #[instrument(
        skip(self),
        fields(company_id = %company_id, invoice_id = %invoice_id, item_id = %item_id),
        err
    )]
    pub fn delete_line_item(
        &self,
        company_id: CompanyId,
        invoice_id: InvoiceId,
        item_id: LineItemId,
    ) -> Result<InvoiceTotals, ServiceError> {
        self.store.write::<_, ServiceError, _>(|tx| {
            let invoice = tx
                .invoice(company_id, invoice_id)
                .ok_or(ServiceError::NotFound)?;
            tx.delete_line_item(company_id, invoice_id, item_id)?;
            Ok(recompute(tx, company_id, &invoice)?.totals())
        })
    }

    /// Recompute and persist an invoice's totals from its current line items.
    ///
    /// Idempotent; an invoice without items gets `0.00` everywhere.
    #[instrument(skip(self), fields(company_id = %company_id, invoice_id = %invoice_id), err)]
    pub fn recalculate_invoice_totals(
        &self,
        company_id: CompanyId,
        invoice_id: InvoiceId,
    ) -> Result<InvoiceTotals, ServiceError> {
        self.store.write::<_, ServiceError, _>(|tx| {
            let invoice = tx
                .invoice(company_id, invoice_id)
                .ok_or(ServiceError::NotFound)?;
            Ok(recompute(tx, company_id, &invoice)?.totals())
        })
    }
}
