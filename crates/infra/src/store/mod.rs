//! Tenant-scoped transactional storage boundary.
//!
//! Every read and write takes the caller's [`CompanyId`]; there is no
//! unscoped lookup. A [`InvoicingStore::write`] closure is one atomic unit:
//! if it returns an error, none of its writes are kept.

pub mod in_memory;

use std::sync::Arc;

use thiserror::Error;

use facturas_core::CompanyId;
use facturas_invoicing::{Invoice, InvoiceId, LineItem, LineItemId};
use facturas_parties::{Client, ClientId, Company};
use facturas_products::{Product, ProductId};

pub use in_memory::InMemoryStore;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("not found")]
    NotFound,

    #[error("referential integrity: {0}")]
    ReferentialIntegrity(String),

    #[error("tenant isolation violation: {0}")]
    TenantIsolation(String),

    #[error("storage backend failure: {0}")]
    Backend(String),
}

/// Operations available inside a transaction.
///
/// Listing order: clients and products by name, invoices newest first, line
/// items by line number.
pub trait StoreTx {
    fn company(&self, company_id: CompanyId) -> Option<Company>;
    fn insert_company(&mut self, company: Company) -> Result<(), StoreError>;
    /// Removes the company and everything it owns.
    fn delete_company(&mut self, company_id: CompanyId) -> Result<(), StoreError>;

    fn client(&self, company_id: CompanyId, id: ClientId) -> Option<Client>;
    fn clients(&self, company_id: CompanyId) -> Vec<Client>;
    fn put_client(&mut self, company_id: CompanyId, client: Client) -> Result<(), StoreError>;
    /// Rejected while any invoice references the client.
    fn delete_client(&mut self, company_id: CompanyId, id: ClientId) -> Result<(), StoreError>;

    fn product(&self, company_id: CompanyId, id: ProductId) -> Option<Product>;
    fn products(&self, company_id: CompanyId) -> Vec<Product>;
    fn put_product(&mut self, company_id: CompanyId, product: Product) -> Result<(), StoreError>;
    /// Rejected while any line item references the product.
    fn delete_product(&mut self, company_id: CompanyId, id: ProductId) -> Result<(), StoreError>;

    fn invoice(&self, company_id: CompanyId, id: InvoiceId) -> Option<Invoice>;
    fn invoices(&self, company_id: CompanyId) -> Vec<Invoice>;
    fn put_invoice(&mut self, company_id: CompanyId, invoice: Invoice) -> Result<(), StoreError>;
    /// Removes the invoice and its line items.
    fn delete_invoice(&mut self, company_id: CompanyId, id: InvoiceId) -> Result<(), StoreError>;

    fn line_item(
        &self,
        company_id: CompanyId,
        invoice_id: InvoiceId,
        id: LineItemId,
    ) -> Option<LineItem>;
    fn line_items(&self, company_id: CompanyId, invoice_id: InvoiceId) -> Vec<LineItem>;
    fn put_line_item(&mut self, company_id: CompanyId, item: LineItem) -> Result<(), StoreError>;
    fn delete_line_item(
        &mut self,
        company_id: CompanyId,
        invoice_id: InvoiceId,
        id: LineItemId,
    ) -> Result<(), StoreError>;
}

/// Transactional store.
pub trait InvoicingStore: Send + Sync {
    type Tx: StoreTx;

    /// Run `f` against a consistent view.
    fn read<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&Self::Tx) -> T;

    /// Run `f` as one atomic unit; commit only if it returns `Ok`.
    fn write<T, E, F>(&self, f: F) -> Result<T, E>
    where
        E: From<StoreError>,
        F: FnOnce(&mut Self::Tx) -> Result<T, E>;
}

impl<S> InvoicingStore for Arc<S>
where
    S: InvoicingStore + ?Sized,
{
    type Tx = S::Tx;

    fn read<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&Self::Tx) -> T,
    {
        (**self).read(f)
    }

    fn write<T, E, F>(&self, f: F) -> Result<T, E>
    where
        E: From<StoreError>,
        F: FnOnce(&mut Self::Tx) -> Result<T, E>,
    {
        (**self).write(f)
    }
}
