use std::collections::HashMap;
use std::hash::Hash;
use std::sync::RwLock;

use facturas_core::{CompanyId, TenantOwned};
use facturas_invoicing::{Invoice, InvoiceId, LineItem, LineItemId};
use facturas_parties::{Client, ClientId, Company};
use facturas_products::{Product, ProductId};

use super::{InvoicingStore, StoreError, StoreTx};

/// Previous value of one row touched by the running write.
#[derive(Debug)]
enum Undo {
    Company(CompanyId, Option<Company>),
    Client((CompanyId, ClientId), Option<Client>),
    Product((CompanyId, ProductId), Option<Product>),
    Invoice((CompanyId, InvoiceId), Option<Invoice>),
    LineItem((CompanyId, LineItemId), Option<LineItem>),
}

/// Tables of the in-memory store, keyed by `(company, id)`.
///
/// Every mutation records the row it replaced, so a failed write is rolled
/// back by touching only the rows it changed.
#[derive(Debug, Default)]
pub struct Tables {
    companies: HashMap<CompanyId, Company>,
    clients: HashMap<(CompanyId, ClientId), Client>,
    products: HashMap<(CompanyId, ProductId), Product>,
    invoices: HashMap<(CompanyId, InvoiceId), Invoice>,
    line_items: HashMap<(CompanyId, LineItemId), LineItem>,
    journal: Vec<Undo>,
}

/// In-memory transactional store for tests/dev.
///
/// Writers run one at a time against the live tables; on error the journal
/// restores every row the writer touched.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl InvoicingStore for InMemoryStore {
    type Tx = Tables;

    fn read<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&Self::Tx) -> T,
    {
        let tables = self
            .tables
            .read()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))?;
        Ok(f(&tables))
    }

    fn write<T, E, F>(&self, f: F) -> Result<T, E>
    where
        E: From<StoreError>,
        F: FnOnce(&mut Self::Tx) -> Result<T, E>,
    {
        let mut tables = self
            .tables
            .write()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))?;

        tables.journal.clear();
        match f(&mut tables) {
            Ok(out) => {
                tables.journal.clear();
                Ok(out)
            }
            Err(err) => {
                tables.rollback();
                Err(err)
            }
        }
    }
}

fn set<K: Hash + Eq, V>(map: &mut HashMap<K, V>, key: K, value: Option<V>) -> Option<V> {
    match value {
        Some(v) => map.insert(key, v),
        None => map.remove(&key),
    }
}

fn keys_of<K: Copy, V>(map: &HashMap<K, V>, keep: impl Fn(&K, &V) -> bool) -> Vec<K> {
    map.iter().filter(|&(k, v)| keep(k, v)).map(|(k, _)| *k).collect()
}

impl Tables {
    #[cfg(test)]
    pub(crate) fn touched(&self) -> usize {
        self.journal.len()
    }

    fn rollback(&mut self) {
        while let Some(undo) = self.journal.pop() {
            match undo {
                Undo::Company(k, prev) => {
                    set(&mut self.companies, k, prev);
                }
                Undo::Client(k, prev) => {
                    set(&mut self.clients, k, prev);
                }
                Undo::Product(k, prev) => {
                    set(&mut self.products, k, prev);
                }
                Undo::Invoice(k, prev) => {
                    set(&mut self.invoices, k, prev);
                }
                Undo::LineItem(k, prev) => {
                    set(&mut self.line_items, k, prev);
                }
            }
        }
    }

    fn set_company(&mut self, key: CompanyId, value: Option<Company>) {
        let prev = set(&mut self.companies, key, value);
        self.journal.push(Undo::Company(key, prev));
    }

    fn set_client(&mut self, key: (CompanyId, ClientId), value: Option<Client>) {
        let prev = set(&mut self.clients, key, value);
        self.journal.push(Undo::Client(key, prev));
    }

    fn set_product(&mut self, key: (CompanyId, ProductId), value: Option<Product>) {
        let prev = set(&mut self.products, key, value);
        self.journal.push(Undo::Product(key, prev));
    }

    fn set_invoice(&mut self, key: (CompanyId, InvoiceId), value: Option<Invoice>) {
        let prev = set(&mut self.invoices, key, value);
        self.journal.push(Undo::Invoice(key, prev));
    }

    fn set_line_item(&mut self, key: (CompanyId, LineItemId), value: Option<LineItem>) {
        let prev = set(&mut self.line_items, key, value);
        self.journal.push(Undo::LineItem(key, prev));
    }

    fn ensure_company(&self, company_id: CompanyId) -> Result<(), StoreError> {
        if self.companies.contains_key(&company_id) {
            Ok(())
        } else {
            Err(StoreError::NotFound)
        }
    }

    fn ensure_owner<T: TenantOwned>(company_id: CompanyId, record: &T) -> Result<(), StoreError> {
        if record.company_id() != company_id {
            return Err(StoreError::TenantIsolation(format!(
                "record of company {} written under company {company_id}",
                record.company_id()
            )));
        }
        Ok(())
    }
}

impl StoreTx for Tables {
    fn company(&self, company_id: CompanyId) -> Option<Company> {
        self.companies.get(&company_id).cloned()
    }

    fn insert_company(&mut self, company: Company) -> Result<(), StoreError> {
        self.set_company(company.id_typed(), Some(company));
        Ok(())
    }

    fn delete_company(&mut self, company_id: CompanyId) -> Result<(), StoreError> {
        self.ensure_company(company_id)?;
        for key in keys_of(&self.line_items, |(c, _), _| *c == company_id) {
            self.set_line_item(key, None);
        }
        for key in keys_of(&self.invoices, |(c, _), _| *c == company_id) {
            self.set_invoice(key, None);
        }
        for key in keys_of(&self.products, |(c, _), _| *c == company_id) {
            self.set_product(key, None);
        }
        for key in keys_of(&self.clients, |(c, _), _| *c == company_id) {
            self.set_client(key, None);
        }
        self.set_company(company_id, None);
        Ok(())
    }

    fn client(&self, company_id: CompanyId, id: ClientId) -> Option<Client> {
        self.clients.get(&(company_id, id)).cloned()
    }

    fn clients(&self, company_id: CompanyId) -> Vec<Client> {
        let mut out: Vec<Client> = self
            .clients
            .iter()
            .filter(|((c, _), _)| *c == company_id)
            .map(|(_, v)| v.clone())
            .collect();
        out.sort_by(|a, b| a.name().cmp(b.name()).then(a.id_typed().cmp(&b.id_typed())));
        out
    }

    fn put_client(&mut self, company_id: CompanyId, client: Client) -> Result<(), StoreError> {
        self.ensure_company(company_id)?;
        Self::ensure_owner(company_id, &client)?;
        self.set_client((company_id, client.id_typed()), Some(client));
        Ok(())
    }

    fn delete_client(&mut self, company_id: CompanyId, id: ClientId) -> Result<(), StoreError> {
        if !self.clients.contains_key(&(company_id, id)) {
            return Err(StoreError::NotFound);
        }
        let in_use = self
            .invoices
            .iter()
            .filter(|((c, _), inv)| *c == company_id && inv.client_id() == id)
            .count();
        if in_use > 0 {
            return Err(StoreError::ReferentialIntegrity(format!(
                "client is referenced by {in_use} invoice(s)"
            )));
        }
        self.set_client((company_id, id), None);
        Ok(())
    }

    fn product(&self, company_id: CompanyId, id: ProductId) -> Option<Product> {
        self.products.get(&(company_id, id)).cloned()
    }

    fn products(&self, company_id: CompanyId) -> Vec<Product> {
        let mut out: Vec<Product> = self
            .products
            .iter()
            .filter(|((c, _), _)| *c == company_id)
            .map(|(_, v)| v.clone())
            .collect();
        out.sort_by(|a, b| a.name().cmp(b.name()).then(a.id_typed().cmp(&b.id_typed())));
        out
    }

    fn put_product(&mut self, company_id: CompanyId, product: Product) -> Result<(), StoreError> {
        self.ensure_company(company_id)?;
        Self::ensure_owner(company_id, &product)?;
        self.set_product((company_id, product.id_typed()), Some(product));
        Ok(())
    }

    fn delete_product(&mut self, company_id: CompanyId, id: ProductId) -> Result<(), StoreError> {
        if !self.products.contains_key(&(company_id, id)) {
            return Err(StoreError::NotFound);
        }
        let in_use = self
            .line_items
            .iter()
            .filter(|((c, _), item)| *c == company_id && item.product_id() == id)
            .count();
        if in_use > 0 {
            return Err(StoreError::ReferentialIntegrity(format!(
                "product is referenced by {in_use} line item(s)"
            )));
        }
        self.set_product((company_id, id), None);
        Ok(())
    }

    fn invoice(&self, company_id: CompanyId, id: InvoiceId) -> Option<Invoice> {
        self.invoices.get(&(company_id, id)).cloned()
    }

    fn invoices(&self, company_id: CompanyId) -> Vec<Invoice> {
        let mut out: Vec<Invoice> = self
            .invoices
            .iter()
            .filter(|((c, _), _)| *c == company_id)
            .map(|(_, v)| v.clone())
            .collect();
        out.sort_by(|a, b| {
            b.invoice_date()
                .cmp(&a.invoice_date())
                .then(b.id_typed().cmp(&a.id_typed()))
        });
        out
    }

    fn put_invoice(&mut self, company_id: CompanyId, invoice: Invoice) -> Result<(), StoreError> {
        self.ensure_company(company_id)?;
        Self::ensure_owner(company_id, &invoice)?;
        if !self.clients.contains_key(&(company_id, invoice.client_id())) {
            return Err(StoreError::ReferentialIntegrity(
                "invoice references an unknown client".to_string(),
            ));
        }
        self.set_invoice((company_id, invoice.id_typed()), Some(invoice));
        Ok(())
    }

    fn delete_invoice(&mut self, company_id: CompanyId, id: InvoiceId) -> Result<(), StoreError> {
        if !self.invoices.contains_key(&(company_id, id)) {
            return Err(StoreError::NotFound);
        }
        let items = keys_of(&self.line_items, |(c, _), item| {
            *c == company_id && item.invoice_id() == id
        });
        for key in items {
            self.set_line_item(key, None);
        }
        self.set_invoice((company_id, id), None);
        Ok(())
    }

    fn line_item(
        &self,
        company_id: CompanyId,
        invoice_id: InvoiceId,
        id: LineItemId,
    ) -> Option<LineItem> {
        self.line_items
            .get(&(company_id, id))
            .filter(|item| item.invoice_id() == invoice_id)
            .cloned()
    }

    fn line_items(&self, company_id: CompanyId, invoice_id: InvoiceId) -> Vec<LineItem> {
        let mut out: Vec<LineItem> = self
            .line_items
            .iter()
            .filter(|((c, _), item)| *c == company_id && item.invoice_id() == invoice_id)
            .map(|(_, v)| v.clone())
            .collect();
        out.sort_by_key(|item| (item.line_no(), item.id_typed()));
        out
    }

    fn put_line_item(&mut self, company_id: CompanyId, item: LineItem) -> Result<(), StoreError> {
        self.ensure_company(company_id)?;
        Self::ensure_owner(company_id, &item)?;
        if !self.invoices.contains_key(&(company_id, item.invoice_id())) {
            return Err(StoreError::ReferentialIntegrity(
                "line item references an unknown invoice".to_string(),
            ));
        }
        if !self.products.contains_key(&(company_id, item.product_id())) {
            return Err(StoreError::ReferentialIntegrity(
                "line item references an unknown product".to_string(),
            ));
        }
        self.set_line_item((company_id, item.id_typed()), Some(item));
        Ok(())
    }

    fn delete_line_item(
        &mut self,
        company_id: CompanyId,
        invoice_id: InvoiceId,
        id: LineItemId,
    ) -> Result<(), StoreError> {
        match self.line_items.get(&(company_id, id)) {
            Some(item) if item.invoice_id() == invoice_id => {
                self.set_line_item((company_id, id), None);
                Ok(())
            }
            _ => Err(StoreError::NotFound),
        }
    }
}
