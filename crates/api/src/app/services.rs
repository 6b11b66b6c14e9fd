use std::sync::Arc;

use facturas_infra::{InMemoryStore, InvoicingService};

/// Services shared by every handler.
pub type AppServices = InvoicingService<Arc<InMemoryStore>>;

pub fn build_services() -> AppServices {
    InvoicingService::new(Arc::new(InMemoryStore::new()))
}
