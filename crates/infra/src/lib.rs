//! Infrastructure layer: transactional storage, service orchestration,
//! company bootstrap and configuration.

pub mod bootstrap;
pub mod config;
pub mod service;
pub mod store;


pub use bootstrap::BootstrapReport;
pub use config::{AppConfig, ConfigError};
pub use service::{InvoiceDetail, InvoicingService, ServiceError};
pub use store::{InMemoryStore, InvoicingStore, StoreError, StoreTx};
