//! Demo data for freshly registered companies.

use chrono::Utc;
use tracing::{info, instrument};

use facturas_core::{CompanyId, DecimalInput};
use facturas_parties::{Client, ClientId, NewClient};
use facturas_products::{NewProduct, Product, ProductId};

use crate::service::{InvoicingService, ServiceError};
use crate::store::{InvoicingStore, StoreTx};

/// What a bootstrap run created (`None` where the company already had data).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BootstrapReport {
    pub client_id: Option<ClientId>,
    pub product_id: Option<ProductId>,
}

fn demo_client() -> NewClient {
    NewClient {
        name: "Cliente Demo".to_string(),
        email: "cliente@demo.com".to_string(),
        phone_number: "0000000000".to_string(),
        address: "Dirección del cliente".to_string(),
        tax_identification_number: "987654321".to_string(),
    }
}

fn demo_product() -> NewProduct {
    NewProduct {
        name: "Producto Demo".to_string(),
        description: "Producto de prueba".to_string(),
        unit_price: DecimalInput::from("100.00"),
        vat_percentage: Some(DecimalInput::from("19.00")),
    }
}

impl<S: InvoicingStore> InvoicingService<S> {
    /// Seed a demo client and a demo product for a company that has none.
    ///
    /// Each is created only if the company has no client (resp. product) yet,
    /// so running it again changes nothing.
    #[instrument(skip(self), fields(company_id = %company_id), err)]
    pub fn bootstrap_company_defaults(
        &self,
        company_id: CompanyId,
    ) -> Result<BootstrapReport, ServiceError> {
        let now = Utc::now();
        let report = self.store.write::<_, ServiceError, _>(|tx| {
            tx.company(company_id).ok_or(ServiceError::NotFound)?;
            let mut report = BootstrapReport::default();

            if tx.clients(company_id).is_empty() {
                let client = Client::register(company_id, ClientId::new(), demo_client(), now)?;
                report.client_id = Some(client.id_typed());
                tx.put_client(company_id, client)?;
            }
            if tx.products(company_id).is_empty() {
                let product =
                    Product::create(company_id, ProductId::new(), demo_product(), now)?;
                report.product_id = Some(product.id_typed());
                tx.put_product(company_id, product)?;
            }
            Ok(report)
        })?;

        info!(
            client_created = report.client_id.is_some(),
            product_created = report.product_id.is_some(),
            "company bootstrap finished"
        );
        Ok(report)
    }
}
