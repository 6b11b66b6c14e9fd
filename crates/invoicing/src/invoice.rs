use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use facturas_core::{CompanyId, DomainError, DomainResult, Entity, TenantOwned};
use facturas_parties::{Client, ClientId};

use crate::totals::InvoiceTotals;

facturas_core::entity_id!(
    /// Invoice identifier (tenant-scoped via `company_id`).
    InvoiceId,
    "InvoiceId"
);

/// Maximum length of the free-form invoice number.
pub const NUMBER_MAX_LEN: usize = 64;

/// Partial update of invoice header fields; `None` leaves the field unchanged.
///
/// An empty `number` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceChanges {
    pub client_id: Option<ClientId>,
    pub notes: Option<String>,
    pub number: Option<String>,
}

/// Invoice header.
///
/// The monetary fields are a cached projection of the line items and are only
/// ever replaced wholesale through [`Invoice::with_totals`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    id: InvoiceId,
    company_id: CompanyId,
    client_id: ClientId,
    invoice_date: NaiveDate,
    notes: String,
    number: Option<String>,
    totals: InvoiceTotals,
    created_at: DateTime<Utc>,
}

impl Invoice {
    /// Open an empty invoice for `client`, dated `now`.
    pub fn open(
        company_id: CompanyId,
        id: InvoiceId,
        client: &Client,
        notes: String,
        number: Option<&str>,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        ensure_client(company_id, client)?;
        Ok(Self {
            id,
            company_id,
            client_id: client.id_typed(),
            invoice_date: now.date_naive(),
            notes,
            number: validated_number(number)?,
            totals: InvoiceTotals::zero(),
            created_at: now,
        })
    }

    pub fn id_typed(&self) -> InvoiceId {
        self.id
    }

    pub fn client_id(&self) -> ClientId {
        self.client_id
    }

    pub fn invoice_date(&self) -> NaiveDate {
        self.invoice_date
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }

    pub fn number(&self) -> Option<&str> {
        self.number.as_deref()
    }

    pub fn totals(&self) -> InvoiceTotals {
        self.totals
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn belongs_to(&self, company_id: CompanyId) -> bool {
        self.company_id == company_id
    }

    /// Replace the cached totals with a freshly computed set.
    pub fn with_totals(&self, totals: InvoiceTotals) -> Self {
        Self {
            totals,
            ..self.clone()
        }
    }

    /// Point the invoice at another client of the same company.
    pub fn reassign_client(&self, client: &Client) -> DomainResult<Self> {
        ensure_client(self.company_id, client)?;
        Ok(Self {
            client_id: client.id_typed(),
            ..self.clone()
        })
    }

    /// Apply note/number edits. Client reassignment goes through
    /// [`Invoice::reassign_client`] since it needs the resolved client.
    pub fn revise(&self, notes: Option<String>, number: Option<&str>) -> DomainResult<Self> {
        let mut next = self.clone();
        if let Some(notes) = notes {
            next.notes = notes;
        }
        if number.is_some() {
            next.number = validated_number(number)?;
        }
        Ok(next)
    }
}

impl Entity for Invoice {
    type Id = InvoiceId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl TenantOwned for Invoice {
    fn company_id(&self) -> CompanyId {
        self.company_id
    }
}

fn ensure_client(company_id: CompanyId, client: &Client) -> DomainResult<()> {
    if !client.belongs_to(company_id) {
        return Err(DomainError::validation("client_id: client not owned by tenant"));
    }
    Ok(())
}

fn validated_number(raw: Option<&str>) -> DomainResult<Option<String>> {
    let Some(number) = raw.map(str::trim).filter(|n| !n.is_empty()) else {
        return Ok(None);
    };
    if number.chars().count() > NUMBER_MAX_LEN {
        return Err(DomainError::validation(format!(
            "number: ensure this field has no more than {NUMBER_MAX_LEN} characters"
        )));
    }
    Ok(Some(number.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use facturas_parties::NewClient;

    fn client_of(company_id: CompanyId) -> Client {
        let data = NewClient {
            name: "Cliente Demo".to_string(),
            ..NewClient::default()
        };
        Client::register(company_id, ClientId::new(), data, Utc::now()).unwrap()
    }

    #[test]
    fn opens_with_zero_totals_and_server_date() {
        let company = CompanyId::new();
        let now = Utc::now();
        let invoice = Invoice::open(
            company,
            InvoiceId::new(),
            &client_of(company),
            "Pago a 30 días".to_string(),
            Some(" F-001 "),
            now,
        )
        .unwrap();

        assert_eq!(invoice.totals(), InvoiceTotals::zero());
        assert_eq!(invoice.invoice_date(), now.date_naive());
        assert_eq!(invoice.number(), Some("F-001"));
    }

    #[test]
    fn rejects_client_of_another_company() {
        let err = Invoice::open(
            CompanyId::new(),
            InvoiceId::new(),
            &client_of(CompanyId::new()),
            String::new(),
            None,
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::Validation(msg) if msg.contains("not owned")));
    }

    #[test]
    fn number_is_bounded_and_clearable() {
        let company = CompanyId::new();
        let invoice = Invoice::open(
            company,
            InvoiceId::new(),
            &client_of(company),
            String::new(),
            Some("A-1"),
            Utc::now(),
        )
        .unwrap();

        let too_long = "9".repeat(NUMBER_MAX_LEN + 1);
        assert!(invoice.revise(None, Some(&too_long)).is_err());

        let cleared = invoice.revise(Some("nota".to_string()), Some("")).unwrap();
        assert_eq!(cleared.number(), None);
        assert_eq!(cleared.notes(), "nota");

        let untouched = invoice.revise(None, None).unwrap();
        assert_eq!(untouched.number(), Some("A-1"));
    }

    #[test]
    fn reassignment_stays_within_the_company() {
        let company = CompanyId::new();
        let invoice = Invoice::open(
            company,
            InvoiceId::new(),
            &client_of(company),
            String::new(),
            None,
            Utc::now(),
        )
        .unwrap();

        let other = client_of(company);
        assert_eq!(invoice.reassign_client(&other).unwrap().client_id(), other.id_typed());
        assert!(invoice.reassign_client(&client_of(CompanyId::new())).is_err());
    }
}
