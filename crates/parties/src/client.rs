use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use facturas_core::{CompanyId, DomainError, DomainResult, Entity, TenantOwned};

facturas_core::entity_id!(
    /// Client identifier (tenant-scoped via `company_id`).
    ClientId,
    "ClientId"
);

/// Data for registering a client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewClient {
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub tax_identification_number: String,
}

/// Partial update; `None` leaves the field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub tax_identification_number: Option<String>,
}

/// A company's customer, invoiced against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    id: ClientId,
    company_id: CompanyId,
    name: String,
    email: String,
    phone_number: String,
    address: String,
    tax_identification_number: String,
    created_at: DateTime<Utc>,
}

impl Client {
    pub fn register(
        company_id: CompanyId,
        id: ClientId,
        data: NewClient,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let name = validated_name(&data.name)?;
        Ok(Self {
            id,
            company_id,
            name,
            email: data.email.trim().to_string(),
            phone_number: data.phone_number.trim().to_string(),
            address: data.address,
            tax_identification_number: data.tax_identification_number.trim().to_string(),
            created_at: now,
        })
    }

    /// Apply a partial update, returning the new state.
    pub fn update(&self, changes: ClientChanges) -> DomainResult<Self> {
        let mut next = self.clone();
        if let Some(name) = changes.name {
            next.name = validated_name(&name)?;
        }
        if let Some(email) = changes.email {
            next.email = email.trim().to_string();
        }
        if let Some(phone) = changes.phone_number {
            next.phone_number = phone.trim().to_string();
        }
        if let Some(address) = changes.address {
            next.address = address;
        }
        if let Some(tin) = changes.tax_identification_number {
            next.tax_identification_number = tin.trim().to_string();
        }
        Ok(next)
    }

    pub fn id_typed(&self) -> ClientId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn phone_number(&self) -> &str {
        &self.phone_number
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn tax_identification_number(&self) -> &str {
        &self.tax_identification_number
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Whether this client may be referenced by an invoice of `company_id`.
    pub fn belongs_to(&self, company_id: CompanyId) -> bool {
        self.company_id == company_id
    }
}

impl Entity for Client {
    type Id = ClientId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl TenantOwned for Client {
    fn company_id(&self) -> CompanyId {
        self.company_id
    }
}

fn validated_name(raw: &str) -> DomainResult<String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(DomainError::validation("name cannot be empty"));
    }
    Ok(name.to_string())
}
