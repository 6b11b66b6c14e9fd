use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use facturas_core::{CompanyId, DomainError, DomainResult, Entity};

/// Registration data for a company.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCompany {
    pub company_name: String,
    #[serde(default)]
    pub tax_identification_number: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub website_link: String,
}

/// Tenant root: every client, product and invoice belongs to exactly one company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    id: CompanyId,
    company_name: String,
    tax_identification_number: String,
    address: String,
    phone_number: String,
    email: String,
    website_link: String,
    created_at: DateTime<Utc>,
}

impl Company {
    pub fn register(id: CompanyId, data: NewCompany, now: DateTime<Utc>) -> DomainResult<Self> {
        let company_name = data.company_name.trim().to_string();
        if company_name.is_empty() {
            return Err(DomainError::validation("company_name cannot be empty"));
        }

        Ok(Self {
            id,
            company_name,
            tax_identification_number: data.tax_identification_number.trim().to_string(),
            address: data.address,
            phone_number: data.phone_number.trim().to_string(),
            email: data.email.trim().to_string(),
            website_link: data.website_link.trim().to_string(),
            created_at: now,
        })
    }

    pub fn id_typed(&self) -> CompanyId {
        self.id
    }

    pub fn company_name(&self) -> &str {
        &self.company_name
    }

    pub fn tax_identification_number(&self) -> &str {
        &self.tax_identification_number
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn phone_number(&self) -> &str {
        &self.phone_number
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn website_link(&self) -> &str {
        &self.website_link
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl Entity for Company {
    type Id = CompanyId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_trims_name() {
        let company = Company::register(
            CompanyId::new(),
            NewCompany {
                company_name: "  Acme SAS ".to_string(),
                ..NewCompany::default()
            },
            Utc::now(),
        )
        .unwrap();
        assert_eq!(company.company_name(), "Acme SAS");
    }

    #[test]
    fn register_rejects_blank_name() {
        let err = Company::register(CompanyId::new(), NewCompany::default(), Utc::now()).unwrap_err();
        match err {
            DomainError::Validation(msg) => assert!(msg.contains("company_name")),
            _ => panic!("Expected Validation error for blank company name"),
        }
    }
}
