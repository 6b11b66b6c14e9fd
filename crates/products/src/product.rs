use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use facturas_core::{
    CompanyId, DecimalError, DecimalInput, DomainError, DomainResult, Entity, TenantOwned,
    ValueObject, check_bounds, parse_non_negative, to_money_scale,
};

use crate::vat::{DEFAULT_VAT, VatRate};

pub const PRICE_MAX_DIGITS: u32 = 12;
pub const PRICE_DECIMAL_PLACES: u32 = 2;

facturas_core::entity_id!(
    /// Product identifier (tenant-scoped via `company_id`).
    ProductId,
    "ProductId"
);

/// Unit price: non-negative, at most 12 digits with 2 decimals.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitPrice(Decimal);

impl UnitPrice {
    pub fn new(amount: Decimal) -> Result<Self, DecimalError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(DecimalError::Negative);
        }
        check_bounds(amount, PRICE_MAX_DIGITS, PRICE_DECIMAL_PLACES)?;
        Ok(Self(to_money_scale(amount)))
    }

    pub fn parse(input: &DecimalInput) -> Result<Self, DecimalError> {
        let amount = parse_non_negative(input, PRICE_MAX_DIGITS, PRICE_DECIMAL_PLACES)?;
        Ok(Self(amount))
    }

    pub fn amount(&self) -> Decimal {
        self.0
    }
}

impl core::fmt::Display for UnitPrice {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl ValueObject for UnitPrice {}

/// Data for creating a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub unit_price: DecimalInput,
    #[serde(default)]
    pub vat_percentage: Option<DecimalInput>,
}

/// Partial update; `None` leaves the field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub unit_price: Option<DecimalInput>,
    pub vat_percentage: Option<DecimalInput>,
}

/// A sellable item or service with a default price and VAT rate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    id: ProductId,
    company_id: CompanyId,
    name: String,
    description: String,
    unit_price: UnitPrice,
    vat_percentage: Option<VatRate>,
    created_at: DateTime<Utc>,
}

impl Product {
    pub fn create(
        company_id: CompanyId,
        id: ProductId,
        data: NewProduct,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let name = validated_name(&data.name)?;
        let unit_price = UnitPrice::parse(&data.unit_price).map_err(|e| field_error("unit_price", e))?;
        let vat_percentage = data
            .vat_percentage
            .as_ref()
            .map(|raw| VatRate::parse(raw).map_err(|e| field_error("vat_percentage", e)))
            .transpose()?;

        Ok(Self {
            id,
            company_id,
            name,
            description: data.description,
            unit_price,
            vat_percentage,
            created_at: now,
        })
    }

    /// Apply a partial update, returning the new state.
    ///
    /// Line items already issued keep the price and VAT they copied at creation.
    pub fn update(&self, changes: ProductChanges) -> DomainResult<Self> {
        let mut next = self.clone();
        if let Some(name) = changes.name {
            next.name = validated_name(&name)?;
        }
        if let Some(description) = changes.description {
            next.description = description;
        }
        if let Some(raw) = changes.unit_price {
            next.unit_price = UnitPrice::parse(&raw).map_err(|e| field_error("unit_price", e))?;
        }
        if let Some(raw) = changes.vat_percentage {
            next.vat_percentage =
                Some(VatRate::parse(&raw).map_err(|e| field_error("vat_percentage", e))?);
        }
        Ok(next)
    }

    pub fn id_typed(&self) -> ProductId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn unit_price(&self) -> UnitPrice {
        self.unit_price
    }

    /// The VAT explicitly configured on the product, if any.
    pub fn vat_percentage(&self) -> Option<VatRate> {
        self.vat_percentage
    }

    /// The product's VAT, or [`DEFAULT_VAT`] when none is configured.
    pub fn effective_vat(&self) -> VatRate {
        self.vat_percentage.unwrap_or(DEFAULT_VAT)
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn belongs_to(&self, company_id: CompanyId) -> bool {
        self.company_id == company_id
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl TenantOwned for Product {
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

fn field_error(field: &str, err: DecimalError) -> DomainError {
    DomainError::validation(format!("{field}: {err}"))
}
