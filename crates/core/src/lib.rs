//! `facturas-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! identifiers, the domain error model, and exact-decimal money helpers.

pub mod entity;
pub mod error;
pub mod id;
pub mod money;
pub mod value_object;

pub use entity::{Entity, TenantOwned};
pub use error::{DomainError, DomainResult};
pub use id::{CompanyId, EntityId};
pub use money::{
    DecimalError, DecimalInput, MONEY_SCALE, check_bounds, parse_decimal, parse_non_negative,
    to_money_scale, to_scale,
};
pub use value_object::ValueObject;
