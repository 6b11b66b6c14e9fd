//! Products domain module.
//!
//! Sellable items/services with a default unit price and VAT rate, used as the
//! pricing source for invoice line items. Pure domain logic (no IO).

pub mod product;
pub mod vat;

pub use product::{
    NewProduct, PRICE_DECIMAL_PLACES, PRICE_MAX_DIGITS, Product, ProductChanges, ProductId,
    UnitPrice,
};
pub use vat::{DEFAULT_VAT, VAT_DECIMAL_PLACES, VAT_MAX_DIGITS, VatRate};
