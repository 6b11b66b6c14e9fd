//! Parties domain module.
//!
//! Companies are the tenant root; clients are the customers a company invoices.
//! Pure domain logic only (no IO, no HTTP, no storage).

pub mod client;
pub mod company;

pub use client::{Client, ClientChanges, ClientId, NewClient};
pub use company::{Company, NewCompany};
