//! Invoicing domain module.
//!
//! Invoices, their line items, the total calculator, and the validation gates
//! that keep malformed items away from it. Pure, deterministic domain logic
//! (no IO, no HTTP, no storage); orchestration lives in `facturas-infra`.

pub mod admission;
pub mod creation;
pub mod invoice;
pub mod line_item;
pub mod totals;

pub use admission::{
    AdmissionError, LineItemChanges, LineItemDraft, admit_line_item, parse_quantity,
    revise_line_item,
};
pub use creation::{CreationError, InvoiceDraft, ItemError, admit_items, open_invoice};
pub use invoice::{Invoice, InvoiceChanges, InvoiceId, NUMBER_MAX_LEN};
pub use line_item::{LineItem, LineItemId, Quantity};
pub use totals::{InvoiceTotals, calculate_totals};
