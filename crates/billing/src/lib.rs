//! `orderflow-billing` — invoices and credit notes.

pub mod invoice;

pub use invoice::{Invoice, InvoiceKind, InvoiceStatus};
