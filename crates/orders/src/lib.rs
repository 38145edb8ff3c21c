//! `orderflow-orders` — the order aggregate and its drafts.

pub mod order;

pub use order::{LineDraft, Order, OrderDraft, OrderLine, OrderStatus};
