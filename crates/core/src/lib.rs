//! `orderflow-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod entity;
pub mod error;
pub mod id;
pub mod money;
pub mod reference;

pub use entity::{Entity, EntityKind, Lifecycle};
pub use error::{DomainError, DomainResult};
pub use id::{
    AccountId, CustomerId, FulfillmentId, FulfillmentServiceId, InvoiceId, LineId, OrderId,
};
pub use money::{apply_rate, line_total, round_money};
pub use reference::{ReferenceConfig, ReferenceGenerator};
