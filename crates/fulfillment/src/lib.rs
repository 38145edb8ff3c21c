//! `orderflow-fulfillment` — fulfillment services and shipments.

pub mod fulfillment;
pub mod service;

pub use fulfillment::{Fulfillment, FulfillmentStatus};
pub use service::FulfillmentService;
