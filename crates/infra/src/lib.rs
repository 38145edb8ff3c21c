//! `orderflow-infra` — persistence and workflow orchestration.
//!
//! [`WorkflowCoordinator`] ties the domain crates together: it runs each
//! lifecycle operation against a [`StateStore`], captures audit events for
//! the touched records, and commits state and history atomically.

pub mod coordinator;
pub mod store;


pub use coordinator::{Cancellation, FulfillmentPolicy, WorkflowConfig, WorkflowCoordinator};
pub use store::{Commit, InMemoryStateStore, RecordWrite, StateStore, StoreError};
