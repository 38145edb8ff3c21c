//! `orderflow-events` — account-scoped event primitives.
//!
//! Defines the immutable [`AccountEvent`] record, the [`ResourceRef`] it
//! points at, and the append-only [`EventStore`] trait infra implements.

pub mod event;
pub mod resource;
pub mod store;

pub use event::AccountEvent;
pub use resource::ResourceRef;
pub use store::{EventFilter, EventStore, EventStoreError};
