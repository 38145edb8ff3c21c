//! Versioned record storage.
//!
//! [`StateStore`] is the persistence seam: reads are account-scoped, writes
//! travel in a [`Commit`] that lands atomically with the events it carries.
//! [`InMemoryStateStore`] is the reference implementation.

pub mod commit;
pub mod in_memory;
pub mod r#trait;

pub use commit::{Commit, RecordWrite};
pub use in_memory::InMemoryStateStore;
pub use r#trait::{StateStore, StoreError};
