//! `orderflow-audit` — per-field change tracking.
//!
//! Entities expose a [`FieldSnapshot`] of their audited fields; the
//! [`AuditTrail`] diffs a before/after pair and emits one change event per
//! tracked field that moved.

pub mod snapshot;
pub mod trail;

pub use snapshot::{Auditable, FieldSnapshot};
pub use trail::{AuditTrail, TrackedFields};
