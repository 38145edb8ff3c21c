//! Entity traits: identity, persistence version, and status lifecycle.

use serde::{Deserialize, Serialize};

/// The kinds of record the system persists.
///
/// Declaration order is the canonical write order inside a commit; keep new
/// variants in dependency order (owners before dependents).
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Account,
    Customer,
    Order,
    Invoice,
    FulfillmentService,
    Fulfillment,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Account => "account",
            EntityKind::Customer => "customer",
            EntityKind::Order => "order",
            EntityKind::Invoice => "invoice",
            EntityKind::FulfillmentService => "fulfillment_service",
            EntityKind::Fulfillment => "fulfillment",
        }
    }
}

impl core::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Entity marker + minimal persistence interface.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Copy + Eq + core::hash::Hash + core::fmt::Debug;

    /// Which table this entity lives in.
    const KIND: EntityKind;

    /// Returns the entity identifier.
    fn id(&self) -> Self::Id;

    /// Persistence version. Zero means the entity has never been stored.
    fn version(&self) -> u64;

    /// Overwrite the persistence version. Called by the store on commit.
    fn set_version(&mut self, version: u64);
}

/// Entities that move through a status workflow.
///
/// `set_status` applies the change verbatim; legality is checked by the
/// transition tables, not here.
pub trait Lifecycle {
    type Status: Copy + Eq + core::fmt::Debug;

    fn status(&self) -> Self::Status;

    fn set_status(&mut self, status: Self::Status);
}
