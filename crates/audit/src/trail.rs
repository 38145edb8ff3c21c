use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde_json::{Value as JsonValue, json};

use orderflow_core::{AccountId, Entity, EntityKind};
use orderflow_events::AccountEvent;

use crate::{Auditable, FieldSnapshot};

/// Which fields are audited, per entity kind.
///
/// Defaults track the fields operators ask about when reconstructing history:
/// order `status`/`total_amount`/`notes`, invoice `status`, fulfillment
/// `status`/`tracking_number`, customer `email`/`phone`. Kinds without an
/// entry produce no change events.
#[derive(Debug, Clone)]
pub struct TrackedFields {
    fields: HashMap<EntityKind, Vec<&'static str>>,
}

impl Default for TrackedFields {
    fn default() -> Self {
        let mut fields = HashMap::new();
        fields.insert(EntityKind::Order, vec!["status", "total_amount", "notes"]);
        fields.insert(EntityKind::Invoice, vec!["status"]);
        fields.insert(EntityKind::Fulfillment, vec!["status", "tracking_number"]);
        fields.insert(EntityKind::Customer, vec!["email", "phone"]);
        Self { fields }
    }
}

impl TrackedFields {
    /// Empty configuration: nothing is audited until `track` adds entries.
    pub fn none() -> Self {
        Self {
            fields: HashMap::new(),
        }
    }

    pub fn tracked(&self, kind: EntityKind) -> &[&'static str] {
        self.fields.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Replace the tracked field list for one kind.
    pub fn track(mut self, kind: EntityKind, fields: Vec<&'static str>) -> Self {
        self.fields.insert(kind, fields);
        self
    }
}

/// Computes per-field change events by diffing entity snapshots.
///
/// The trail itself is stateless; callers hand the resulting events to the
/// store together with the entity write so history and state land atomically.
#[derive(Debug, Clone, Default)]
pub struct AuditTrail {
    tracked: TrackedFields,
}

impl AuditTrail {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tracked(tracked: TrackedFields) -> Self {
        Self { tracked }
    }

    pub fn tracked(&self) -> &TrackedFields {
        &self.tracked
    }

    /// Diff `before` against the entity's current snapshot and emit one
    /// `<kind>.<field>.changed` event per tracked field whose value moved.
    ///
    /// A field absent from a snapshot diffs as JSON null. Events come out in
    /// field-name order regardless of how the tracked list was configured,
    /// all stamped with the same `at`.
    pub fn capture<E: Auditable>(
        &self,
        account_id: AccountId,
        entity: &E,
        before: &FieldSnapshot,
        at: DateTime<Utc>,
    ) -> Vec<AccountEvent> {
        let after = entity.snapshot();
        let mut fields: Vec<&'static str> = self.tracked.tracked(E::KIND).to_vec();
        fields.sort_unstable();
        fields.dedup();

        let mut events = Vec::new();
        for field in fields {
            let old_value = before.get(field).cloned().unwrap_or(JsonValue::Null);
            let new_value = after.get(field).cloned().unwrap_or(JsonValue::Null);
            if old_value == new_value {
                continue;
            }
            events.push(AccountEvent::new(
                account_id,
                entity.resource_ref(),
                format!("{}.{}.changed", E::KIND, field),
                json!({
                    "field": field,
                    "old_value": old_value,
                    "new_value": new_value,
                }),
                at,
            ));
        }
        events
    }
}
