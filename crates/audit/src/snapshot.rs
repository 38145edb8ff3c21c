use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value as JsonValue;

use orderflow_core::Entity;
use orderflow_events::ResourceRef;

/// Point-in-time values of an entity's audited fields, keyed by field name.
///
/// Values are stored as JSON so the trail can diff fields of any type with
/// one comparison.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldSnapshot {
    fields: BTreeMap<&'static str, JsonValue>,
}

impl FieldSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one field. A value that fails to serialize is captured as JSON
    /// null rather than poisoning the whole snapshot.
    pub fn with(mut self, field: &'static str, value: impl Serialize) -> Self {
        let value = serde_json::to_value(value).unwrap_or(JsonValue::Null);
        self.fields.insert(field, value);
        self
    }

    /// The captured value, or `None` if the field was never captured.
    pub fn get(&self, field: &str) -> Option<&JsonValue> {
        self.fields.get(field)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Entities whose field changes are recorded in the audit trail.
pub trait Auditable: Entity {
    /// Where events about this entity point.
    fn resource_ref(&self) -> ResourceRef;

    /// Current values of every field the trail may track for this entity.
    fn snapshot(&self) -> FieldSnapshot;
}
