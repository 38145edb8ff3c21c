use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use orderflow_core::AccountId;

use crate::ResourceRef;

/// One immutable history record, scoped to an account.
///
/// Events are append-only: once written they are never updated or deleted.
/// `event_type` is dot-separated (`order.status.changed`, `order.cancelled`)
/// and `payload` carries the type-specific details as JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountEvent {
    event_id: Uuid,
    account_id: AccountId,
    resource: ResourceRef,
    event_type: String,
    payload: JsonValue,
    created_at: DateTime<Utc>,
}

impl AccountEvent {
    /// Build an event. `created_at` is passed in rather than sampled here so
    /// every event raised by one operation carries the same instant.
    pub fn new(
        account_id: AccountId,
        resource: ResourceRef,
        event_type: impl Into<String>,
        payload: JsonValue,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            event_id: Uuid::now_v7(),
            account_id,
            resource,
            event_type: event_type.into(),
            payload,
            created_at,
        }
    }

    pub fn event_id(&self) -> Uuid {
        self.event_id
    }

    pub fn account_id(&self) -> AccountId {
        self.account_id
    }

    pub fn resource(&self) -> ResourceRef {
        self.resource
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    pub fn payload(&self) -> &JsonValue {
        &self.payload
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
