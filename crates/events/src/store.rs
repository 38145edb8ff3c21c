use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;

use orderflow_core::{AccountId, DomainError};

use crate::{AccountEvent, ResourceRef};

/// Criteria for querying an account's events.
///
/// All fields are conjunctive; an empty filter matches every event. Both time
/// bounds are strict (events exactly at the bound are excluded).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventFilter {
    /// Exact event type, e.g. `order.status.changed`.
    pub event_type: Option<String>,
    /// Only events about this record.
    pub resource: Option<ResourceRef>,
    /// Only events created strictly after this instant.
    pub created_after: Option<DateTime<Utc>>,
    /// Only events created strictly before this instant.
    pub created_before: Option<DateTime<Utc>>,
}

impl EventFilter {
    pub fn matches(&self, event: &AccountEvent) -> bool {
        if let Some(event_type) = &self.event_type {
            if event.event_type() != event_type {
                return false;
            }
        }
        if let Some(resource) = self.resource {
            if event.resource() != resource {
                return false;
            }
        }
        if let Some(after) = self.created_after {
            if event.created_at() <= after {
                return false;
            }
        }
        if let Some(before) = self.created_before {
            if event.created_at() >= before {
                return false;
            }
        }
        true
    }
}

/// Event store operation error.
///
/// These are infrastructure errors (isolation, storage) as opposed to domain
/// errors (validation, invariants).
#[derive(Debug, Error)]
pub enum EventStoreError {
    #[error("account isolation violation: {0}")]
    AccountIsolation(String),

    #[error("event store backend error: {0}")]
    Backend(String),
}

/// `Backend` failures map to [`DomainError::ConcurrencyConflict`] with a
/// `backend: ` message prefix; commit races arrive on that variant without one.
impl From<EventStoreError> for DomainError {
    fn from(err: EventStoreError) -> Self {
        match err {
            EventStoreError::AccountIsolation(msg) => DomainError::Validation(msg),
            EventStoreError::Backend(msg) => {
                DomainError::ConcurrencyConflict(format!("backend: {msg}"))
            }
        }
    }
}

/// Append-only, account-scoped event store.
///
/// Implementations must:
/// - enforce account isolation on both read and write (a batch may not mix
///   accounts, and queries never return another account's events)
/// - persist a batch atomically (all events or none)
/// - never modify or delete previously appended events
pub trait EventStore: Send + Sync {
    /// Append a batch of events. An empty batch is a no-op.
    fn append(&self, events: Vec<AccountEvent>) -> Result<(), EventStoreError>;

    /// Query one account's events, most recent first.
    fn events(
        &self,
        account_id: AccountId,
        filter: &EventFilter,
    ) -> Result<Vec<AccountEvent>, EventStoreError>;
}

impl<S> EventStore for Arc<S>
where
    S: EventStore + ?Sized,
{
    fn append(&self, events: Vec<AccountEvent>) -> Result<(), EventStoreError> {
        (**self).append(events)
    }

    fn events(
        &self,
        account_id: AccountId,
        filter: &EventFilter,
    ) -> Result<Vec<AccountEvent>, EventStoreError> {
        (**self).events(account_id, filter)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use orderflow_core::OrderId;

    use super::*;

    fn event_at(account_id: AccountId, event_type: &str, at: DateTime<Utc>) -> AccountEvent {
        AccountEvent::new(
            account_id,
            ResourceRef::Order(OrderId::new()),
            event_type,
            serde_json::json!({}),
            at,
        )
    }

    #[test]
    fn empty_filter_matches_everything() {
        let account_id = AccountId::new();
        let event = event_at(account_id, "order.created", Utc::now());

        assert!(EventFilter::default().matches(&event));
    }

    #[test]
    fn event_type_filter_requires_exact_match() {
        let account_id = AccountId::new();
        let event = event_at(account_id, "order.status.changed", Utc::now());

        let mut filter = EventFilter::default();
        filter.event_type = Some("order.status.changed".to_string());
        assert!(filter.matches(&event));

        filter.event_type = Some("order.status".to_string());
        assert!(!filter.matches(&event));
    }

    #[test]
    fn resource_filter_distinguishes_records_of_the_same_kind() {
        let account_id = AccountId::new();
        let order_id = OrderId::new();
        let event = AccountEvent::new(
            account_id,
            ResourceRef::Order(order_id),
            "order.created",
            serde_json::json!({}),
            Utc::now(),
        );

        let mut filter = EventFilter::default();
        filter.resource = Some(ResourceRef::Order(order_id));
        assert!(filter.matches(&event));

        filter.resource = Some(ResourceRef::Order(OrderId::new()));
        assert!(!filter.matches(&event));
    }

    #[test]
    fn time_bounds_are_strict() {
        let account_id = AccountId::new();
        let at = Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();
        let event = event_at(account_id, "order.created", at);

        let mut filter = EventFilter::default();
        filter.created_after = Some(at);
        assert!(!filter.matches(&event), "created_after bound is exclusive");

        filter.created_after = Some(at - chrono::Duration::seconds(1));
        assert!(filter.matches(&event));

        let mut filter = EventFilter::default();
        filter.created_before = Some(at);
        assert!(!filter.matches(&event), "created_before bound is exclusive");

        filter.created_before = Some(at + chrono::Duration::seconds(1));
        assert!(filter.matches(&event));
    }

    #[test]
    fn backend_errors_convert_with_a_prefix() {
        let err = DomainError::from(EventStoreError::Backend("lock poisoned".to_string()));
        assert_eq!(
            err,
            DomainError::ConcurrencyConflict("backend: lock poisoned".to_string())
        );

        let err = DomainError::from(EventStoreError::AccountIsolation("mixed batch".to_string()));
        assert_eq!(err, DomainError::Validation("mixed batch".to_string()));
    }
}
