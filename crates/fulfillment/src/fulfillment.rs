use chrono::{DateTime, Utc};
use core::str::FromStr;
use serde::{Deserialize, Serialize};

use orderflow_audit::{Auditable, FieldSnapshot};
use orderflow_core::{
    AccountId, DomainError, DomainResult, Entity, EntityKind, FulfillmentId,
    FulfillmentServiceId, Lifecycle,
};
use orderflow_events::ResourceRef;

/// Fulfillment status lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FulfillmentStatus {
    Pending,
    Processing,
    Shipped,
    Delivered,
}

impl FulfillmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FulfillmentStatus::Pending => "pending",
            FulfillmentStatus::Processing => "processing",
            FulfillmentStatus::Shipped => "shipped",
            FulfillmentStatus::Delivered => "delivered",
        }
    }
}

impl core::fmt::Display for FulfillmentStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FulfillmentStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(FulfillmentStatus::Pending),
            "processing" => Ok(FulfillmentStatus::Processing),
            "shipped" => Ok(FulfillmentStatus::Shipped),
            "delivered" => Ok(FulfillmentStatus::Delivered),
            other => Err(DomainError::validation(format!(
                "unknown fulfillment status: {other}"
            ))),
        }
    }
}

/// One shipment for an order, handled by a fulfillment service.
///
/// The owning order carries the link (`Order::fulfillment_id`); the
/// fulfillment itself only knows which service runs it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fulfillment {
    id: FulfillmentId,
    account_id: AccountId,
    fulfillment_service_id: FulfillmentServiceId,
    status: FulfillmentStatus,
    tracking_number: Option<String>,
    carrier: Option<String>,
    shipped_at: Option<DateTime<Utc>>,
    delivered_at: Option<DateTime<Utc>>,
    version: u64,
}

impl Fulfillment {
    pub fn new(account_id: AccountId, fulfillment_service_id: FulfillmentServiceId) -> Self {
        Self {
            id: FulfillmentId::new(),
            account_id,
            fulfillment_service_id,
            status: FulfillmentStatus::Pending,
            tracking_number: None,
            carrier: None,
            shipped_at: None,
            delivered_at: None,
            version: 0,
        }
    }

    pub fn account_id(&self) -> AccountId {
        self.account_id
    }

    pub fn fulfillment_service_id(&self) -> FulfillmentServiceId {
        self.fulfillment_service_id
    }

    pub fn tracking_number(&self) -> Option<&str> {
        self.tracking_number.as_deref()
    }

    pub fn carrier(&self) -> Option<&str> {
        self.carrier.as_deref()
    }

    pub fn shipped_at(&self) -> Option<DateTime<Utc>> {
        self.shipped_at
    }

    pub fn delivered_at(&self) -> Option<DateTime<Utc>> {
        self.delivered_at
    }

    /// Stamp the shipment details. Paired with the transition to `shipped`
    /// by the workflow; a failed call leaves the fulfillment untouched.
    pub fn record_shipment(
        &mut self,
        tracking_number: impl Into<String>,
        carrier: impl Into<String>,
        shipped_at: DateTime<Utc>,
    ) -> DomainResult<()> {
        let tracking_number = tracking_number.into();
        if tracking_number.trim().is_empty() {
            return Err(DomainError::validation("tracking number cannot be empty"));
        }
        let carrier = carrier.into();
        if carrier.trim().is_empty() {
            return Err(DomainError::validation("carrier cannot be empty"));
        }

        self.tracking_number = Some(tracking_number);
        self.carrier = Some(carrier);
        self.shipped_at = Some(shipped_at);
        Ok(())
    }

    /// Stamp the delivery time. Paired with the transition to `delivered`.
    pub fn record_delivery(&mut self, delivered_at: DateTime<Utc>) {
        self.delivered_at = Some(delivered_at);
    }
}

impl Entity for Fulfillment {
    type Id = FulfillmentId;
    const KIND: EntityKind = EntityKind::Fulfillment;

    fn id(&self) -> FulfillmentId {
        self.id
    }

    fn version(&self) -> u64 {
        self.version
    }

    fn set_version(&mut self, version: u64) {
        self.version = version;
    }
}

impl Lifecycle for Fulfillment {
    type Status = FulfillmentStatus;

    fn status(&self) -> FulfillmentStatus {
        self.status
    }

    fn set_status(&mut self, status: FulfillmentStatus) {
        self.status = status;
    }
}

impl Auditable for Fulfillment {
    fn resource_ref(&self) -> ResourceRef {
        ResourceRef::Fulfillment(self.id)
    }

    fn snapshot(&self) -> FieldSnapshot {
        FieldSnapshot::new()
            .with("status", self.status)
            .with("tracking_number", &self.tracking_number)
            .with("carrier", &self.carrier)
    }
}
