use serde::{Deserialize, Serialize};
use uuid::Uuid;

use orderflow_core::{
    AccountId, CustomerId, EntityKind, FulfillmentId, FulfillmentServiceId, InvoiceId, OrderId,
};

/// Reference to the record an event is about.
///
/// Serializes as `{"kind": "order", "id": "<uuid>"}` so consumers can dispatch
/// on kind without knowing every identifier type.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum ResourceRef {
    Account(AccountId),
    Customer(CustomerId),
    Order(OrderId),
    Invoice(InvoiceId),
    FulfillmentService(FulfillmentServiceId),
    Fulfillment(FulfillmentId),
}

impl ResourceRef {
    pub fn kind(&self) -> EntityKind {
        match self {
            ResourceRef::Account(_) => EntityKind::Account,
            ResourceRef::Customer(_) => EntityKind::Customer,
            ResourceRef::Order(_) => EntityKind::Order,
            ResourceRef::Invoice(_) => EntityKind::Invoice,
            ResourceRef::FulfillmentService(_) => EntityKind::FulfillmentService,
            ResourceRef::Fulfillment(_) => EntityKind::Fulfillment,
        }
    }

    pub fn id(&self) -> Uuid {
        match self {
            ResourceRef::Account(id) => Uuid::from(*id),
            ResourceRef::Customer(id) => Uuid::from(*id),
            ResourceRef::Order(id) => Uuid::from(*id),
            ResourceRef::Invoice(id) => Uuid::from(*id),
            ResourceRef::FulfillmentService(id) => Uuid::from(*id),
            ResourceRef::Fulfillment(id) => Uuid::from(*id),
        }
    }
}

impl core::fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}/{}", self.kind(), self.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_as_tagged_kind_and_id() {
        let order_id = OrderId::new();
        let resource = ResourceRef::Order(order_id);

        let json = serde_json::to_value(resource).expect("serialization should succeed");

        assert_eq!(
            json,
            serde_json::json!({ "kind": "order", "id": order_id.to_string() })
        );
    }

    #[test]
    fn kind_and_id_track_the_wrapped_identifier() {
        let invoice_id = InvoiceId::new();
        let resource = ResourceRef::Invoice(invoice_id);

        assert_eq!(resource.kind(), EntityKind::Invoice);
        assert_eq!(resource.id(), Uuid::from(invoice_id));
        assert_eq!(resource.to_string(), format!("invoice/{invoice_id}"));
    }
}
