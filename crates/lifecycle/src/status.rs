//! Kind-erased status handling for callers that work with raw strings
//! (API layers, stored status columns).

use core::str::FromStr;

use orderflow_billing::InvoiceStatus;
use orderflow_core::{DomainError, DomainResult, EntityKind};
use orderflow_fulfillment::FulfillmentStatus;
use orderflow_orders::OrderStatus;

use crate::StateMachine;

/// A status value paired with the workflow it belongs to.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Status {
    Order(OrderStatus),
    Invoice(InvoiceStatus),
    Fulfillment(FulfillmentStatus),
}

impl Status {
    /// Parse a raw status string against the workflow for `kind`.
    ///
    /// Kinds without a status workflow (accounts, customers, services) are a
    /// validation error, as are unknown status strings.
    pub fn parse(kind: EntityKind, value: &str) -> DomainResult<Self> {
        match kind {
            EntityKind::Order => Ok(Status::Order(OrderStatus::from_str(value)?)),
            EntityKind::Invoice => Ok(Status::Invoice(InvoiceStatus::from_str(value)?)),
            EntityKind::Fulfillment => {
                Ok(Status::Fulfillment(FulfillmentStatus::from_str(value)?))
            }
            other => Err(DomainError::validation(format!(
                "{other} has no status workflow"
            ))),
        }
    }

    pub fn kind(&self) -> EntityKind {
        match self {
            Status::Order(_) => EntityKind::Order,
            Status::Invoice(_) => EntityKind::Invoice,
            Status::Fulfillment(_) => EntityKind::Fulfillment,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Order(status) => status.as_str(),
            Status::Invoice(status) => status.as_str(),
            Status::Fulfillment(status) => status.as_str(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        match self {
            Status::Order(status) => status.is_terminal(),
            Status::Invoice(status) => status.is_terminal(),
            Status::Fulfillment(status) => status.is_terminal(),
        }
    }
}

impl core::fmt::Display for Status {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether `current -> target` is legal for `kind`, both given as strings.
///
/// Unknown statuses are errors, not `false`: a typo should never read as
/// "transition forbidden".
pub fn can_transition(kind: EntityKind, current: &str, target: &str) -> DomainResult<bool> {
    match Status::parse(kind, current)? {
        Status::Order(from) => Ok(from.can_transition(OrderStatus::from_str(target)?)),
        Status::Invoice(from) => Ok(from.can_transition(InvoiceStatus::from_str(target)?)),
        Status::Fulfillment(from) => {
            Ok(from.can_transition(FulfillmentStatus::from_str(target)?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_resolves_per_kind() {
        assert_eq!(
            Status::parse(EntityKind::Order, "pending").unwrap(),
            Status::Order(OrderStatus::Pending)
        );
        assert_eq!(
            Status::parse(EntityKind::Invoice, "sent").unwrap(),
            Status::Invoice(InvoiceStatus::Sent)
        );
        assert_eq!(
            Status::parse(EntityKind::Fulfillment, "shipped").unwrap(),
            Status::Fulfillment(FulfillmentStatus::Shipped)
        );
    }

    #[test]
    fn parse_rejects_unknown_status_and_workflowless_kinds() {
        match Status::parse(EntityKind::Order, "shipped").unwrap_err() {
            DomainError::Validation(_) => {}
            _ => panic!("Expected Validation error for foreign status"),
        }
        match Status::parse(EntityKind::Account, "active").unwrap_err() {
            DomainError::Validation(_) => {}
            _ => panic!("Expected Validation error for workflowless kind"),
        }
    }

    #[test]
    fn can_transition_answers_from_strings() {
        assert!(can_transition(EntityKind::Order, "pending", "validated").unwrap());
        assert!(!can_transition(EntityKind::Order, "pending", "invoiced").unwrap());
        assert!(!can_transition(EntityKind::Invoice, "draft", "paid").unwrap());

        match can_transition(EntityKind::Order, "pending", "banana").unwrap_err() {
            DomainError::Validation(_) => {}
            _ => panic!("Expected Validation error for unknown target"),
        }
    }

    #[test]
    fn terminal_statuses_report_as_such() {
        assert!(Status::parse(EntityKind::Order, "cancelled").unwrap().is_terminal());
        assert!(!Status::parse(EntityKind::Order, "invoiced").unwrap().is_terminal());
        assert_eq!(Status::parse(EntityKind::Invoice, "paid").unwrap().as_str(), "paid");
    }
}
