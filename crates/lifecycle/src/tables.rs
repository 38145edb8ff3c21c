//! Transition tables for the three status workflows.

use orderflow_billing::InvoiceStatus;
use orderflow_core::EntityKind;
use orderflow_fulfillment::FulfillmentStatus;
use orderflow_orders::OrderStatus;

use crate::StateMachine;

impl StateMachine for OrderStatus {
    fn kind() -> EntityKind {
        EntityKind::Order
    }

    fn successors(&self) -> &'static [Self] {
        match self {
            OrderStatus::Pending => &[OrderStatus::Validated, OrderStatus::Cancelled],
            OrderStatus::Validated => &[OrderStatus::Invoiced, OrderStatus::Cancelled],
            OrderStatus::Invoiced => &[OrderStatus::Cancelled],
            OrderStatus::Cancelled => &[],
        }
    }
}

impl StateMachine for InvoiceStatus {
    fn kind() -> EntityKind {
        EntityKind::Invoice
    }

    fn successors(&self) -> &'static [Self] {
        match self {
            InvoiceStatus::Draft => &[InvoiceStatus::Sent],
            InvoiceStatus::Sent => &[InvoiceStatus::Paid],
            InvoiceStatus::Paid => &[],
        }
    }
}

impl StateMachine for FulfillmentStatus {
    fn kind() -> EntityKind {
        EntityKind::Fulfillment
    }

    fn successors(&self) -> &'static [Self] {
        match self {
            FulfillmentStatus::Pending => {
                &[FulfillmentStatus::Processing, FulfillmentStatus::Shipped]
            }
            FulfillmentStatus::Processing => &[FulfillmentStatus::Shipped],
            FulfillmentStatus::Shipped => &[FulfillmentStatus::Delivered],
            FulfillmentStatus::Delivered => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use orderflow_billing::Invoice;
    use orderflow_core::{AccountId, CustomerId, DomainError, Lifecycle, OrderId};
    use orderflow_orders::Order;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::{TransitionError, transition};

    const ORDER_STATUSES: [OrderStatus; 4] = [
        OrderStatus::Pending,
        OrderStatus::Validated,
        OrderStatus::Invoiced,
        OrderStatus::Cancelled,
    ];

    const FULFILLMENT_STATUSES: [FulfillmentStatus; 4] = [
        FulfillmentStatus::Pending,
        FulfillmentStatus::Processing,
        FulfillmentStatus::Shipped,
        FulfillmentStatus::Delivered,
    ];

    #[test]
    fn order_table_is_exactly_the_five_allowed_edges() {
        let allowed = [
            (OrderStatus::Pending, OrderStatus::Validated),
            (OrderStatus::Pending, OrderStatus::Cancelled),
            (OrderStatus::Validated, OrderStatus::Invoiced),
            (OrderStatus::Validated, OrderStatus::Cancelled),
            (OrderStatus::Invoiced, OrderStatus::Cancelled),
        ];

        for from in ORDER_STATUSES {
            for to in ORDER_STATUSES {
                assert_eq!(
                    from.can_transition(to),
                    allowed.contains(&(from, to)),
                    "{from} -> {to}"
                );
            }
        }
    }

    #[test]
    fn invoice_table_is_strictly_linear() {
        assert!(InvoiceStatus::Draft.can_transition(InvoiceStatus::Sent));
        assert!(InvoiceStatus::Sent.can_transition(InvoiceStatus::Paid));

        assert!(
            !InvoiceStatus::Draft.can_transition(InvoiceStatus::Paid),
            "a draft invoice cannot be paid"
        );
        assert!(!InvoiceStatus::Sent.can_transition(InvoiceStatus::Draft));
        assert!(!InvoiceStatus::Paid.can_transition(InvoiceStatus::Sent));
        assert!(!InvoiceStatus::Draft.can_transition(InvoiceStatus::Draft));
    }

    #[test]
    fn fulfillment_table_allows_skipping_processing_only() {
        let allowed = [
            (FulfillmentStatus::Pending, FulfillmentStatus::Processing),
            (FulfillmentStatus::Pending, FulfillmentStatus::Shipped),
            (FulfillmentStatus::Processing, FulfillmentStatus::Shipped),
            (FulfillmentStatus::Shipped, FulfillmentStatus::Delivered),
        ];

        for from in FULFILLMENT_STATUSES {
            for to in FULFILLMENT_STATUSES {
                assert_eq!(
                    from.can_transition(to),
                    allowed.contains(&(from, to)),
                    "{from} -> {to}"
                );
            }
        }
    }

    #[test]
    fn terminal_statuses_have_no_successors() {
        assert!(OrderStatus::Cancelled.is_terminal());
        assert!(InvoiceStatus::Paid.is_terminal());
        assert!(FulfillmentStatus::Delivered.is_terminal());

        assert!(!OrderStatus::Invoiced.is_terminal());
        assert!(!InvoiceStatus::Sent.is_terminal());
        assert!(!FulfillmentStatus::Shipped.is_terminal());
    }

    #[test]
    fn transition_moves_an_order_forward() {
        let mut order = Order::new(
            AccountId::new(),
            CustomerId::new(),
            "ORD-1",
            Vec::new(),
            None,
            Utc::now(),
        )
        .unwrap();

        transition(&mut order, OrderStatus::Validated).unwrap();
        assert_eq!(order.status(), OrderStatus::Validated);
    }

    #[test]
    fn rejected_transition_leaves_status_unchanged() {
        let mut order = Order::new(
            AccountId::new(),
            CustomerId::new(),
            "ORD-1",
            Vec::new(),
            None,
            Utc::now(),
        )
        .unwrap();
        transition(&mut order, OrderStatus::Validated).unwrap();

        let err = transition(&mut order, OrderStatus::Pending).unwrap_err();

        assert_eq!(
            err,
            TransitionError {
                kind: EntityKind::Order,
                from: "validated".to_string(),
                to: "pending".to_string(),
            }
        );
        assert_eq!(order.status(), OrderStatus::Validated);
    }

    #[test]
    fn paying_a_draft_invoice_is_rejected() {
        let mut invoice = Invoice::draft(
            AccountId::new(),
            OrderId::new(),
            "INV-1",
            dec!(10.00),
            dec!(1.00),
        )
        .unwrap();

        let err = transition(&mut invoice, InvoiceStatus::Paid).unwrap_err();

        let domain: DomainError = err.into();
        match domain {
            DomainError::InvalidTransition { kind, from, to } => {
                assert_eq!(kind, EntityKind::Invoice);
                assert_eq!(from, "draft");
                assert_eq!(to, "paid");
            }
            _ => panic!("Expected InvalidTransition"),
        }
        assert_eq!(invoice.status(), InvoiceStatus::Draft);
    }
}
