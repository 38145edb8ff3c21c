use chrono::{DateTime, Utc};
use core::str::FromStr;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use orderflow_audit::{Auditable, FieldSnapshot};
use orderflow_core::{
    AccountId, CustomerId, DomainError, DomainResult, Entity, EntityKind, FulfillmentId, LineId,
    Lifecycle, OrderId, line_total, round_money,
};
use orderflow_events::ResourceRef;

/// Order status lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Validated,
    Invoiced,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Validated => "validated",
            OrderStatus::Invoiced => "invoiced",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl core::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(OrderStatus::Pending),
            "validated" => Ok(OrderStatus::Validated),
            "invoiced" => Ok(OrderStatus::Invoiced),
            "cancelled" => Ok(OrderStatus::Cancelled),
            other => Err(DomainError::validation(format!(
                "unknown order status: {other}"
            ))),
        }
    }
}

/// One priced line on an order.
///
/// `total_price` is derived (quantity times unit price, rounded) and never
/// set directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    id: LineId,
    name: String,
    sku: Option<String>,
    quantity: u32,
    unit_price: Decimal,
    total_price: Decimal,
}

impl OrderLine {
    pub fn new(
        name: impl Into<String>,
        sku: Option<String>,
        quantity: u32,
        unit_price: Decimal,
    ) -> DomainResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("line name cannot be empty"));
        }
        if quantity == 0 {
            return Err(DomainError::validation("line quantity must be at least 1"));
        }
        if unit_price < Decimal::ZERO {
            return Err(DomainError::validation("line unit price cannot be negative"));
        }

        Ok(Self {
            id: LineId::new(),
            name,
            sku: sku.and_then(|s| {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            }),
            quantity,
            unit_price,
            total_price: line_total(quantity, unit_price),
        })
    }

    pub fn id(&self) -> LineId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sku(&self) -> Option<&str> {
        self.sku.as_deref()
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn unit_price(&self) -> Decimal {
        self.unit_price
    }

    pub fn total_price(&self) -> Decimal {
        self.total_price
    }
}

/// A commercial order: the root the billing and fulfillment records hang off.
///
/// Lines are only mutable while the order is `pending` or `validated`;
/// after invoicing the priced content is frozen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    id: OrderId,
    account_id: AccountId,
    customer_id: CustomerId,
    fulfillment_id: Option<FulfillmentId>,
    reference: String,
    status: OrderStatus,
    lines: Vec<OrderLine>,
    total_amount: Decimal,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    version: u64,
}

impl Order {
    pub fn new(
        account_id: AccountId,
        customer_id: CustomerId,
        reference: impl Into<String>,
        lines: Vec<OrderLine>,
        notes: Option<String>,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let reference = reference.into();
        if reference.trim().is_empty() {
            return Err(DomainError::validation("order reference cannot be empty"));
        }

        let mut order = Self {
            id: OrderId::new(),
            account_id,
            customer_id,
            fulfillment_id: None,
            reference,
            status: OrderStatus::Pending,
            lines,
            total_amount: Decimal::ZERO,
            notes: normalize_notes(notes),
            created_at: now,
            updated_at: now,
            version: 0,
        };
        order.recompute_total();
        Ok(order)
    }

    pub fn account_id(&self) -> AccountId {
        self.account_id
    }

    pub fn customer_id(&self) -> CustomerId {
        self.customer_id
    }

    pub fn fulfillment_id(&self) -> Option<FulfillmentId> {
        self.fulfillment_id
    }

    pub fn reference(&self) -> &str {
        &self.reference
    }

    pub fn lines(&self) -> &[OrderLine] {
        &self.lines
    }

    pub fn total_amount(&self) -> Decimal {
        self.total_amount
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Whether the priced content may still change.
    pub fn is_mutable(&self) -> bool {
        matches!(self.status, OrderStatus::Pending | OrderStatus::Validated)
    }

    pub fn add_line(&mut self, line: OrderLine, now: DateTime<Utc>) -> DomainResult<()> {
        self.ensure_mutable()?;
        self.lines.push(line);
        self.recompute_total();
        self.touch(now);
        Ok(())
    }

    pub fn remove_line(&mut self, line_id: LineId, now: DateTime<Utc>) -> DomainResult<()> {
        self.ensure_mutable()?;
        let position = self
            .lines
            .iter()
            .position(|line| line.id() == line_id)
            .ok_or(DomainError::NotFound)?;
        self.lines.remove(position);
        self.recompute_total();
        self.touch(now);
        Ok(())
    }

    /// Replace the free-form notes. Allowed in every status except
    /// `cancelled`; blank notes clear the field.
    pub fn set_notes(&mut self, notes: Option<String>, now: DateTime<Utc>) -> DomainResult<()> {
        if self.status == OrderStatus::Cancelled {
            return Err(DomainError::invalid_state(
                "cannot update notes of a cancelled order",
            ));
        }
        self.notes = normalize_notes(notes);
        self.touch(now);
        Ok(())
    }

    pub fn attach_fulfillment(
        &mut self,
        fulfillment_id: FulfillmentId,
        now: DateTime<Utc>,
    ) -> DomainResult<()> {
        if self.fulfillment_id.is_some() {
            return Err(DomainError::invalid_state(
                "order already has a fulfillment attached",
            ));
        }
        self.fulfillment_id = Some(fulfillment_id);
        self.touch(now);
        Ok(())
    }

    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }

    fn ensure_mutable(&self) -> DomainResult<()> {
        if !self.is_mutable() {
            return Err(DomainError::invalid_state(format!(
                "cannot modify lines of {} order",
                self.status
            )));
        }
        Ok(())
    }

    fn recompute_total(&mut self) {
        let sum: Decimal = self.lines.iter().map(OrderLine::total_price).sum();
        self.total_amount = round_money(sum);
    }
}

fn normalize_notes(notes: Option<String>) -> Option<String> {
    notes.and_then(|n| {
        let trimmed = n.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

impl Entity for Order {
    type Id = OrderId;
    const KIND: EntityKind = EntityKind::Order;

    fn id(&self) -> OrderId {
        self.id
    }

    fn version(&self) -> u64 {
        self.version
    }

    fn set_version(&mut self, version: u64) {
        self.version = version;
    }
}

impl Lifecycle for Order {
    type Status = OrderStatus;

    fn status(&self) -> OrderStatus {
        self.status
    }

    fn set_status(&mut self, status: OrderStatus) {
        self.status = status;
    }
}

impl Auditable for Order {
    fn resource_ref(&self) -> ResourceRef {
        ResourceRef::Order(self.id)
    }

    fn snapshot(&self) -> FieldSnapshot {
        FieldSnapshot::new()
            .with("reference", &self.reference)
            .with("status", self.status)
            .with("total_amount", self.total_amount)
            .with("notes", &self.notes)
            .with("fulfillment_id", self.fulfillment_id)
    }
}

/// Input for creating an order.
///
/// `reference: None` asks the workflow to generate one; a supplied reference
/// is used verbatim (after a uniqueness check) and never overwritten.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderDraft {
    pub reference: Option<String>,
    pub lines: Vec<LineDraft>,
    pub notes: Option<String>,
}

/// Input for one order line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineDraft {
    pub name: String,
    pub sku: Option<String>,
    pub quantity: u32,
    pub unit_price: Decimal,
}

impl LineDraft {
    pub fn new(name: impl Into<String>, quantity: u32, unit_price: Decimal) -> Self {
        Self {
            name: name.into(),
            sku: None,
            quantity,
            unit_price,
        }
    }

    pub fn with_sku(mut self, sku: impl Into<String>) -> Self {
        self.sku = Some(sku.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn test_order(lines: Vec<OrderLine>) -> Order {
        Order::new(
            AccountId::new(),
            CustomerId::new(),
            "ORD-20240601-00000001",
            lines,
            None,
            Utc::now(),
        )
        .unwrap()
    }

    fn widget_lines() -> Vec<OrderLine> {
        vec![
            OrderLine::new("Widget", None, 2, dec!(15.00)).unwrap(),
            OrderLine::new("Gadget", Some("GAD-1".to_string()), 4, dec!(3.00)).unwrap(),
        ]
    }

    #[test]
    fn total_is_the_rounded_sum_of_line_totals() {
        let order = test_order(widget_lines());
        assert_eq!(order.total_amount(), dec!(42.00));
        assert_eq!(order.status(), OrderStatus::Pending);
    }

    #[test]
    fn empty_order_totals_zero() {
        let order = test_order(Vec::new());
        assert_eq!(order.total_amount(), Decimal::ZERO);
        assert!(order.lines().is_empty());
    }

    #[test]
    fn line_rejects_zero_quantity() {
        let err = OrderLine::new("Widget", None, 0, dec!(1.00)).unwrap_err();
        match err {
            DomainError::Validation(_) => {}
            _ => panic!("Expected Validation error for zero quantity"),
        }
    }

    #[test]
    fn line_rejects_blank_name_and_negative_price() {
        match OrderLine::new("  ", None, 1, dec!(1.00)).unwrap_err() {
            DomainError::Validation(_) => {}
            _ => panic!("Expected Validation error for blank name"),
        }
        match OrderLine::new("Widget", None, 1, dec!(-0.01)).unwrap_err() {
            DomainError::Validation(_) => {}
            _ => panic!("Expected Validation error for negative price"),
        }
    }

    #[test]
    fn rejects_blank_reference() {
        let err = Order::new(
            AccountId::new(),
            CustomerId::new(),
            "   ",
            Vec::new(),
            None,
            Utc::now(),
        )
        .unwrap_err();
        match err {
            DomainError::Validation(_) => {}
            _ => panic!("Expected Validation error for blank reference"),
        }
    }

    #[test]
    fn add_line_recomputes_total_and_touches() {
        let mut order = test_order(widget_lines());
        let before_update = order.updated_at();

        let later = before_update + chrono::Duration::seconds(5);
        order
            .add_line(OrderLine::new("Tripod", None, 1, dec!(8.00)).unwrap(), later)
            .unwrap();

        assert_eq!(order.total_amount(), dec!(50.00));
        assert_eq!(order.updated_at(), later);
    }

    #[test]
    fn remove_line_recomputes_total() {
        let mut order = test_order(widget_lines());
        let gadget_id = order.lines()[1].id();

        order.remove_line(gadget_id, Utc::now()).unwrap();

        assert_eq!(order.lines().len(), 1);
        assert_eq!(order.total_amount(), dec!(30.00));
    }

    #[test]
    fn remove_unknown_line_is_not_found() {
        let mut order = test_order(widget_lines());
        let err = order.remove_line(LineId::new(), Utc::now()).unwrap_err();
        match err {
            DomainError::NotFound => {}
            _ => panic!("Expected NotFound for unknown line"),
        }
    }

    #[test]
    fn lines_freeze_once_invoiced() {
        let mut order = test_order(widget_lines());
        order.set_status(OrderStatus::Invoiced);

        let err = order
            .add_line(OrderLine::new("Extra", None, 1, dec!(1.00)).unwrap(), Utc::now())
            .unwrap_err();
        match err {
            DomainError::InvalidState(_) => {}
            _ => panic!("Expected InvalidState when adding to an invoiced order"),
        }

        let line_id = order.lines()[0].id();
        let err = order.remove_line(line_id, Utc::now()).unwrap_err();
        match err {
            DomainError::InvalidState(_) => {}
            _ => panic!("Expected InvalidState when removing from an invoiced order"),
        }
    }

    #[test]
    fn notes_update_allowed_until_cancelled() {
        let mut order = test_order(Vec::new());

        order
            .set_notes(Some("leave at the back door".to_string()), Utc::now())
            .unwrap();
        assert_eq!(order.notes(), Some("leave at the back door"));

        order.set_notes(Some("  ".to_string()), Utc::now()).unwrap();
        assert_eq!(order.notes(), None, "blank notes clear the field");

        order.set_status(OrderStatus::Cancelled);
        let err = order
            .set_notes(Some("too late".to_string()), Utc::now())
            .unwrap_err();
        match err {
            DomainError::InvalidState(_) => {}
            _ => panic!("Expected InvalidState for notes on a cancelled order"),
        }
    }

    #[test]
    fn fulfillment_attaches_once() {
        let mut order = test_order(Vec::new());
        let fulfillment_id = FulfillmentId::new();

        order.attach_fulfillment(fulfillment_id, Utc::now()).unwrap();
        assert_eq!(order.fulfillment_id(), Some(fulfillment_id));

        let err = order
            .attach_fulfillment(FulfillmentId::new(), Utc::now())
            .unwrap_err();
        match err {
            DomainError::InvalidState(_) => {}
            _ => panic!("Expected InvalidState for second fulfillment"),
        }
    }

    #[test]
    fn status_strings_round_trip() {
        for status in [
            OrderStatus::Pending,
            OrderStatus::Validated,
            OrderStatus::Invoiced,
            OrderStatus::Cancelled,
        ] {
            assert_eq!(status.as_str().parse::<OrderStatus>().unwrap(), status);
        }

        match "shipped".parse::<OrderStatus>().unwrap_err() {
            DomainError::Validation(_) => {}
            _ => panic!("Expected Validation error for unknown status"),
        }
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 256,
                ..ProptestConfig::default()
            })]

            /// Property: the order total always equals the rounded sum of its
            /// line totals, however the lines were priced.
            #[test]
            fn total_matches_line_sum(
                specs in prop::collection::vec((1u32..50, 0i64..100_000i64), 0..8)
            ) {
                let lines: Vec<OrderLine> = specs
                    .iter()
                    .map(|(quantity, cents)| {
                        OrderLine::new("Item", None, *quantity, Decimal::new(*cents, 2)).unwrap()
                    })
                    .collect();
                let expected: Decimal =
                    round_money(lines.iter().map(OrderLine::total_price).sum());

                let order = test_order(lines);

                prop_assert_eq!(order.total_amount(), expected);
            }
        }
    }
}
