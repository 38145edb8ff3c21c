use chrono::{Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};

use orderflow_audit::{AuditTrail, Auditable, TrackedFields};
use orderflow_billing::{Invoice, InvoiceStatus};
use orderflow_core::{
    AccountId, CustomerId, DomainError, DomainResult, Entity, EntityKind, FulfillmentId,
    FulfillmentServiceId, InvoiceId, Lifecycle, LineId, OrderId, ReferenceConfig,
    ReferenceGenerator, apply_rate,
};
use orderflow_events::{AccountEvent, EventFilter, EventStore, ResourceRef};
use orderflow_fulfillment::{Fulfillment, FulfillmentService, FulfillmentStatus};
use orderflow_lifecycle::transition;
use orderflow_orders::{LineDraft, Order, OrderDraft, OrderLine, OrderStatus};
use orderflow_parties::{Account, Customer, CustomerDetails, CustomerPatch};

use crate::store::{Commit, StateStore};

/// When an invoiced order may be handed to fulfillment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FulfillmentPolicy {
    /// The debit invoice must be `paid` first.
    #[default]
    RequirePaidInvoice,
    /// The debit invoice must be at least `sent`; payment may lag shipping.
    RequireIssuedInvoice,
}

/// Workflow tuning knobs.
#[derive(Debug, Clone)]
pub struct WorkflowConfig {
    pub fulfillment_policy: FulfillmentPolicy,
    /// Tax rate applied to the order total when raising an invoice.
    pub tax_rate: Decimal,
    /// Days between issuing an invoice and its due date.
    pub payment_terms_days: i64,
    pub references: ReferenceConfig,
    pub tracked: TrackedFields,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            fulfillment_policy: FulfillmentPolicy::default(),
            tax_rate: Decimal::ZERO,
            payment_terms_days: 30,
            references: ReferenceConfig::default(),
            tracked: TrackedFields::default(),
        }
    }
}

/// Result of cancelling an order.
#[derive(Debug, Clone)]
pub struct Cancellation {
    pub order: Order,
    /// Present only when cancellation reversed an already billed order.
    pub credit_note: Option<Invoice>,
}

/// Drives the order lifecycle end to end.
///
/// Every operation follows the same shape: load fresh state, apply the
/// change in memory, then commit the touched records together with their
/// audit events. The loaded versions travel with the writes, so two racers
/// starting from the same state cannot both land; the loser's commit is
/// rejected and the operation fails without side effects.
pub struct WorkflowCoordinator<S> {
    store: S,
    audit: AuditTrail,
    references: ReferenceGenerator,
    config: WorkflowConfig,
}

impl<S> WorkflowCoordinator<S>
where
    S: StateStore + EventStore,
{
    pub fn new(store: S) -> Self {
        Self::with_config(store, WorkflowConfig::default())
    }

    pub fn with_config(store: S, config: WorkflowConfig) -> Self {
        let audit = AuditTrail::with_tracked(config.tracked.clone());
        Self {
            store,
            audit,
            references: ReferenceGenerator::new(),
            config,
        }
    }

    pub fn config(&self) -> &WorkflowConfig {
        &self.config
    }

    pub fn create_account(&self, name: &str) -> DomainResult<Account> {
        let account = Account::new(name)?;
        let account_id = account.id();
        self.store
            .commit(Commit::new(account_id).write_account(account))?;
        info!(%account_id, "account created");
        Ok(self.store.account(account_id)?)
    }

    pub fn create_customer(
        &self,
        account_id: AccountId,
        details: CustomerDetails,
    ) -> DomainResult<Customer> {
        self.store.account(account_id)?;
        let customer = Customer::new(account_id, details)?;
        let customer_id = customer.id();
        self.store
            .commit(Commit::new(account_id).write_customer(customer))?;
        info!(%account_id, %customer_id, "customer created");
        Ok(self.store.customer(account_id, customer_id)?)
    }

    pub fn update_customer(
        &self,
        account_id: AccountId,
        customer_id: CustomerId,
        patch: CustomerPatch,
    ) -> DomainResult<Customer> {
        let now = Utc::now();
        let mut customer = self.store.customer(account_id, customer_id)?;
        let before = customer.snapshot();
        customer.apply_patch(patch)?;
        let events = self.audit.capture(account_id, &customer, &before, now);
        self.store.commit(
            Commit::new(account_id)
                .write_customer(customer)
                .with_events(events),
        )?;
        info!(%account_id, %customer_id, "customer updated");
        Ok(self.store.customer(account_id, customer_id)?)
    }

    pub fn create_fulfillment_service(
        &self,
        account_id: AccountId,
        name: &str,
        provider: &str,
    ) -> DomainResult<FulfillmentService> {
        self.store.account(account_id)?;
        let service = FulfillmentService::new(account_id, name, provider)?;
        let service_id = service.id();
        self.store
            .commit(Commit::new(account_id).write_fulfillment_service(service))?;
        info!(%account_id, %service_id, provider, "fulfillment service created");
        Ok(self.store.fulfillment_service(account_id, service_id)?)
    }

    pub fn set_fulfillment_service_active(
        &self,
        account_id: AccountId,
        service_id: FulfillmentServiceId,
        active: bool,
    ) -> DomainResult<FulfillmentService> {
        let mut service = self.store.fulfillment_service(account_id, service_id)?;
        service.set_active(active);
        self.store
            .commit(Commit::new(account_id).write_fulfillment_service(service))?;
        info!(%account_id, %service_id, active, "fulfillment service toggled");
        Ok(self.store.fulfillment_service(account_id, service_id)?)
    }

    /// Create an order in `pending`.
    ///
    /// A draft without a reference gets a generated one; a supplied reference
    /// is kept verbatim after a uniqueness check.
    pub fn create_order(
        &self,
        account_id: AccountId,
        customer_id: CustomerId,
        draft: OrderDraft,
    ) -> DomainResult<Order> {
        let now = Utc::now();
        self.store.customer(account_id, customer_id)?;

        let reference = match draft.reference {
            Some(supplied) => {
                let supplied = supplied.trim().to_string();
                if supplied.is_empty() {
                    return Err(DomainError::validation("order reference cannot be empty"));
                }
                if self
                    .store
                    .reference_exists(account_id, EntityKind::Order, &supplied)?
                {
                    return Err(DomainError::validation(format!(
                        "order reference {supplied} is already taken"
                    )));
                }
                supplied
            }
            None => self.unique_reference(account_id, EntityKind::Order)?,
        };

        let lines = draft
            .lines
            .into_iter()
            .map(build_line)
            .collect::<DomainResult<Vec<_>>>()?;
        let order = Order::new(account_id, customer_id, reference, lines, draft.notes, now)?;
        let order_id = order.id();

        self.store
            .commit(Commit::new(account_id).write_order(order))?;
        info!(%account_id, %order_id, "order created");
        Ok(self.store.order(account_id, order_id)?)
    }

    pub fn add_order_line(
        &self,
        account_id: AccountId,
        order_id: OrderId,
        line: LineDraft,
    ) -> DomainResult<Order> {
        let now = Utc::now();
        let mut order = self.store.order(account_id, order_id)?;
        let before = order.snapshot();
        order.add_line(build_line(line)?, now)?;
        let events = self.audit.capture(account_id, &order, &before, now);
        self.store.commit(
            Commit::new(account_id)
                .write_order(order)
                .with_events(events),
        )?;
        Ok(self.store.order(account_id, order_id)?)
    }

    pub fn remove_order_line(
        &self,
        account_id: AccountId,
        order_id: OrderId,
        line_id: LineId,
    ) -> DomainResult<Order> {
        let now = Utc::now();
        let mut order = self.store.order(account_id, order_id)?;
        let before = order.snapshot();
        order.remove_line(line_id, now)?;
        let events = self.audit.capture(account_id, &order, &before, now);
        self.store.commit(
            Commit::new(account_id)
                .write_order(order)
                .with_events(events),
        )?;
        Ok(self.store.order(account_id, order_id)?)
    }

    pub fn update_order_notes(
        &self,
        account_id: AccountId,
        order_id: OrderId,
        notes: Option<String>,
    ) -> DomainResult<Order> {
        let now = Utc::now();
        let mut order = self.store.order(account_id, order_id)?;
        let before = order.snapshot();
        order.set_notes(notes, now)?;
        let events = self.audit.capture(account_id, &order, &before, now);
        self.store.commit(
            Commit::new(account_id)
                .write_order(order)
                .with_events(events),
        )?;
        Ok(self.store.order(account_id, order_id)?)
    }

    pub fn validate_order(&self, account_id: AccountId, order_id: OrderId) -> DomainResult<Order> {
        let now = Utc::now();
        let mut order = self.store.order(account_id, order_id)?;
        let before = order.snapshot();
        transition(&mut order, OrderStatus::Validated)?;
        order.touch(now);
        let events = self.audit.capture(account_id, &order, &before, now);
        self.store.commit(
            Commit::new(account_id)
                .write_order(order)
                .with_events(events),
        )?;
        info!(%account_id, %order_id, "order validated");
        Ok(self.store.order(account_id, order_id)?)
    }

    /// Move a validated order to `invoiced` and raise its debit invoice.
    ///
    /// The order write and the new invoice land in one commit. Two racers
    /// both loading the validated order cannot each produce an invoice: the
    /// loser's order write carries a stale version and its commit fails.
    pub fn invoice_order(
        &self,
        account_id: AccountId,
        order_id: OrderId,
    ) -> DomainResult<Invoice> {
        let now = Utc::now();
        let mut order = self.store.order(account_id, order_id)?;
        if order.lines().is_empty() {
            return Err(DomainError::invalid_state(
                "cannot invoice an order with no lines",
            ));
        }
        if self
            .store
            .invoice_for_order(account_id, order_id)?
            .is_some()
        {
            return Err(DomainError::invalid_state("order is already invoiced"));
        }

        let before = order.snapshot();
        transition(&mut order, OrderStatus::Invoiced)?;
        order.touch(now);

        let number = self.unique_reference(account_id, EntityKind::Invoice)?;
        let amount = order.total_amount();
        let tax_amount = apply_rate(amount, self.config.tax_rate);
        let invoice = Invoice::draft(account_id, order_id, number, amount, tax_amount)?;
        let invoice_id = invoice.id();

        let events = self.audit.capture(account_id, &order, &before, now);
        self.store.commit(
            Commit::new(account_id)
                .write_order(order)
                .write_invoice(invoice)
                .with_events(events),
        )?;
        info!(%account_id, %order_id, %invoice_id, "order invoiced");
        Ok(self.store.invoice(account_id, invoice_id)?)
    }

    /// Issue a draft invoice: `draft -> sent`, with the due date set from
    /// the configured payment terms.
    pub fn send_invoice(
        &self,
        account_id: AccountId,
        invoice_id: InvoiceId,
    ) -> DomainResult<Invoice> {
        let now = Utc::now();
        let mut invoice = self.store.invoice(account_id, invoice_id)?;
        let before = invoice.snapshot();
        transition(&mut invoice, InvoiceStatus::Sent)?;
        let due_at = (now + Duration::days(self.config.payment_terms_days)).date_naive();
        invoice.issue(now, due_at);
        let events = self.audit.capture(account_id, &invoice, &before, now);
        self.store.commit(
            Commit::new(account_id)
                .write_invoice(invoice)
                .with_events(events),
        )?;
        info!(%account_id, %invoice_id, "invoice sent");
        Ok(self.store.invoice(account_id, invoice_id)?)
    }

    pub fn mark_invoice_paid(
        &self,
        account_id: AccountId,
        invoice_id: InvoiceId,
        paid_on: NaiveDate,
    ) -> DomainResult<Invoice> {
        let now = Utc::now();
        let mut invoice = self.store.invoice(account_id, invoice_id)?;
        let before = invoice.snapshot();
        transition(&mut invoice, InvoiceStatus::Paid)?;
        invoice.record_payment(paid_on);
        let events = self.audit.capture(account_id, &invoice, &before, now);
        self.store.commit(
            Commit::new(account_id)
                .write_invoice(invoice)
                .with_events(events),
        )?;
        info!(%account_id, %invoice_id, %paid_on, "invoice paid");
        Ok(self.store.invoice(account_id, invoice_id)?)
    }

    /// Cancel an order from any non-terminal status.
    ///
    /// What else happens depends on how far the order got: a validated order
    /// records an `order.cancelled` event, an invoiced order additionally
    /// gets a credit note reversing its debit invoice. Everything lands in
    /// one commit with the status change.
    pub fn cancel_order(
        &self,
        account_id: AccountId,
        order_id: OrderId,
    ) -> DomainResult<Cancellation> {
        let now = Utc::now();
        let mut order = self.store.order(account_id, order_id)?;
        let prior_status = order.status();

        let before = order.snapshot();
        transition(&mut order, OrderStatus::Cancelled)?;
        order.touch(now);

        if let Some(fulfillment_id) = order.fulfillment_id() {
            warn!(
                %account_id, %order_id, %fulfillment_id,
                "cancelling an order with an attached fulfillment"
            );
        }

        let mut events = self.audit.capture(account_id, &order, &before, now);
        let mut commit = Commit::new(account_id);
        let mut credit_note_id = None;

        match prior_status {
            OrderStatus::Pending => {}
            OrderStatus::Validated => {
                events.push(AccountEvent::new(
                    account_id,
                    ResourceRef::Order(order_id),
                    "order.cancelled",
                    json!({ "reference": order.reference() }),
                    now,
                ));
            }
            OrderStatus::Invoiced => {
                let invoice = self
                    .store
                    .invoice_for_order(account_id, order_id)?
                    .ok_or_else(|| {
                        DomainError::invalid_state("invoiced order has no invoice on record")
                    })?;
                let number = self.unique_reference(account_id, EntityKind::Invoice)?;
                let credit = Invoice::credit_note(&invoice, number, now)?;
                credit_note_id = Some(credit.id());
                commit = commit.write_invoice(credit);
            }
            // A cancelled order never gets here: the transition above
            // already rejected it.
            OrderStatus::Cancelled => {}
        }

        self.store
            .commit(commit.write_order(order).with_events(events))?;

        let order = self.store.order(account_id, order_id)?;
        let credit_note = match credit_note_id {
            Some(id) => Some(self.store.invoice(account_id, id)?),
            None => None,
        };
        info!(%account_id, %order_id, from = %prior_status, "order cancelled");
        Ok(Cancellation { order, credit_note })
    }

    /// Create a shipment for an invoiced order through an active service.
    ///
    /// The configured [`FulfillmentPolicy`] decides how far the order's
    /// invoice must have progressed first.
    pub fn create_fulfillment(
        &self,
        account_id: AccountId,
        order_id: OrderId,
        service_id: FulfillmentServiceId,
    ) -> DomainResult<Fulfillment> {
        let now = Utc::now();
        let mut order = self.store.order(account_id, order_id)?;
        if order.status() != OrderStatus::Invoiced {
            return Err(DomainError::invalid_state(format!(
                "cannot fulfill a {} order",
                order.status()
            )));
        }
        if order.fulfillment_id().is_some() {
            return Err(DomainError::invalid_state(
                "order already has a fulfillment attached",
            ));
        }

        let service = self.store.fulfillment_service(account_id, service_id)?;
        if !service.is_active() {
            return Err(DomainError::invalid_state(format!(
                "fulfillment service {} is inactive",
                service.name()
            )));
        }

        let invoice = self
            .store
            .invoice_for_order(account_id, order_id)?
            .ok_or_else(|| {
                DomainError::invalid_state("invoiced order has no invoice on record")
            })?;
        match self.config.fulfillment_policy {
            FulfillmentPolicy::RequirePaidInvoice => {
                if !invoice.is_paid() {
                    return Err(DomainError::invalid_state(
                        "invoice must be paid before fulfillment",
                    ));
                }
            }
            FulfillmentPolicy::RequireIssuedInvoice => {
                if invoice.status() == InvoiceStatus::Draft {
                    return Err(DomainError::invalid_state(
                        "invoice must be sent before fulfillment",
                    ));
                }
            }
        }

        let fulfillment = Fulfillment::new(account_id, service_id);
        let fulfillment_id = fulfillment.id();
        let before = order.snapshot();
        order.attach_fulfillment(fulfillment_id, now)?;
        let events = self.audit.capture(account_id, &order, &before, now);
        self.store.commit(
            Commit::new(account_id)
                .write_order(order)
                .write_fulfillment(fulfillment)
                .with_events(events),
        )?;
        info!(%account_id, %order_id, %fulfillment_id, "fulfillment created");
        Ok(self.store.fulfillment(account_id, fulfillment_id)?)
    }

    pub fn start_processing(
        &self,
        account_id: AccountId,
        fulfillment_id: FulfillmentId,
    ) -> DomainResult<Fulfillment> {
        let now = Utc::now();
        let mut fulfillment = self.store.fulfillment(account_id, fulfillment_id)?;
        let before = fulfillment.snapshot();
        transition(&mut fulfillment, FulfillmentStatus::Processing)?;
        let events = self.audit.capture(account_id, &fulfillment, &before, now);
        self.store.commit(
            Commit::new(account_id)
                .write_fulfillment(fulfillment)
                .with_events(events),
        )?;
        info!(%account_id, %fulfillment_id, "fulfillment processing");
        Ok(self.store.fulfillment(account_id, fulfillment_id)?)
    }

    /// Record shipment details and move to `shipped`.
    ///
    /// Detail validation runs before the transition, so a blank tracking
    /// number leaves the status where it was.
    pub fn ship(
        &self,
        account_id: AccountId,
        fulfillment_id: FulfillmentId,
        tracking_number: &str,
        carrier: &str,
    ) -> DomainResult<Fulfillment> {
        let now = Utc::now();
        let mut fulfillment = self.store.fulfillment(account_id, fulfillment_id)?;
        let before = fulfillment.snapshot();
        fulfillment.record_shipment(tracking_number, carrier, now)?;
        transition(&mut fulfillment, FulfillmentStatus::Shipped)?;
        let events = self.audit.capture(account_id, &fulfillment, &before, now);
        self.store.commit(
            Commit::new(account_id)
                .write_fulfillment(fulfillment)
                .with_events(events),
        )?;
        info!(%account_id, %fulfillment_id, tracking_number, "fulfillment shipped");
        Ok(self.store.fulfillment(account_id, fulfillment_id)?)
    }

    pub fn mark_delivered(
        &self,
        account_id: AccountId,
        fulfillment_id: FulfillmentId,
    ) -> DomainResult<Fulfillment> {
        let now = Utc::now();
        let mut fulfillment = self.store.fulfillment(account_id, fulfillment_id)?;
        let before = fulfillment.snapshot();
        transition(&mut fulfillment, FulfillmentStatus::Delivered)?;
        fulfillment.record_delivery(now);
        let events = self.audit.capture(account_id, &fulfillment, &before, now);
        self.store.commit(
            Commit::new(account_id)
                .write_fulfillment(fulfillment)
                .with_events(events),
        )?;
        info!(%account_id, %fulfillment_id, "fulfillment delivered");
        Ok(self.store.fulfillment(account_id, fulfillment_id)?)
    }

    pub fn account(&self, account_id: AccountId) -> DomainResult<Account> {
        Ok(self.store.account(account_id)?)
    }

    pub fn customer(
        &self,
        account_id: AccountId,
        customer_id: CustomerId,
    ) -> DomainResult<Customer> {
        Ok(self.store.customer(account_id, customer_id)?)
    }

    pub fn order(&self, account_id: AccountId, order_id: OrderId) -> DomainResult<Order> {
        Ok(self.store.order(account_id, order_id)?)
    }

    pub fn invoice(&self, account_id: AccountId, invoice_id: InvoiceId) -> DomainResult<Invoice> {
        Ok(self.store.invoice(account_id, invoice_id)?)
    }

    pub fn invoice_for_order(
        &self,
        account_id: AccountId,
        order_id: OrderId,
    ) -> DomainResult<Option<Invoice>> {
        Ok(self.store.invoice_for_order(account_id, order_id)?)
    }

    pub fn fulfillment_service(
        &self,
        account_id: AccountId,
        service_id: FulfillmentServiceId,
    ) -> DomainResult<FulfillmentService> {
        Ok(self.store.fulfillment_service(account_id, service_id)?)
    }

    pub fn fulfillment(
        &self,
        account_id: AccountId,
        fulfillment_id: FulfillmentId,
    ) -> DomainResult<Fulfillment> {
        Ok(self.store.fulfillment(account_id, fulfillment_id)?)
    }

    /// Query the account's event history, most recent first.
    pub fn events(
        &self,
        account_id: AccountId,
        filter: &EventFilter,
    ) -> DomainResult<Vec<AccountEvent>> {
        Ok(self.store.events(account_id, filter)?)
    }

    fn unique_reference(&self, account_id: AccountId, kind: EntityKind) -> DomainResult<String> {
        let prefix = self.config.references.prefix_for(kind).ok_or_else(|| {
            DomainError::validation(format!("no reference prefix configured for {kind}"))
        })?;
        self.references.generate_unique(
            prefix,
            self.config.references.max_attempts(),
            |candidate| Ok(self.store.reference_exists(account_id, kind, candidate)?),
        )
    }
}

fn build_line(draft: LineDraft) -> DomainResult<OrderLine> {
    OrderLine::new(draft.name, draft.sku, draft.quantity, draft.unit_price)
}
