use uuid::Uuid;

use orderflow_billing::Invoice;
use orderflow_core::{AccountId, Entity, EntityKind};
use orderflow_events::AccountEvent;
use orderflow_fulfillment::{Fulfillment, FulfillmentService};
use orderflow_orders::Order;
use orderflow_parties::{Account, Customer};

/// One versioned row heading into a commit.
///
/// The carried entity's `version` is the version the caller loaded (zero for
/// a brand-new record); the store checks it against the stored row before
/// applying anything.
#[derive(Debug, Clone)]
pub enum RecordWrite {
    Account(Account),
    Customer(Customer),
    Order(Order),
    Invoice(Invoice),
    FulfillmentService(FulfillmentService),
    Fulfillment(Fulfillment),
}

impl RecordWrite {
    pub fn kind(&self) -> EntityKind {
        match self {
            RecordWrite::Account(_) => EntityKind::Account,
            RecordWrite::Customer(_) => EntityKind::Customer,
            RecordWrite::Order(_) => EntityKind::Order,
            RecordWrite::Invoice(_) => EntityKind::Invoice,
            RecordWrite::FulfillmentService(_) => EntityKind::FulfillmentService,
            RecordWrite::Fulfillment(_) => EntityKind::Fulfillment,
        }
    }

    pub fn id(&self) -> Uuid {
        match self {
            RecordWrite::Account(account) => Uuid::from(account.id()),
            RecordWrite::Customer(customer) => Uuid::from(customer.id()),
            RecordWrite::Order(order) => Uuid::from(order.id()),
            RecordWrite::Invoice(invoice) => Uuid::from(invoice.id()),
            RecordWrite::FulfillmentService(service) => Uuid::from(service.id()),
            RecordWrite::Fulfillment(fulfillment) => Uuid::from(fulfillment.id()),
        }
    }

    pub fn version(&self) -> u64 {
        match self {
            RecordWrite::Account(account) => account.version(),
            RecordWrite::Customer(customer) => customer.version(),
            RecordWrite::Order(order) => order.version(),
            RecordWrite::Invoice(invoice) => invoice.version(),
            RecordWrite::FulfillmentService(service) => service.version(),
            RecordWrite::Fulfillment(fulfillment) => fulfillment.version(),
        }
    }

    /// The account the record belongs to. An account row scopes to itself.
    pub fn account_id(&self) -> AccountId {
        match self {
            RecordWrite::Account(account) => account.id(),
            RecordWrite::Customer(customer) => customer.account_id(),
            RecordWrite::Order(order) => order.account_id(),
            RecordWrite::Invoice(invoice) => invoice.account_id(),
            RecordWrite::FulfillmentService(service) => service.account_id(),
            RecordWrite::Fulfillment(fulfillment) => fulfillment.account_id(),
        }
    }
}

/// An atomic multi-record mutation scoped to one account.
///
/// All writes and events land together or not at all; a version mismatch on
/// any single write fails the whole commit.
#[derive(Debug, Clone)]
pub struct Commit {
    account_id: AccountId,
    writes: Vec<RecordWrite>,
    events: Vec<AccountEvent>,
}

impl Commit {
    pub fn new(account_id: AccountId) -> Self {
        Self {
            account_id,
            writes: Vec::new(),
            events: Vec::new(),
        }
    }

    pub fn account_id(&self) -> AccountId {
        self.account_id
    }

    pub fn writes(&self) -> &[RecordWrite] {
        &self.writes
    }

    pub fn events(&self) -> &[AccountEvent] {
        &self.events
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty() && self.events.is_empty()
    }

    pub fn write_account(mut self, account: Account) -> Self {
        self.writes.push(RecordWrite::Account(account));
        self
    }

    pub fn write_customer(mut self, customer: Customer) -> Self {
        self.writes.push(RecordWrite::Customer(customer));
        self
    }

    pub fn write_order(mut self, order: Order) -> Self {
        self.writes.push(RecordWrite::Order(order));
        self
    }

    pub fn write_invoice(mut self, invoice: Invoice) -> Self {
        self.writes.push(RecordWrite::Invoice(invoice));
        self
    }

    pub fn write_fulfillment_service(mut self, service: FulfillmentService) -> Self {
        self.writes.push(RecordWrite::FulfillmentService(service));
        self
    }

    pub fn write_fulfillment(mut self, fulfillment: Fulfillment) -> Self {
        self.writes.push(RecordWrite::Fulfillment(fulfillment));
        self
    }

    pub fn with_events(mut self, events: Vec<AccountEvent>) -> Self {
        self.events.extend(events);
        self
    }

    pub fn into_parts(self) -> (AccountId, Vec<RecordWrite>, Vec<AccountEvent>) {
        (self.account_id, self.writes, self.events)
    }
}
