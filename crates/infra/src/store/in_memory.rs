use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use uuid::Uuid;

use orderflow_billing::{Invoice, InvoiceKind};
use orderflow_core::{
    AccountId, CustomerId, Entity, EntityKind, FulfillmentId, FulfillmentServiceId, InvoiceId,
    OrderId,
};
use orderflow_events::{AccountEvent, EventFilter, EventStore, EventStoreError};
use orderflow_fulfillment::{Fulfillment, FulfillmentService};
use orderflow_orders::Order;
use orderflow_parties::{Account, Customer};

use super::commit::{Commit, RecordWrite};
use super::r#trait::{StateStore, StoreError};

#[derive(Debug, Default)]
struct Tables {
    accounts: HashMap<Uuid, Account>,
    customers: HashMap<Uuid, Customer>,
    orders: HashMap<Uuid, Order>,
    invoices: HashMap<Uuid, Invoice>,
    fulfillment_services: HashMap<Uuid, FulfillmentService>,
    fulfillments: HashMap<Uuid, Fulfillment>,
    events: Vec<AccountEvent>,
}

impl Tables {
    fn current_version(&self, kind: EntityKind, id: &Uuid) -> Option<u64> {
        match kind {
            EntityKind::Account => self.accounts.get(id).map(|a| a.version()),
            EntityKind::Customer => self.customers.get(id).map(|c| c.version()),
            EntityKind::Order => self.orders.get(id).map(|o| o.version()),
            EntityKind::Invoice => self.invoices.get(id).map(|i| i.version()),
            EntityKind::FulfillmentService => {
                self.fulfillment_services.get(id).map(|s| s.version())
            }
            EntityKind::Fulfillment => self.fulfillments.get(id).map(|f| f.version()),
        }
    }

    fn check_version(&self, write: &RecordWrite) -> Result<(), StoreError> {
        let id = write.id();
        let expected = write.version();
        match (self.current_version(write.kind(), &id), expected) {
            (None, 0) => Ok(()),
            (None, _) => Err(StoreError::Conflict(format!(
                "{} {id} is gone, write expected version {expected}",
                write.kind()
            ))),
            (Some(_), 0) => Err(StoreError::Conflict(format!(
                "{} {id} already exists",
                write.kind()
            ))),
            (Some(current), _) if current == expected => Ok(()),
            (Some(current), _) => Err(StoreError::Conflict(format!(
                "{} {id} is at version {current}, write expected {expected}",
                write.kind()
            ))),
        }
    }

    fn check_uniqueness(&self, write: &RecordWrite) -> Result<(), StoreError> {
        match write {
            RecordWrite::Order(order) => {
                let taken = self.orders.values().any(|existing| {
                    existing.account_id() == order.account_id()
                        && existing.id() != order.id()
                        && existing.reference() == order.reference()
                });
                if taken {
                    return Err(StoreError::Duplicate(format!(
                        "order reference {}",
                        order.reference()
                    )));
                }
            }
            RecordWrite::Invoice(invoice) => {
                let taken = self.invoices.values().any(|existing| {
                    existing.account_id() == invoice.account_id()
                        && existing.id() != invoice.id()
                        && existing.number() == invoice.number()
                });
                if taken {
                    return Err(StoreError::Duplicate(format!(
                        "invoice number {}",
                        invoice.number()
                    )));
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn apply(&mut self, write: RecordWrite) {
        match write {
            RecordWrite::Account(mut account) => {
                account.set_version(account.version() + 1);
                self.accounts.insert(Uuid::from(account.id()), account);
            }
            RecordWrite::Customer(mut customer) => {
                customer.set_version(customer.version() + 1);
                self.customers.insert(Uuid::from(customer.id()), customer);
            }
            RecordWrite::Order(mut order) => {
                order.set_version(order.version() + 1);
                self.orders.insert(Uuid::from(order.id()), order);
            }
            RecordWrite::Invoice(mut invoice) => {
                invoice.set_version(invoice.version() + 1);
                self.invoices.insert(Uuid::from(invoice.id()), invoice);
            }
            RecordWrite::FulfillmentService(mut service) => {
                service.set_version(service.version() + 1);
                self.fulfillment_services
                    .insert(Uuid::from(service.id()), service);
            }
            RecordWrite::Fulfillment(mut fulfillment) => {
                fulfillment.set_version(fulfillment.version() + 1);
                self.fulfillments
                    .insert(Uuid::from(fulfillment.id()), fulfillment);
            }
        }
    }
}

/// Pairwise checks a commit cannot express against stored rows alone.
fn check_batch(writes: &[RecordWrite]) -> Result<(), StoreError> {
    for (position, first) in writes.iter().enumerate() {
        for second in &writes[position + 1..] {
            if first.kind() == second.kind() && first.id() == second.id() {
                return Err(StoreError::Conflict(format!(
                    "{} {} written twice in one commit",
                    first.kind(),
                    first.id()
                )));
            }
            if let (RecordWrite::Order(a), RecordWrite::Order(b)) = (first, second) {
                if a.reference() == b.reference() {
                    return Err(StoreError::Duplicate(format!(
                        "order reference {}",
                        a.reference()
                    )));
                }
            }
            if let (RecordWrite::Invoice(a), RecordWrite::Invoice(b)) = (first, second) {
                if a.number() == b.number() {
                    return Err(StoreError::Duplicate(format!(
                        "invoice number {}",
                        a.number()
                    )));
                }
            }
        }
    }
    Ok(())
}

/// In-memory [`StateStore`] and [`EventStore`] for tests and benchmarks.
///
/// One `RwLock` over all tables stands in for a database transaction: a
/// commit validates every write under the write lock, then applies them, so
/// partial commits are never observable.
#[derive(Debug, Default)]
pub struct InMemoryStateStore {
    inner: RwLock<Tables>,
}

impl InMemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, StoreError> {
        self.inner
            .read()
            .map_err(|_| StoreError::Backend("state store lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>, StoreError> {
        self.inner
            .write()
            .map_err(|_| StoreError::Backend("state store lock poisoned".to_string()))
    }
}

impl StateStore for InMemoryStateStore {
    fn account(&self, account_id: AccountId) -> Result<Account, StoreError> {
        self.read()?
            .accounts
            .get(account_id.as_uuid())
            .cloned()
            .ok_or(StoreError::NotFound {
                kind: EntityKind::Account,
            })
    }

    fn customer(
        &self,
        account_id: AccountId,
        customer_id: CustomerId,
    ) -> Result<Customer, StoreError> {
        self.read()?
            .customers
            .get(customer_id.as_uuid())
            .filter(|customer| customer.account_id() == account_id)
            .cloned()
            .ok_or(StoreError::NotFound {
                kind: EntityKind::Customer,
            })
    }

    fn order(&self, account_id: AccountId, order_id: OrderId) -> Result<Order, StoreError> {
        self.read()?
            .orders
            .get(order_id.as_uuid())
            .filter(|order| order.account_id() == account_id)
            .cloned()
            .ok_or(StoreError::NotFound {
                kind: EntityKind::Order,
            })
    }

    fn invoice(
        &self,
        account_id: AccountId,
        invoice_id: InvoiceId,
    ) -> Result<Invoice, StoreError> {
        self.read()?
            .invoices
            .get(invoice_id.as_uuid())
            .filter(|invoice| invoice.account_id() == account_id)
            .cloned()
            .ok_or(StoreError::NotFound {
                kind: EntityKind::Invoice,
            })
    }

    fn invoice_for_order(
        &self,
        account_id: AccountId,
        order_id: OrderId,
    ) -> Result<Option<Invoice>, StoreError> {
        Ok(self
            .read()?
            .invoices
            .values()
            .find(|invoice| {
                invoice.account_id() == account_id
                    && invoice.order_id() == order_id
                    && invoice.kind() == InvoiceKind::Debit
            })
            .cloned())
    }

    fn fulfillment_service(
        &self,
        account_id: AccountId,
        service_id: FulfillmentServiceId,
    ) -> Result<FulfillmentService, StoreError> {
        self.read()?
            .fulfillment_services
            .get(service_id.as_uuid())
            .filter(|service| service.account_id() == account_id)
            .cloned()
            .ok_or(StoreError::NotFound {
                kind: EntityKind::FulfillmentService,
            })
    }

    fn fulfillment(
        &self,
        account_id: AccountId,
        fulfillment_id: FulfillmentId,
    ) -> Result<Fulfillment, StoreError> {
        self.read()?
            .fulfillments
            .get(fulfillment_id.as_uuid())
            .filter(|fulfillment| fulfillment.account_id() == account_id)
            .cloned()
            .ok_or(StoreError::NotFound {
                kind: EntityKind::Fulfillment,
            })
    }

    fn reference_exists(
        &self,
        account_id: AccountId,
        kind: EntityKind,
        reference: &str,
    ) -> Result<bool, StoreError> {
        let tables = self.read()?;
        let exists = match kind {
            EntityKind::Order => tables
                .orders
                .values()
                .any(|order| order.account_id() == account_id && order.reference() == reference),
            EntityKind::Invoice => tables.invoices.values().any(|invoice| {
                invoice.account_id() == account_id && invoice.number() == reference
            }),
            _ => false,
        };
        Ok(exists)
    }

    fn commit(&self, commit: Commit) -> Result<(), StoreError> {
        let (account_id, mut writes, events) = commit.into_parts();
        if writes.is_empty() && events.is_empty() {
            return Ok(());
        }
        let mut tables = self.write()?;

        for event in &events {
            if event.account_id() != account_id {
                return Err(StoreError::AccountIsolation(format!(
                    "commit for account {account_id} carries an event for account {}",
                    event.account_id()
                )));
            }
        }

        // Owners before dependents, so a new order lands before its invoice.
        writes.sort_by_key(|write| write.kind());

        for write in &writes {
            if write.account_id() != account_id {
                return Err(StoreError::AccountIsolation(format!(
                    "commit for account {account_id} carries a {} for account {}",
                    write.kind(),
                    write.account_id()
                )));
            }
            tables.check_version(write)?;
            tables.check_uniqueness(write)?;
        }
        check_batch(&writes)?;

        for write in writes {
            tables.apply(write);
        }
        tables.events.extend(events);
        Ok(())
    }
}

impl EventStore for InMemoryStateStore {
    fn append(&self, events: Vec<AccountEvent>) -> Result<(), EventStoreError> {
        if events.is_empty() {
            return Ok(());
        }
        let account_id = events[0].account_id();
        if let Some(stray) = events.iter().find(|event| event.account_id() != account_id) {
            return Err(EventStoreError::AccountIsolation(format!(
                "append mixes accounts {account_id} and {}",
                stray.account_id()
            )));
        }

        let mut tables = self
            .inner
            .write()
            .map_err(|_| EventStoreError::Backend("event store lock poisoned".to_string()))?;
        tables.events.extend(events);
        Ok(())
    }

    fn events(
        &self,
        account_id: AccountId,
        filter: &EventFilter,
    ) -> Result<Vec<AccountEvent>, EventStoreError> {
        let tables = self
            .inner
            .read()
            .map_err(|_| EventStoreError::Backend("event store lock poisoned".to_string()))?;
        let mut matching: Vec<AccountEvent> = tables
            .events
            .iter()
            .filter(|event| event.account_id() == account_id && filter.matches(event))
            .cloned()
            .collect();
        // Stable sort: events sharing an instant keep their append order.
        matching.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        Ok(matching)
    }
}
