use std::sync::Arc;

use thiserror::Error;

use orderflow_billing::Invoice;
use orderflow_core::{
    AccountId, CustomerId, DomainError, EntityKind, FulfillmentId, FulfillmentServiceId,
    InvoiceId, OrderId,
};
use orderflow_fulfillment::{Fulfillment, FulfillmentService};
use orderflow_orders::Order;
use orderflow_parties::{Account, Customer};

use super::commit::Commit;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("version conflict: {0}")]
    Conflict(String),
    #[error("duplicate reference: {0}")]
    Duplicate(String),
    #[error("account isolation violation: {0}")]
    AccountIsolation(String),
    #[error("{kind} not found")]
    NotFound { kind: EntityKind },
    #[error("store backend failure: {0}")]
    Backend(String),
}

/// `Backend` failures map to [`DomainError::ConcurrencyConflict`] with a
/// `backend: ` message prefix; version conflicts keep their message as is.
impl From<StoreError> for DomainError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(msg) => DomainError::ConcurrencyConflict(msg),
            StoreError::Duplicate(msg) => DomainError::ConcurrencyConflict(msg),
            StoreError::AccountIsolation(msg) => DomainError::Validation(msg),
            StoreError::NotFound { .. } => DomainError::NotFound,
            StoreError::Backend(msg) => {
                DomainError::ConcurrencyConflict(format!("backend: {msg}"))
            }
        }
    }
}

/// Versioned record storage with atomic multi-record commits.
///
/// Every read is scoped to an account; a record that exists under another
/// account reads as `NotFound`. Commits apply all of their writes or none,
/// and each write must carry the version the caller last observed.
pub trait StateStore: Send + Sync {
    fn account(&self, account_id: AccountId) -> Result<Account, StoreError>;

    fn customer(
        &self,
        account_id: AccountId,
        customer_id: CustomerId,
    ) -> Result<Customer, StoreError>;

    fn order(&self, account_id: AccountId, order_id: OrderId) -> Result<Order, StoreError>;

    fn invoice(&self, account_id: AccountId, invoice_id: InvoiceId)
    -> Result<Invoice, StoreError>;

    /// The debit invoice billed against an order, if one exists. Credit notes
    /// reference the same order but are never returned here.
    fn invoice_for_order(
        &self,
        account_id: AccountId,
        order_id: OrderId,
    ) -> Result<Option<Invoice>, StoreError>;

    fn fulfillment_service(
        &self,
        account_id: AccountId,
        service_id: FulfillmentServiceId,
    ) -> Result<FulfillmentService, StoreError>;

    fn fulfillment(
        &self,
        account_id: AccountId,
        fulfillment_id: FulfillmentId,
    ) -> Result<Fulfillment, StoreError>;

    /// Whether a human-facing reference is already taken for the given kind
    /// within the account.
    fn reference_exists(
        &self,
        account_id: AccountId,
        kind: EntityKind,
        reference: &str,
    ) -> Result<bool, StoreError>;

    fn commit(&self, commit: Commit) -> Result<(), StoreError>;
}

impl<S: StateStore + ?Sized> StateStore for Arc<S> {
    fn account(&self, account_id: AccountId) -> Result<Account, StoreError> {
        (**self).account(account_id)
    }

    fn customer(
        &self,
        account_id: AccountId,
        customer_id: CustomerId,
    ) -> Result<Customer, StoreError> {
        (**self).customer(account_id, customer_id)
    }

    fn order(&self, account_id: AccountId, order_id: OrderId) -> Result<Order, StoreError> {
        (**self).order(account_id, order_id)
    }

    fn invoice(
        &self,
        account_id: AccountId,
        invoice_id: InvoiceId,
    ) -> Result<Invoice, StoreError> {
        (**self).invoice(account_id, invoice_id)
    }

    fn invoice_for_order(
        &self,
        account_id: AccountId,
        order_id: OrderId,
    ) -> Result<Option<Invoice>, StoreError> {
        (**self).invoice_for_order(account_id, order_id)
    }

    fn fulfillment_service(
        &self,
        account_id: AccountId,
        service_id: FulfillmentServiceId,
    ) -> Result<FulfillmentService, StoreError> {
        (**self).fulfillment_service(account_id, service_id)
    }

    fn fulfillment(
        &self,
        account_id: AccountId,
        fulfillment_id: FulfillmentId,
    ) -> Result<Fulfillment, StoreError> {
        (**self).fulfillment(account_id, fulfillment_id)
    }

    fn reference_exists(
        &self,
        account_id: AccountId,
        kind: EntityKind,
        reference: &str,
    ) -> Result<bool, StoreError> {
        (**self).reference_exists(account_id, kind, reference)
    }

    fn commit(&self, commit: Commit) -> Result<(), StoreError> {
        (**self).commit(commit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_errors_convert_with_a_prefix() {
        let err = DomainError::from(StoreError::Backend("lock poisoned".to_string()));
        assert_eq!(
            err,
            DomainError::ConcurrencyConflict("backend: lock poisoned".to_string())
        );

        let err = DomainError::from(StoreError::Conflict("order version 2, have 1".to_string()));
        assert_eq!(
            err,
            DomainError::ConcurrencyConflict("order version 2, have 1".to_string())
        );
    }
}
