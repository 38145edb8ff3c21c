use chrono::{DateTime, NaiveDate, Utc};
use core::str::FromStr;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use orderflow_audit::{Auditable, FieldSnapshot};
use orderflow_core::{
    AccountId, DomainError, DomainResult, Entity, EntityKind, InvoiceId, Lifecycle, OrderId,
    round_money,
};
use orderflow_events::ResourceRef;

/// Invoice status lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    Draft,
    Sent,
    Paid,
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Draft => "draft",
            InvoiceStatus::Sent => "sent",
            InvoiceStatus::Paid => "paid",
        }
    }
}

impl core::fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InvoiceStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(InvoiceStatus::Draft),
            "sent" => Ok(InvoiceStatus::Sent),
            "paid" => Ok(InvoiceStatus::Paid),
            other => Err(DomainError::validation(format!(
                "unknown invoice status: {other}"
            ))),
        }
    }
}

/// Whether an invoice charges the customer or refunds them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceKind {
    Debit,
    Credit,
}

/// An invoice raised against one order.
///
/// Credit notes are invoices of kind `credit` with every amount negated;
/// they reverse a previously billed debit invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    id: InvoiceId,
    account_id: AccountId,
    order_id: OrderId,
    number: String,
    kind: InvoiceKind,
    status: InvoiceStatus,
    amount: Decimal,
    tax_amount: Decimal,
    total_amount: Decimal,
    issued_at: Option<DateTime<Utc>>,
    due_at: Option<NaiveDate>,
    paid_at: Option<NaiveDate>,
    version: u64,
}

impl Invoice {
    /// A fresh debit invoice in `draft`, not yet issued to the customer.
    pub fn draft(
        account_id: AccountId,
        order_id: OrderId,
        number: impl Into<String>,
        amount: Decimal,
        tax_amount: Decimal,
    ) -> DomainResult<Self> {
        let number = number.into();
        if number.trim().is_empty() {
            return Err(DomainError::validation("invoice number cannot be empty"));
        }
        if amount < Decimal::ZERO {
            return Err(DomainError::validation("invoice amount cannot be negative"));
        }
        if tax_amount < Decimal::ZERO {
            return Err(DomainError::validation("invoice tax cannot be negative"));
        }

        Ok(Self {
            id: InvoiceId::new(),
            account_id,
            order_id,
            number,
            kind: InvoiceKind::Debit,
            status: InvoiceStatus::Draft,
            amount,
            tax_amount,
            total_amount: round_money(amount + tax_amount),
            issued_at: None,
            due_at: None,
            paid_at: None,
            version: 0,
        })
    }

    /// A credit note reversing `source`: same order, every amount negated,
    /// born already `sent`. Credit notes have no due date.
    pub fn credit_note(
        source: &Invoice,
        number: impl Into<String>,
        issued_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        if source.kind == InvoiceKind::Credit {
            return Err(DomainError::invalid_state(
                "cannot issue a credit note against a credit note",
            ));
        }
        let number = number.into();
        if number.trim().is_empty() {
            return Err(DomainError::validation("invoice number cannot be empty"));
        }

        Ok(Self {
            id: InvoiceId::new(),
            account_id: source.account_id,
            order_id: source.order_id,
            number,
            kind: InvoiceKind::Credit,
            status: InvoiceStatus::Sent,
            amount: -source.amount,
            tax_amount: -source.tax_amount,
            total_amount: -source.total_amount,
            issued_at: Some(issued_at),
            due_at: None,
            paid_at: None,
            version: 0,
        })
    }

    pub fn account_id(&self) -> AccountId {
        self.account_id
    }

    pub fn order_id(&self) -> OrderId {
        self.order_id
    }

    pub fn number(&self) -> &str {
        &self.number
    }

    pub fn kind(&self) -> InvoiceKind {
        self.kind
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn tax_amount(&self) -> Decimal {
        self.tax_amount
    }

    pub fn total_amount(&self) -> Decimal {
        self.total_amount
    }

    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        self.issued_at
    }

    pub fn due_at(&self) -> Option<NaiveDate> {
        self.due_at
    }

    pub fn paid_at(&self) -> Option<NaiveDate> {
        self.paid_at
    }

    pub fn is_paid(&self) -> bool {
        self.status == InvoiceStatus::Paid
    }

    /// Stamp the issue and due dates. Paired with the `draft -> sent`
    /// transition by the workflow; performs no legality checks itself.
    pub fn issue(&mut self, issued_at: DateTime<Utc>, due_at: NaiveDate) {
        self.issued_at = Some(issued_at);
        self.due_at = Some(due_at);
    }

    /// Stamp the payment date. Paired with the `sent -> paid` transition.
    pub fn record_payment(&mut self, paid_on: NaiveDate) {
        self.paid_at = Some(paid_on);
    }
}

impl Entity for Invoice {
    type Id = InvoiceId;
    const KIND: EntityKind = EntityKind::Invoice;

    fn id(&self) -> InvoiceId {
        self.id
    }

    fn version(&self) -> u64 {
        self.version
    }

    fn set_version(&mut self, version: u64) {
        self.version = version;
    }
}

impl Lifecycle for Invoice {
    type Status = InvoiceStatus;

    fn status(&self) -> InvoiceStatus {
        self.status
    }

    fn set_status(&mut self, status: InvoiceStatus) {
        self.status = status;
    }
}

impl Auditable for Invoice {
    fn resource_ref(&self) -> ResourceRef {
        ResourceRef::Invoice(self.id)
    }

    fn snapshot(&self) -> FieldSnapshot {
        FieldSnapshot::new()
            .with("number", &self.number)
            .with("status", self.status)
            .with("amount", self.amount)
            .with("tax_amount", self.tax_amount)
            .with("total_amount", self.total_amount)
    }
}
