use serde::{Deserialize, Serialize};

use orderflow_core::{AccountId, DomainError, DomainResult, Entity, EntityKind};

/// An account: the isolation boundary every other record hangs off.
///
/// Orders, invoices and fulfillments belong to exactly one account and are
/// never visible across accounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    id: AccountId,
    name: String,
    version: u64,
}

impl Account {
    pub fn new(name: impl Into<String>) -> DomainResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("account name cannot be empty"));
        }
        Ok(Self {
            id: AccountId::new(),
            name,
            version: 0,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Entity for Account {
    type Id = AccountId;
    const KIND: EntityKind = EntityKind::Account;

    fn id(&self) -> AccountId {
        self.id
    }

    fn version(&self) -> u64 {
        self.version
    }

    fn set_version(&mut self, version: u64) {
        self.version = version;
    }
}
