use serde::{Deserialize, Serialize};

use orderflow_audit::{Auditable, FieldSnapshot};
use orderflow_core::{AccountId, CustomerId, DomainError, DomainResult, Entity, EntityKind};
use orderflow_events::ResourceRef;

/// Contact and naming details supplied when creating a customer.
///
/// All fields are optional; blank strings are treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerDetails {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// Partial update for a customer.
///
/// `None` keeps the current value; `Some(value)` replaces it, with a blank
/// string clearing the field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomerPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// A customer within one account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    id: CustomerId,
    account_id: AccountId,
    first_name: Option<String>,
    last_name: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    address: Option<String>,
    version: u64,
}

impl Customer {
    pub fn new(account_id: AccountId, details: CustomerDetails) -> DomainResult<Self> {
        let email = normalize(details.email);
        validate_email(email.as_deref())?;

        Ok(Self {
            id: CustomerId::new(),
            account_id,
            first_name: normalize(details.first_name),
            last_name: normalize(details.last_name),
            email,
            phone: normalize(details.phone),
            address: normalize(details.address),
            version: 0,
        })
    }

    pub fn account_id(&self) -> AccountId {
        self.account_id
    }

    pub fn first_name(&self) -> Option<&str> {
        self.first_name.as_deref()
    }

    pub fn last_name(&self) -> Option<&str> {
        self.last_name.as_deref()
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    pub fn phone(&self) -> Option<&str> {
        self.phone.as_deref()
    }

    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }

    /// Apply a partial update. A failed patch leaves the customer untouched.
    pub fn apply_patch(&mut self, patch: CustomerPatch) -> DomainResult<()> {
        let email = match patch.email {
            Some(value) => normalize(Some(value)),
            None => self.email.clone(),
        };
        validate_email(email.as_deref())?;

        if let Some(value) = patch.first_name {
            self.first_name = normalize(Some(value));
        }
        if let Some(value) = patch.last_name {
            self.last_name = normalize(Some(value));
        }
        if let Some(value) = patch.phone {
            self.phone = normalize(Some(value));
        }
        if let Some(value) = patch.address {
            self.address = normalize(Some(value));
        }
        self.email = email;
        Ok(())
    }

    /// Best available human-readable label for this customer.
    pub fn display_name(&self) -> String {
        match (&self.first_name, &self.last_name) {
            (Some(first), Some(last)) => format!("{first} {last}"),
            (Some(first), None) => first.clone(),
            (None, Some(last)) => last.clone(),
            (None, None) => self
                .email
                .clone()
                .unwrap_or_else(|| format!("Customer #{}", self.id)),
        }
    }
}

fn normalize(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let trimmed = v.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

fn validate_email(email: Option<&str>) -> DomainResult<()> {
    if let Some(email) = email {
        if !email.contains('@') {
            return Err(DomainError::validation(format!("invalid email: {email}")));
        }
    }
    Ok(())
}

impl Entity for Customer {
    type Id = CustomerId;
    const KIND: EntityKind = EntityKind::Customer;

    fn id(&self) -> CustomerId {
        self.id
    }

    fn version(&self) -> u64 {
        self.version
    }

    fn set_version(&mut self, version: u64) {
        self.version = version;
    }
}

impl Auditable for Customer {
    fn resource_ref(&self) -> ResourceRef {
        ResourceRef::Customer(self.id)
    }

    fn snapshot(&self) -> FieldSnapshot {
        FieldSnapshot::new()
            .with("first_name", &self.first_name)
            .with("last_name", &self.last_name)
            .with("email", &self.email)
            .with("phone", &self.phone)
            .with("address", &self.address)
    }
}
