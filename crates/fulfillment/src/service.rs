use serde::{Deserialize, Serialize};

use orderflow_core::{
    AccountId, DomainError, DomainResult, Entity, EntityKind, FulfillmentServiceId,
};

/// A configured carrier integration (e.g. an account's UPS connection).
///
/// Fulfillments can only be created through an active service; deactivating
/// one leaves its existing fulfillments untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FulfillmentService {
    id: FulfillmentServiceId,
    account_id: AccountId,
    name: String,
    provider: String,
    active: bool,
    version: u64,
}

impl FulfillmentService {
    pub fn new(
        account_id: AccountId,
        name: impl Into<String>,
        provider: impl Into<String>,
    ) -> DomainResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("service name cannot be empty"));
        }
        let provider = provider.into();
        if provider.trim().is_empty() {
            return Err(DomainError::validation("service provider cannot be empty"));
        }

        Ok(Self {
            id: FulfillmentServiceId::new(),
            account_id,
            name,
            provider,
            active: true,
            version: 0,
        })
    }

    pub fn account_id(&self) -> AccountId {
        self.account_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn provider(&self) -> &str {
        &self.provider
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }
}

impl Entity for FulfillmentService {
    type Id = FulfillmentServiceId;
    const KIND: EntityKind = EntityKind::FulfillmentService;

    fn id(&self) -> FulfillmentServiceId {
        self.id
    }

    fn version(&self) -> u64 {
        self.version
    }

    fn set_version(&mut self, version: u64) {
        self.version = version;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_service_starts_active() {
        let service = FulfillmentService::new(AccountId::new(), "Main warehouse", "ups").unwrap();
        assert!(service.is_active());
        assert_eq!(service.provider(), "ups");
        assert_eq!(service.version(), 0);
    }

    #[test]
    fn rejects_blank_name_or_provider() {
        match FulfillmentService::new(AccountId::new(), " ", "ups").unwrap_err() {
            DomainError::Validation(_) => {}
            _ => panic!("Expected Validation error for blank name"),
        }
        match FulfillmentService::new(AccountId::new(), "Main", "  ").unwrap_err() {
            DomainError::Validation(_) => {}
            _ => panic!("Expected Validation error for blank provider"),
        }
    }

    #[test]
    fn deactivation_toggles() {
        let mut service = FulfillmentService::new(AccountId::new(), "Main", "ups").unwrap();
        service.set_active(false);
        assert!(!service.is_active());
    }
}
