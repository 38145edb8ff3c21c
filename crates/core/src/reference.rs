//! Human-facing reference generation (order and invoice numbers).

use std::collections::HashMap;

use chrono::Utc;
use rand::Rng;

use crate::entity::EntityKind;
use crate::error::{DomainError, DomainResult};

/// Generates references of the form `PREFIX-YYYYMMDD-XXXXXXXX`.
///
/// The date is the current UTC day and the suffix is eight uppercase hex
/// digits drawn from a random `u32`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ReferenceGenerator;

impl ReferenceGenerator {
    pub fn new() -> Self {
        Self
    }

    /// One candidate reference. Suffixes are random, so collisions are
    /// possible; callers that need uniqueness go through [`generate_unique`].
    ///
    /// [`generate_unique`]: ReferenceGenerator::generate_unique
    pub fn generate(&self, prefix: &str) -> String {
        let date = Utc::now().format("%Y%m%d");
        let suffix: u32 = rand::thread_rng().gen_range(0..=u32::MAX);
        format!("{prefix}-{date}-{suffix:08X}")
    }

    /// Generate candidates until `is_taken` reports a free one, giving up
    /// after `max_attempts` tries with [`DomainError::GenerationExhausted`].
    ///
    /// Errors from `is_taken` (e.g. a store lookup failing) propagate as-is.
    pub fn generate_unique<F>(
        &self,
        prefix: &str,
        max_attempts: u32,
        mut is_taken: F,
    ) -> DomainResult<String>
    where
        F: FnMut(&str) -> DomainResult<bool>,
    {
        for _ in 0..max_attempts {
            let candidate = self.generate(prefix);
            if !is_taken(&candidate)? {
                return Ok(candidate);
            }
        }
        Err(DomainError::generation_exhausted(max_attempts))
    }
}

/// Which prefix each entity kind uses, plus the retry budget for uniqueness.
///
/// Defaults: `ORD` for orders, `INV` for invoices, five attempts. Kinds
/// without a configured prefix cannot have references generated for them.
#[derive(Debug, Clone)]
pub struct ReferenceConfig {
    prefixes: HashMap<EntityKind, String>,
    max_attempts: u32,
}

impl Default for ReferenceConfig {
    fn default() -> Self {
        let mut prefixes = HashMap::new();
        prefixes.insert(EntityKind::Order, "ORD".to_string());
        prefixes.insert(EntityKind::Invoice, "INV".to_string());
        Self {
            prefixes,
            max_attempts: 5,
        }
    }
}

impl ReferenceConfig {
    pub fn prefix_for(&self, kind: EntityKind) -> Option<&str> {
        self.prefixes.get(&kind).map(String::as_str)
    }

    pub fn with_prefix(mut self, kind: EntityKind, prefix: impl Into<String>) -> Self {
        self.prefixes.insert(kind, prefix.into());
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }
}
