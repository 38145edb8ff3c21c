use thiserror::Error;

use orderflow_core::{DomainError, EntityKind, Lifecycle};

/// A status enum with a fixed transition table.
///
/// The table is the single source of truth for which status changes are
/// legal; everything else (workflow side effects, persistence) happens only
/// after the table says yes.
pub trait StateMachine: Copy + Eq + core::fmt::Debug + core::fmt::Display + 'static {
    /// Which entity kind this machine governs.
    fn kind() -> EntityKind;

    /// Statuses directly reachable from `self`. Empty for terminal statuses.
    fn successors(&self) -> &'static [Self];

    fn can_transition(&self, target: Self) -> bool {
        self.successors().contains(&target)
    }

    fn is_terminal(&self) -> bool {
        self.successors().is_empty()
    }
}

/// A status change the transition table does not allow.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("cannot transition {kind} from {from} to {to}")]
pub struct TransitionError {
    pub kind: EntityKind,
    pub from: String,
    pub to: String,
}

impl From<TransitionError> for DomainError {
    fn from(err: TransitionError) -> Self {
        DomainError::InvalidTransition {
            kind: err.kind,
            from: err.from,
            to: err.to,
        }
    }
}

/// Move `entity` to `target` if its machine allows it.
///
/// On rejection the entity's status is untouched. Asking for the current
/// status again is a rejection too: self-loops are not in any table.
pub fn transition<E>(entity: &mut E, target: E::Status) -> Result<(), TransitionError>
where
    E: Lifecycle,
    E::Status: StateMachine,
{
    let current = entity.status();
    if !current.can_transition(target) {
        return Err(TransitionError {
            kind: E::Status::kind(),
            from: current.to_string(),
            to: target.to_string(),
        });
    }
    entity.set_status(target);
    Ok(())
}
