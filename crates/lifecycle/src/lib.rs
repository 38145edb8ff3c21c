//! `orderflow-lifecycle` — status transition tables.
//!
//! Each workflow (order, invoice, fulfillment) is a [`StateMachine`] whose
//! [`successors`](StateMachine::successors) table fully defines the legal
//! moves. [`transition`] is the only way status changes happen; a rejected
//! move leaves the entity exactly as it was.

pub mod machine;
pub mod status;
mod tables;

pub use machine::{StateMachine, TransitionError, transition};
pub use status::{Status, can_transition};
