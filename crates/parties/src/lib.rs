//! `orderflow-parties` — accounts and the customers inside them.

pub mod account;
pub mod customer;

pub use account::Account;
pub use customer::{Customer, CustomerDetails, CustomerPatch};
