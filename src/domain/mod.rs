//! Domain layer: ledger entities, policies and the split-payment state
//! machine. Everything here is pure and synchronous; the stores behind
//! `ports` are the only asynchronous seam.

pub mod account;
pub mod cashback;
pub mod commerciant;
pub mod commission;
pub mod exchange;
pub mod money;
pub mod operation;
pub mod ports;
pub mod split;
pub mod transaction;
pub mod user;
