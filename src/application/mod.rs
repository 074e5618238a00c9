//! Application layer containing the core business logic orchestration.
//!
//! This module defines the `BankEngine`, the primary entry point for
//! replaying operations. One handler per operation kind; handlers pull
//! entities from the stores, consult the exchange graph and the policies,
//! mutate balances under the domain invariants and append transaction
//! records.

pub mod engine;
mod payments;
mod plans;
mod reports;
mod splits;
