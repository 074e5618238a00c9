//! Concrete implementations of the domain ports: in-memory registries, the
//! system clock and the seeded identifier factory.

pub mod clock;
pub mod in_memory;
pub mod numbers;
