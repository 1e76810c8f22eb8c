//! Store adapters. The in-memory adapter is the reference implementation;
//! a database-backed adapter would implement the same `GameStore` contract.

pub mod memory;

pub use memory::MemoryStore;
