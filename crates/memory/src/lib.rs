//! Memory store implementations for Baton.

pub mod in_memory;

pub use in_memory::InMemoryStore;
