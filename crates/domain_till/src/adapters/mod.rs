//! In-process adapters for the till's consumed contracts

pub mod memory;

pub use memory::{InMemoryEntryStore, InMemorySalesSource};
