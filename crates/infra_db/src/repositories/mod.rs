//! Repository implementations for the till's persistence contracts

pub mod entries;
pub mod sales;

pub use entries::PgEntryStore;
pub use sales::PgSalesSource;
