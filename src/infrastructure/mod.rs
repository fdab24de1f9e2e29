//! Ticket store backends.

pub mod in_memory;
#[cfg(feature = "storage-mysql")]
pub mod mysql;
#[cfg(feature = "storage-rocksdb")]
pub mod rocksdb;
