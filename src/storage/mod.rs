//! Storage utilities and abstractions.
//!
//! ## Modules
//!
//! - `rocksdb`: Generic RocksDB utilities (configuration, handle, iteration, batches)

pub mod rocksdb;

pub use rocksdb::{index_key, BatchWriter, RocksDbConfig, RocksDbHandle};
