//! Shared RocksDB storage utilities.
//!
//! Generic helpers only: nothing in here knows about categories or forums.
//! Board-specific layout lives in `board::storage`.
//!
//! ## Key Features
//!
//! - Configurable RocksDB setup with a default and a server profile
//! - Bincode-encoded key-value operations
//! - Prefix iteration for secondary indexes
//! - Atomic multi-key writes through [`BatchWriter`]

use crate::error::{BoardError, Result};
use rocksdb::{
    BoundColumnFamily, ColumnFamilyDescriptor, DBWithThreadMode, MultiThreaded, Options,
    WriteBatch,
};
use serde::{de::DeserializeOwned, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, trace, warn};

// =============================================================================
// RocksDB Configuration
// =============================================================================

/// Configuration for RocksDB storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RocksDbConfig {
    /// Maximum number of open files.
    pub max_open_files: i32,
    /// Number of log files to keep.
    pub keep_log_file_num: usize,
    /// Maximum WAL size in bytes.
    pub max_wal_size: u64,
    /// Write buffer size in bytes.
    pub write_buffer_size: usize,
    /// Maximum number of write buffers.
    pub max_write_buffer_number: i32,
}

impl Default for RocksDbConfig {
    fn default() -> Self {
        Self {
            max_open_files: 64,
            keep_log_file_num: 2,
            max_wal_size: 16 * 1024 * 1024,      // 16MB
            write_buffer_size: 8 * 1024 * 1024, // 8MB
            max_write_buffer_number: 2,
        }
    }
}

impl RocksDbConfig {
    /// Creates a configuration for a long-running board server.
    ///
    /// Board data is small and read-heavy, so this mostly raises the file
    /// and WAL limits rather than the write buffers.
    pub fn for_server() -> Self {
        Self {
            max_open_files: 256,
            keep_log_file_num: 3,
            max_wal_size: 64 * 1024 * 1024,       // 64MB
            write_buffer_size: 16 * 1024 * 1024, // 16MB
            max_write_buffer_number: 3,
        }
    }

    /// Builds RocksDB Options from this configuration.
    pub fn build_options(&self) -> Options {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);
        opts.set_max_open_files(self.max_open_files);
        opts.set_keep_log_file_num(self.keep_log_file_num);
        opts.set_max_total_wal_size(self.max_wal_size);
        opts.increase_parallelism(num_cpus::get() as i32);
        opts.set_write_buffer_size(self.write_buffer_size);
        opts.set_max_write_buffer_number(self.max_write_buffer_number);
        opts.set_compression_type(rocksdb::DBCompressionType::Lz4);
        opts
    }
}

// =============================================================================
// Key Generation Utilities
// =============================================================================

/// Concatenates key parts without separators.
///
/// Index keys are built from fixed-width parts (16-byte ids, 8-byte
/// big-endian timestamps), so plain concatenation keeps them prefix-iterable
/// and lexicographically ordered.
pub fn index_key(parts: &[&[u8]]) -> Vec<u8> {
    let len = parts.iter().map(|p| p.len()).sum();
    let mut key = Vec::with_capacity(len);
    for part in parts {
        key.extend_from_slice(part);
    }
    key
}

fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    bincode::serialize(value)
        .map_err(|e| BoardError::serialization(format!("Failed to serialize: {}", e)))
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    bincode::deserialize(bytes)
        .map_err(|e| BoardError::serialization(format!("Failed to deserialize: {}", e)))
}

// =============================================================================
// Database Handle Wrapper
// =============================================================================

/// A wrapper around RocksDB that provides common operations.
///
/// Embedded in domain storage structs, which add their own column family
/// layout on top.
pub struct RocksDbHandle {
    db: Arc<DBWithThreadMode<MultiThreaded>>,
}

impl RocksDbHandle {
    /// Opens a RocksDB database with the given column families.
    pub fn open(
        db_path: impl AsRef<Path>,
        config: &RocksDbConfig,
        column_families: &[&str],
    ) -> Result<Self> {
        let opts = config.build_options();
        let cf_opts = Options::default();

        let cf_descriptors: Vec<_> = column_families
            .iter()
            .map(|cf| ColumnFamilyDescriptor::new(*cf, cf_opts.clone()))
            .collect();

        let db = DBWithThreadMode::<MultiThreaded>::open_cf_descriptors(
            &opts,
            db_path.as_ref(),
            cf_descriptors,
        )
        .map_err(|e| BoardError::storage(format!("Failed to open RocksDB: {}", e)))?;

        Ok(Self { db: Arc::new(db) })
    }

    /// Gets a column family handle.
    pub fn cf(&self, name: &str) -> Result<Arc<BoundColumnFamily<'_>>> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| BoardError::storage(format!("Column family '{}' not found", name)))
    }

    /// Stores a serializable value at the given key.
    pub fn put<T: Serialize>(&self, cf_name: &str, key: &[u8], value: &T) -> Result<()> {
        let cf = self.cf(cf_name)?;
        let bytes = encode(value)?;

        trace!(
            cf = cf_name,
            key_len = key.len(),
            value_bytes = bytes.len(),
            "db_put: storing serialized value"
        );

        self.db
            .put_cf(&cf, key, &bytes)
            .map_err(|e| BoardError::storage(format!("Failed to write: {}", e)))
    }

    /// Loads and deserializes a value from the given key.
    pub fn get<T: DeserializeOwned>(&self, cf_name: &str, key: &[u8]) -> Result<Option<T>> {
        match self.get_raw(cf_name, key)? {
            Some(bytes) => decode(&bytes).map(Some),
            None => Ok(None),
        }
    }

    /// Loads raw bytes from the given key.
    pub fn get_raw(&self, cf_name: &str, key: &[u8]) -> Result<Option<Vec<u8>>> {
        let cf = self.cf(cf_name)?;

        match self.db.get_cf(&cf, key) {
            Ok(Some(bytes)) => {
                trace!(
                    cf = cf_name,
                    key_len = key.len(),
                    value_bytes = bytes.len(),
                    "db_get: found record"
                );
                Ok(Some(bytes))
            }
            Ok(None) => {
                trace!(cf = cf_name, key_len = key.len(), "db_get: key not found");
                Ok(None)
            }
            Err(e) => Err(BoardError::storage(format!("Failed to read: {}", e))),
        }
    }

    /// Checks if a key exists.
    pub fn exists(&self, cf_name: &str, key: &[u8]) -> Result<bool> {
        Ok(self.get_raw(cf_name, key)?.is_some())
    }

    /// Iterates over all entries with the given prefix.
    ///
    /// The callback receives (key, value) pairs and returns false to stop.
    pub fn prefix_iterate<F>(&self, cf_name: &str, prefix: &[u8], mut callback: F) -> Result<()>
    where
        F: FnMut(&[u8], &[u8]) -> bool,
    {
        let cf = self.cf(cf_name)?;
        let iter = self.db.prefix_iterator_cf(&cf, prefix);

        let mut count: usize = 0;
        for item in iter {
            let (key, value) =
                item.map_err(|e| BoardError::storage(format!("Iterator error: {}", e)))?;
            if !key.starts_with(prefix) {
                break;
            }
            count += 1;
            if !callback(&key, &value) {
                break;
            }
        }

        debug!(
            cf = cf_name,
            prefix_len = prefix.len(),
            records_iterated = count,
            "db_prefix_iterate: completed iteration"
        );

        Ok(())
    }

    /// Collects the key suffixes (everything after `prefix`) of all entries
    /// under the prefix. Used to read id lists out of secondary indexes.
    pub fn prefix_suffixes(&self, cf_name: &str, prefix: &[u8]) -> Result<Vec<Vec<u8>>> {
        let mut suffixes = Vec::new();
        self.prefix_iterate(cf_name, prefix, |key, _| {
            suffixes.push(key[prefix.len()..].to_vec());
            true
        })?;
        Ok(suffixes)
    }

    /// Deserializes every value in a column family.
    ///
    /// Records that fail to decode are skipped with a warning so a single
    /// corrupt row does not hide the rest of the table.
    pub fn collect_all<T: DeserializeOwned>(&self, cf_name: &str) -> Result<Vec<T>> {
        let cf = self.cf(cf_name)?;
        let iter = self.db.iterator_cf(&cf, rocksdb::IteratorMode::Start);

        let mut results = Vec::new();
        let mut errors: usize = 0;
        for item in iter {
            let (_, value) =
                item.map_err(|e| BoardError::storage(format!("Iterator error: {}", e)))?;
            match decode(&value) {
                Ok(record) => results.push(record),
                Err(e) => {
                    errors += 1;
                    warn!(cf = cf_name, "Skipping undecodable record: {}", e);
                }
            }
        }

        debug!(
            cf = cf_name,
            records_collected = results.len(),
            deserialization_errors = errors,
            "db_collect_all: collected records"
        );

        Ok(results)
    }

    /// Starts an atomic batch of writes against this database.
    pub fn batch(&self) -> BatchWriter<'_> {
        BatchWriter {
            handle: self,
            batch: WriteBatch::default(),
            ops: 0,
        }
    }
}

impl std::fmt::Debug for RocksDbHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RocksDbHandle")
            .field("db", &"RocksDB")
            .finish()
    }
}

// =============================================================================
// Batched Writes
// =============================================================================

/// Accumulates puts and deletes across column families and applies them in
/// a single atomic RocksDB write.
///
/// Dropping the writer without calling [`BatchWriter::commit`] discards
/// every queued operation.
pub struct BatchWriter<'a> {
    handle: &'a RocksDbHandle,
    batch: WriteBatch,
    ops: usize,
}

impl BatchWriter<'_> {
    /// Queues a serialized value.
    pub fn put<T: Serialize>(&mut self, cf_name: &str, key: &[u8], value: &T) -> Result<()> {
        let bytes = encode(value)?;
        self.put_raw(cf_name, key, &bytes)
    }

    /// Queues raw bytes.
    pub fn put_raw(&mut self, cf_name: &str, key: &[u8], value: &[u8]) -> Result<()> {
        let cf = self.handle.cf(cf_name)?;
        self.batch.put_cf(&cf, key, value);
        self.ops += 1;
        Ok(())
    }

    /// Queues a delete.
    pub fn delete(&mut self, cf_name: &str, key: &[u8]) -> Result<()> {
        let cf = self.handle.cf(cf_name)?;
        self.batch.delete_cf(&cf, key);
        self.ops += 1;
        Ok(())
    }

    /// Applies all queued operations atomically.
    pub fn commit(self) -> Result<()> {
        trace!(ops = self.ops, "db_batch: committing");
        self.handle
            .db
            .write(self.batch)
            .map_err(|e| BoardError::storage(format!("Failed to write batch: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use tempfile::TempDir;

    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
    struct Row {
        name: String,
        order: i32,
    }

    fn create_test_db() -> (RocksDbHandle, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test_db");
        let config = RocksDbConfig::default();
        let db = RocksDbHandle::open(&db_path, &config, &["rows", "idx"]).expect("Failed to open db");
        (db, temp_dir)
    }

    #[test]
    fn test_index_key_concatenates() {
        let key = index_key(&[b"abc", b"", b"de"]);
        assert_eq!(key, b"abcde");
    }

    #[test]
    fn test_put_and_get() {
        let (db, _temp) = create_test_db();
        let row = Row {
            name: "General".to_string(),
            order: 3,
        };

        db.put("rows", b"k1", &row).unwrap();

        let loaded: Row = db.get("rows", b"k1").unwrap().unwrap();
        assert_eq!(loaded, row);
        assert!(db.exists("rows", b"k1").unwrap());
        assert!(!db.exists("rows", b"k2").unwrap());
    }

    #[test]
    fn test_get_missing_key() {
        let (db, _temp) = create_test_db();
        let result: Option<Row> = db.get("rows", b"nonexistent").unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_unknown_column_family() {
        let (db, _temp) = create_test_db();
        let err = db.get_raw("nope", b"k").unwrap_err();
        assert!(matches!(err, BoardError::Storage(_)));
    }

    #[test]
    fn test_prefix_suffixes() {
        let (db, _temp) = create_test_db();
        let mut batch = db.batch();
        batch.put_raw("idx", b"aaa1", b"").unwrap();
        batch.put_raw("idx", b"aaa2", b"").unwrap();
        batch.put_raw("idx", b"aab1", b"").unwrap();
        batch.commit().unwrap();

        let suffixes = db.prefix_suffixes("idx", b"aaa").unwrap();
        assert_eq!(suffixes, vec![b"1".to_vec(), b"2".to_vec()]);
    }

    #[test]
    fn test_batch_is_atomic_and_droppable() {
        let (db, _temp) = create_test_db();

        let mut batch = db.batch();
        batch.put_raw("rows", b"dropped", b"x").unwrap();
        drop(batch);
        assert!(!db.exists("rows", b"dropped").unwrap());

        let mut batch = db.batch();
        batch.put_raw("rows", b"a", b"1").unwrap();
        batch.put_raw("idx", b"a", b"").unwrap();
        batch.delete("rows", b"missing").unwrap();
        batch.commit().unwrap();
        assert!(db.exists("rows", b"a").unwrap());
        assert!(db.exists("idx", b"a").unwrap());
    }

    #[test]
    fn test_collect_all_skips_corrupt_rows() {
        let (db, _temp) = create_test_db();
        db.put(
            "rows",
            b"good",
            &Row {
                name: "ok".to_string(),
                order: 1,
            },
        )
        .unwrap();
        let mut batch = db.batch();
        batch.put_raw("rows", b"bad", &[0xff]).unwrap();
        batch.commit().unwrap();

        let rows: Vec<Row> = db.collect_all("rows").unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn test_server_config() {
        let config = RocksDbConfig::for_server();
        assert_eq!(config.max_open_files, 256);
        assert_ne!(config, RocksDbConfig::default());
    }
}
