//! Runtime configuration read from environment variables.
//!
//! | Variable | Default | Meaning |
//! |---|---|---|
//! | `BBFORUM_DATA_DIR` | `bbforum_data` | directory holding the board database |
//! | `BBFORUM_STORAGE_PROFILE` | `default` | `default` or `server` RocksDB tuning |
//! | `BBFORUM_PAGE_SIZE` | `20` | threads per forum page (1-100) |
//! | `BBFORUM_SHORT_CODE_ATTEMPTS` | `3` | short code resolutions tried before giving up on write conflicts |

use crate::error::{BoardError, Result};
use crate::storage::RocksDbConfig;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::debug;

/// Default data directory name.
pub const DEFAULT_DATA_DIR: &str = "bbforum_data";

/// Default number of threads per forum page.
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Largest accepted page size.
pub const MAX_PAGE_SIZE: usize = 100;

/// Default number of short code resolutions per forum write.
pub const DEFAULT_SHORT_CODE_ATTEMPTS: usize = 3;

/// RocksDB tuning profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageProfile {
    #[default]
    Default,
    Server,
}

impl StorageProfile {
    pub fn rocksdb_config(&self) -> RocksDbConfig {
        match self {
            StorageProfile::Default => RocksDbConfig::default(),
            StorageProfile::Server => RocksDbConfig::for_server(),
        }
    }
}

impl FromStr for StorageProfile {
    type Err = BoardError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "default" => Ok(StorageProfile::Default),
            "server" => Ok(StorageProfile::Server),
            other => Err(BoardError::config(format!(
                "Unknown storage profile '{}' (expected 'default' or 'server')",
                other
            ))),
        }
    }
}

/// Board configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardConfig {
    pub data_dir: PathBuf,
    pub storage_profile: StorageProfile,
    pub page_size: usize,
    pub max_short_code_attempts: usize,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            storage_profile: StorageProfile::Default,
            page_size: DEFAULT_PAGE_SIZE,
            max_short_code_attempts: DEFAULT_SHORT_CODE_ATTEMPTS,
        }
    }
}

impl BoardConfig {
    /// Loads the configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads the configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(dir) = lookup("BBFORUM_DATA_DIR").filter(|v| !v.trim().is_empty()) {
            config.data_dir = PathBuf::from(dir.trim());
        }
        if let Some(profile) = lookup("BBFORUM_STORAGE_PROFILE") {
            config.storage_profile = profile.parse()?;
        }
        if let Some(size) = lookup("BBFORUM_PAGE_SIZE") {
            config.page_size = parse_number("BBFORUM_PAGE_SIZE", &size)?;
        }
        if let Some(attempts) = lookup("BBFORUM_SHORT_CODE_ATTEMPTS") {
            config.max_short_code_attempts =
                parse_number("BBFORUM_SHORT_CODE_ATTEMPTS", &attempts)?;
        }

        config.validate()?;
        debug!(?config, "Loaded board configuration");
        Ok(config)
    }

    /// Checks value ranges.
    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_PAGE_SIZE).contains(&self.page_size) {
            return Err(BoardError::config(format!(
                "Page size must be between 1 and {}",
                MAX_PAGE_SIZE
            )));
        }
        if self.max_short_code_attempts == 0 {
            return Err(BoardError::config(
                "Short code attempts must be at least 1",
            ));
        }
        Ok(())
    }
}

fn parse_number(key: &str, value: &str) -> Result<usize> {
    value
        .trim()
        .parse()
        .map_err(|e| BoardError::config(format!("Invalid {} value '{}': {}", key, value, e)))
}
