//! Utility functions for CLI operations.

use crate::board::{BoardService, ForumStorage};
use crate::config::BoardConfig;
use crate::error::{BoardError, Result};
use chrono::{TimeZone, Utc};
use serde::Serialize;
use std::io::Write;
use tracing::debug;

/// Open the on-disk board described by `config`
pub fn open_service(config: &BoardConfig) -> Result<BoardService<ForumStorage>> {
    debug!(
        data_dir = %config.data_dir.display(),
        profile = ?config.storage_profile,
        "Opening board storage"
    );
    let storage = ForumStorage::open(&config.data_dir, &config.storage_profile.rocksdb_config())?;
    Ok(BoardService::with_config(storage, config))
}

/// Format a millisecond timestamp as a UTC date and time
pub fn format_timestamp(millis: u64) -> String {
    i64::try_from(millis)
        .ok()
        .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
        .map(|dt| dt.format("%Y-%m-%d %H:%M UTC").to_string())
        .unwrap_or_else(|| millis.to_string())
}

/// Write a value as pretty JSON followed by a newline
pub fn write_json<W: Write, T: Serialize + ?Sized>(out: &mut W, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)
        .map_err(|e| BoardError::serialization(format!("JSON output failed: {}", e)))?;
    writeln!(out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(0), "1970-01-01 00:00 UTC");
        assert_eq!(format_timestamp(1_700_000_000_000), "2023-11-14 22:13 UTC");
        assert_eq!(format_timestamp(u64::MAX), u64::MAX.to_string());
    }

    #[test]
    fn test_write_json() {
        let mut out = Vec::new();
        write_json(&mut out, &vec!["a", "b"]).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.ends_with("]\n"));
        let back: Vec<String> = serde_json::from_str(&text).unwrap();
        assert_eq!(back, vec!["a", "b"]);
    }
}
