//! Database operations for vendio-dq
//!
//! One module per table; free async functions over the shared pool. Entity
//! mutation functions take any SQLite executor so the bulk mutator can run
//! them inside a transaction when configured to.

pub mod bulk_sessions;
pub mod customers;
pub mod deals;
pub mod transactions;
pub mod validation_logs;

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;
use vendio_common::{Error, Result};

pub(crate) fn parse_uuid(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw).map_err(|e| Error::Internal(format!("Invalid UUID in database: {}", e)))
}

pub(crate) fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::Internal(format!("Invalid timestamp in database: {}", e)))
}

pub(crate) fn parse_day(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|e| Error::Internal(format!("Invalid date in database: {}", e)))
}

/// Decode a JSON string-list column; malformed content degrades to empty
pub(crate) fn decode_string_list(raw: &str) -> Vec<String> {
    serde_json::from_str(raw).unwrap_or_default()
}

pub(crate) fn encode_string_list(values: &[String]) -> Result<String> {
    serde_json::to_string(values)
        .map_err(|e| Error::Internal(format!("Failed to serialize list: {}", e)))
}
