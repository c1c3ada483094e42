//! Date/time helpers for blobstage
//!
//! Conversions between chrono (used throughout the crate) and the
//! `time` types the Azure SDK expects, plus lenient duration parsing.

use crate::error::{Result, StageError};
use chrono::{DateTime, Utc};
use time::OffsetDateTime;

/// Convert a chrono UTC timestamp into an `OffsetDateTime` at whole-second precision
pub fn to_offset_datetime(dt: DateTime<Utc>) -> Result<OffsetDateTime> {
    OffsetDateTime::from_unix_timestamp(dt.timestamp()).map_err(|e| {
        StageError::invalid_sas_window(format!("timestamp {} out of range: {e}", dt.to_rfc3339()))
    })
}

/// Parse an hour count, falling back to zero on anything that is not an integer
pub fn parse_hours_lenient(input: &str) -> i64 {
    match input.trim().parse::<i64>() {
        Ok(hours) => hours,
        Err(_) => {
            tracing::warn!("Invalid SAS duration '{}', using 0 hours", input);
            0
        }
    }
}
