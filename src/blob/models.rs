//! Data models for container provisioning
//!
//! This module defines the SAS validity window and the permission set
//! granted on staged containers.

use crate::error::{Result, StageError};
use azure_storage::shared_access_signature::service_sas::BlobSasPermissions;
use chrono::{DateTime, Duration, TimeZone, Utc};

/// Validity window of a shared access signature, always in UTC
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SasWindow {
    start: DateTime<Utc>,
    expiry: DateTime<Utc>,
}

impl SasWindow {
    /// Build a window from two instants in any timezone.
    ///
    /// Both ends are normalized to UTC; expiry must be strictly after start.
    pub fn new<Tz: TimeZone>(start: DateTime<Tz>, expiry: DateTime<Tz>) -> Result<Self> {
        let start = start.with_timezone(&Utc);
        let expiry = expiry.with_timezone(&Utc);

        if expiry <= start {
            return Err(StageError::invalid_sas_window(format!(
                "expiry {} is not after start {}",
                expiry.to_rfc3339(),
                start.to_rfc3339()
            )));
        }

        Ok(Self { start, expiry })
    }

    /// Window starting now and lasting `hours`
    pub fn from_now(hours: i64) -> Result<Self> {
        Self::starting_at(Utc::now(), hours)
    }

    pub fn starting_at<Tz: TimeZone>(start: DateTime<Tz>, hours: i64) -> Result<Self> {
        if hours <= 0 {
            return Err(StageError::invalid_sas_window(format!(
                "duration must be at least one hour, got {hours}"
            )));
        }
        let duration = Duration::try_hours(hours).ok_or_else(|| {
            StageError::invalid_sas_window(format!("duration of {hours} hours is out of range"))
        })?;
        let expiry = start.clone().checked_add_signed(duration).ok_or_else(|| {
            StageError::invalid_sas_window(format!("duration of {hours} hours is out of range"))
        })?;
        Self::new(start, expiry)
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn expiry(&self) -> DateTime<Utc> {
        self.expiry
    }
}

/// Permissions granted on every staged container
pub fn full_container_permissions() -> BlobSasPermissions {
    BlobSasPermissions {
        read: true,
        add: true,
        create: true,
        write: true,
        delete: true,
        list: true,
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    #[test]
    fn test_window_normalizes_to_utc() {
        let tz = FixedOffset::east_opt(5 * 3600).unwrap();
        let start = tz.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let window = SasWindow::starting_at(start, 2).unwrap();

        assert_eq!(window.start(), Utc.with_ymd_and_hms(2024, 6, 1, 7, 0, 0).unwrap());
        assert_eq!(window.expiry(), Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap());
    }

    #[test]
    fn test_window_rejects_non_positive_duration() {
        assert!(SasWindow::from_now(0).is_err());
        assert!(SasWindow::from_now(-3).is_err());
    }

    #[test]
    fn test_window_rejects_expiry_before_start() {
        let start = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        assert!(SasWindow::new(start, start).is_err());
        assert!(SasWindow::new(start, start - Duration::minutes(1)).is_err());
        assert!(SasWindow::new(start, start + Duration::seconds(1)).is_ok());
    }

    #[test]
    fn test_window_rejects_overflowing_duration() {
        assert!(SasWindow::from_now(i64::MAX).is_err());
    }

    #[test]
    fn test_full_permissions() {
        let perms = full_container_permissions();
        assert!(perms.read && perms.add && perms.create && perms.write && perms.delete && perms.list);
    }
}
