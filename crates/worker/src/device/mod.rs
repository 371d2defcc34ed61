//! Biometric attendance devices.
//!
//! Devices keep their clock in office local time, so punches are reported
//! as naive local timestamps and converted to UTC by the sync job.

pub mod gateway;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::Deserialize;

/// One raw punch as read from a device.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DevicePunch {
    /// User id enrolled on the device (matches `employees.biometric_pin`).
    pub pin: String,
    pub timestamp: NaiveDateTime,
    #[serde(default)]
    pub verify_mode: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    /// Network, DNS or timeout failure.
    #[error("Device request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Device returned HTTP {0}")]
    HttpStatus(u16),

    #[error("Invalid device response: {0}")]
    InvalidResponse(String),
}

#[async_trait]
pub trait AttendanceDevice: Send + Sync {
    /// Punches recorded at or after `since` (device local time), or every
    /// stored punch when `since` is `None`.
    async fn fetch_punches(
        &self,
        since: Option<NaiveDateTime>,
    ) -> Result<Vec<DevicePunch>, DeviceError>;
}
