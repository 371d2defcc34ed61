//! HTTP gateway in front of a biometric machine.
//!
//! `GET {base}/api/punches?since=YYYY-MM-DDTHH:MM:SS` answers
//! `{"punches": [{"pin": "1001", "timestamp": "2026-10-16T08:02:11", "verify_mode": "fingerprint"}]}`.

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::Deserialize;
use studio_db::models::biometric::BiometricMachine;

use super::{AttendanceDevice, DeviceError, DevicePunch};

const SINCE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

#[derive(Debug, Deserialize)]
struct PunchesResponse {
    punches: Vec<DevicePunch>,
}

pub struct HttpDeviceGateway {
    client: reqwest::Client,
    base_url: String,
}

impl HttpDeviceGateway {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, DeviceError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Gateway for a registered machine at `http://{ip_address}:{port}`.
    pub fn for_machine(machine: &BiometricMachine, timeout: Duration) -> Result<Self, DeviceError> {
        Self::new(
            format!("http://{}:{}", machine.ip_address, machine.port),
            timeout,
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl AttendanceDevice for HttpDeviceGateway {
    async fn fetch_punches(
        &self,
        since: Option<NaiveDateTime>,
    ) -> Result<Vec<DevicePunch>, DeviceError> {
        let mut request = self.client.get(format!("{}/api/punches", self.base_url));
        if let Some(since) = since {
            request = request.query(&[("since", since.format(SINCE_FORMAT).to_string())]);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(DeviceError::HttpStatus(response.status().as_u16()));
        }

        let body = response.text().await?;
        let parsed: PunchesResponse = serde_json::from_str(&body)
            .map_err(|e| DeviceError::InvalidResponse(e.to_string()))?;

        tracing::debug!(
            base_url = %self.base_url,
            count = parsed.punches.len(),
            "Fetched punches from device"
        );
        Ok(parsed.punches)
    }
}
