//! Blocking HTTP implementation of [`DeviceClient`]

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::{Client, Response};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde_json::Value;

use intent_compare::path::encode_key;

use crate::client::DeviceClient;
use crate::config::RestconfConfig;
use crate::error::{DeviceError, Result};
use crate::patch::{PatchRequest, parse_patch_errors};

const YANG_DATA_JSON: &str = "application/yang-data+json";
const YANG_PATCH_JSON: &str = "application/yang-patch+json";

/// RESTCONF client reaching devices through a controller's device mount
pub struct HttpDeviceClient {
    config: RestconfConfig,
    client: Client,
}

impl std::fmt::Debug for HttpDeviceClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpDeviceClient")
            .field("base_url", &self.config.base_url)
            .finish()
    }
}

impl HttpDeviceClient {
    /// Create a client from connection settings
    pub fn new(config: RestconfConfig) -> Result<Self> {
        let client = build_client(config.timeout_secs, config.accept_invalid_certs)
            .map_err(|e| connectivity(&config.base_url, e))?;
        Ok(Self { config, client })
    }

    /// URL of `path` below a device's configuration root
    pub fn device_url(&self, device_id: &str, path: &str) -> String {
        let base = self.config.base_url.trim_end_matches('/');
        let root = self
            .config
            .device_root
            .trim_matches('/')
            .replace("{device}", &encode_key(device_id));
        let path = path.trim_start_matches('/');
        if path.is_empty() {
            format!("{base}/{root}")
        } else {
            format!("{base}/{root}/{path}")
        }
    }

    fn read(&self, device_id: &str, path: &str, content: &str) -> Result<Option<Value>> {
        let url = self.device_url(device_id, path);
        tracing::debug!(device = %device_id, %url, content, "RESTCONF GET");

        let response = self
            .client
            .get(&url)
            .query(&[("content", content)])
            .header(ACCEPT, YANG_DATA_JSON)
            .send()
            .map_err(|e| connectivity(device_id, e))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(DeviceError::status(status.as_u16()));
        }

        let body = body_text(response)?;
        if body.trim().is_empty() {
            return Ok(Some(Value::Null));
        }
        serde_json::from_str(&body)
            .map(Some)
            .map_err(|e| DeviceError::Decode {
                message: e.to_string(),
            })
    }
}

impl DeviceClient for HttpDeviceClient {
    fn get_config(&self, device_id: &str, path: &str) -> Result<Option<Value>> {
        self.read(device_id, path, "config")
    }

    fn get_state(&self, device_id: &str, path: &str) -> Result<Option<Value>> {
        self.read(device_id, path, "nonconfig")
    }

    fn patch(&self, device_id: &str, request: &PatchRequest) -> Result<()> {
        let url = self.device_url(device_id, "");
        tracing::debug!(device = %device_id, %url, patch_id = %request.patch_id, edits = request.edit.len(), "RESTCONF PATCH");

        let response = self
            .client
            .patch(&url)
            .header(CONTENT_TYPE, YANG_PATCH_JSON)
            .header(ACCEPT, YANG_DATA_JSON)
            .json(&request.to_body())
            .send()
            .map_err(|e| connectivity(device_id, e))?;

        let status = response.status();
        let body = body_text(response)?;
        check_write(status.as_u16(), &body)
    }

    fn remove(&self, device_id: &str, path: &str) -> Result<()> {
        let url = self.device_url(device_id, path);
        tracing::debug!(device = %device_id, %url, "RESTCONF DELETE");

        let response = self
            .client
            .delete(&url)
            .header(ACCEPT, YANG_DATA_JSON)
            .send()
            .map_err(|e| connectivity(device_id, e))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(());
        }
        let body = body_text(response)?;
        check_write(status.as_u16(), &body)
    }
}

pub(crate) fn build_client(
    timeout_secs: u64,
    accept_invalid_certs: bool,
) -> reqwest::Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .danger_accept_invalid_certs(accept_invalid_certs)
        .build()
}

pub(crate) fn connectivity(target: &str, error: reqwest::Error) -> DeviceError {
    DeviceError::Connectivity {
        target: target.to_string(),
        message: error.to_string(),
    }
}

pub(crate) fn body_text(response: Response) -> Result<String> {
    response.text().map_err(|e| DeviceError::Decode {
        message: e.to_string(),
    })
}

/// Outcome of a write from its status and body
///
/// Structured errors in the body win over the bare status, and are honoured
/// even on a success status.
fn check_write(status: u16, body: &str) -> Result<()> {
    let errors = serde_json::from_str::<Value>(body)
        .map(|v| parse_patch_errors(&v))
        .unwrap_or_default();

    if !errors.is_empty() {
        return Err(DeviceError::Patch { errors });
    }
    if (200..300).contains(&status) {
        Ok(())
    } else {
        Err(DeviceError::status(status))
    }
}
