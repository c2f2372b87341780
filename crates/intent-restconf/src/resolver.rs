//! Approved-misalignment service
//!
//! Operators can sanction specific drift. For intent types that opt in, the
//! desired configuration is filtered before a synchronize, and audit reports
//! are filtered before they are returned. Both calls are "same shape in,
//! same shape out, minus approved entries".

use reqwest::blocking::Client;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use intent_model::AuditReport;

use crate::config::{ResolverConfig, RestconfConfig};
use crate::error::{DeviceError, Result};
use crate::http::{body_text, build_client, connectivity};

/// Desired configuration submitted for filtering
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct SynchronizeResolution<'a> {
    pub intent_type: &'a str,
    pub target: &'a str,
    pub device_id: &'a str,
    pub root_path: &'a str,
    pub desired_config: &'a Value,
}

/// Filters approved misalignments out of desired config and audit reports
pub trait MisalignmentResolver: Send + Sync {
    /// Desired configuration with approved deviations applied
    fn resolve_synchronize(&self, request: &SynchronizeResolution<'_>) -> Result<Value>;

    /// Report with approved findings removed
    fn resolve_audit(&self, report: &AuditReport) -> Result<AuditReport>;
}

/// Resolver backed by the controller's HTTP endpoints
pub struct HttpMisalignmentResolver {
    synchronize_url: String,
    audit_url: String,
    client: Client,
}

impl std::fmt::Debug for HttpMisalignmentResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpMisalignmentResolver")
            .field("synchronize_url", &self.synchronize_url)
            .field("audit_url", &self.audit_url)
            .finish()
    }
}

impl HttpMisalignmentResolver {
    /// Create a resolver; `None` when the endpoints are not configured
    pub fn from_config(resolver: &ResolverConfig, restconf: &RestconfConfig) -> Result<Option<Self>> {
        let (Some(synchronize_url), Some(audit_url)) =
            (resolver.synchronize_url.clone(), resolver.audit_url.clone())
        else {
            return Ok(None);
        };
        let client = build_client(restconf.timeout_secs, restconf.accept_invalid_certs)
            .map_err(|e| connectivity(&synchronize_url, e))?;
        Ok(Some(Self {
            synchronize_url,
            audit_url,
            client,
        }))
    }

    fn post<B: Serialize + ?Sized, T: DeserializeOwned>(&self, url: &str, body: &B) -> Result<T> {
        tracing::debug!(%url, "Resolver POST");
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .map_err(|e| connectivity(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DeviceError::status(status.as_u16()));
        }
        let text = body_text(response)?;
        serde_json::from_str(&text).map_err(|e| DeviceError::Decode {
            message: e.to_string(),
        })
    }
}

impl MisalignmentResolver for HttpMisalignmentResolver {
    fn resolve_synchronize(&self, request: &SynchronizeResolution<'_>) -> Result<Value> {
        self.post(&self.synchronize_url, request)
    }

    fn resolve_audit(&self, report: &AuditReport) -> Result<AuditReport> {
        self.post(&self.audit_url, report)
    }
}
