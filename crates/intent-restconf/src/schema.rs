//! List key lookups over HTTP

use reqwest::blocking::Client;
use serde_json::Value;

use intent_compare::path::encode_key;
use intent_compare::{Error as CompareError, SchemaKeySource};

use crate::config::RestconfConfig;
use crate::error::{DeviceError, Result};
use crate::http::{body_text, build_client, connectivity};

/// Schema metadata service answering `GET <base>/<device>/<list path>`
///
/// The response is either a JSON array of key names or an object with a
/// `keys` array.
pub struct HttpSchemaKeySource {
    base_url: String,
    client: Client,
}

impl HttpSchemaKeySource {
    /// Create a key source against `base_url`
    pub fn new(base_url: impl Into<String>, restconf: &RestconfConfig) -> Result<Self> {
        let base_url = base_url.into();
        let client = build_client(restconf.timeout_secs, restconf.accept_invalid_certs)
            .map_err(|e| connectivity(&base_url, e))?;
        Ok(Self { base_url, client })
    }

    fn fetch(&self, device_id: &str, list_path: &str) -> Result<Vec<String>> {
        let url = format!(
            "{}/{}/{}",
            self.base_url.trim_end_matches('/'),
            encode_key(device_id),
            list_path.trim_start_matches('/')
        );
        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| connectivity(&url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DeviceError::status(status.as_u16()));
        }
        let body: Value = serde_json::from_str(&body_text(response)?).map_err(|e| {
            DeviceError::Decode {
                message: e.to_string(),
            }
        })?;
        parse_keys(&body).ok_or_else(|| DeviceError::Decode {
            message: format!("no key list in schema response for {list_path}"),
        })
    }
}

impl SchemaKeySource for HttpSchemaKeySource {
    fn list_keys(&self, device_id: &str, list_path: &str) -> intent_compare::Result<Vec<String>> {
        self.fetch(device_id, list_path)
            .map_err(|e| CompareError::KeyLookup {
                path: list_path.to_string(),
                message: e.to_string(),
            })
    }
}

fn parse_keys(body: &Value) -> Option<Vec<String>> {
    let list = match body {
        Value::Array(_) => body,
        Value::Object(map) => map.get("keys")?,
        _ => return None,
    };
    list.as_array()?
        .iter()
        .map(|k| k.as_str().map(str::to_string))
        .collect()
}
