//! HTTP client for the Hue bridge REST API.

use std::collections::HashMap;
use std::time::Duration;

use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::errors::Error;
use crate::payload::StatePayload;

type Result<T> = std::result::Result<T, Error>;

/// A light as reported by the bridge's lights listing.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LightInfo {
    pub name: String,
    pub state: LightState,
}

/// The relevant slice of a bridge light's state.
///
/// Bulbs without color support omit hue/sat; those default to zero so the
/// decoded color degrades to a gray ramp instead of failing.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LightState {
    pub on: bool,
    #[serde(default)]
    pub hue: u16,
    #[serde(default)]
    pub sat: u8,
    #[serde(default)]
    pub bri: u8,
}

#[derive(Debug, Deserialize)]
struct ApiResult {
    success: Option<RegisterSuccess>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct RegisterSuccess {
    username: String,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(rename = "type")]
    error_type: u16,
    description: String,
}

/// An HTTP client bound to one bridge address.
///
/// All bridge communication goes through this type: the registration call
/// used during pairing, the lights listing used by discovery, and the
/// per-light state updates issued by the sync engine.
#[derive(Debug, Clone)]
pub struct BridgeClient {
    base_url: String,
    http: reqwest::Client,
}

impl BridgeClient {
    /// How this software identifies itself to the bridge when registering.
    const DEVICE_TYPE: &'static str = "hue-lights-rs#gateway";
    const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

    /// Create a client for the bridge at the given address.
    ///
    /// `address` is an IP or hostname; a full `http://` / `https://` URL
    /// is also accepted.
    pub fn new(address: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Self::REQUEST_TIMEOUT)
            .build()?;
        Ok(Self::from_reqwest(address, http))
    }

    /// Create a client from a preconfigured `reqwest::Client`.
    pub fn from_reqwest(address: &str, http: reqwest::Client) -> Self {
        let base_url = if address.starts_with("http://") || address.starts_with("https://") {
            address.trim_end_matches('/').to_string()
        } else {
            format!("http://{address}")
        };
        BridgeClient { base_url, http }
    }

    /// Register this software with the bridge, returning the credential.
    ///
    /// Succeeds only while the bridge's link button window is open;
    /// otherwise the bridge answers with error type 101.
    pub async fn register(&self) -> Result<String> {
        let url = format!("{}/api", self.base_url);
        let body = json!({ "devicetype": Self::DEVICE_TYPE });

        let results: Vec<ApiResult> = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        debug!("registration response: {results:?}");

        for result in results {
            if let Some(success) = result.success {
                return Ok(success.username);
            }
            if let Some(error) = result.error {
                return Err(Error::bridge(error.error_type, &error.description));
            }
        }
        Err(Error::bridge(0, "malformed registration response"))
    }

    /// List all lights known to the bridge, keyed by bridge-local id.
    pub async fn get_lights(&self, credential: &str) -> Result<HashMap<String, LightInfo>> {
        let url = format!("{}/api/{credential}/lights", self.base_url);

        let value: Value = self
            .http
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        check_bridge_error(&value)?;

        serde_json::from_value(value).map_err(Error::JsonLoad)
    }

    /// Push a state update for one light.
    ///
    /// The bridge answers with a text blob that is not inspected beyond
    /// the HTTP status.
    pub async fn set_state(
        &self,
        credential: &str,
        light_id: &str,
        payload: &StatePayload,
    ) -> Result<()> {
        let url = format!("{}/api/{credential}/lights/{light_id}/state", self.base_url);
        debug!("PUT {url}: {payload:?}");

        self.http
            .put(&url)
            .json(payload)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

/// The bridge reports failures as a 200 response carrying an error array.
fn check_bridge_error(value: &Value) -> Result<()> {
    let Some(results) = value.as_array() else {
        return Ok(());
    };
    for result in results {
        if let Some(error) = result.get("error") {
            let error: ApiError =
                serde_json::from_value(error.clone()).map_err(Error::JsonLoad)?;
            return Err(Error::bridge(error.error_type, &error.description));
        }
    }
    Ok(())
}
