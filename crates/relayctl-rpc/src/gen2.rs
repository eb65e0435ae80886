// Gen2 JSON-RPC HTTP client
//
// Wraps `reqwest::Client` with the Gen2 envelope: every call is a POST
// to `/rpc` carrying `{id, method, params}` and the device answers with
// `{id, src, result}` on success or `{error: {code, message}}` on
// failure. All methods return unwrapped `result` payloads -- the
// envelope is stripped before the caller sees it.

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::transport::{DEVICE_USERNAME, TransportConfig};

/// Raw HTTP client for a Gen2+ device.
pub struct Gen2Client {
    http: reqwest::Client,
    base_url: Url,
    password: Option<SecretString>,
}

// ── Envelope ─────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct RpcEnvelope<T> {
    #[allow(dead_code)]
    id: Option<i64>,
    result: Option<T>,
    error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

// ── Typed payloads ───────────────────────────────────────────────────

/// Response to `Shelly.GetDeviceInfo`.
#[derive(Debug, Clone, Deserialize)]
pub struct Gen2DeviceInfo {
    pub id: Option<String>,
    pub model: Option<String>,
    /// Protocol generation reported by the device (2, 3, ...).
    #[serde(rename = "gen")]
    pub generation: u8,
    pub fw_id: Option<String>,
    pub app: Option<String>,
    #[serde(default)]
    pub auth_en: bool,
}

/// Response to `Switch.Set` / `Switch.Toggle`.
#[derive(Debug, Clone, Deserialize)]
pub struct SwitchSetResult {
    /// State of the switch before the call took effect.
    pub was_on: Option<bool>,
}

impl Gen2Client {
    /// Create a new Gen2 client for a device base URL
    /// (e.g. `http://192.168.1.40`).
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self {
            http,
            base_url,
            password: transport.password.clone(),
        })
    }

    /// The device base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── Core RPC mechanics ───────────────────────────────────────────

    /// Invoke an RPC method and unwrap the envelope.
    pub async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Option<Value>,
    ) -> Result<T, Error> {
        let url = self.base_url.join("rpc")?;
        debug!(%url, method, "gen2 rpc call");

        let mut body = json!({ "id": 1, "method": method });
        if let Some(params) = params {
            body["params"] = params;
        }

        let mut req = self.http.post(url).json(&body);
        if let Some(ref password) = self.password {
            req = req.basic_auth(DEVICE_USERNAME, Some(password.expose_secret()));
        }

        let resp = req.send().await.map_err(Error::Transport)?;
        let status = resp.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(Error::Auth);
        }
        if !status.is_success() {
            return Err(Error::UnexpectedStatus {
                status: status.as_u16(),
            });
        }

        let text = resp.text().await.map_err(Error::Transport)?;
        let envelope: RpcEnvelope<T> =
            serde_json::from_str(&text).map_err(|e| Error::Deserialization {
                message: e.to_string(),
                body: text.clone(),
            })?;

        if let Some(err) = envelope.error {
            return Err(Error::Rpc {
                code: err.code,
                message: err.message,
            });
        }
        envelope.result.ok_or_else(|| Error::Deserialization {
            message: "rpc response carried neither result nor error".into(),
            body: text,
        })
    }

    // ── Typed helpers ────────────────────────────────────────────────

    /// `Shelly.GetDeviceInfo` -- identity, model, generation, auth flag.
    pub async fn get_device_info(&self) -> Result<Gen2DeviceInfo, Error> {
        self.call("Shelly.GetDeviceInfo", None).await
    }

    /// `Shelly.GetConfig` -- the full component configuration, raw.
    ///
    /// Returned untyped: the set of `"{type}:{id}"` keys varies per
    /// device model, so relayctl-core parses the shape itself.
    pub async fn get_config(&self) -> Result<Value, Error> {
        self.call("Shelly.GetConfig", None).await
    }

    /// `Shelly.GetStatus` -- the full component status, raw.
    pub async fn get_status(&self) -> Result<Value, Error> {
        self.call("Shelly.GetStatus", None).await
    }

    /// `Switch.Set` -- drive a switch component on or off.
    pub async fn set_switch(&self, id: u32, on: bool) -> Result<SwitchSetResult, Error> {
        self.call("Switch.Set", Some(json!({ "id": id, "on": on })))
            .await
    }

    /// `Switch.Toggle`.
    pub async fn toggle_switch(&self, id: u32) -> Result<SwitchSetResult, Error> {
        self.call("Switch.Toggle", Some(json!({ "id": id }))).await
    }
}
