// Gen1 REST HTTP client
//
// Gen1 devices answer plain GET endpoints with bare JSON bodies -- no
// envelope to strip. Writes are also GETs with query parameters
// (`/relay/0?turn=on`), a quirk of the generation.

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::transport::{DEVICE_USERNAME, TransportConfig};

/// Raw HTTP client for a Gen1 device.
pub struct Gen1Client {
    http: reqwest::Client,
    base_url: Url,
    password: Option<SecretString>,
}

// ── Typed payloads ───────────────────────────────────────────────────

/// Response to `GET /shelly` -- the unauthenticated identity endpoint.
///
/// Newer firmware also reports `gen`; its absence means generation 1.
#[derive(Debug, Clone, Deserialize)]
pub struct Gen1DeviceIdent {
    #[serde(rename = "type")]
    pub device_type: Option<String>,
    pub mac: Option<String>,
    pub fw: Option<String>,
    #[serde(default)]
    pub auth: bool,
    #[serde(rename = "gen")]
    pub generation: Option<u8>,
}

/// Response to `GET /relay/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct Gen1RelayState {
    pub ison: Option<bool>,
}

impl Gen1Client {
    /// Create a new Gen1 client for a device base URL.
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

    // ── Request helpers ──────────────────────────────────────────────

    /// Send a GET request to a device path and parse the JSON body.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let url = self.base_url.join(path)?;
        debug!(%url, "gen1 get");

        let mut req = self.http.get(url);
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
        serde_json::from_str(&text).map_err(|e| Error::Deserialization {
            message: e.to_string(),
            body: text,
        })
    }

    // ── Typed helpers ────────────────────────────────────────────────

    /// `GET /shelly` -- device identity, served without auth.
    pub async fn shelly(&self) -> Result<Gen1DeviceIdent, Error> {
        self.get("shelly").await
    }

    /// `GET /settings` -- the full device settings document, raw.
    ///
    /// Component sections (`relays`, `lights`, `rollers`, ...) are
    /// arrays whose position is the component id; relayctl-core parses
    /// the shape itself.
    pub async fn settings(&self) -> Result<Value, Error> {
        self.get("settings").await
    }

    /// `GET /status` -- the full device status, raw.
    pub async fn status(&self) -> Result<Value, Error> {
        self.get("status").await
    }

    /// `GET /relay/{id}?turn={on|off|toggle}`.
    pub async fn set_relay(&self, id: u32, turn: &str) -> Result<Gen1RelayState, Error> {
        self.get(&format!("relay/{id}?turn={turn}")).await
    }
}
