use thiserror::Error;

/// Top-level error type for the `relayctl-rpc` crate.
///
/// Covers every failure mode of both device API generations.
/// `relayctl-core` maps these into user-facing diagnostics -- consumers
/// of the core never see these raw.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Unexpected HTTP status outside the JSON-RPC / REST envelope.
    #[error("Unexpected HTTP status {status}")]
    UnexpectedStatus { status: u16 },

    // ── Authentication ──────────────────────────────────────────────
    /// The device rejected the request (401) -- missing or wrong password.
    #[error("Device authentication required or rejected")]
    Auth,

    // ── Gen2 JSON-RPC ───────────────────────────────────────────────
    /// Structured error from a Gen2 device (`{error: {code, message}}`).
    #[error("Device RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if the device could not be reached at all
    /// (connect failure or timeout) as opposed to answering with an error.
    pub fn is_unreachable(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }

    /// Returns `true` if this is an authentication failure.
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Auth)
    }

    /// Returns `true` if this is a "not found" response (unknown
    /// endpoint or component id on the device).
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            Self::UnexpectedStatus { status } => *status == 404,
            _ => false,
        }
    }
}
