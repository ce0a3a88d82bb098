//! Purpose: Connection settings for the control-plane client.
//! Exports: `ClientConfig`.
//! Role: Plain, deserializable settings; validated when a `Client` is built.
//! Invariants: `timeout_ms` bounds connect plus full response read per request.
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_TIMEOUT_MS: u64 = 5_000;

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default)]
    pub tls_ca_file: Option<PathBuf>,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: None,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            tls_ca_file: None,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn with_tls_ca_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.tls_ca_file = Some(path.into());
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}
