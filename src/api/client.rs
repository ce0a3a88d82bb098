//! Purpose: Blocking HTTP/JSON transport to the control-plane REST API.
//! Exports: `Client`.
//! Role: Owns the agent, auth header, timeout, and status-to-error mapping.
//! Invariants: Non-2xx responses become server-reported errors carrying the status.
//! Invariants: Timeouts map to `Timeout`; other IO/TLS failures map to `Transport`.
//! Invariants: Empty success bodies decode as JSON `null`.
#![allow(clippy::result_large_err)]

use super::config::ClientConfig;
use super::pipeline::Pipeline;
use super::services::Services;
use crate::core::error::{ApiResult, Error, ErrorKind, error_kind_from_status};
use crate::core::record::Record;
use crate::models::ErrorResponse;
use serde_json::Value;
use std::error::Error as StdError;
use std::fmt;
use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;
use url::Url;

#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    base_url: Url,
    token: Option<String>,
    agent: ureq::Agent,
}

impl Client {
    pub fn new(config: ClientConfig) -> ApiResult<Self> {
        let base_url = normalize_base_url(&config.base_url)?;
        if config.timeout_ms == 0 {
            return Err(Error::new(ErrorKind::Usage).with_message("timeout must be greater than zero"));
        }
        let mut builder = ureq::AgentBuilder::new().timeout(config.timeout());
        if let Some(path) = &config.tls_ca_file {
            builder = builder.tls_config(Arc::new(tls_config_from_ca_file(path)?));
        }
        Ok(Self {
            inner: Arc::new(ClientInner {
                base_url,
                token: config.token,
                agent: builder.build(),
            }),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Handle for an existing pipeline; no request is made.
    pub fn pipeline(&self, pipeline_id: u64) -> Pipeline {
        Pipeline::new(self.clone(), pipeline_id)
    }

    pub fn services(&self) -> Services {
        Services::new(self.clone())
    }

    pub(crate) fn get(&self, segments: &[&str], query: &[(&str, &str)]) -> ApiResult<Value> {
        self.call("GET", segments, query, None)
    }

    pub(crate) fn post(&self, segments: &[&str], body: Option<&Value>) -> ApiResult<Value> {
        self.call("POST", segments, &[], body)
    }

    pub(crate) fn patch(&self, segments: &[&str], body: &Value) -> ApiResult<Value> {
        self.call("PATCH", segments, &[], Some(body))
    }

    pub(crate) fn delete(&self, segments: &[&str]) -> ApiResult<Value> {
        self.call("DELETE", segments, &[], None)
    }

    fn call(
        &self,
        method: &str,
        segments: &[&str],
        query: &[(&str, &str)],
        body: Option<&Value>,
    ) -> ApiResult<Value> {
        let url = build_url(&self.inner.base_url, segments, query)?;
        tracing::debug!(method, url = %url, "control plane request");

        let mut request = self
            .inner
            .agent
            .request_url(method, &url)
            .set("Accept", "application/json");
        if let Some(token) = &self.inner.token {
            request = request.set("Authorization", &format!("Bearer {token}"));
        }
        let response = match body {
            Some(body) => {
                let payload = serde_json::to_string(body).map_err(|err| {
                    Error::new(ErrorKind::Internal)
                        .with_message("failed to encode request json")
                        .with_source(err)
                })?;
                request
                    .set("Content-Type", "application/json")
                    .send_string(&payload)
            }
            None => request.call(),
        };

        match response {
            Ok(resp) => {
                tracing::debug!(status = resp.status(), "control plane response");
                read_json_response(resp)
            }
            Err(ureq::Error::Status(code, resp)) => {
                tracing::debug!(status = code, "control plane error response");
                Err(parse_error_response(code, resp))
            }
            Err(ureq::Error::Transport(err)) => {
                tracing::warn!(error = %err, url = %url, "control plane request failed");
                Err(transport_error(err))
            }
        }
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.inner.base_url.as_str())
            .field("token", &self.inner.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

fn normalize_base_url(raw: &str) -> ApiResult<Url> {
    let mut url = Url::parse(raw).map_err(|err| {
        Error::new(ErrorKind::Usage)
            .with_message("invalid base url")
            .with_source(err)
    })?;
    let scheme = url.scheme();
    if scheme != "http" && scheme != "https" {
        return Err(
            Error::new(ErrorKind::Usage).with_message("base url must use http or https scheme")
        );
    }
    if url.path() != "/" && !url.path().is_empty() {
        return Err(Error::new(ErrorKind::Usage).with_message("base url must not include a path"));
    }
    url.set_path("/");
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}

fn build_url(base_url: &Url, segments: &[&str], query: &[(&str, &str)]) -> ApiResult<Url> {
    let mut url = base_url.clone();
    {
        let mut path = url
            .path_segments_mut()
            .map_err(|_| Error::new(ErrorKind::Usage).with_message("base url cannot be a base"))?;
        path.clear();
        for segment in segments {
            path.push(segment);
        }
    }
    if !query.is_empty() {
        let mut pairs = url.query_pairs_mut();
        for (key, value) in query {
            pairs.append_pair(key, value);
        }
    }
    Ok(url)
}

fn tls_config_from_ca_file(path: &Path) -> ApiResult<rustls::ClientConfig> {
    let cert_bytes = std::fs::read(path).map_err(|err| {
        Error::new(ErrorKind::Usage)
            .with_message(format!("failed to read TLS CA file {}", path.display()))
            .with_source(err)
    })?;
    let mut cert_reader = Cursor::new(cert_bytes);
    let certs = rustls_pemfile::certs(&mut cert_reader)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|err| {
            Error::new(ErrorKind::Usage)
                .with_message(format!("failed to parse TLS CA file {}", path.display()))
                .with_source(err)
        })?;
    if certs.is_empty() {
        return Err(Error::new(ErrorKind::Usage).with_message(format!(
            "TLS CA file {} contains no certificates",
            path.display()
        )));
    }

    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();
    let mut root_store = rustls::RootCertStore::empty();
    let (added, _) = root_store.add_parsable_certificates(certs);
    if added == 0 {
        return Err(Error::new(ErrorKind::Usage).with_message(format!(
            "TLS CA file {} contains no parsable certificates",
            path.display()
        )));
    }

    Ok(rustls::ClientConfig::builder()
        .with_root_certificates(root_store)
        .with_no_client_auth())
}

fn read_json_response(response: ureq::Response) -> ApiResult<Value> {
    let body = response.into_string().map_err(|err| {
        let kind = if is_timeout_io(&err) {
            ErrorKind::Timeout
        } else {
            ErrorKind::Transport
        };
        Error::new(kind)
            .with_message("failed to read response body")
            .with_source(err)
    })?;
    if body.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(&body).map_err(|err| {
        Error::new(ErrorKind::Internal)
            .with_message("invalid response json")
            .with_source(err)
    })
}

fn parse_error_response(status: u16, response: ureq::Response) -> Error {
    let err = Error::new(error_kind_from_status(status)).with_status(status);
    let body = response.into_string().unwrap_or_default();
    let parsed = serde_json::from_str::<Value>(&body)
        .ok()
        .and_then(|value| ErrorResponse::from_value(value).ok());
    match parsed {
        Some(remote) => err
            .with_message(remote.message())
            .with_error_code(remote.error_code()),
        None if !body.trim().is_empty() => err.with_message(body.trim().to_string()),
        None => err.with_message(format!("server returned status {status}")),
    }
}

fn transport_error(err: ureq::Transport) -> Error {
    let timed_out = {
        let mut source = err.source();
        let mut found = false;
        while let Some(cause) = source {
            if cause
                .downcast_ref::<std::io::Error>()
                .is_some_and(is_timeout_io)
            {
                found = true;
                break;
            }
            source = cause.source();
        }
        found
    };
    if timed_out {
        Error::new(ErrorKind::Timeout)
            .with_message("request timed out")
            .with_source(err)
    } else {
        Error::new(ErrorKind::Transport)
            .with_message("request failed")
            .with_source(err)
    }
}

fn is_timeout_io(err: &std::io::Error) -> bool {
    matches!(
        err.kind(),
        std::io::ErrorKind::TimedOut | std::io::ErrorKind::WouldBlock
    )
}
