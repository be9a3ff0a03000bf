//! Shared HTTP plumbing for the sealing and unsealing services.

use std::time::Duration;

use reqwest::{Client, Response, multipart::Form};
use serde::Deserialize;
use tracing::debug;

/// Sealing endpoint path.
pub const SEAL_PATH: &str = "/create-seal";
/// Unsealing endpoint path.
pub const UNSEAL_PATH: &str = "/unseal";

/// Multipart field carrying the audio payload.
pub(crate) const AUDIO_FIELD: &str = "audio";
/// Multipart field carrying the seal image.
pub(crate) const IMAGE_FIELD: &str = "image";
/// Multipart field carrying the credential.
pub(crate) const PASSWORD_FIELD: &str = "password";

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// HTTP client bound to one service base URL.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct ServiceClient {
    http: Client,
    base_url: String,
}

impl ServiceClient {
    /// Build a client for `base_url` (e.g. `http://localhost:8000`).
    ///
    /// # Errors
    ///
    /// Returns the builder error if the TLS backend cannot be initialised.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> reqwest::Result<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub(crate) async fn post_form(&self, path: &str, form: Form) -> reqwest::Result<Response> {
        let url = self.endpoint(path);
        debug!(url = %url, "POST multipart");
        self.http.post(url).multipart(form).send().await
    }
}

/// Structured error body returned by the services.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    detail: Option<serde_json::Value>,
}

/// Message from a structured error body, if the body has one.
pub(crate) fn error_reason(body: &[u8]) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_slice(body).ok()?;

    parsed
        .error
        .filter(|e| !e.trim().is_empty())
        .or_else(|| match parsed.detail {
            Some(serde_json::Value::String(detail)) if !detail.trim().is_empty() => Some(detail),
            _ => None,
        })
}
