//! The remote mutation capability.
//!
//! Every state change is confirmed against the backend through the
//! [`RemoteClient`] trait. Calls send and receive JSON bodies, attach a
//! same-origin anti-forgery token header derived from a readable cookie,
//! and treat any non-2xx status uniformly as failure regardless of body
//! content - there is no partial-success parsing.

use std::sync::{Arc, Mutex};

use serde_json::Value;
use thiserror::Error;
use tracing::instrument;

use crate::config::ClientConfig;
use crate::error::ClientError;

/// Errors that can occur calling the remote backend.
///
/// Both variants recover the same way at every call site: roll the
/// optimistic change back and surface a transient notice.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// HTTP transport failed.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend answered with a non-2xx status.
    #[error("remote returned status {0}")]
    Status(u16),

    /// The response body was not the expected JSON shape.
    #[error("malformed response: {0}")]
    Malformed(String),
}

/// A remote endpoint path, resolved against the configured base URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint(String);

impl Endpoint {
    /// Create an endpoint from a path.
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// The endpoint path.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// An endpoint path with an `{id}` placeholder for a per-entity key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointTemplate(String);

impl EndpointTemplate {
    /// Create a template from a path containing `{id}`.
    #[must_use]
    pub fn new(template: impl Into<String>) -> Self {
        Self(template.into())
    }

    /// Fill the placeholder with an entity key.
    #[must_use]
    pub fn fill(&self, key: &str) -> Endpoint {
        Endpoint(self.0.replace("{id}", key))
    }
}

/// Injected capability performing remote mutation calls.
///
/// Implementations must treat any non-2xx response as [`RemoteError`];
/// callers rely on failure being uniform to drive their rollback path.
#[allow(async_fn_in_trait)]
pub trait RemoteClient: Send + Sync {
    /// Perform a call against `endpoint` with a JSON payload.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError`] on transport failure, non-2xx status, or a
    /// body that is not valid JSON.
    async fn call(&self, endpoint: &Endpoint, payload: Value) -> Result<Value, RemoteError>;
}

impl<T: RemoteClient + ?Sized> RemoteClient for Arc<T> {
    async fn call(&self, endpoint: &Endpoint, payload: Value) -> Result<Value, RemoteError> {
        (**self).call(endpoint, payload).await
    }
}

/// HTTP implementation of [`RemoteClient`] over `reqwest`.
///
/// The anti-forgery token is read by the host from the configured cookie
/// and handed over via [`set_csrf_token`](Self::set_csrf_token); it is
/// attached to every call as an `X-CSRFToken` header.
#[derive(Debug, Clone)]
pub struct HttpRemoteClient {
    client: reqwest::Client,
    base_url: url::Url,
    csrf_token: Arc<Mutex<Option<String>>>,
}

impl HttpRemoteClient {
    /// Create a new HTTP remote client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            "X-Requested-With",
            reqwest::header::HeaderValue::from_static("XMLHttpRequest"),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(RemoteError::from)?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            csrf_token: Arc::new(Mutex::new(None)),
        })
    }

    /// Set the anti-forgery token read from the configured cookie.
    ///
    /// # Panics
    ///
    /// Panics if the token lock was poisoned by a panicking thread.
    pub fn set_csrf_token(&self, token: impl Into<String>) {
        #[allow(clippy::unwrap_used)]
        let mut guard = self.csrf_token.lock().unwrap();
        *guard = Some(token.into());
    }

    fn current_token(&self) -> Option<String> {
        #[allow(clippy::unwrap_used)]
        self.csrf_token.lock().unwrap().clone()
    }
}

impl RemoteClient for HttpRemoteClient {
    #[instrument(skip(self, payload), fields(endpoint = %endpoint))]
    async fn call(&self, endpoint: &Endpoint, payload: Value) -> Result<Value, RemoteError> {
        let url = self
            .base_url
            .join(endpoint.as_str())
            .map_err(|e| RemoteError::Malformed(format!("invalid endpoint: {e}")))?;

        let mut request = self.client.post(url).json(&payload);
        if let Some(token) = self.current_token() {
            request = request.header("X-CSRFToken", token);
        }

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            tracing::warn!(status = %status, "remote call failed");
            return Err(RemoteError::Status(status.as_u16()));
        }

        // Read the body as text first for better error diagnostics
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %body.chars().take(500).collect::<String>(),
                "failed to parse remote response"
            );
            RemoteError::Malformed(e.to_string())
        })
    }
}
