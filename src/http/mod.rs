//! HTTP step execution against the notebook API.
//!
//! [`HttpExecutor`] owns a `reqwest` client and a current-thread Tokio
//! runtime. Each request is built with an optional bearer token, sent, and
//! its body read under a single bounded timeout. The synchronous methods block
//! on the executor's runtime so step definitions can stay synchronous.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, warn};

use crate::config::{ClientSettings, ServerSettings};
use crate::error::{AssertionError, HttpError, Result};
use crate::template;


/// Opaque credential sent as `Authorization: Bearer <token>`.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(String);

impl BearerToken {
    /// Wrap a raw token string.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Return the raw token string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BearerToken(<redacted>)")
    }
}

/// Status and body of a completed HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// The HTTP status code.
    pub status: u16,
    /// The response body as text.
    pub body: String,
}

impl HttpResponse {
    /// Returns whether the status code is in the 2xx range.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Parse the body as JSON, if it is JSON.
    #[must_use]
    pub fn json(&self) -> Option<serde_json::Value> {
        serde_json::from_str(&self.body).ok()
    }
}

/// Sends requests to the configured server with a bounded timeout.
pub struct HttpExecutor {
    client: reqwest::Client,
    runtime: tokio::runtime::Runtime,
    base_url: String,
    timeout_ms: u64,
}

impl fmt::Debug for HttpExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpExecutor")
            .field("base_url", &self.base_url)
            .field("timeout_ms", &self.timeout_ms)
            .finish_non_exhaustive()
    }
}

impl HttpExecutor {
    /// Create an executor for `server` using the client limits in `client`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` for a zero timeout,
    /// [`HttpError::ClientBuildFailed`] if the HTTP client cannot be
    /// built, or [`HttpError::RuntimeCreationFailed`] if the Tokio runtime
    /// cannot be created.
    pub fn new(server: &ServerSettings, client: &ClientSettings) -> Result<Self> {
        client.validate()?;
        let http_client = reqwest::Client::builder()
            .user_agent(concat!("notebook-harness/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| HttpError::ClientBuildFailed {
                message: e.to_string(),
            })?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| HttpError::RuntimeCreationFailed {
                message: e.to_string(),
            })?;

        Ok(Self {
            client: http_client,
            runtime,
            base_url: server.base_url(),
            timeout_ms: client.timeout_ms,
        })
    }

    /// The base URL every request path is appended to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The timeout applied to each request.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Join `path` onto the base URL.
    #[must_use]
    pub fn url_for(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Build a GET request, attaching bearer auth only when `token` is set.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::RequestFailed`] if `url` is not a valid URL.
    pub fn build_get(
        &self,
        url: &str,
        token: Option<&BearerToken>,
    ) -> std::result::Result<reqwest::Request, HttpError> {
        let mut builder = self.client.get(url);
        if let Some(token) = token {
            builder = builder.bearer_auth(token.as_str());
        }
        builder.build().map_err(|e| HttpError::RequestFailed {
            url: url.to_owned(),
            message: e.to_string(),
        })
    }

    /// Resolve `endpoint_template` against `params` and send a GET request.
    ///
    /// # Errors
    ///
    /// Returns a template error for unbound placeholders, or an HTTP error if
    /// the request fails or exceeds the timeout.
    pub async fn send_get_async(
        &self,
        endpoint_template: &str,
        params: &BTreeMap<String, String>,
        token: Option<&BearerToken>,
    ) -> Result<HttpResponse> {
        let path = template::resolve(endpoint_template, params)?;
        let url = self.url_for(&path);
        debug!(method = "GET", %url, authenticated = token.is_some(), "sending request");
        let request = self.build_get(&url, token)?;
        Ok(self.execute(request).await?)
    }

    /// Blocking form of [`Self::send_get_async`].
    ///
    /// # Errors
    ///
    /// As [`Self::send_get_async`].
    pub fn send_get(
        &self,
        endpoint_template: &str,
        params: &BTreeMap<String, String>,
        token: Option<&BearerToken>,
    ) -> Result<HttpResponse> {
        self.runtime
            .block_on(self.send_get_async(endpoint_template, params, token))
    }

    /// Send `body` as JSON in a POST request to `path`.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::RequestFailed`] if the request cannot be built or
    /// sent, or [`HttpError::Timeout`] if it exceeds the timeout.
    pub async fn post_json_async<B>(
        &self,
        path: &str,
        body: &B,
        token: Option<&BearerToken>,
    ) -> Result<HttpResponse>
    where
        B: Serialize + ?Sized,
    {
        let url = self.url_for(path);
        debug!(method = "POST", %url, authenticated = token.is_some(), "sending request");
        let mut builder = self.client.post(&url).json(body);
        if let Some(token) = token {
            builder = builder.bearer_auth(token.as_str());
        }
        let request = builder.build().map_err(|e| HttpError::RequestFailed {
            url: url.clone(),
            message: e.to_string(),
        })?;
        Ok(self.execute(request).await?)
    }

    /// Blocking form of [`Self::post_json_async`].
    ///
    /// # Errors
    ///
    /// As [`Self::post_json_async`].
    pub fn post_json<B>(
        &self,
        path: &str,
        body: &B,
        token: Option<&BearerToken>,
    ) -> Result<HttpResponse>
    where
        B: Serialize + ?Sized,
    {
        self.runtime.block_on(self.post_json_async(path, body, token))
    }

    /// Send `request` and read the body, bounded by the configured timeout.
    async fn execute(
        &self,
        request: reqwest::Request,
    ) -> std::result::Result<HttpResponse, HttpError> {
        let url = request.url().to_string();
        let exchange = async {
            let response = self.client.execute(request).await?;
            let status = response.status().as_u16();
            let body = response.text().await?;
            Ok::<_, reqwest::Error>(HttpResponse { status, body })
        };

        let response = tokio::time::timeout(self.timeout(), exchange)
            .await
            .map_err(|_| HttpError::Timeout {
                url: url.clone(),
                millis: self.timeout_ms,
            })?
            .map_err(|e| HttpError::RequestFailed {
                url: url.clone(),
                message: e.to_string(),
            })?;

        debug!(%url, status = response.status, "received response");
        Ok(response)
    }
}

/// Check that `response` carries the `expected` status code.
///
/// # Errors
///
/// Returns [`AssertionError::StatusMismatch`] carrying both codes when they
/// differ.
pub fn assert_status(
    response: &HttpResponse,
    expected: u16,
) -> std::result::Result<(), AssertionError> {
    if response.status == expected {
        return Ok(());
    }
    warn!(expected, observed = response.status, "status code mismatch");
    Err(AssertionError::StatusMismatch {
        expected,
        observed: response.status,
        body: response.body.clone(),
    })
}
