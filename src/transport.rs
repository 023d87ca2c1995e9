//! HTTP client adapter.
//!
//! [`ApiClient`] wraps outgoing requests with the base URL, bearer-token
//! injection from the session store, and error normalization. It knows
//! nothing about the cache: gateways call it, the cache layer calls
//! gateways.
//!
//! Every endpoint wraps its payload as `{ success, message?, data }`;
//! the adapter unwraps the envelope and returns `data`. On a non-success
//! status it extracts the body's `message` field when present, falling
//! back to the caller's per-operation phrase.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::session::SessionStore;
use crate::telemetry;
use crate::types::Envelope;
use crate::{BiblionError, Result};

/// Default request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP adapter shared by every gateway.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    session: Arc<SessionStore>,
}

impl ApiClient {
    pub(crate) fn new(
        base_url: impl Into<String>,
        timeout: Option<Duration>,
        session: Arc<SessionStore>,
    ) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout.unwrap_or(DEFAULT_TIMEOUT))
            .build()
            .map_err(|e| BiblionError::Configuration(e.to_string()))?;

        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }

        Ok(Self {
            http,
            base_url,
            session,
        })
    }

    /// `GET path`, unwrapping the envelope.
    pub async fn get<T: DeserializeOwned>(&self, path: &str, operation: &'static str) -> Result<T> {
        self.request(Method::GET, path, None::<&()>, operation).await
    }

    /// `POST path` with an optional JSON body, unwrapping the envelope.
    pub async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: Option<&impl Serialize>,
        operation: &'static str,
    ) -> Result<T> {
        self.request(Method::POST, path, body, operation).await
    }

    /// `PUT path` with an optional JSON body, unwrapping the envelope.
    pub async fn put<T: DeserializeOwned>(
        &self,
        path: &str,
        body: Option<&impl Serialize>,
        operation: &'static str,
    ) -> Result<T> {
        self.request(Method::PUT, path, body, operation).await
    }

    /// `PATCH path` with a JSON body, unwrapping the envelope.
    pub async fn patch<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &impl Serialize,
        operation: &'static str,
    ) -> Result<T> {
        self.request(Method::PATCH, path, Some(body), operation)
            .await
    }

    /// `DELETE path`. Ignores the envelope payload, which some endpoints
    /// omit entirely.
    pub async fn delete(&self, path: &str, operation: &'static str) -> Result<()> {
        let _: Option<serde_json::Value> = self
            .request(Method::DELETE, path, None::<&()>, operation)
            .await?;
        Ok(())
    }

    /// Shape a request, stamp auth, send, and normalize the response.
    ///
    /// `operation` names the call for generic failure messages
    /// (e.g. "borrow book" → "Failed to borrow book").
    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&impl Serialize>,
        operation: &'static str,
    ) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        let mut builder = self.http.request(method.clone(), &url);

        if let Some(token) = self.session.token() {
            builder = builder.header("Authorization", format!("Bearer {token}"));
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }

        debug!(%method, %url, "dispatching request");

        let response = match builder.send().await {
            Ok(r) => r,
            Err(e) => {
                metrics::counter!(telemetry::REQUESTS_TOTAL,
                    "operation" => operation, "status" => "error")
                .increment(1);
                return Err(BiblionError::Network(e.to_string()));
            }
        };

        let status = response.status();
        if !status.is_success() {
            metrics::counter!(telemetry::REQUESTS_TOTAL,
                "operation" => operation, "status" => "error")
            .increment(1);
            return Err(error_from_response(status, response, operation).await);
        }

        let envelope: Envelope<T> = response
            .json()
            .await
            .map_err(|e| BiblionError::Decode(e.to_string()))?;

        metrics::counter!(telemetry::REQUESTS_TOTAL,
            "operation" => operation, "status" => "ok")
        .increment(1);

        Ok(envelope.data)
    }
}

/// Map a non-success response to a [`BiblionError`].
///
/// The body's `message` field wins when present; otherwise the generic
/// per-operation phrase is used. A bare 401 (no server message) maps to
/// `NotAuthenticated`.
async fn error_from_response(
    status: StatusCode,
    response: reqwest::Response,
    operation: &'static str,
) -> BiblionError {
    let message = match response.json::<serde_json::Value>().await {
        Ok(body) => body
            .get("message")
            .and_then(|m| m.as_str())
            .map(str::to_string),
        Err(_) => None,
    };

    if status == StatusCode::UNAUTHORIZED && message.is_none() {
        return BiblionError::NotAuthenticated;
    }

    BiblionError::Api {
        status: status.as_u16(),
        message: message.unwrap_or_else(|| format!("Failed to {operation}")),
    }
}
