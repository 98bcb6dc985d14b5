//! Core HTTP plumbing shared by every endpoint group

use flowdash_core::config::BackendConfig;
use flowdash_core::{Error, Result};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use validator::Validate;

/// Message-only response returned by most mutation endpoints
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessageResponse {
    /// Human-readable outcome description
    pub message: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: Option<String>,
}

/// API client for the telemetry backend
///
/// Cheap to clone; the underlying connection pool is shared.
#[derive(Debug, Clone)]
pub struct ApiClient {
    pub(crate) client: Client,
    pub(crate) base_url: String,
    pub(crate) token: Option<String>,
}

impl ApiClient {
    /// Create a new client against the given base URL
    /// (e.g. `http://10.0.0.5:8000/api/v1`)
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        }
    }

    /// Build a client from backend configuration, applying the configured
    /// request timeout and any pre-issued token.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be constructed.
    pub fn from_config(config: &BackendConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()
            .map_err(|e| Error::Http(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        })
    }

    /// Attach a bearer token
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Replace the bearer token in place (used after login)
    pub fn set_token(&mut self, token: impl Into<String>) {
        self.token = Some(token.into());
    }

    /// Whether a bearer token is currently attached
    #[must_use]
    pub const fn has_token(&self) -> bool {
        self.token.is_some()
    }

    /// Base URL this client talks to
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Attach auth, send, and map transport/status failures onto our error
    /// enum. Non-success responses have their JSON `detail` extracted.
    pub(crate) async fn send(&self, mut request: RequestBuilder) -> Result<Response> {
        if let Some(ref token) = self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::Http(format!("request failed: {e}")))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let resource = response.url().path().to_string();
        let detail = error_detail(response).await;
        tracing::debug!(status = %status, resource = %resource, "backend returned error");

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(Error::Authentication(detail)),
            StatusCode::NOT_FOUND => Err(Error::NotFound { resource }),
            _ => Err(Error::Api {
                status: status.as_u16(),
                message: detail,
            }),
        }
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[String],
    ) -> Result<T> {
        let mut url = self.url(path);
        if !query.is_empty() {
            url.push('?');
            url.push_str(&query.join("&"));
        }
        let response = self.send(self.client.get(url)).await?;
        parse_json(response).await
    }

    pub(crate) async fn get_text(&self, path: &str, query: &[String]) -> Result<String> {
        let mut url = self.url(path);
        if !query.is_empty() {
            url.push('?');
            url.push_str(&query.join("&"));
        }
        let response = self.send(self.client.get(url)).await?;
        response
            .text()
            .await
            .map_err(|e| Error::Http(format!("failed to read response body: {e}")))
    }

    pub(crate) async fn get_bytes(&self, path: &str, query: &[String]) -> Result<Vec<u8>> {
        let mut url = self.url(path);
        if !query.is_empty() {
            url.push('?');
            url.push_str(&query.join("&"));
        }
        let response = self.send(self.client.get(url)).await?;
        response
            .bytes()
            .await
            .map(|body| body.to_vec())
            .map_err(|e| Error::Http(format!("failed to read response body: {e}")))
    }

    pub(crate) async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.send(self.client.post(self.url(path)).json(body)).await?;
        parse_json(response).await
    }

    pub(crate) async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.send(self.client.post(self.url(path))).await?;
        parse_json(response).await
    }

    pub(crate) async fn put_json<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.send(self.client.put(self.url(path)).json(body)).await?;
        parse_json(response).await
    }

    pub(crate) async fn put_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.send(self.client.put(self.url(path))).await?;
        parse_json(response).await
    }

    pub(crate) async fn patch_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[String],
    ) -> Result<T> {
        let mut url = self.url(path);
        if !query.is_empty() {
            url.push('?');
            url.push_str(&query.join("&"));
        }
        let response = self.send(self.client.patch(url)).await?;
        parse_json(response).await
    }

    pub(crate) async fn delete_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.send(self.client.delete(self.url(path))).await?;
        parse_json(response).await
    }

    pub(crate) async fn delete_empty(&self, path: &str) -> Result<()> {
        self.send(self.client.delete(self.url(path))).await?;
        Ok(())
    }
}

pub(crate) async fn parse_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    response
        .json()
        .await
        .map_err(|e| Error::Http(format!("failed to parse response body: {e}")))
}

async fn error_detail(response: Response) -> String {
    let status = response.status();
    match response.text().await {
        Ok(body) => serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|b| b.detail)
            .unwrap_or_else(|| {
                if body.is_empty() {
                    status.to_string()
                } else {
                    body
                }
            }),
        Err(_) => status.to_string(),
    }
}

/// Run payload validation before a write request leaves the process
pub(crate) fn validated<T: Validate>(payload: &T) -> Result<()> {
    payload.validate().map_err(|errors| {
        let field = errors
            .field_errors()
            .keys()
            .next()
            .map_or_else(String::new, ToString::to_string);
        Error::Validation {
            field,
            message: errors.to_string(),
        }
    })
}
