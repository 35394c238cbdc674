//! Remote data gateway: uniform request execution with bounded latency.
//!
//! Every feature module goes through the [`Gateway`] for its single network
//! round trip. The gateway owns the per-request deadline and the response
//! contract; it is stateless and has no retry/backoff policy - retries, if
//! desired, are the caller's responsibility.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::{RequestBuilder, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::MarketConfig;
use crate::error::{ApiError, ApiResult};

/// The HTTP header name for request correlation IDs.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Shared network-call wrapper providing timeout and uniform response
/// parsing.
#[derive(Clone)]
pub struct Gateway {
    inner: Arc<GatewayInner>,
}

struct GatewayInner {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
    auth_token: Option<SecretString>,
}

impl Gateway {
    /// Create a gateway over a shared HTTP client.
    #[must_use]
    pub fn new(client: reqwest::Client, config: &MarketConfig) -> Self {
        Self {
            inner: Arc::new(GatewayInner {
                client,
                base_url: config.api_base_url.clone(),
                timeout: config.request_timeout,
                auth_token: config.auth_token.clone(),
            }),
        }
    }

    /// The configured per-request deadline.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.inner.timeout
    }

    /// Absolute URL for a path under the REST base.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.inner.base_url)
    }

    fn prepare(&self, builder: RequestBuilder) -> RequestBuilder {
        let builder = builder.header(REQUEST_ID_HEADER, Uuid::new_v4().to_string());
        match &self.inner.auth_token {
            Some(token) => builder.bearer_auth(token.expose_secret()),
            None => builder,
        }
    }

    /// Start a GET request for a path under the REST base.
    #[must_use]
    pub fn get(&self, path: &str) -> RequestBuilder {
        self.prepare(self.inner.client.get(self.url(path)))
    }

    /// Start a POST request for a path under the REST base.
    #[must_use]
    pub fn post(&self, path: &str) -> RequestBuilder {
        self.prepare(self.inner.client.post(self.url(path)))
    }

    /// Start a PUT request for a path under the REST base.
    #[must_use]
    pub fn put(&self, path: &str) -> RequestBuilder {
        self.prepare(self.inner.client.put(self.url(path)))
    }

    /// Start a DELETE request for a path under the REST base.
    #[must_use]
    pub fn delete(&self, path: &str) -> RequestBuilder {
        self.prepare(self.inner.client.delete(self.url(path)))
    }

    /// Start a request against an absolute URL (e.g., the upload or realtime
    /// endpoints, which live outside the REST base).
    #[must_use]
    pub fn request_absolute(&self, method: reqwest::Method, url: &str) -> RequestBuilder {
        self.prepare(self.inner.client.request(method, url))
    }

    /// Execute a prepared request, racing it against the configured
    /// deadline. On expiry the request future is dropped - aborting the
    /// in-flight request - and the call fails with [`ApiError::Timeout`].
    /// Exactly one attempt is made per invocation.
    ///
    /// # Errors
    ///
    /// [`ApiError::Timeout`] when the deadline elapses, [`ApiError::Http`]
    /// on transport failure.
    pub async fn send(&self, builder: RequestBuilder) -> ApiResult<Response> {
        let deadline = self.inner.timeout;
        match tokio::time::timeout(deadline, builder.send()).await {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(e)) => Err(ApiError::Http(e)),
            Err(_elapsed) => {
                warn!(timeout_ms = deadline.as_millis() as u64, "request aborted on deadline");
                Err(ApiError::Timeout {
                    ms: deadline.as_millis() as u64,
                })
            }
        }
    }

    /// Apply the uniform response contract and return the parsed JSON body.
    ///
    /// - non-2xx status: fails with a message drawn from the body's
    ///   `message`/`error` field if parseable, else the HTTP status line;
    /// - 2xx with a non-JSON content type: returns `{}` if `allow_empty`,
    ///   else fails with a content-type error;
    /// - 2xx with an unparseable body: returns `{}` if `allow_empty`, else
    ///   fails with a parse error;
    /// - otherwise: the parsed JSON body.
    ///
    /// # Errors
    ///
    /// See the contract above; body-read failures surface as
    /// [`ApiError::Http`].
    pub async fn read_json(&self, response: Response, allow_empty: bool) -> ApiResult<Value> {
        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        let body = response.text().await?;

        if !status.is_success() {
            let message = extract_error_message(status, &body);
            debug!(status = status.as_u16(), %message, "backend returned error status");
            return Err(ApiError::Api {
                status: status.as_u16(),
                message,
            });
        }

        if !content_type.to_ascii_lowercase().contains("json") {
            if allow_empty {
                return Ok(Value::Object(Map::new()));
            }
            return Err(ApiError::ContentType(content_type));
        }

        match serde_json::from_str(&body) {
            Ok(value) => Ok(value),
            Err(e) if allow_empty => {
                debug!(error = %e, "unparseable body tolerated (allow_empty)");
                Ok(Value::Object(Map::new()))
            }
            Err(e) => Err(ApiError::Parse(e)),
        }
    }

    /// Execute a request and decode the JSON body into `T`.
    ///
    /// # Errors
    ///
    /// Any gateway error, or [`ApiError::Parse`] when the body does not
    /// match `T`.
    pub async fn expect_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> ApiResult<T> {
        let response = self.send(builder).await?;
        let value = self.read_json(response, false).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Execute a request where an empty or non-JSON 2xx body is acceptable
    /// (e.g., deletes and acknowledgement-only mutations).
    ///
    /// # Errors
    ///
    /// Any gateway error. Missing bodies decode from `{}`, so `T` must
    /// tolerate an empty object.
    pub async fn expect_json_lenient<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> ApiResult<T> {
        let response = self.send(builder).await?;
        let value = self.read_json(response, true).await?;
        Ok(serde_json::from_value(value)?)
    }

    // =========================================================================
    // Convenience wrappers used by the feature modules
    // =========================================================================

    /// GET a path and decode the JSON response.
    ///
    /// # Errors
    ///
    /// Any gateway error.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        self.expect_json(self.get(path)).await
    }

    /// POST a JSON body and decode the JSON response.
    ///
    /// # Errors
    ///
    /// Any gateway error.
    pub async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &impl Serialize,
    ) -> ApiResult<T> {
        self.expect_json(self.post(path).json(body)).await
    }

    /// PUT a JSON body and decode the JSON response.
    ///
    /// # Errors
    ///
    /// Any gateway error.
    pub async fn put_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &impl Serialize,
    ) -> ApiResult<T> {
        self.expect_json(self.put(path).json(body)).await
    }

    /// DELETE a path, tolerating an empty response body.
    ///
    /// # Errors
    ///
    /// Any gateway error.
    pub async fn delete_empty(&self, path: &str) -> ApiResult<()> {
        let response = self.send(self.delete(path)).await?;
        self.read_json(response, true).await.map(|_| ())
    }
}

/// Pull a human-readable message out of an error response body.
///
/// Tries the JSON body's `message` field, then `error`; falls back to the
/// HTTP status line when neither is present or the body is not JSON.
fn extract_error_message(status: StatusCode, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        for field in ["message", "error"] {
            if let Some(text) = value.get(field).and_then(Value::as_str)
                && !text.is_empty()
            {
                return text.to_string();
            }
        }
    }
    status
        .canonical_reason()
        .map_or_else(|| format!("HTTP {}", status.as_u16()), |reason| {
            format!("HTTP {} {reason}", status.as_u16())
        })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_message_field() {
        let msg = extract_error_message(StatusCode::BAD_REQUEST, r#"{"message":"bad quantity"}"#);
        assert_eq!(msg, "bad quantity");
    }

    #[test]
    fn test_extract_error_field() {
        let msg = extract_error_message(StatusCode::CONFLICT, r#"{"error":"out of stock"}"#);
        assert_eq!(msg, "out of stock");
    }

    #[test]
    fn test_message_field_wins_over_error_field() {
        let msg = extract_error_message(
            StatusCode::CONFLICT,
            r#"{"message":"primary","error":"secondary"}"#,
        );
        assert_eq!(msg, "primary");
    }

    #[test]
    fn test_non_json_body_falls_back_to_status_line() {
        let msg = extract_error_message(StatusCode::BAD_GATEWAY, "<html>oops</html>");
        assert_eq!(msg, "HTTP 502 Bad Gateway");
    }

    #[test]
    fn test_empty_message_falls_back_to_status_line() {
        let msg = extract_error_message(StatusCode::NOT_FOUND, r#"{"message":""}"#);
        assert_eq!(msg, "HTTP 404 Not Found");
    }

    #[test]
    fn test_url_joins_base_and_path() {
        let config = MarketConfig {
            api_base_url: "http://localhost:9810/api".to_string(),
            ..MarketConfig::default()
        };
        let gateway = Gateway::new(reqwest::Client::new(), &config);
        assert_eq!(gateway.url("/cart/7"), "http://localhost:9810/api/cart/7");
    }
}
