//! # HTTP Transport
//!
//! This module defines the [`ApiTransport`] trait, the seam between
//! controllers and the network, plus the production [`HttpTransport`]
//! backed by reqwest.
//!
//! # Architecture Note
//! Controllers and the session store never touch reqwest directly. They
//! talk to `dyn ApiTransport`, which lets tests substitute the in-memory
//! [`MockTransport`](crate::mock::MockTransport) without spawning a
//! server. The transport owns two cross-cutting concerns:
//!
//! 1. **Credential injection**: every call asks its [`TokenSource`]
//!    (in practice the session store) for the current bearer token and
//!    attaches `Authorization: Bearer <token>` when one is present.
//! 2. **Error normalization**: a non-2xx response is converted into an
//!    [`ApiError::Rejected`] carrying the `msg` field of the JSON body,
//!    or a generic message when the body has none.
//!
//! Outbound calls carry no timeout and no cancellation token; a hung
//! request simply never resolves.

use crate::error::ApiError;
use async_trait::async_trait;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// HTTP methods used against the catalog API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Get,
    Post,
    Put,
    Delete,
}

impl Verb {
    fn into_method(self) -> reqwest::Method {
        match self {
            Verb::Get => reqwest::Method::GET,
            Verb::Post => reqwest::Method::POST,
            Verb::Put => reqwest::Method::PUT,
            Verb::Delete => reqwest::Method::DELETE,
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Verb::Get => "GET",
            Verb::Post => "POST",
            Verb::Put => "PUT",
            Verb::Delete => "DELETE",
        };
        f.write_str(s)
    }
}

/// Source of the bearer credential attached to authenticated calls.
///
/// Implemented by [`SessionStore`](crate::session::SessionStore); the
/// transport reads the token on every request, so a login or logout is
/// picked up by the very next call.
pub trait TokenSource: Send + Sync {
    fn bearer_token(&self) -> Option<String>;
}

/// Object-safe interface for JSON-over-HTTP calls against the remote API.
#[async_trait]
pub trait ApiTransport: Send + Sync {
    /// Issue one request and return the decoded JSON body.
    async fn request(
        &self,
        verb: Verb,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value, ApiError>;
}

/// Production transport over reqwest.
pub struct HttpTransport {
    base_url: String,
    http: reqwest::Client,
    tokens: Arc<dyn TokenSource>,
}

impl HttpTransport {
    /// Creates a transport rooted at `base_url`. Paths passed to
    /// [`ApiTransport::request`] are appended verbatim, so the base URL
    /// is stored without a trailing slash.
    pub fn new(base_url: impl Into<String>, tokens: Arc<dyn TokenSource>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            base_url,
            http: reqwest::Client::new(),
            tokens,
        }
    }
}

#[async_trait]
impl ApiTransport for HttpTransport {
    async fn request(
        &self,
        verb: Verb,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.http.request(verb.into_method(), &url);
        if let Some(token) = self.tokens.bearer_token() {
            request = request.bearer_auth(token);
        }
        if let Some(body) = &body {
            request = request.json(body);
        }

        debug!(%verb, path, "sending request");
        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        let status = response.status().as_u16();
        let success = response.status().is_success();
        let text = response
            .text()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let result = normalize_response(success, status, &text);
        if let Err(e) = &result {
            warn!(%verb, path, status, error = %e, "request rejected");
        }
        result
    }
}

/// Turns a raw status + body into the transport's error contract: a
/// non-2xx body carries the failure reason in its `msg` field, with a
/// generic message when absent; a 2xx body must decode as JSON.
fn normalize_response(success: bool, status: u16, text: &str) -> Result<Value, ApiError> {
    if !success {
        let message = serde_json::from_str::<Value>(text)
            .ok()
            .and_then(|v| v.get("msg").and_then(Value::as_str).map(str::to_owned))
            .unwrap_or_else(|| format!("request failed with status {status}"));
        return Err(ApiError::Rejected { status, message });
    }
    serde_json::from_str(text).map_err(|_| ApiError::Decode)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NoToken;
    impl TokenSource for NoToken {
        fn bearer_token(&self) -> Option<String> {
            None
        }
    }

    #[test]
    fn base_url_loses_trailing_slash() {
        let transport = HttpTransport::new("https://api.example.com/", Arc::new(NoToken));
        assert_eq!(transport.base_url, "https://api.example.com");
    }

    #[test]
    fn rejection_carries_the_body_message() {
        let err = normalize_response(false, 401, r#"{"msg":"credenciales invalidas"}"#)
            .unwrap_err();
        assert_eq!(err.to_string(), "credenciales invalidas");
        assert_eq!(err.status(), Some(401));
    }

    #[test]
    fn rejection_without_a_message_falls_back_to_the_status() {
        let err = normalize_response(false, 502, "<html>bad gateway</html>").unwrap_err();
        assert_eq!(err.to_string(), "request failed with status 502");
        assert_eq!(err.status(), Some(502));
    }

    #[test]
    fn successful_response_with_a_bad_body_is_a_decode_error() {
        let err = normalize_response(true, 200, "not json").unwrap_err();
        assert!(matches!(err, ApiError::Decode));

        let ok = normalize_response(true, 200, r#"[{"_id":"c1"}]"#).unwrap();
        assert!(ok.is_array());
    }
}
