//! # Mock Transport
//!
//! An in-memory [`ApiTransport`] with expectation tracking, for testing
//! controllers and the session store without a server.
//!
//! Expectations are a FIFO queue: each `expect(verb, path)` must be
//! matched, in order, by the next request the code under test issues. A
//! request with no queued expectation, or one that does not match the
//! head of the queue, panics: mismatches are test bugs, not runtime
//! conditions. Every request is also appended to a log so tests can
//! assert on payload shape and call counts (e.g. that a validation
//! failure issued no request at all).
//!
//! ```
//! use catalog_client::mock::MockTransport;
//! use catalog_client::transport::{ApiTransport, Verb};
//! use serde_json::json;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let mock = MockTransport::new();
//! mock.expect(Verb::Get, "/api/Planetas").return_json(json!([]));
//!
//! let body = mock.request(Verb::Get, "/api/Planetas", None).await.unwrap();
//! assert_eq!(body, json!([]));
//! mock.verify();
//! # }
//! ```

use crate::error::ApiError;
use crate::transport::{ApiTransport, Verb};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

struct Expectation {
    verb: Verb,
    path: String,
    delay: Option<Duration>,
    response: Result<Value, ApiError>,
}

/// One request observed by the mock.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub verb: Verb,
    pub path: String,
    pub body: Option<Value>,
}

/// In-memory transport with a fluent expectation API.
///
/// Cloneable; clones share the same queue and log, so a test can hand
/// one clone to the code under test and keep another for assertions.
#[derive(Clone, Default)]
pub struct MockTransport {
    expectations: Arc<Mutex<VecDeque<Expectation>>>,
    log: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues an expectation for the next unmatched request.
    pub fn expect(&self, verb: Verb, path: impl Into<String>) -> ExpectationBuilder {
        ExpectationBuilder {
            verb,
            path: path.into(),
            delay: None,
            expectations: self.expectations.clone(),
        }
    }

    /// Everything the code under test sent, in order.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.log.lock().unwrap().clone()
    }

    /// How many requests hit a given verb + path.
    pub fn calls(&self, verb: Verb, path: &str) -> usize {
        self.log
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.verb == verb && r.path == path)
            .count()
    }

    /// Panics unless every queued expectation was consumed.
    pub fn verify(&self) {
        let pending = self.expectations.lock().unwrap();
        if !pending.is_empty() {
            panic!("not all expectations were met, {} remaining", pending.len());
        }
    }
}

#[async_trait]
impl ApiTransport for MockTransport {
    async fn request(
        &self,
        verb: Verb,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value, ApiError> {
        self.log.lock().unwrap().push(RecordedRequest {
            verb,
            path: path.to_owned(),
            body,
        });

        let expectation = self.expectations.lock().unwrap().pop_front();
        let Some(expectation) = expectation else {
            panic!("unexpected request {verb} {path}: no expectation queued");
        };
        if expectation.verb != verb || expectation.path != path {
            panic!(
                "expected {} {}, got {} {}",
                expectation.verb, expectation.path, verb, path
            );
        }
        if let Some(delay) = expectation.delay {
            tokio::time::sleep(delay).await;
        }
        expectation.response
    }
}

/// Builder returned by [`MockTransport::expect`].
pub struct ExpectationBuilder {
    verb: Verb,
    path: String,
    delay: Option<Duration>,
    expectations: Arc<Mutex<VecDeque<Expectation>>>,
}

impl ExpectationBuilder {
    /// Delays the response, to hold a request "in flight" under a paused
    /// tokio clock and exercise the one-slot busy lock.
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Resolves the matched request with a 2xx JSON body.
    pub fn return_json(self, value: Value) {
        let response = Ok(value);
        self.push(response);
    }

    /// Rejects the matched request the way the real API does: a non-2xx
    /// status whose body message becomes the failure reason.
    pub fn return_error(self, status: u16, message: impl Into<String>) {
        let response = Err(ApiError::Rejected {
            status,
            message: message.into(),
        });
        self.push(response);
    }

    /// Fails the matched request before it reaches a server.
    pub fn return_network_error(self, message: impl Into<String>) {
        let response = Err(ApiError::Network(message.into()));
        self.push(response);
    }

    fn push(self, response: Result<Value, ApiError>) {
        self.expectations.lock().unwrap().push_back(Expectation {
            verb: self.verb,
            path: self.path,
            delay: self.delay,
            response,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn expectations_resolve_in_order() {
        let mock = MockTransport::new();
        mock.expect(Verb::Get, "/api/Personajes").return_json(json!([]));
        mock.expect(Verb::Post, "/api/Personajes")
            .return_error(400, "name taken");

        let list = mock.request(Verb::Get, "/api/Personajes", None).await;
        assert_eq!(list.unwrap(), json!([]));

        let err = mock
            .request(Verb::Post, "/api/Personajes", Some(json!({ "name": "Goku" })))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "name taken");
        assert_eq!(err.status(), Some(400));

        assert_eq!(mock.requests().len(), 2);
        assert_eq!(mock.calls(Verb::Post, "/api/Personajes"), 1);
        mock.verify();
    }

    #[tokio::test]
    #[should_panic(expected = "no expectation queued")]
    async fn unexpected_request_panics() {
        let mock = MockTransport::new();
        let _ = mock.request(Verb::Get, "/api/Planetas", None).await;
    }

    #[test]
    #[should_panic(expected = "not all expectations were met")]
    fn verify_reports_unmet_expectations() {
        let mock = MockTransport::new();
        mock.expect(Verb::Get, "/api/Planetas").return_json(json!([]));
        mock.verify();
    }
}
