//! # Transport Errors
//!
//! This module defines the error type shared by every transport
//! implementation. Centralizing it keeps the failure contract identical
//! whether a controller talks to the real API or to a mock.

/// Errors surfaced by an [`ApiTransport`](crate::transport::ApiTransport).
///
/// The remote API reports failures as a non-2xx status with a JSON body
/// carrying a `msg` field; [`ApiError::Rejected`] holds that message so
/// views can show it verbatim. Everything else (connection refused, bad
/// body) collapses into the remaining variants. The `Display` output of
/// every variant is a human-readable failure reason.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The server answered with a non-2xx status.
    #[error("{message}")]
    Rejected { status: u16, message: String },
    /// The request never completed (DNS, connection, TLS, ...).
    #[error("network error: {0}")]
    Network(String),
    /// A 2xx response whose body was not valid JSON.
    #[error("response body was not valid JSON")]
    Decode,
}

impl ApiError {
    /// Status code of a server rejection, if this is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }
}
