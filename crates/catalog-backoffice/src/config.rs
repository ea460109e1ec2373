//! Runtime configuration: API endpoint and session file location.

use std::path::PathBuf;

/// Public instance used when `CATALOG_API_URL` is not set.
pub const DEFAULT_API_URL: &str = "https://final-backend-app-hibridas.onrender.com";

const API_URL_VAR: &str = "CATALOG_API_URL";

/// Base URL of the remote catalog API.
pub fn api_url() -> String {
    std::env::var(API_URL_VAR).unwrap_or_else(|_| DEFAULT_API_URL.to_owned())
}

/// Where the session token and user record are persisted. Falls back to
/// the working directory when no config dir exists (containers).
pub fn session_file() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("catalog-backoffice")
        .join("session.json")
}
