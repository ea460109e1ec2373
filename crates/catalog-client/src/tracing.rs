//! # Observability & Tracing
//!
//! Structured logging for the whole client. Controllers and the session
//! store emit `tracing` events with structured fields (`resource`, `id`,
//! `error = %e`): info for lifecycle and mutations, debug for individual
//! requests, warn for failures.
//!
//! ```bash
//! RUST_LOG=info cargo run      # compact logs
//! RUST_LOG=debug cargo run     # every request and payload decision
//! ```
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false) // structured fields carry the context instead
        .compact()
        .init();
}
