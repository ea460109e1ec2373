//! # Catalog Client
//!
//! Building blocks for an administrative client of the character/planet
//! catalog API: a session layer, route guards, and a generic CRUD
//! controller that one schema table instantiates per resource.
//!
//! ## Architecture Overview
//!
//! The crate separates concerns into three layers:
//!
//! 1. **Transport layer** ([`ApiTransport`]): JSON-over-HTTP calls,
//!    bearer-credential injection, error normalization. Production code
//!    uses the reqwest-backed [`HttpTransport`]; tests use
//!    [`mock::MockTransport`].
//! 2. **Session layer** ([`SessionStore`]): the single source of truth
//!    for "who is logged in", persisted across restarts, consumed by
//!    [`Guard`]s as boolean predicates.
//! 3. **Controller layer** ([`ResourceController`]): the CRUD state
//!    machine (list phases, create/edit drafts, delete confirmation,
//!    one-slot busy lock, transient notices), parameterized by a
//!    [`ResourceSchema`] so the same implementation serves characters,
//!    planets and users.
//!
//! ## Example
//!
//! ```
//! use catalog_client::{
//!     controller::{Mode, Phase, ResourceController},
//!     mock::MockTransport,
//!     schema::{FieldSpec, ResourceSchema},
//!     transport::Verb,
//! };
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let schema = ResourceSchema::new(
//!     "planet",
//!     "/api/backoffice/planetas",
//!     vec![
//!         FieldSpec::text("name").required(),
//!         FieldSpec::numeric("poblation"),
//!     ],
//! )
//! .with_rename("poblation", "Poblation");
//!
//! let mock = MockTransport::new();
//! mock.expect(Verb::Get, "/api/backoffice/planetas")
//!     .return_json(json!([{ "_id": "p1", "name": "Namek", "Poblation": 1000 }]));
//!
//! let controller = ResourceController::new(schema, Arc::new(mock.clone()));
//! controller.load().await;
//!
//! let items = controller.items();
//! assert_eq!(items[0].number("poblation"), Some(1000.0));
//! assert_eq!(controller.mode(), Mode::Browsing);
//! assert!(matches!(controller.phase(), Phase::Ready(_)));
//! mock.verify();
//! # }
//! ```
//!
//! ## Concurrency Model
//!
//! Everything here models a single-user interactive client: no
//! operation blocks, mutating calls hold a one-slot `busy` lock that
//! drops overlapping requests, list reads are last-write-wins, and
//! outbound calls carry no timeout. See [`controller`] for the details.

pub mod controller;
pub mod error;
pub mod guard;
pub mod mock;
pub mod schema;
pub mod session;
pub mod tracing;
pub mod transport;

// Re-export core types for convenience
pub use controller::{Mode, Phase, ResourceController, NOTICE_TTL};
pub use error::ApiError;
pub use guard::{Guard, GuardOutcome, Guarded, Route};
pub use schema::{FieldKind, FieldSpec, Requirement, ResourceItem, ResourceSchema};
pub use session::{CurrentUser, Session, SessionError, SessionStore};
pub use transport::{ApiTransport, HttpTransport, TokenSource, Verb};
