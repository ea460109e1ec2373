//! The user collection (admin-only).
//!
//! Users deviate from the other resources in three ways, all expressed
//! through the schema rather than a separate controller:
//! - creation goes through the dedicated admin endpoint,
//! - the password is required when creating but dropped from update
//!   payloads when left blank (blank means "keep the current one"),
//! - the role is editable but not part of the create payload; the
//!   admin endpoint decides the initial role.

use catalog_client::{ApiTransport, FieldSpec, ResourceController, ResourceSchema};
use std::sync::Arc;

/// Admin CRUD endpoint.
pub const BACKOFFICE_PATH: &str = "/api/backoffice/usuarios";
/// Admin-only creation endpoint.
pub const CREATE_PATH: &str = "/api/backoffice/usuarios/admin";

pub fn schema() -> ResourceSchema {
    ResourceSchema::new(
        "user",
        BACKOFFICE_PATH,
        vec![
            FieldSpec::text("nombre").required(),
            FieldSpec::text("email").required(),
            FieldSpec::text("password").required_on_create().skip_blank(),
            FieldSpec::text("role").update_only().with_default("user"),
        ],
    )
    .with_create_path(CREATE_PATH)
}

/// Controller over the admin endpoints.
pub fn backoffice_controller(transport: Arc<dyn ApiTransport>) -> ResourceController {
    ResourceController::new(schema(), transport)
}
