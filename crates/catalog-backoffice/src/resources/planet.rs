//! The planet collection.
//!
//! The population attribute lives server-side as `Poblation` while the
//! form keys it as `poblation`; the schema rename makes the controller
//! send the server casing and accept either casing on reads.

use catalog_client::{ApiTransport, FieldSpec, ResourceController, ResourceSchema};
use std::sync::Arc;

/// Admin CRUD endpoint.
pub const BACKOFFICE_PATH: &str = "/api/backoffice/planetas";
/// Public, read-only listing endpoint.
pub const PUBLIC_PATH: &str = "/api/Planetas";

fn fields() -> Vec<FieldSpec> {
    vec![
        FieldSpec::text("name").required(),
        FieldSpec::text("image"),
        FieldSpec::multiline("description"),
        FieldSpec::numeric("poblation"),
        FieldSpec::text("color"),
    ]
}

pub fn schema() -> ResourceSchema {
    ResourceSchema::new("planet", BACKOFFICE_PATH, fields()).with_rename("poblation", "Poblation")
}

/// Schema over the public endpoint, for the browsing screens.
pub fn public_schema() -> ResourceSchema {
    ResourceSchema::new("planet", PUBLIC_PATH, fields()).with_rename("poblation", "Poblation")
}

/// Controller over the admin endpoints.
pub fn backoffice_controller(transport: Arc<dyn ApiTransport>) -> ResourceController {
    ResourceController::new(schema(), transport)
}

/// Controller over the public endpoint; used read-only.
pub fn public_controller(transport: Arc<dyn ApiTransport>) -> ResourceController {
    ResourceController::new(public_schema(), transport)
}
