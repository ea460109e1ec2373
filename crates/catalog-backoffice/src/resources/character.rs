//! The character collection.
//!
//! `kiBase` is numeric: blank input is omitted from payloads rather than
//! sent as zero, since the server distinguishes absence from zero.

use catalog_client::{ApiTransport, FieldSpec, ResourceController, ResourceSchema};
use std::sync::Arc;

/// Admin CRUD endpoint.
pub const BACKOFFICE_PATH: &str = "/api/backoffice/personajes";
/// Public, read-only listing endpoint.
pub const PUBLIC_PATH: &str = "/api/Personajes";

fn fields() -> Vec<FieldSpec> {
    vec![
        FieldSpec::text("name").required(),
        FieldSpec::text("image"),
        FieldSpec::multiline("description"),
        FieldSpec::numeric("kiBase"),
        FieldSpec::text("FavoriteFood"),
    ]
}

pub fn schema() -> ResourceSchema {
    ResourceSchema::new("character", BACKOFFICE_PATH, fields())
}

/// Schema over the public endpoint, for the browsing screens.
pub fn public_schema() -> ResourceSchema {
    ResourceSchema::new("character", PUBLIC_PATH, fields())
}

/// Controller over the admin endpoints.
pub fn backoffice_controller(transport: Arc<dyn ApiTransport>) -> ResourceController {
    ResourceController::new(schema(), transport)
}

/// Controller over the public endpoint; used read-only.
pub fn public_controller(transport: Arc<dyn ApiTransport>) -> ResourceController {
    ResourceController::new(public_schema(), transport)
}
