//! Resource definitions. Each module supplies the field table and the
//! API paths for one collection; the generic
//! [`ResourceController`](catalog_client::ResourceController) does the
//! rest.

pub mod character;
pub mod planet;
pub mod user;
