//! # Catalog Backoffice
//!
//! The application crate: resource definitions for the character/planet
//! catalog, local auth-form validation, and configuration. Everything
//! generic lives in `catalog-client`; this crate only supplies the data
//! that makes each resource different.

pub mod auth;
pub mod config;
pub mod resources;
