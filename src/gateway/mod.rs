//! Path-restricted model gateway
//!
//! This module provides the HTTP server that exposes a read-only,
//! security-bounded view of the host filesystem to the viewer frontend.
//!
//! Security features:
//! - Allow-list containment with separator-boundary exact matching
//! - NUL-byte and path-traversal rejection
//! - Single-extension file type policy (`.ply`)
//! - Closed error taxonomy with deterministic status/message mapping

mod error;
mod paths;
mod routes;
mod server;
#[cfg(test)]
mod tests;

pub use error::GatewayError;
pub use paths::{AllowedRoots, ALLOWED_EXTENSION};
pub use routes::{serve_file, resolve_session, list_models, list_map_nodes, FileParams, SessionParams};
pub use server::{ModelGatewayServer, GatewayState};
