//! splat-gate - point-cloud model gateway and session authorization service
//!
//! This crate provides the server side of a browser-based Gaussian-splat
//! viewer including:
//! - Path-restricted file access gateway with allow-list containment
//! - Fail-closed session authorization against a remote token verifier
//! - Model catalog and warehouse map data for the viewer UI
//! - Structured logging with console and rolling-file outputs

pub mod auth;
pub mod catalog;
pub mod config;
pub mod gateway;
pub mod logging;

// Re-export commonly used items
pub use auth::{AuthorizationState, JsonFileTokenStore, RemoteTokenVerifier, SessionGate};
pub use catalog::{ModelCatalog, ModelEntry};
pub use config::{ConfigError, GatewayConfig};
pub use gateway::{AllowedRoots, GatewayError, ModelGatewayServer};
pub use logging::{LoggingConfig, LoggingSystem};
