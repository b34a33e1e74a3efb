//! Model gateway server implementation
//!
//! Assembles the router, owns the shared request state, and binds the
//! listener. All state is constructed once from [`GatewayConfig`] and
//! never mutated afterwards, so concurrent requests share it without
//! locking.

use std::sync::Arc;

use axum::{
    http::{HeaderValue, Method},
    routing::get,
    Router,
};
use tower_http::cors::{Any, CorsLayer};

use crate::auth::SessionGate;
use crate::catalog::ModelCatalog;
use crate::config::{ConfigResult, GatewayConfig};

use super::error::GatewayError;
use super::paths::AllowedRoots;
use super::routes::{list_map_nodes, list_models, resolve_session, serve_file};

/// Shared state for the gateway server
#[derive(Clone)]
pub struct GatewayState {
    /// Allowed root directories (immutable after startup)
    pub roots: Arc<AllowedRoots>,
    /// Model catalog served to the viewer UI
    pub catalog: Arc<ModelCatalog>,
    /// Session authorization gate
    pub gate: Arc<SessionGate>,
}

/// Path-restricted model gateway server
///
/// Exposes the file streaming endpoint, session resolution, and the
/// catalog routes. Construction resolves and validates the allow-list;
/// a bad root configuration fails here rather than at request time.
pub struct ModelGatewayServer {
    config: GatewayConfig,
    state: GatewayState,
}

impl ModelGatewayServer {
    /// Create a gateway server from resolved configuration
    pub fn new(config: GatewayConfig, gate: SessionGate) -> ConfigResult<Self> {
        let roots = AllowedRoots::new(&config.ply_roots)?;

        let catalog = match &config.model_catalog_path {
            Some(path) => match ModelCatalog::from_file(path) {
                Ok(catalog) => catalog,
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "failed to load model catalog, using built-in entries"
                    );
                    ModelCatalog::builtin()
                }
            },
            None => ModelCatalog::builtin(),
        };

        let state = GatewayState {
            roots: Arc::new(roots),
            catalog: Arc::new(catalog),
            gate: Arc::new(gate),
        };

        Ok(Self { config, state })
    }

    /// Get a clone of the server state (for sharing with handlers)
    pub fn state_clone(&self) -> GatewayState {
        self.state.clone()
    }

    /// All allowed CORS origins
    pub fn allowed_origins(&self) -> Vec<String> {
        let mut origins = vec![
            "http://localhost:3000".to_string(),
            "http://127.0.0.1:3000".to_string(),
        ];
        origins.extend(self.config.allowed_origins.iter().cloned());
        origins
    }

    /// Build the router with all routes and middleware
    pub fn build_router(&self) -> Router {
        let cors = CorsLayer::new()
            .allow_methods([Method::GET, Method::OPTIONS])
            .allow_headers(Any)
            .allow_origin(
                self.allowed_origins()
                    .iter()
                    .filter_map(|origin| origin.parse::<HeaderValue>().ok())
                    .collect::<Vec<_>>(),
            );

        Router::new()
            .route("/file", get(serve_file))
            .route("/session", get(resolve_session))
            .route("/models", get(list_models))
            .route("/map/nodes", get(list_map_nodes))
            .route("/health", get(|| async { "OK" }))
            .layer(cors)
            .with_state(self.state.clone())
    }

    /// Start the server (blocking)
    pub async fn start(&self) -> Result<(), GatewayError> {
        let router = self.build_router();

        let listener = tokio::net::TcpListener::bind(self.config.http_addr)
            .await
            .map_err(|e| GatewayError::BindFailed {
                reason: e.to_string(),
            })?;

        let roots: Vec<String> = self
            .state
            .roots
            .roots()
            .map(|root| root.display().to_string())
            .collect();
        tracing::info!(
            addr = %self.config.http_addr,
            roots = ?roots,
            "model gateway listening"
        );

        axum::serve(listener, router)
            .await
            .map_err(|e| GatewayError::Internal {
                reason: e.to_string(),
            })?;

        Ok(())
    }

    /// Start the server in a background task
    pub fn start_background(self) -> tokio::task::JoinHandle<Result<(), GatewayError>> {
        tokio::spawn(async move { self.start().await })
    }
}
