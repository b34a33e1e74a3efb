//! Gateway configuration
//!
//! All runtime settings come from environment variables, resolved exactly
//! once at process start into an explicit [`GatewayConfig`] value that is
//! passed into the server constructor. There is no runtime reload and no
//! global configuration state.
//!
//! | Variable | Meaning |
//! |---|---|
//! | `GS_PLY_ROOTS` | comma-separated absolute allowed root directories |
//! | `GS_HTTP_ADDR` | socket address the gateway binds to |
//! | `GS_VERIFY_URL` | token verification endpoint |
//! | `GS_VERIFY_TIMEOUT_MS` | verification request timeout |
//! | `GS_TOKEN_STORE` | path of the persisted-token JSON file |
//! | `GS_MODEL_CATALOG` | optional model catalog JSON file |
//! | `GS_ALLOWED_ORIGINS` | additional CORS origins, comma-separated |


use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use thiserror::Error;

/// Configuration error types
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid bind address '{value}': {reason}")]
    InvalidAddr { value: String, reason: String },

    #[error("Allowed root is not an absolute path: {root}")]
    RelativeRoot { root: String },

    #[error("No allowed roots configured")]
    EmptyRootSet,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration result type
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Main gateway configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Socket address the HTTP server binds to
    #[serde(default = "default_http_addr")]
    pub http_addr: SocketAddr,

    /// Allowed root directories for file retrieval
    #[serde(default = "default_ply_roots")]
    pub ply_roots: Vec<PathBuf>,

    /// Token verification endpoint
    #[serde(default = "default_verify_url")]
    pub verify_url: String,

    /// Verification request timeout in milliseconds
    #[serde(default = "default_verify_timeout_ms")]
    pub verify_timeout_ms: u64,

    /// Path of the persisted-token JSON file
    #[serde(default = "default_token_store_path")]
    pub token_store_path: PathBuf,

    /// Optional model catalog JSON file replacing the built-in catalog
    #[serde(default)]
    pub model_catalog_path: Option<PathBuf>,

    /// Additional allowed CORS origins
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

fn default_http_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8080))
}

fn default_ply_roots() -> Vec<PathBuf> {
    vec![PathBuf::from("/tmp")]
}

fn default_verify_url() -> String {
    "http://13.228.40.232:6699/3d-map/verify-cross-page-token".to_string()
}

fn default_verify_timeout_ms() -> u64 {
    5000
}

fn default_token_store_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("splat-gate")
        .join("token.json")
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            http_addr: default_http_addr(),
            ply_roots: default_ply_roots(),
            verify_url: default_verify_url(),
            verify_timeout_ms: default_verify_timeout_ms(),
            token_store_path: default_token_store_path(),
            model_catalog_path: None,
            allowed_origins: Vec::new(),
        }
    }
}

impl GatewayConfig {
    /// Resolve configuration from the process environment.
    ///
    /// Unset or empty variables fall back to the documented defaults; a
    /// malformed `GS_HTTP_ADDR` is an error rather than a silent fallback.
    pub fn from_env() -> ConfigResult<Self> {
        let mut config = Self::default();

        if let Some(raw) = read_env("GS_PLY_ROOTS") {
            let roots = parse_list(&raw);
            if !roots.is_empty() {
                config.ply_roots = roots.into_iter().map(PathBuf::from).collect();
            }
        }

        if let Some(raw) = read_env("GS_HTTP_ADDR") {
            config.http_addr = raw.parse().map_err(|e: std::net::AddrParseError| {
                ConfigError::InvalidAddr {
                    value: raw.clone(),
                    reason: e.to_string(),
                }
            })?;
        }

        if let Some(raw) = read_env("GS_VERIFY_URL") {
            config.verify_url = raw;
        }

        if let Some(raw) = read_env("GS_VERIFY_TIMEOUT_MS") {
            match raw.parse::<u64>() {
                Ok(ms) => config.verify_timeout_ms = ms,
                Err(_) => {
                    tracing::warn!(
                        value = %raw,
                        default_ms = config.verify_timeout_ms,
                        "GS_VERIFY_TIMEOUT_MS is not a number, using default"
                    );
                }
            }
        }

        if let Some(raw) = read_env("GS_TOKEN_STORE") {
            config.token_store_path = PathBuf::from(raw);
        }

        if let Some(raw) = read_env("GS_MODEL_CATALOG") {
            config.model_catalog_path = Some(PathBuf::from(raw));
        }

        if let Some(raw) = read_env("GS_ALLOWED_ORIGINS") {
            config.allowed_origins = parse_list(&raw);
        }

        Ok(config)
    }

    /// Verification timeout as a [`std::time::Duration`]
    pub fn verify_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.verify_timeout_ms)
    }
}

/// Read an environment variable, treating unset and empty as absent
fn read_env(name: &str) -> Option<String> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Some(value),
        _ => None,
    }
}

/// Split a comma-separated list, trimming entries and dropping empty ones
pub(crate) fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|entry| entry.trim())
        .filter(|entry| !entry.is_empty())
        .map(|entry| entry.to_string())
        .collect()
}
