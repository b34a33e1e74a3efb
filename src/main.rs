//! splat-gate - point-cloud model gateway and session authorization service
//!
//! Main entry point for the gateway server.

use std::sync::Arc;

use anyhow::Context;

use splat_gate::auth::{JsonFileTokenStore, RemoteTokenVerifier, SessionGate};
use splat_gate::config::GatewayConfig;
use splat_gate::gateway::ModelGatewayServer;
use splat_gate::logging::{LoggingConfig, LoggingSystem};

#[tokio::main]
async fn main() {
    let logging_config = if cfg!(debug_assertions) {
        LoggingConfig::development()
    } else {
        LoggingConfig::production()
    };

    // Keep the logging system alive for the process lifetime so the log
    // file handles stay open and flushed.
    let _logging_system = match LoggingSystem::init(logging_config) {
        Ok(system) => {
            tracing::info!("Logging system initialized successfully");
            Some(system)
        }
        Err(e) => {
            // Fall back to basic logging if advanced logging fails
            eprintln!("Failed to initialize logging system: {}. Using basic logging.", e);
            tracing_subscriber::fmt()
                .with_env_filter(
                    tracing_subscriber::EnvFilter::from_default_env()
                        .add_directive(tracing::Level::INFO.into()),
                )
                .init();
            None
        }
    };

    tracing::info!("Starting splat-gate...");

    if let Err(e) = run().await {
        tracing::error!(error = %format!("{:#}", e), "splat-gate exited with error");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let config = GatewayConfig::from_env().context("While resolving configuration")?;

    let store = JsonFileTokenStore::new(&config.token_store_path);
    let verifier = RemoteTokenVerifier::new(&config.verify_url, config.verify_timeout())
        .context("While building the token verification client")?;
    let gate = SessionGate::new(Arc::new(store), Arc::new(verifier));

    let server = ModelGatewayServer::new(config, gate)
        .context("While constructing the model gateway")?;

    server.start().await.context("While serving")?;
    Ok(())
}
