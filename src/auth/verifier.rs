//! Remote token verification
//!
//! The verification service accepts `POST { "token": ... }` and signals
//! validity through its HTTP status alone: any 2xx response is valid, and
//! the response body is not inspected. Non-2xx statuses report as invalid;
//! transport failures and timeouts surface as errors for the gate to
//! handle.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

use super::error::{AuthError, AuthResult};

/// Request body for the verification endpoint
#[derive(Debug, Serialize)]
struct VerifyRequest<'a> {
    token: &'a str,
}

/// Token verification capability
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    /// Check a token against the verification authority.
    ///
    /// `Ok(false)` is an explicit rejection; `Err` is an unreachable or
    /// timed-out verifier. Callers must treat both as unauthorized.
    async fn verify(&self, token: &SecretString) -> AuthResult<bool>;
}

/// HTTP client for the remote verification service
pub struct RemoteTokenVerifier {
    client: reqwest::Client,
    endpoint: String,
}

impl RemoteTokenVerifier {
    /// Create a verifier for the given endpoint with a request timeout
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> AuthResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AuthError::ClientBuild {
                reason: e.to_string(),
            })?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    /// The verification endpoint URL
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl TokenVerifier for RemoteTokenVerifier {
    async fn verify(&self, token: &SecretString) -> AuthResult<bool> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&VerifyRequest {
                token: token.expose_secret(),
            })
            .send()
            .await
            .map_err(|e| AuthError::VerifierUnreachable {
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            tracing::warn!(status = %response.status(), "token verification rejected");
            return Ok(false);
        }

        Ok(true)
    }
}
