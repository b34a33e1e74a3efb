//! Session authorization gate
//!
//! Tri-state machine gating the protected view: a resolution starts at
//! `Unknown` and moves exactly once to `Authorized` or `Denied`. A token
//! arriving in the page URL is persisted before verification so later
//! page loads can fall back to it; a token that has already verified
//! valid is not re-verified until a different token replaces it.

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use super::store::TokenStore;
use super::verifier::TokenVerifier;

/// Authorization state of a page load
///
/// `Unknown` exists only before a resolution completes; `resolve` always
/// returns one of the terminal states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthorizationState {
    Unknown,
    Authorized,
    Denied,
}

impl AuthorizationState {
    /// Whether the protected view may render
    pub fn is_authorized(&self) -> bool {
        matches!(self, AuthorizationState::Authorized)
    }

    /// Whether this is a terminal state
    pub fn is_terminal(&self) -> bool {
        !matches!(self, AuthorizationState::Unknown)
    }
}

/// Session authorization gate
pub struct SessionGate {
    store: Arc<dyn TokenStore>,
    verifier: Arc<dyn TokenVerifier>,
    /// Token that has already verified valid in this process
    verified: RwLock<Option<String>>,
}

impl SessionGate {
    /// Create a gate over the given storage and verification capabilities
    pub fn new(store: Arc<dyn TokenStore>, verifier: Arc<dyn TokenVerifier>) -> Self {
        Self {
            store,
            verifier,
            verified: RwLock::new(None),
        }
    }

    /// Resolve authorization for a page load.
    ///
    /// 1. take the token candidate from the request query, else fall back
    ///    to the persisted store;
    /// 2. a query-supplied token is persisted (replacing any stored one)
    ///    before verification;
    /// 3. no token from either source resolves to `Denied` without any
    ///    network call;
    /// 4. otherwise the verifier decides; rejection, transport failure and
    ///    timeout all resolve to `Denied`. Failures are logged, never
    ///    propagated.
    pub async fn resolve(&self, query_token: Option<&str>) -> AuthorizationState {
        let from_query = query_token
            .map(str::trim)
            .filter(|token| !token.is_empty());

        let candidate: Option<SecretString> = match from_query {
            Some(token) => Some(SecretString::new(token.to_string())),
            None => match self.store.get().await {
                Ok(stored) => stored,
                Err(e) => {
                    tracing::warn!(error = %e, "token store read failed");
                    None
                }
            },
        };

        let Some(token) = candidate else {
            return AuthorizationState::Denied;
        };

        if from_query.is_some() {
            if let Err(e) = self.store.set(&token).await {
                tracing::warn!(error = %e, "failed to persist session token");
            }
        }

        if self.is_already_verified(&token).await {
            return AuthorizationState::Authorized;
        }

        match self.verifier.verify(&token).await {
            Ok(true) => {
                let mut verified = self.verified.write().await;
                *verified = Some(token.expose_secret().clone());
                AuthorizationState::Authorized
            }
            Ok(false) => AuthorizationState::Denied,
            Err(e) => {
                tracing::warn!(error = %e, "token verification failed, denying access");
                AuthorizationState::Denied
            }
        }
    }

    async fn is_already_verified(&self, token: &SecretString) -> bool {
        let verified = self.verified.read().await;
        verified.as_deref() == Some(token.expose_secret().as_str())
    }
}
