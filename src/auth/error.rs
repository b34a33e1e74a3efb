//! Authorization error types

use thiserror::Error;

/// Authorization error type
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Token store IO error: {0}")]
    StoreIo(#[from] std::io::Error),

    #[error("Token store serialization error: {0}")]
    StoreSerde(#[from] serde_json::Error),

    #[error("Verifier client build failed: {reason}")]
    ClientBuild { reason: String },

    #[error("Verification request failed: {reason}")]
    VerifierUnreachable { reason: String },
}

/// Authorization result type
pub type AuthResult<T> = Result<T, AuthError>;
