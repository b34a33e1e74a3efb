//! Token persistence
//!
//! [`TokenStore`] is the durable key-value capability the session gate
//! depends on: one slot, `get`/`set`. The file-backed implementation
//! mirrors how browsers keep the token across page reloads; the in-memory
//! implementation backs tests and ephemeral deployments.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use super::error::AuthResult;

/// Durable single-slot token storage
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Read the persisted token, if any
    async fn get(&self) -> AuthResult<Option<SecretString>>;

    /// Persist a token, replacing any previous one
    async fn set(&self, token: &SecretString) -> AuthResult<()>;
}

/// Persisted token record
#[derive(Debug, Serialize, Deserialize)]
struct PersistedToken {
    token: String,
    updated_at: String,
}

/// JSON file-backed token store with atomic writes
pub struct JsonFileTokenStore {
    path: PathBuf,
}

impl JsonFileTokenStore {
    /// Create a store persisting to the given file path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The file path this store persists to
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn write_record(&self, record: &PersistedToken) -> AuthResult<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let content = serde_json::to_string_pretty(record)?;

        // Write to temp file first, then atomic rename
        let temp_path = self.path.with_extension("json.tmp");
        tokio::fs::write(&temp_path, &content).await?;
        tokio::fs::rename(&temp_path, &self.path).await?;

        Ok(())
    }
}

#[async_trait]
impl TokenStore for JsonFileTokenStore {
    async fn get(&self) -> AuthResult<Option<SecretString>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let record: PersistedToken = serde_json::from_str(&content)?;
        Ok(Some(SecretString::new(record.token)))
    }

    async fn set(&self, token: &SecretString) -> AuthResult<()> {
        let record = PersistedToken {
            token: token.expose_secret().clone(),
            updated_at: chrono::Utc::now().to_rfc3339(),
        };
        self.write_record(&record).await
    }
}

/// In-memory token store
#[derive(Default)]
pub struct MemoryTokenStore {
    token: RwLock<Option<String>>,
}

impl MemoryTokenStore {
    /// Create an empty in-memory store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-seeded with a token
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: RwLock::new(Some(token.into())),
        }
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn get(&self) -> AuthResult<Option<SecretString>> {
        let token = self.token.read().await;
        Ok(token.clone().map(SecretString::new))
    }

    async fn set(&self, token: &SecretString) -> AuthResult<()> {
        let mut slot = self.token.write().await;
        *slot = Some(token.expose_secret().clone());
        Ok(())
    }
}
