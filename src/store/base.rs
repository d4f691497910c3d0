use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use super::{file_store::FileStore, memory_store::MemoryStore, no_store::NoStore};
use crate::config::{StoreBackend, StoreConfig};

/// Key under which the session token is kept.
pub const AUTH_TOKEN_KEY: &str = "auth_token";

/// The CredentialStore trait abstracts persistent client-side key/value storage
/// (the local-storage analogue used for the session token).
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, String>;
    async fn set(&self, key: &str, value: &str) -> Result<(), String>;
    async fn remove(&self, key: &str) -> Result<(), String>;
    /// False only for the disabled store, so token lookups can skip it quietly.
    fn is_enabled(&self) -> bool {
        true
    }
}

/// Creates a concrete store implementation based on the StoreConfig.
/// If `store.enabled = false`, returns NoStore. Otherwise, picks the specified backend.
pub fn create_store(config: &StoreConfig) -> Result<Arc<dyn CredentialStore>, String> {
    if !config.enabled {
        info!("Credential store is disabled. Using NoStore.");
        return Ok(Arc::new(NoStore::new()));
    }

    match &config.backend {
        Some(StoreBackend::File(file_config)) => {
            info!("Using file credential store at '{}'", file_config.path.display());
            Ok(Arc::new(FileStore::new(file_config)))
        }
        Some(StoreBackend::Memory) => {
            info!("Using in-memory credential store.");
            Ok(Arc::new(MemoryStore::new()))
        }
        None => Err("Store is enabled, but no backend config is provided!".to_string()),
    }
}
