use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::debug;

use super::CredentialStore;

/// Config for the file-backed credential store.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct FileStoreConfig {
    pub path: PathBuf,
}

/// Stores credentials as a flat JSON object in a single file.
///
/// The whole file is read and rewritten on each call; the mutex keeps
/// concurrent writers within this process from interleaving.
pub struct FileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStore {
    pub fn new(config: &FileStoreConfig) -> Self {
        Self {
            path: config.path.clone(),
            lock: Mutex::new(()),
        }
    }

    async fn read_entries(&self) -> Result<BTreeMap<String, String>, String> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.is_empty() => Ok(BTreeMap::new()),
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map_err(|e| format!("Corrupt credential file '{}': {}", self.path.display(), e)),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("Credential file '{}' does not exist yet", self.path.display());
                Ok(BTreeMap::new())
            }
            Err(e) => Err(format!(
                "Error reading credential file '{}': {}",
                self.path.display(),
                e
            )),
        }
    }

    async fn write_entries(&self, entries: &BTreeMap<String, String>) -> Result<(), String> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| format!("Error creating '{}': {}", parent.display(), e))?;
            }
        }
        let body = serde_json::to_vec_pretty(entries).map_err(|e| e.to_string())?;
        tokio::fs::write(&self.path, body).await.map_err(|e| {
            format!(
                "Error writing credential file '{}': {}",
                self.path.display(),
                e
            )
        })
    }
}

#[async_trait]
impl CredentialStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, String> {
        let _guard = self.lock.lock().await;
        Ok(self.read_entries().await?.remove(key))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), String> {
        let _guard = self.lock.lock().await;
        let mut entries = self.read_entries().await?;
        entries.insert(key.to_string(), value.to_string());
        self.write_entries(&entries).await
    }

    async fn remove(&self, key: &str) -> Result<(), String> {
        let _guard = self.lock.lock().await;
        let mut entries = self.read_entries().await?;
        if entries.remove(key).is_some() {
            self.write_entries(&entries).await?;
        }
        Ok(())
    }
}
