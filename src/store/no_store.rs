use super::CredentialStore;
use async_trait::async_trait;

/// Stands in when persistence is switched off; every call fails.
pub struct NoStore;

impl NoStore {
    pub fn new() -> Self {
        NoStore
    }
}

impl Default for NoStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CredentialStore for NoStore {
    async fn get(&self, _key: &str) -> Result<Option<String>, String> {
        Err("Credential store is disabled".into())
    }

    async fn set(&self, _key: &str, _value: &str) -> Result<(), String> {
        Err("Credential store is disabled".into())
    }

    async fn remove(&self, _key: &str) -> Result<(), String> {
        Err("Credential store is disabled".into())
    }

    fn is_enabled(&self) -> bool {
        false
    }
}
