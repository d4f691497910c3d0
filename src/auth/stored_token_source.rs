use std::sync::Arc;

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::TokenSource;
use crate::store::{CredentialStore, AUTH_TOKEN_KEY};

/// Reads the bearer token saved in the credential store.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct StoredTokenConfig {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_key")]
    pub key: String,
}

fn default_name() -> String {
    "stored".to_string()
}

fn default_key() -> String {
    AUTH_TOKEN_KEY.to_string()
}

impl Default for StoredTokenConfig {
    fn default() -> Self {
        StoredTokenConfig {
            name: default_name(),
            key: default_key(),
        }
    }
}

pub struct StoredTokenSource {
    config: StoredTokenConfig,
    store: Arc<dyn CredentialStore>,
}

impl StoredTokenSource {
    pub fn new(config: &StoredTokenConfig, store: Arc<dyn CredentialStore>) -> Self {
        Self {
            config: config.clone(),
            store,
        }
    }
}

#[async_trait]
impl TokenSource for StoredTokenSource {
    fn get_name(&self) -> &str {
        &self.config.name
    }

    async fn get_token(&self) -> Option<String> {
        if !self.store.is_enabled() {
            return None;
        }
        match self.store.get(&self.config.key).await {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(e) => {
                debug!("Reading '{}' from credential store failed: {}", self.config.key, e);
                None
            }
        }
    }
}
