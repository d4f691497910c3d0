use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::TokenSource;

#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct StaticTokenConfig {
    #[serde(default = "default_name")]
    pub name: String,
    pub token: String,
}

fn default_name() -> String {
    "static".to_string()
}

/// Always returns the same token.
pub struct StaticTokenSource {
    config: StaticTokenConfig,
}

impl StaticTokenSource {
    pub fn new(config: &StaticTokenConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }
}

#[async_trait]
impl TokenSource for StaticTokenSource {
    fn get_name(&self) -> &str {
        &self.config.name
    }

    async fn get_token(&self) -> Option<String> {
        Some(self.config.token.clone())
    }
}
