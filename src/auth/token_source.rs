use std::sync::Arc;
use std::time::Duration;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::identity_token_source::{IdentityConfig, IdentityTokenSource};
use super::static_token_source::{StaticTokenConfig, StaticTokenSource};
use super::stored_token_source::{StoredTokenConfig, StoredTokenSource};
use crate::store::CredentialStore;
use crate::utils::log_throttle::should_emit;

const NO_TOKEN_LOG_WINDOW: Duration = Duration::from_secs(60);

/// Configuration options for each token source, tried in the listed order.
#[derive(Deserialize, Serialize, JsonSchema, Debug, Clone)]
#[serde(tag = "type")]
pub enum TokenSourceConfig {
    /// The hosted identity provider; uses the top-level `identity` section.
    #[serde(rename = "identity")]
    Identity,
    /// A token previously saved in the credential store.
    #[serde(rename = "stored")]
    Stored(StoredTokenConfig),
    /// A fixed token, for development and tests.
    #[serde(rename = "static")]
    Static(StaticTokenConfig),
}

/// Anything that can hand out the current session's bearer token.
///
/// Returning `None` means "no session"; sources never fail loudly, the
/// request simply goes out unauthenticated.
#[async_trait::async_trait]
pub trait TokenSource: Send + Sync {
    fn get_name(&self) -> &str;
    async fn get_token(&self) -> Option<String>;
}

/// Create a token source from a given config.
pub fn create_token_source(
    config: &TokenSourceConfig,
    identity: Option<&IdentityConfig>,
    store: &Arc<dyn CredentialStore>,
) -> Result<Box<dyn TokenSource>, String> {
    match config {
        TokenSourceConfig::Identity => {
            let identity = identity.ok_or_else(|| {
                "token source 'identity' requires an `identity` config section".to_string()
            })?;
            Ok(Box::new(IdentityTokenSource::new(identity)?))
        }
        TokenSourceConfig::Stored(cfg) => Ok(Box::new(StoredTokenSource::new(cfg, store.clone()))),
        TokenSourceConfig::Static(cfg) => Ok(Box::new(StaticTokenSource::new(cfg))),
    }
}

/// Tries each source in sequence and returns the first token found.
pub struct TokenChain {
    sources: Vec<Box<dyn TokenSource>>,
}

impl TokenChain {
    pub fn new(sources: Vec<Box<dyn TokenSource>>) -> Self {
        TokenChain { sources }
    }

    /// Build the chain from config. A source that cannot be built (e.g. the
    /// identity source without an `identity` section) is skipped with a warning.
    pub fn from_config(
        configs: &[TokenSourceConfig],
        identity: Option<&IdentityConfig>,
        store: &Arc<dyn CredentialStore>,
    ) -> Self {
        info!("Creating token sources...");
        let sources = configs
            .iter()
            .filter_map(|cfg| match create_token_source(cfg, identity, store) {
                Ok(source) => Some(source),
                Err(e) => {
                    warn!("Skipping token source: {}", e);
                    None
                }
            })
            .collect();
        TokenChain { sources }
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

#[async_trait::async_trait]
impl TokenSource for TokenChain {
    fn get_name(&self) -> &str {
        "token-chain"
    }

    async fn get_token(&self) -> Option<String> {
        for source in &self.sources {
            match source.get_token().await {
                Some(token) => {
                    debug!("Token source '{}' supplied a token", source.get_name());
                    return Some(token);
                }
                None => debug!("Token source '{}' has no token", source.get_name()),
            }
        }

        if let Some(suppressed_count) = should_emit("auth.token_chain.empty", NO_TOKEN_LOG_WINDOW) {
            debug!(
                event_name = "auth.token_chain.empty",
                event_domain = "auth",
                sources = self.sources.len(),
                suppressed_count,
                "no token source supplied a token; requests go out unauthenticated"
            );
        }
        None
    }
}
