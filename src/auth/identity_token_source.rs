use std::time::Duration;

use async_trait::async_trait;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine as _;
use reqwest::{Method, RequestBuilder, Url};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use super::TokenSource;
use crate::utils::log_throttle::should_emit;

const LOAD_FAILED_LOG_WINDOW: Duration = Duration::from_secs(60);

/// Publishable keys carry their frontend API host as padded or unpadded base64.
const KEY_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// The config needed to reach the hosted identity provider.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct IdentityConfig {
    #[serde(default = "default_name")]
    pub name: String,
    /// `pk_test_...` / `pk_live_...`
    #[serde(default)]
    pub publishable_key: String,
    /// Frontend API base URL. Derived from the publishable key when absent.
    pub frontend_api: Option<String>,
    /// Session token template to request.
    #[serde(default = "default_template")]
    pub template: String,
    /// Sent verbatim as `Authorization` to the frontend API (native clients).
    pub client_token: Option<String>,
    /// Upper bound on the one-time SDK load. Unbounded when absent.
    pub load_timeout_ms: Option<u64>,
}

fn default_name() -> String {
    "identity".to_string()
}

fn default_template() -> String {
    "default".to_string()
}

#[derive(Deserialize)]
struct ClientEnvelope {
    response: Option<ClientResource>,
}

#[derive(Deserialize)]
struct ClientResource {
    last_active_session_id: Option<String>,
}

#[derive(Deserialize)]
struct SessionTokenResponse {
    jwt: String,
}

/// Recover the frontend API URL encoded in a publishable key.
pub fn frontend_api_from_publishable_key(key: &str) -> Result<String, String> {
    let encoded = key
        .strip_prefix("pk_test_")
        .or_else(|| key.strip_prefix("pk_live_"))
        .ok_or_else(|| "publishable key must start with pk_test_ or pk_live_".to_string())?;

    let decoded = KEY_ENGINE
        .decode(encoded)
        .map_err(|e| format!("publishable key is not valid base64: {}", e))?;
    let decoded =
        String::from_utf8(decoded).map_err(|_| "publishable key is not valid UTF-8".to_string())?;

    match decoded.strip_suffix('$') {
        Some(host) if !host.is_empty() => Ok(format!("https://{}", host)),
        _ => Err("publishable key does not encode a frontend API host".to_string()),
    }
}

/// Token source backed by the identity provider's frontend API.
///
/// The SDK load (an environment handshake) runs at most once per instance;
/// every caller, including concurrent first callers, shares its outcome.
/// A failed load is remembered and all later calls return `None`.
pub struct IdentityTokenSource {
    config: IdentityConfig,
    frontend_api: String,
    client: reqwest::Client,
    loaded: OnceCell<bool>,
}

impl IdentityTokenSource {
    pub fn new(config: &IdentityConfig) -> Result<Self, String> {
        let frontend_api = match &config.frontend_api {
            Some(api) if !api.trim().is_empty() => api.trim().trim_end_matches('/').to_string(),
            _ => frontend_api_from_publishable_key(&config.publishable_key)?,
        };
        info!(
            "Creating identity token source '{}' against '{}'",
            config.name, frontend_api
        );
        Ok(Self {
            config: config.clone(),
            frontend_api,
            client: reqwest::Client::new(),
            loaded: OnceCell::new(),
        })
    }

    pub fn frontend_api(&self) -> &str {
        &self.frontend_api
    }

    /// Append percent-encoded path segments to the frontend API URL.
    fn url(&self, segments: &[&str]) -> Result<Url, String> {
        let mut url = Url::parse(&self.frontend_api)
            .map_err(|e| format!("Invalid frontend API '{}': {}", self.frontend_api, e))?;
        url.path_segments_mut()
            .map_err(|_| format!("Frontend API '{}' cannot be a base URL", self.frontend_api))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder, String> {
        let builder = self.client.request(method, self.url(segments)?);
        Ok(match &self.config.client_token {
            Some(token) => builder.header(reqwest::header::AUTHORIZATION, token),
            None => builder,
        })
    }

    async fn fetch_environment(&self) -> Result<(), String> {
        let response = self
            .request(Method::GET, &["v1", "environment"])?
            .send()
            .await
            .map_err(|e| format!("Error sending request: {}", e))?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(format!("Unexpected status code: {}", response.status()))
        }
    }

    async fn load(&self) -> bool {
        let result = match self.config.load_timeout_ms {
            Some(ms) => timeout(Duration::from_millis(ms), self.fetch_environment())
                .await
                .unwrap_or_else(|_| Err(format!("timed out after {} ms", ms))),
            None => self.fetch_environment().await,
        };
        match result {
            Ok(()) => {
                info!(
                    event_name = "auth.identity.loaded",
                    event_domain = "auth",
                    source = self.config.name.as_str(),
                    "identity SDK loaded"
                );
                true
            }
            Err(e) => {
                warn!(
                    event_name = "auth.identity.load_failed",
                    event_domain = "auth",
                    source = self.config.name.as_str(),
                    error = e.as_str(),
                    "identity SDK failed to load; no tokens will be issued"
                );
                false
            }
        }
    }

    /// Runs the one-time load if needed and reports whether it succeeded.
    pub async fn ensure_loaded(&self) -> bool {
        *self.loaded.get_or_init(|| self.load()).await
    }

    async fn active_session(&self) -> Result<Option<String>, String> {
        let response = self
            .request(Method::GET, &["v1", "client"])?
            .send()
            .await
            .map_err(|e| format!("Error sending request: {}", e))?;
        if !response.status().is_success() {
            return Err(format!("Unexpected status code: {}", response.status()));
        }
        let envelope: ClientEnvelope = response
            .json()
            .await
            .map_err(|e| format!("Error parsing JSON: {}", e))?;
        Ok(envelope
            .response
            .and_then(|client| client.last_active_session_id))
    }

    async fn session_token(&self, session_id: &str) -> Result<String, String> {
        let segments = [
            "v1",
            "client",
            "sessions",
            session_id,
            "tokens",
            self.config.template.as_str(),
        ];
        let response = self
            .request(Method::POST, &segments)?
            .send()
            .await
            .map_err(|e| format!("Error sending request: {}", e))?;
        if !response.status().is_success() {
            return Err(format!("Unexpected status code: {}", response.status()));
        }
        let token: SessionTokenResponse = response
            .json()
            .await
            .map_err(|e| format!("Error parsing JSON: {}", e))?;
        Ok(token.jwt)
    }
}

#[async_trait]
impl TokenSource for IdentityTokenSource {
    fn get_name(&self) -> &str {
        &self.config.name
    }

    async fn get_token(&self) -> Option<String> {
        if !self.ensure_loaded().await {
            if let Some(suppressed_count) =
                should_emit("auth.identity.unavailable", LOAD_FAILED_LOG_WINDOW)
            {
                debug!(
                    event_name = "auth.identity.unavailable",
                    event_domain = "auth",
                    suppressed_count,
                    "identity SDK unavailable"
                );
            }
            return None;
        }

        let session_id = match self.active_session().await {
            Ok(Some(id)) => id,
            Ok(None) => {
                debug!("No active identity session");
                return None;
            }
            Err(e) => {
                debug!("Looking up the active session failed: {}", e);
                return None;
            }
        };

        match self.session_token(&session_id).await {
            Ok(token) => Some(token),
            Err(e) => {
                debug!("Fetching a session token failed: {}", e);
                None
            }
        }
    }
}
