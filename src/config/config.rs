use std::path::Path;

use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use schemars::{schema_for, JsonSchema};
use serde::{Deserialize, Serialize};

use super::logging::LoggingConfig;
use super::store::StoreConfig;
use crate::auth::{IdentityConfig, TokenSourceConfig};
use crate::notifications::PlatformConfig;

/// A top-level enum for versioned configurations.
#[derive(Deserialize, Serialize, JsonSchema)]
#[serde(tag = "version")]
pub enum Config {
    #[serde(rename = "1.0.0")]
    ConfigV1(ConfigV1),
}

/// Main config for v1.0.0: backend location, credential sources, push and payments.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct ConfigV1 {
    pub backend_url: String,
    pub identity: Option<IdentityConfig>,
    #[serde(default = "default_token_sources")]
    pub token_sources: Vec<TokenSourceConfig>,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub payments: PaymentsConfig,
    #[serde(default)]
    pub push: PushConfig,
    #[serde(default)]
    pub platform: PlatformConfig,
    #[serde(default)]
    pub toast: ToastConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_token_sources() -> Vec<TokenSourceConfig> {
    vec![
        TokenSourceConfig::Identity,
        TokenSourceConfig::Stored(Default::default()),
    ]
}

/// Payment provider settings; only the publishable key is known to the client.
#[derive(Deserialize, Serialize, Debug, Clone, Default, JsonSchema)]
pub struct PaymentsConfig {
    pub publishable_key: Option<String>,
}

/// Web push settings.
#[derive(Deserialize, Serialize, Debug, Clone, Default, JsonSchema)]
pub struct PushConfig {
    /// VAPID application server key, URL-safe base64.
    pub vapid_public_key: Option<String>,
}

/// In-app toast settings.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct ToastConfig {
    #[serde(default = "default_dismiss_after_ms")]
    pub dismiss_after_ms: u64,
}

fn default_dismiss_after_ms() -> u64 {
    5000
}

impl Default for ToastConfig {
    fn default() -> Self {
        ToastConfig {
            dismiss_after_ms: default_dismiss_after_ms(),
        }
    }
}

/// Backend HTTP settings. No timeout unless one is configured.
#[derive(Deserialize, Serialize, Debug, Clone, Default, JsonSchema)]
pub struct HttpConfig {
    pub timeout_in_ms: Option<u64>,
}

/// Maps the public build-time variables onto config keys.
fn public_env() -> Env {
    Env::prefixed("PUBLIC_").map(|key| {
        match key.as_str().to_ascii_lowercase().as_str() {
            "backend_url" => "backend_url".into(),
            "clerk_publishable_key" => "identity.publishable_key".into(),
            "clerk_frontend_api" => "identity.frontend_api".into(),
            "stripe_publishable_key" => "payments.publishable_key".into(),
            "vapid_public_key" => "push.vapid_public_key".into(),
            other => other.to_string().into(),
        }
    })
}

/// Builds the figment: defaults, then the YAML file, then `PUBLIC_*` variables.
pub fn figment(path: &Path) -> Figment {
    Figment::from(Serialized::default("version", "1.0.0"))
        .merge(Yaml::file(path))
        .merge(public_env())
}

/// Extract a `ConfigV1` from an already assembled figment.
pub fn extract(figment: Figment) -> Result<ConfigV1, String> {
    match figment.extract::<Config>() {
        Ok(Config::ConfigV1(c)) => Ok(c),
        Err(e) => Err(e.to_string()),
    }
}

/// Load config from the given YAML file layered with the process environment.
pub fn load_config(path: &Path) -> ConfigV1 {
    match extract(figment(path)) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Error loading configuration: {}", e);
            std::process::exit(1);
        }
    }
}

/// Print the JSON schema for the configuration to stdout.
pub fn print_schema() -> Result<(), serde_json::Error> {
    let schema = schema_for!(Config);
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}
