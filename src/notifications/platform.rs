use std::sync::Arc;

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::models::{PermissionStatus, PushSubscription};
use super::push::decode_key;

/// Which platform adapter backs notification permission and push.
#[derive(Deserialize, Serialize, JsonSchema, Debug, Clone, Default)]
#[serde(tag = "type")]
pub enum PlatformConfig {
    #[default]
    #[serde(rename = "headless")]
    Headless,
    #[serde(rename = "provisioned")]
    Provisioned(ProvisionedPlatformConfig),
}

/// A device whose push endpoint was registered out of band.
#[derive(Deserialize, Serialize, JsonSchema, Debug, Clone)]
pub struct ProvisionedPlatformConfig {
    pub endpoint: String,
    /// URL-safe or standard base64.
    pub p256dh: String,
    /// URL-safe or standard base64.
    pub auth: String,
}

/// The notification and push capabilities of the environment the client runs in.
#[async_trait]
pub trait NotificationPlatform: Send + Sync {
    fn get_name(&self) -> &str;
    /// Whether notifications can be shown at all.
    fn supports_notifications(&self) -> bool;
    /// Whether push subscriptions (and the worker that receives them) exist.
    fn supports_push(&self) -> bool;
    fn permission(&self) -> PermissionStatus;
    /// Prompt the user; returns the answer.
    async fn request_permission(&self) -> PermissionStatus;
    async fn existing_subscription(&self) -> Result<Option<PushSubscription>, String>;
    async fn subscribe(&self, application_server_key: &[u8]) -> Result<PushSubscription, String>;
}

/// Create a platform adapter from a given config.
pub fn create_platform(config: &PlatformConfig) -> Result<Arc<dyn NotificationPlatform>, String> {
    match config {
        PlatformConfig::Headless => Ok(Arc::new(HeadlessPlatform)),
        PlatformConfig::Provisioned(cfg) => Ok(Arc::new(ProvisionedPlatform::new(cfg)?)),
    }
}

/// No notification or push support.
pub struct HeadlessPlatform;

#[async_trait]
impl NotificationPlatform for HeadlessPlatform {
    fn get_name(&self) -> &str {
        "headless"
    }

    fn supports_notifications(&self) -> bool {
        false
    }

    fn supports_push(&self) -> bool {
        false
    }

    fn permission(&self) -> PermissionStatus {
        PermissionStatus::Denied
    }

    async fn request_permission(&self) -> PermissionStatus {
        PermissionStatus::Denied
    }

    async fn existing_subscription(&self) -> Result<Option<PushSubscription>, String> {
        Ok(None)
    }

    async fn subscribe(&self, _application_server_key: &[u8]) -> Result<PushSubscription, String> {
        Err("push is not supported on a headless platform".to_string())
    }
}

/// Permission is granted up front and the subscription already exists.
pub struct ProvisionedPlatform {
    subscription: PushSubscription,
}

impl ProvisionedPlatform {
    pub fn new(config: &ProvisionedPlatformConfig) -> Result<Self, String> {
        let subscription = PushSubscription {
            endpoint: config.endpoint.clone(),
            p256dh: decode_key(&config.p256dh).map_err(|e| format!("p256dh: {}", e))?,
            auth: decode_key(&config.auth).map_err(|e| format!("auth: {}", e))?,
        };
        info!("Using provisioned push endpoint '{}'", subscription.endpoint);
        Ok(Self { subscription })
    }
}

#[async_trait]
impl NotificationPlatform for ProvisionedPlatform {
    fn get_name(&self) -> &str {
        "provisioned"
    }

    fn supports_notifications(&self) -> bool {
        true
    }

    fn supports_push(&self) -> bool {
        true
    }

    fn permission(&self) -> PermissionStatus {
        PermissionStatus::Granted
    }

    async fn request_permission(&self) -> PermissionStatus {
        PermissionStatus::Granted
    }

    async fn existing_subscription(&self) -> Result<Option<PushSubscription>, String> {
        Ok(Some(self.subscription.clone()))
    }

    async fn subscribe(&self, _application_server_key: &[u8]) -> Result<PushSubscription, String> {
        Ok(self.subscription.clone())
    }
}
