//! Lazy handle to the hosted payment provider.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::OnceCell;
use tracing::{info, warn};

use crate::config::PaymentsConfig;

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMode {
    Test,
    Live,
}

/// Client-side view of the payment provider: the publishable key and the
/// mode it selects. Checkout itself happens on the provider's hosted pages.
#[derive(Debug)]
pub struct PaymentSdk {
    publishable_key: String,
    mode: PaymentMode,
}

impl PaymentSdk {
    fn from_key(key: &str) -> Result<Self, String> {
        let key = key.trim();
        let mode = if key.starts_with("pk_test_") {
            PaymentMode::Test
        } else if key.starts_with("pk_live_") {
            PaymentMode::Live
        } else {
            return Err("publishable key must start with pk_test_ or pk_live_".to_string());
        };
        if key.len() <= "pk_test_".len() {
            return Err("publishable key is truncated".to_string());
        }
        Ok(PaymentSdk {
            publishable_key: key.to_string(),
            mode,
        })
    }

    pub fn publishable_key(&self) -> &str {
        &self.publishable_key
    }

    pub fn mode(&self) -> PaymentMode {
        self.mode
    }
}

/// Builds the [`PaymentSdk`] on first use and hands out the same handle afterwards.
pub struct PaymentSdkLoader {
    config: PaymentsConfig,
    sdk: OnceCell<Option<Arc<PaymentSdk>>>,
}

impl PaymentSdkLoader {
    pub fn new(config: &PaymentsConfig) -> Self {
        PaymentSdkLoader {
            config: config.clone(),
            sdk: OnceCell::new(),
        }
    }

    /// `None` when no usable publishable key is configured.
    pub async fn get(&self) -> Option<Arc<PaymentSdk>> {
        self.sdk.get_or_init(|| async { self.load() }).await.clone()
    }

    fn load(&self) -> Option<Arc<PaymentSdk>> {
        let Some(key) = self.config.publishable_key.as_deref() else {
            warn!("No payment publishable key configured");
            return None;
        };
        match PaymentSdk::from_key(key) {
            Ok(sdk) => {
                info!("Payment SDK ready in {:?} mode", sdk.mode());
                Some(Arc::new(sdk))
            }
            Err(e) => {
                warn!("Payment SDK unavailable: {}", e);
                None
            }
        }
    }
}
