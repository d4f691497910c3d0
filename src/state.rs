//! Shared client state.
//!
//! Contains everything a front end holds for the lifetime of a session:
//! configuration, credential storage, the backend client, the notification
//! store and the payment SDK loader.

use crate::config::ConfigV1;
use crate::http::ApiClient;
use crate::notifications::NotificationStore;
use crate::payments::PaymentSdkLoader;
use crate::store::CredentialStore;
use std::sync::Arc;

/// Client state shared by every command or view.
///
/// Cloning is cheap; all fields are reference counted.
#[derive(Clone)]
pub struct AppState {
    /// Configuration loaded at startup.
    pub config: Arc<ConfigV1>,
    /// Local credential storage (saved session token).
    pub store: Arc<dyn CredentialStore>,
    /// Backend client with bearer token injection.
    pub api: ApiClient,
    /// Notification UI state and actions.
    pub notifications: NotificationStore,
    /// Lazily loaded payment provider handle.
    pub payments: Arc<PaymentSdkLoader>,
}
