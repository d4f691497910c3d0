use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::models::{NotificationList, PermissionStatus, SubscribeRequest};
use super::platform::NotificationPlatform;
use super::presenter::{Presenter, Toast};
use super::push::{decode_key, PushOutcome};
use super::state::NotificationState;
use crate::config::{PushConfig, ToastConfig};
use crate::error::ClientError;
use crate::http::ApiClient;

/// Owns the notification UI state and the actions that change it.
///
/// Cloning is cheap and every clone shares the same state. Actions may run
/// concurrently; overlapping loads are not sequenced and the last one to
/// finish wins. Mutations are applied only after the backend acknowledges.
#[derive(Clone)]
pub struct NotificationStore {
    inner: Arc<Inner>,
}

struct Inner {
    api: ApiClient,
    platform: Arc<dyn NotificationPlatform>,
    presenter: Arc<dyn Presenter>,
    state: watch::Sender<NotificationState>,
    server_key: Option<String>,
    toast_dismiss_after: Duration,
}

impl NotificationStore {
    pub fn new(
        api: ApiClient,
        platform: Arc<dyn NotificationPlatform>,
        presenter: Arc<dyn Presenter>,
        push: &PushConfig,
        toast: &ToastConfig,
    ) -> Self {
        let (state, _) = watch::channel(NotificationState::default());
        NotificationStore {
            inner: Arc::new(Inner {
                api,
                platform,
                presenter,
                state,
                server_key: push.vapid_public_key.clone(),
                toast_dismiss_after: Duration::from_millis(toast.dismiss_after_ms),
            }),
        }
    }

    /// A receiver that observes every state change.
    pub fn subscribe(&self) -> watch::Receiver<NotificationState> {
        self.inner.state.subscribe()
    }

    pub fn snapshot(&self) -> NotificationState {
        self.inner.state.borrow().clone()
    }

    fn apply(&self, transition: impl FnOnce(NotificationState) -> NotificationState) {
        self.inner
            .state
            .send_modify(|state| *state = transition(std::mem::take(state)));
    }

    /// Ask for notification permission and subscribe to push once granted.
    ///
    /// Returns `true` when permission is granted. Push registration failures
    /// are logged and do not change the result.
    pub async fn request_permission(&self) -> bool {
        let platform = &self.inner.platform;
        if !platform.supports_notifications() {
            info!(
                "Platform '{}' does not support notifications",
                platform.get_name()
            );
            return false;
        }

        let permission = match platform.permission() {
            PermissionStatus::Default => platform.request_permission().await,
            decided => decided,
        };
        self.apply(|state| state.with_permission(permission));

        if permission != PermissionStatus::Granted {
            debug!("Notification permission is {:?}", permission);
            return false;
        }

        // Failures are already logged by subscribe_to_push.
        let _ = self.subscribe_to_push().await;
        true
    }

    /// Reuse or create a push subscription and forward it to the backend.
    pub async fn subscribe_to_push(&self) -> Result<PushOutcome, ClientError> {
        if !self.inner.platform.supports_push() {
            debug!(
                "Platform '{}' has no push support; skipping subscription",
                self.inner.platform.get_name()
            );
            return Ok(PushOutcome::Unsupported);
        }

        let result = self.register_push().await;
        if let Err(e) = &result {
            error!(
                event_name = "notifications.push.subscribe_failed",
                event_domain = "notifications",
                error = %e,
                "failed to subscribe to push notifications"
            );
        }
        result
    }

    async fn register_push(&self) -> Result<PushOutcome, ClientError> {
        let platform = &self.inner.platform;
        let subscription = match platform
            .existing_subscription()
            .await
            .map_err(ClientError::Platform)?
        {
            Some(existing) => {
                debug!("Reusing existing push subscription");
                existing
            }
            None => {
                let Some(key) = self.server_key() else {
                    return Ok(PushOutcome::MissingServerKey);
                };
                platform
                    .subscribe(&key)
                    .await
                    .map_err(ClientError::Platform)?
            }
        };

        self.inner
            .api
            .post_json(
                &["api", "notifications", "subscribe"],
                &SubscribeRequest::from(&subscription),
            )
            .await?;

        info!(
            event_name = "notifications.push.registered",
            event_domain = "notifications",
            endpoint = subscription.endpoint.as_str(),
            "push subscription registered with backend"
        );
        Ok(PushOutcome::Registered)
    }

    fn server_key(&self) -> Option<Vec<u8>> {
        let Some(raw) = &self.inner.server_key else {
            warn!("No push application server key configured; cannot create a subscription");
            return None;
        };
        match decode_key(raw) {
            Ok(key) => Some(key),
            Err(e) => {
                warn!("Push application server key is unusable: {}", e);
                None
            }
        }
    }

    /// Fetch the full list and replace local state with it.
    pub async fn load_notifications(&self) -> Result<(), ClientError> {
        self.apply(NotificationState::loading_started);

        match self
            .inner
            .api
            .get_json::<NotificationList>(&["api", "notifications"])
            .await
        {
            Ok(list) => {
                debug!("Loaded {} notifications", list.notifications.len());
                self.apply(|state| state.loaded(list.notifications));
                Ok(())
            }
            Err(e) => {
                error!(
                    event_name = "notifications.load_failed",
                    event_domain = "notifications",
                    error = %e,
                    "failed to load notifications"
                );
                self.apply(NotificationState::load_failed);
                Err(e)
            }
        }
    }

    pub async fn mark_as_read(&self, id: i64) -> Result<(), ClientError> {
        let id_segment = id.to_string();
        match self
            .inner
            .api
            .put(&["api", "notifications", &id_segment, "read"])
            .await
        {
            Ok(()) => {
                self.apply(|state| state.marked_read(id));
                Ok(())
            }
            Err(e) => {
                error!(
                    event_name = "notifications.mark_read_failed",
                    event_domain = "notifications",
                    notification_id = id,
                    error = %e,
                    "failed to mark notification as read"
                );
                Err(e)
            }
        }
    }

    pub async fn mark_all_as_read(&self) -> Result<(), ClientError> {
        match self
            .inner
            .api
            .put(&["api", "notifications", "read-all"])
            .await
        {
            Ok(()) => {
                self.apply(NotificationState::all_marked_read);
                Ok(())
            }
            Err(e) => {
                error!(
                    event_name = "notifications.mark_all_read_failed",
                    event_domain = "notifications",
                    error = %e,
                    "failed to mark all notifications as read"
                );
                Err(e)
            }
        }
    }

    /// Show a toast, schedule its dismissal, and refresh the list in the background.
    ///
    /// Outside a Tokio runtime the toast is still shown but neither the
    /// dismissal nor the refresh can be scheduled.
    pub fn show_in_app(&self, title: &str, message: &str, action_url: Option<&str>) -> Uuid {
        let toast = Toast::new(title, message, action_url);
        self.inner.presenter.show(&toast);
        let id = toast.id;

        let handle = match Handle::try_current() {
            Ok(handle) => handle,
            Err(e) => {
                warn!(
                    event_name = "notifications.toast.no_runtime",
                    event_domain = "notifications",
                    toast_id = %id,
                    error = %e,
                    "no async runtime; toast will not be dismissed or followed by a refresh"
                );
                return id;
            }
        };

        let presenter = self.inner.presenter.clone();
        let delay = self.inner.toast_dismiss_after;
        handle.spawn(async move {
            tokio::time::sleep(delay).await;
            presenter.dismiss(id);
        });

        let store = self.clone();
        handle.spawn(async move {
            // Failures are already logged by load_notifications.
            let _ = store.load_notifications().await;
        });

        id
    }
}
