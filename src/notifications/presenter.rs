use serde::Serialize;
use tracing::info;
use uuid::Uuid;

/// A transient in-app notification.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub id: Uuid,
    pub title: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_url: Option<String>,
}

impl Toast {
    pub fn new(title: &str, message: &str, action_url: Option<&str>) -> Self {
        Toast {
            id: Uuid::new_v4(),
            title: title.to_string(),
            message: message.to_string(),
            action_url: action_url.map(str::to_string),
        }
    }
}

/// Where toasts are drawn. Implementations must not block.
pub trait Presenter: Send + Sync {
    fn show(&self, toast: &Toast);
    fn dismiss(&self, id: Uuid);
}

/// Renders toasts as log events.
pub struct LogPresenter;

impl Presenter for LogPresenter {
    fn show(&self, toast: &Toast) {
        info!(
            event_name = "notifications.toast.shown",
            event_domain = "notifications",
            toast_id = %toast.id,
            title = toast.title.as_str(),
            action_url = toast.action_url.as_deref().unwrap_or(""),
            "{}",
            toast.message
        );
    }

    fn dismiss(&self, id: Uuid) {
        info!(
            event_name = "notifications.toast.dismissed",
            event_domain = "notifications",
            toast_id = %id,
            "toast dismissed"
        );
    }
}
