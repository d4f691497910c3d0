//! Notification state, permission handling, push registration and in-app toasts.

pub mod models;
pub mod platform;
pub mod presenter;
pub mod push;
pub mod state;
pub mod store;

pub use models::{Notification, PermissionStatus, PushSubscription};
pub use platform::{create_platform, NotificationPlatform, PlatformConfig};
pub use presenter::{LogPresenter, Presenter, Toast};
pub use push::PushOutcome;
pub use state::NotificationState;
pub use store::NotificationStore;
