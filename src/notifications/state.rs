use serde::Serialize;

use super::models::{Notification, PermissionStatus};

/// Everything a front end needs to render the notification UI.
///
/// Transitions consume the current state and return the next one, so they
/// can be tested without a backend. `unread_count` is recomputed from the
/// list after every transition that touches it.
#[derive(Serialize, Debug, Clone, Default, PartialEq)]
pub struct NotificationState {
    pub notifications: Vec<Notification>,
    pub unread_count: usize,
    pub permission: PermissionStatus,
    pub loading: bool,
}

fn count_unread(notifications: &[Notification]) -> usize {
    notifications.iter().filter(|n| !n.is_read).count()
}

impl NotificationState {
    pub fn loading_started(self) -> Self {
        Self {
            loading: true,
            ..self
        }
    }

    /// Replace the list with a fresh fetch, keeping backend order.
    pub fn loaded(self, notifications: Vec<Notification>) -> Self {
        Self {
            unread_count: count_unread(&notifications),
            notifications,
            loading: false,
            ..self
        }
    }

    /// A failed fetch only clears the loading flag; stale data stays.
    pub fn load_failed(self) -> Self {
        Self {
            loading: false,
            ..self
        }
    }

    pub fn marked_read(mut self, id: i64) -> Self {
        for notification in self.notifications.iter_mut().filter(|n| n.id == id) {
            notification.is_read = true;
        }
        self.unread_count = count_unread(&self.notifications);
        self
    }

    pub fn all_marked_read(mut self) -> Self {
        for notification in &mut self.notifications {
            notification.is_read = true;
        }
        self.unread_count = 0;
        self
    }

    pub fn with_permission(self, permission: PermissionStatus) -> Self {
        Self { permission, ..self }
    }
}
