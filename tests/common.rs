#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use figment::{
    providers::{Format, Yaml},
    Figment,
};
use soulseer_client::config::{Config, ConfigV1};
use soulseer_client::notifications::{Presenter, Toast};
use soulseer_client::startup::build_state_with_presenter;
use soulseer_client::state::AppState;
use uuid::Uuid;

/// Parse a YAML test config with `{backend}` replaced by the mock server URL.
pub fn load_test_config(yaml: &str, backend: &str) -> ConfigV1 {
    let yaml = yaml.replace("{backend}", backend);
    let config: Config = Figment::new()
        .merge(Yaml::string(&yaml))
        .extract()
        .expect("Failed to parse test config YAML");

    match config {
        Config::ConfigV1(cfg) => cfg,
    }
}

/// Collects toasts instead of drawing them.
#[derive(Default)]
pub struct RecordingPresenter {
    pub shown: Mutex<Vec<Toast>>,
    pub dismissed: Mutex<Vec<Uuid>>,
}

impl Presenter for RecordingPresenter {
    fn show(&self, toast: &Toast) {
        self.shown.lock().unwrap().push(toast.clone());
    }

    fn dismiss(&self, id: Uuid) {
        self.dismissed.lock().unwrap().push(id);
    }
}

pub fn build_app(config: ConfigV1) -> (AppState, Arc<RecordingPresenter>) {
    let presenter = Arc::new(RecordingPresenter::default());
    let state = build_state_with_presenter(Arc::new(config), presenter.clone())
        .expect("failed to build client state");
    (state, presenter)
}

pub fn notifications_body() -> String {
    serde_json::json!({
        "notifications": [
            {"id": 1, "title": "New Reading Request", "message": "You have a new reading request waiting",
             "kind": "session_request", "is_read": false, "created_at": "2025-01-07T10:00:00Z",
             "action_url": "/dashboard/sessions/abc"},
            {"id": 2, "title": "Appointment Reminder", "message": "Your reading starts in 15 minutes",
             "kind": "appointment_reminder", "is_read": false, "created_at": "2025-01-07T09:45:00"}
        ]
    })
    .to_string()
}
