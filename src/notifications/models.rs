use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;

/// A notification as served by `GET /api/notifications`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Notification {
    pub id: i64,
    pub title: String,
    pub message: String,
    pub kind: String,
    pub is_read: bool,
    /// `None` when the backend sent a timestamp that could not be read.
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_url: Option<String>,
}

/// Response envelope of `GET /api/notifications`.
#[derive(Serialize, Deserialize, Debug)]
pub struct NotificationList {
    pub notifications: Vec<Notification>,
}

/// Browser-style notification permission.
#[derive(Serialize, Deserialize, JsonSchema, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PermissionStatus {
    #[default]
    Default,
    Granted,
    Denied,
}

/// A push subscription as handed out by the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushSubscription {
    pub endpoint: String,
    pub p256dh: Vec<u8>,
    pub auth: Vec<u8>,
}

/// Body of `POST /api/notifications/subscribe`.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct SubscribeRequest {
    pub endpoint: String,
    pub keys: PushKeys,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct PushKeys {
    pub p256dh: String,
    pub auth: String,
}

/// An unreadable timestamp is logged and dropped so the rest of the batch survives.
fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    match parse_timestamp(&raw) {
        Ok(ts) => Ok(Some(ts)),
        Err(e) => {
            warn!(
                event_name = "notifications.timestamp_unreadable",
                event_domain = "notifications",
                error = e.as_str(),
                "keeping notification without a creation time"
            );
            Ok(None)
        }
    }
}

/// Accepts RFC 3339, offsets written without a colon, naive date-times
/// (read as UTC) and bare dates (midnight UTC).
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, String> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    if let Some(ts) = ["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%d %H:%M:%S%.f%z"]
        .iter()
        .find_map(|fmt| DateTime::parse_from_str(raw, fmt).ok())
    {
        return Ok(ts.with_timezone(&Utc));
    }
    if let Some(naive) = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
    {
        return Ok(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| format!("invalid timestamp '{}'", raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn parses_notification_payload() {
        let body = r#"{
            "notifications": [
                {"id": 1, "title": "New Reading Request", "message": "You have a new reading request waiting",
                 "kind": "session_request", "is_read": false, "created_at": "2025-01-07T10:00:00Z",
                 "action_url": "/dashboard/sessions"},
                {"id": 2, "title": "Reminder", "message": "Your reading starts in 15 minutes",
                 "kind": "appointment_reminder", "is_read": true, "created_at": "2025-01-07T09:30:00.123456"}
            ]
        }"#;
        let list: NotificationList = serde_json::from_str(body).unwrap();

        assert_eq!(list.notifications.len(), 2);
        assert_eq!(list.notifications[0].action_url.as_deref(), Some("/dashboard/sessions"));
        assert_eq!(list.notifications[1].action_url, None);
        assert_eq!(
            list.notifications[0].created_at,
            Some(Utc.with_ymd_and_hms(2025, 1, 7, 10, 0, 0).unwrap())
        );
    }

    #[test]
    fn odd_timestamps_do_not_drop_the_batch() {
        let body = r#"{
            "notifications": [
                {"id": 1, "title": "a", "message": "m", "kind": "system", "is_read": false,
                 "created_at": "2025-01-07T10:00:00Z"},
                {"id": 2, "title": "b", "message": "m", "kind": "system", "is_read": false,
                 "created_at": "2025-01-07T10:00:00+0000"},
                {"id": 3, "title": "c", "message": "m", "kind": "system", "is_read": false,
                 "created_at": "2025-01-07"},
                {"id": 4, "title": "d", "message": "m", "kind": "system", "is_read": true,
                 "created_at": "last tuesday"},
                {"id": 5, "title": "e", "message": "m", "kind": "system", "is_read": true,
                 "created_at": null},
                {"id": 6, "title": "f", "message": "m", "kind": "system", "is_read": true}
            ]
        }"#;
        let list: NotificationList = serde_json::from_str(body).unwrap();

        let ten = Utc.with_ymd_and_hms(2025, 1, 7, 10, 0, 0).unwrap();
        let midnight = Utc.with_ymd_and_hms(2025, 1, 7, 0, 0, 0).unwrap();
        let stamps: Vec<_> = list.notifications.iter().map(|n| n.created_at).collect();
        assert_eq!(
            stamps,
            vec![Some(ten), Some(ten), Some(midnight), None, None, None]
        );
    }

    #[test]
    fn offsets_without_colon_and_bare_dates_parse() {
        assert_eq!(
            parse_timestamp("2025-01-07T12:00:00+0200").unwrap(),
            Utc.with_ymd_and_hms(2025, 1, 7, 10, 0, 0).unwrap()
        );
        assert_eq!(
            parse_timestamp("2025-01-07").unwrap(),
            Utc.with_ymd_and_hms(2025, 1, 7, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn offsets_are_normalized_to_utc() {
        let ts = parse_timestamp("2025-01-07T12:00:00+02:00").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2025, 1, 7, 10, 0, 0).unwrap());
    }

    #[test]
    fn rejects_garbage_timestamps() {
        assert!(parse_timestamp("yesterday").is_err());
    }

    #[test]
    fn permission_uses_lowercase_names() {
        assert_eq!(
            serde_json::to_string(&PermissionStatus::Granted).unwrap(),
            "\"granted\""
        );
        assert_eq!(PermissionStatus::default(), PermissionStatus::Default);
    }
}
