use base64::alphabet;
use base64::engine::general_purpose::STANDARD;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine as _;
use serde::Serialize;

use super::models::{PushKeys, PushSubscription, SubscribeRequest};

const LENIENT: GeneralPurposeConfig =
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent);
const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::URL_SAFE, LENIENT);
const STANDARD_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::STANDARD, LENIENT);

/// What `subscribe_to_push` ended up doing.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PushOutcome {
    /// The platform has no push capability; nothing was attempted.
    Unsupported,
    /// No usable application server key and no existing subscription.
    MissingServerKey,
    /// The subscription was forwarded to the backend.
    Registered,
}

/// Decode a key given in URL-safe base64 (VAPID style) or standard base64,
/// with or without padding.
pub fn decode_key(raw: &str) -> Result<Vec<u8>, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err("key is empty".to_string());
    }
    URL_SAFE_LENIENT
        .decode(trimmed)
        .or_else(|_| STANDARD_LENIENT.decode(trimmed))
        .map_err(|e| format!("key is not valid base64: {}", e))
}

/// Standard padded base64, the encoding the backend stores.
pub fn encode_key(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

impl From<&PushSubscription> for SubscribeRequest {
    fn from(subscription: &PushSubscription) -> Self {
        SubscribeRequest {
            endpoint: subscription.endpoint.clone(),
            keys: PushKeys {
                p256dh: encode_key(&subscription.p256dh),
                auth: encode_key(&subscription.auth),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_url_safe_and_standard_keys() {
        assert_eq!(decode_key("-_8").unwrap(), vec![0xfb, 0xff]);
        assert_eq!(decode_key("+/8=").unwrap(), vec![0xfb, 0xff]);
        assert_eq!(decode_key(" AQID ").unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn placeholder_key_is_rejected() {
        assert!(decode_key("YOUR_VAPID_PUBLIC_KEY").is_err());
        assert!(decode_key("").is_err());
    }

    #[test]
    fn subscribe_request_uses_standard_base64() {
        let request = SubscribeRequest::from(&PushSubscription {
            endpoint: "https://push.example/abc".to_string(),
            p256dh: vec![0xfb, 0xff],
            auth: vec![1, 2, 3],
        });
        assert_eq!(request.endpoint, "https://push.example/abc");
        assert_eq!(request.keys.p256dh, "+/8=");
        assert_eq!(request.keys.auth, "AQID");
    }
}
