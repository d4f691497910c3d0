use thiserror::Error;

/// Errors surfaced by the client at the backend boundary.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("error sending request: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected status {status} from {url}")]
    Status { status: u16, url: String },

    #[error("error decoding response: {0}")]
    Decode(String),

    #[error("invalid url: {0}")]
    InvalidUrl(String),

    #[error("credential store error: {0}")]
    Store(String),

    #[error("platform error: {0}")]
    Platform(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl ClientError {
    /// True when the backend answered with the given status code.
    pub fn is_status(&self, code: u16) -> bool {
        matches!(self, ClientError::Status { status, .. } if *status == code)
    }
}
