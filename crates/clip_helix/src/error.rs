#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Token request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Token endpoint returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Malformed token response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Token response did not contain an access_token")]
    MissingToken,
}

#[derive(Debug, thiserror::Error)]
pub enum MetadataError {
    #[error("Channel '{0}' not found")]
    ChannelNotFound(String),
    #[error("HTTP error: {0}")]
    Request(#[from] reqwest::Error),
    #[error("{endpoint} returned {status}: {body}")]
    Status {
        endpoint: String,
        status: u16,
        body: String,
    },
    #[error("Malformed {endpoint} response: {reason}")]
    Decode {
        endpoint: String,
        reason: serde_json::Error,
    },
}
