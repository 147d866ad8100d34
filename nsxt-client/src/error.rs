/// Errors returned by NSX-T Manager API calls.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The manager answered with a non-2xx status code.
    #[error("NSX-T API HTTP error: status={status}, path={path}, body={body}")]
    Http {
        path: String,
        status: u16,
        body: String,
    },

    /// An underlying HTTP transport error from `reqwest`.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The response body was not the expected JSON document.
    #[error("Failed to decode response from {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// The configured manager URL cannot be used as an API base.
    #[error("Invalid NSX-T manager URL: {0}")]
    InvalidUrl(String),

    /// The HTTP client could not be constructed.
    #[error("Failed to build HTTP client: {0}")]
    Build(String),
}

impl ClientError {
    /// HTTP status code, if the manager answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Http { status, .. } => Some(*status),
            ClientError::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Convenience type alias so callers can write `error::Result<T>`.
pub type Result<T> = std::result::Result<T, ClientError>;
