//! Biblion error types

/// Biblion error types
#[derive(Debug, thiserror::Error)]
pub enum BiblionError {
    // Transport/network errors
    #[error("network error: {0}")]
    Network(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("authentication required")]
    NotAuthenticated,

    // Data errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unexpected response shape: {0}")]
    Decode(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    // Configuration errors
    #[error("configuration error: {0}")]
    Configuration(String),

    // Credential persistence errors
    #[error("credential store error: {0}")]
    CredentialStore(String),
}

impl BiblionError {
    /// Whether this error is worth retrying or re-reading later.
    ///
    /// Transport failures and 429/5xx statuses are transient; 4xx statuses
    /// and local errors are permanent.
    pub fn is_transient(&self) -> bool {
        match self {
            BiblionError::Network(_) => true,
            BiblionError::Api { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    /// HTTP status code, when this error carries one.
    pub fn status(&self) -> Option<u16> {
        match self {
            BiblionError::Api { status, .. } => Some(*status),
            BiblionError::NotAuthenticated => Some(401),
            _ => None,
        }
    }

    /// Re-own an error observed through a shared handle.
    ///
    /// Fetch results are broadcast to every reader attached to the same
    /// in-flight request, so the original error stays behind an `Arc`.
    /// All variants reproduce exactly except `Json`, whose source is not
    /// clonable and degrades to `Decode` with the rendered message.
    pub(crate) fn duplicate(&self) -> Self {
        match self {
            BiblionError::Network(m) => BiblionError::Network(m.clone()),
            BiblionError::Api { status, message } => BiblionError::Api {
                status: *status,
                message: message.clone(),
            },
            BiblionError::NotAuthenticated => BiblionError::NotAuthenticated,
            BiblionError::Json(e) => BiblionError::Decode(e.to_string()),
            BiblionError::Decode(m) => BiblionError::Decode(m.clone()),
            BiblionError::InvalidInput(m) => BiblionError::InvalidInput(m.clone()),
            BiblionError::Configuration(m) => BiblionError::Configuration(m.clone()),
            BiblionError::CredentialStore(m) => BiblionError::CredentialStore(m.clone()),
        }
    }

    /// The message to surface to a user, given a per-operation fallback.
    ///
    /// API errors carry the server's own message; everything else falls
    /// back to the generic phrase naming the operation.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            BiblionError::Api { message, .. } if !message.is_empty() => message.clone(),
            _ => fallback.to_string(),
        }
    }
}

impl From<reqwest::Error> for BiblionError {
    fn from(err: reqwest::Error) -> Self {
        // Status-bearing errors are normalized in the transport layer where
        // the response body is still available; anything reaching here is
        // a transport-level failure.
        BiblionError::Network(err.to_string())
    }
}

/// Result type alias for biblion operations
pub type Result<T> = std::result::Result<T, BiblionError>;
