//! Error types for backend API calls.

/// Result type alias for API operations.
pub type Result<T> = std::result::Result<T, Error>;

/// API client error types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// HTTP request error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing error.
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// Backend answered with a non-success status.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Message from the response body, or the status reason.
        message: String,
    },

    /// One of the message lists could not be loaded.
    #[error("Failed to load {list}: {source}")]
    Fetch {
        /// Which list failed (`inbox` or `sent`).
        list: &'static str,
        /// Underlying failure.
        source: Box<Error>,
    },

    /// Authenticated call made without a session.
    #[error("Not logged in")]
    NotAuthenticated,

    /// Request rejected before it was sent.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Core library error.
    #[error(transparent)]
    Core(#[from] sponsorbridge_core::Error),
}

impl Error {
    /// Creates an API error from a status code and message.
    #[must_use]
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Tags an error with the list whose fetch failed.
    #[must_use]
    pub fn fetch(list: &'static str, source: Self) -> Self {
        Self::Fetch {
            list,
            source: Box::new(source),
        }
    }

    /// Returns true if the backend rejected the credentials.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        match self {
            Self::Api { status, .. } => *status == 401,
            Self::NotAuthenticated => true,
            Self::Fetch { source, .. } => source.is_unauthorized(),
            _ => false,
        }
    }
}
