use thiserror::Error;

/// Errors returned by the internal API client
#[derive(Debug, Error)]
pub enum ApiError {
    /// The HTTP client could not be built from configuration
    #[error("Error creating http client: {0}")]
    ClientSetup(String),

    /// Connection, DNS, TLS or timeout failure
    #[error("{0}")]
    Transport(Box<dyn std::error::Error + Send + Sync>),

    /// A request body could not be encoded
    #[error("Failed to encode request: {0}")]
    Encoding(#[source] serde_json::Error),

    /// The response body was not the expected JSON
    #[error("Parsing failed")]
    Parsing(#[source] serde_json::Error),

    /// Error status with a message supplied by the server
    #[error("{0}")]
    Api(String),

    /// Error status without a usable message
    #[error("Internal API error ({0})")]
    Internal(u16),
}

impl ApiError {
    /// Wrap any transport-level failure
    pub fn transport(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        ApiError::Transport(err.into())
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Transport(Box::new(err))
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
