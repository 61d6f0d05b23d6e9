//! Error types for sf-auth.
//!
//! Error messages are designed to avoid exposing sensitive credential data.

/// Result type alias for sf-auth operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for sf-auth operations.
///
/// Error messages are sanitized to prevent accidental credential exposure.
#[derive(Debug, thiserror::Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional source error.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl Error {
    /// Create a new error with the given kind.
    pub fn new(kind: ErrorKind) -> Self {
        Self { kind, source: None }
    }

    /// Create a new error with the given kind and source.
    pub fn with_source(
        kind: ErrorKind,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            source: Some(Box::new(source)),
        }
    }

    /// The transport error underneath, when the failure came from an HTTP call.
    pub fn client_error(&self) -> Option<&relay_sf_client::Error> {
        self.source
            .as_deref()
            .and_then(|s| s.downcast_ref::<relay_sf_client::Error>())
    }

    /// The token endpoint's failed response, if it answered at all.
    pub fn response(&self) -> Option<&relay_sf_client::FailedResponse> {
        self.client_error().and_then(|e| e.response())
    }
}

/// The kind of error that occurred.
///
/// Error messages avoid including credential values.
#[derive(Debug, thiserror::Error)]
pub enum ErrorKind {
    /// OAuth error response from the token endpoint.
    #[error("OAuth error: {error} - {description}")]
    OAuth { error: String, description: String },

    /// HTTP error during the token exchange.
    #[error("HTTP error: {0}")]
    Http(String),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(String),

    /// Environment variable not set.
    #[error("Environment variable not set: {0}")]
    EnvVar(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input provided.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::with_source(ErrorKind::Json(err.to_string()), err)
    }
}

impl From<relay_sf_client::Error> for Error {
    fn from(err: relay_sf_client::Error) -> Self {
        let message = err.to_string();
        let sanitized = if message.contains("Bearer") || message.contains("token=") {
            "Client error (details redacted for security)".to_string()
        } else {
            message
        };
        let kind = match err.kind {
            relay_sf_client::ErrorKind::Config(_) => ErrorKind::Config(sanitized),
            relay_sf_client::ErrorKind::Json(_) => ErrorKind::Json(sanitized),
            _ => ErrorKind::Http(sanitized),
        };
        Error::with_source(kind, err)
    }
}
