//! Error types for sf-rest.
//!
//! Every failure a caller can see from a dispatched call falls in one of
//! these kinds. Failures that came from the server keep the full response
//! (status, status text, headers, raw body) for inspection.

use relay_sf_client::FailedResponse;

/// Result type alias for sf-rest operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for sf-rest operations.
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

    /// Wrap a failed refresh exchange. Always terminal.
    pub fn refresh_failed(err: relay_sf_auth::Error) -> Self {
        Error::with_source(ErrorKind::Refresh(err.to_string()), err)
    }

    pub(crate) fn invalid_input(message: impl Into<String>) -> Self {
        Error::new(ErrorKind::InvalidInput(message.into()))
    }

    /// The server's failed response, if there was one.
    ///
    /// For [`ErrorKind::Refresh`] this is the token endpoint's response.
    pub fn response(&self) -> Option<&FailedResponse> {
        match &self.kind {
            ErrorKind::Authentication(resp) | ErrorKind::Api(resp) => Some(resp),
            ErrorKind::Refresh(_) => self
                .source
                .as_deref()
                .and_then(|s| s.downcast_ref::<relay_sf_auth::Error>())
                .and_then(|e| e.response()),
            _ => None,
        }
    }

    /// HTTP status of the failed response, if any.
    pub fn status(&self) -> Option<u16> {
        self.response().map(|r| r.status)
    }

    /// Returns true if the session was rejected and not recovered.
    pub fn is_auth_error(&self) -> bool {
        matches!(self.kind, ErrorKind::Authentication(_))
    }

    pub fn is_refresh_error(&self) -> bool {
        matches!(self.kind, ErrorKind::Refresh(_))
    }
}

/// The kind of error that occurred.
#[derive(Debug, thiserror::Error)]
pub enum ErrorKind {
    /// Network failure, timeout, or a body that could not be read or parsed.
    #[error("Transport error: {0}")]
    Transport(String),

    /// HTTP 401 that was not recovered by a refresh.
    #[error("Authentication failed: {0}")]
    Authentication(FailedResponse),

    /// The refresh exchange failed.
    #[error("Session refresh failed: {0}")]
    Refresh(String),

    /// Any other non-success status.
    #[error("API error: {0}")]
    Api(FailedResponse),

    /// Invalid input; nothing was sent.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Client misconfiguration, e.g. no session or instance set.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<relay_sf_client::Error> for Error {
    fn from(err: relay_sf_client::Error) -> Self {
        use relay_sf_client::ErrorKind as ClientKind;

        let kind = match &err.kind {
            ClientKind::Authentication(resp) => ErrorKind::Authentication(resp.clone()),
            ClientKind::Http(resp) => ErrorKind::Api(resp.clone()),
            ClientKind::Config(msg) | ClientKind::InvalidUrl(msg) => ErrorKind::Config(msg.clone()),
            _ => ErrorKind::Transport(err.to_string()),
        };
        Error::with_source(kind, err)
    }
}

impl From<relay_sf_auth::Error> for Error {
    fn from(err: relay_sf_auth::Error) -> Self {
        use relay_sf_auth::ErrorKind as AuthKind;

        let kind = match &err.kind {
            AuthKind::InvalidInput(msg) => ErrorKind::InvalidInput(msg.clone()),
            AuthKind::Config(msg) | AuthKind::EnvVar(msg) => ErrorKind::Config(msg.clone()),
            _ => return Error::refresh_failed(err),
        };
        Error::with_source(kind, err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::with_source(ErrorKind::Transport(format!("malformed response: {}", err)), err)
    }
}
