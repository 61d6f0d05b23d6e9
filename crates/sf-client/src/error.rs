//! Error types for sf-client.

use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

use bytes::Bytes;

/// Result type alias for sf-client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for sf-client operations.
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

    /// Returns true if the server rejected the session (HTTP 401).
    pub fn is_auth_error(&self) -> bool {
        matches!(self.kind, ErrorKind::Authentication(_))
    }

    /// The failed response, if the server answered at all.
    pub fn response(&self) -> Option<&FailedResponse> {
        match &self.kind {
            ErrorKind::Authentication(resp) | ErrorKind::Http(resp) => Some(resp),
            _ => None,
        }
    }

    /// HTTP status of the failed response, if any.
    pub fn status(&self) -> Option<u16> {
        self.response().map(|r| r.status)
    }

    /// Classify a non-success response.
    pub fn from_response(response: FailedResponse) -> Self {
        if response.status == 401 {
            Error::new(ErrorKind::Authentication(response))
        } else {
            Error::new(ErrorKind::Http(response))
        }
    }
}

/// The kind of error that occurred.
#[derive(Debug, thiserror::Error)]
pub enum ErrorKind {
    /// Non-success response other than 401.
    #[error("HTTP error: {0}")]
    Http(FailedResponse),

    /// Session rejected (HTTP 401).
    #[error("Authentication error: {0}")]
    Authentication(FailedResponse),

    /// Request timeout.
    #[error("Request timeout")]
    Timeout,

    /// Connection error.
    #[error("Connection error: {0}")]
    Connection(String),

    /// Response body could not be decoded, or a request body could not be encoded.
    #[error("JSON error: {0}")]
    Json(String),

    /// Invalid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Other error.
    #[error("{0}")]
    Other(String),
}

/// A non-success response kept for caller inspection.
#[derive(Debug, Clone)]
pub struct FailedResponse {
    /// HTTP status code.
    pub status: u16,
    /// Canonical reason phrase for the status.
    pub status_text: String,
    /// Response headers (lowercased names).
    pub headers: HashMap<String, String>,
    /// Raw response body.
    pub body: Bytes,
}

impl FailedResponse {
    pub fn new(status: u16, headers: HashMap<String, String>, body: Bytes) -> Self {
        let status_text = reqwest::StatusCode::from_u16(status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or("")
            .to_string();
        Self {
            status,
            status_text,
            headers,
            body,
        }
    }

    /// Body decoded as UTF-8, lossily.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Look up a response header.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    /// Decode the Salesforce error payload, which is either an array of
    /// `{errorCode, message, fields}` objects or a single such object.
    pub fn api_errors(&self) -> Vec<ApiError> {
        if let Ok(errors) = serde_json::from_slice::<Vec<ApiError>>(&self.body) {
            return errors;
        }
        if let Ok(error) = serde_json::from_slice::<ApiError>(&self.body) {
            return vec![error];
        }
        Vec::new()
    }
}

impl fmt::Display for FailedResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.status, self.status_text)?;
        if let Some(first) = self.api_errors().into_iter().next() {
            write!(
                f,
                " ({}: {})",
                first.error_code,
                sanitize_error_message(&first.message)
            )
        } else if !self.body.is_empty() {
            write!(f, " - {}", sanitize_error_message(&self.text()))
        } else {
            Ok(())
        }
    }
}

/// One entry of a Salesforce error payload.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct ApiError {
    #[serde(rename = "errorCode", alias = "error_code")]
    pub error_code: String,
    pub message: String,
    #[serde(default)]
    pub fields: Vec<String>,
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            ErrorKind::Timeout
        } else if err.is_connect() {
            ErrorKind::Connection(err.to_string())
        } else if err.is_decode() {
            ErrorKind::Json(err.to_string())
        } else {
            ErrorKind::Other(err.to_string())
        };

        Error::with_source(kind, err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::with_source(ErrorKind::Json(err.to_string()), err)
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error::with_source(ErrorKind::InvalidUrl(err.to_string()), err)
    }
}

/// Sanitize an error message to prevent exposing sensitive data.
///
/// This function:
/// - Truncates messages longer than 500 characters
/// - Removes potential tokens (anything that looks like an access token)
/// - Removes potential session IDs
pub(crate) fn sanitize_error_message(message: &str) -> String {
    const MAX_LENGTH: usize = 500;

    static TOKEN: OnceLock<regex_lite::Regex> = OnceLock::new();
    static SESSION: OnceLock<regex_lite::Regex> = OnceLock::new();

    // Salesforce tokens start with the 15/18 char org id followed by '!'
    let token_pattern = TOKEN.get_or_init(|| {
        regex_lite::Regex::new(r"00[A-Za-z0-9]{13,}[!][A-Za-z0-9_.]+").expect("valid regex")
    });
    let session_pattern = SESSION
        .get_or_init(|| regex_lite::Regex::new(r"sid=[A-Za-z0-9]{20,}").expect("valid regex"));

    let mut sanitized = token_pattern
        .replace_all(message, "[REDACTED_TOKEN]")
        .to_string();
    sanitized = session_pattern
        .replace_all(&sanitized, "sid=[REDACTED]")
        .to_string();

    if sanitized.len() > MAX_LENGTH {
        let mut cut = MAX_LENGTH;
        while !sanitized.is_char_boundary(cut) {
            cut -= 1;
        }
        sanitized.truncate(cut);
        sanitized.push_str("...[truncated]");
    }

    sanitized
}
