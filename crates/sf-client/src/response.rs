//! HTTP response handling with Salesforce-specific extensions.

use std::collections::HashMap;

use bytes::Bytes;
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::error::{Error, FailedResponse, Result};

/// Wrapper around a successful HTTP response.
#[derive(Debug)]
pub struct Response {
    inner: reqwest::Response,
}

impl Response {
    pub(crate) fn new(inner: reqwest::Response) -> Self {
        Self { inner }
    }

    /// Get the HTTP status code.
    pub fn status(&self) -> u16 {
        self.inner.status().as_u16()
    }

    /// Returns true if the response status is successful (2xx).
    pub fn is_success(&self) -> bool {
        self.inner.status().is_success()
    }

    /// Get a header value.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.inner.headers().get(name)?.to_str().ok()
    }

    /// Get the Content-Type header.
    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// All headers, with lowercased names.
    pub fn headers(&self) -> HashMap<String, String> {
        collect_headers(self.inner.headers())
    }

    /// Get the response body as text.
    pub async fn text(self) -> Result<String> {
        self.inner.text().await.map_err(Into::into)
    }

    /// Get the response body as bytes.
    pub async fn bytes(self) -> Result<Bytes> {
        self.inner.bytes().await.map_err(Into::into)
    }

    /// Deserialize the response body as JSON.
    pub async fn json<T: DeserializeOwned>(self) -> Result<T> {
        let body = self.bytes().await?;
        serde_json::from_slice(&body).map_err(Into::into)
    }

    /// Deserialize the body as JSON, treating an empty body as `None`.
    pub async fn json_opt<T: DeserializeOwned>(self) -> Result<Option<T>> {
        let body = self.bytes().await?;
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }
        serde_json::from_slice(&body).map(Some).map_err(Into::into)
    }

    /// Get access to the inner reqwest::Response.
    pub fn into_inner(self) -> reqwest::Response {
        self.inner
    }
}

/// Read a non-success response into an error, keeping status, headers and body.
pub(crate) async fn into_error(response: reqwest::Response) -> Error {
    let status = response.status().as_u16();
    let headers = collect_headers(response.headers());
    failure_from_body(status, headers, response.bytes().await)
}

/// An unreadable body still yields the classified failure, with the read
/// error as its source.
fn failure_from_body<E>(
    status: u16,
    headers: HashMap<String, String>,
    body: std::result::Result<Bytes, E>,
) -> Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    match body {
        Ok(body) => Error::from_response(FailedResponse::new(status, headers, body)),
        Err(err) => {
            warn!(status, error = %err, "Failed to read error response body");
            let mut error = Error::from_response(FailedResponse::new(status, headers, Bytes::new()));
            error.source = Some(Box::new(err));
            error
        }
    }
}

fn collect_headers(headers: &reqwest::header::HeaderMap) -> HashMap<String, String> {
    headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_ascii_lowercase(), v.to_string()))
        })
        .collect()
}
