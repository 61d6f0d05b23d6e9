//! Core HTTP client with proxy forwarding, progress streaming and failure
//! classification.

use bytes::Bytes;
use tracing::{debug, info, instrument};

use crate::config::ClientConfig;
use crate::error::{Error, ErrorKind, Result};
use crate::progress::observed_stream;
use crate::request::{RequestBody, RequestBuilder};
use crate::response::{into_error, Response};
use crate::PROXY_ENDPOINT_HEADER;

/// HTTP client for Salesforce APIs.
///
/// Every call is a single attempt: non-2xx responses come back as
/// [`ErrorKind::Authentication`] (401) or [`ErrorKind::Http`], and deciding
/// whether to refresh and retry is left to the caller.
#[derive(Debug, Clone)]
pub struct SfHttpClient {
    inner: reqwest::Client,
    config: ClientConfig,
}

impl SfHttpClient {
    /// Create a new HTTP client with the given configuration.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let inner = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_idle_timeout(config.pool_idle_timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .user_agent(&config.user_agent)
            .gzip(config.accept_compressed)
            .deflate(config.accept_compressed)
            .build()
            .map_err(|e| Error::with_source(ErrorKind::Config(e.to_string()), e))?;

        Ok(Self { inner, config })
    }

    /// Create a new HTTP client with default configuration.
    pub fn default_client() -> Result<Self> {
        Self::new(ClientConfig::default())
    }

    /// Get the client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Send one attempt and classify the outcome.
    #[instrument(skip(self, request), fields(method = %request.method, url = %request.url, proxied = request.forward_to.is_some()))]
    pub async fn execute(&self, request: RequestBuilder) -> Result<Response> {
        let mut req = self
            .inner
            .request(request.method.to_reqwest(), &request.url);

        if let Some(ref target) = request.forward_to {
            req = req.header(PROXY_ENDPOINT_HEADER, target.as_str());
        }

        for (name, value) in &request.headers {
            req = req.header(name.as_str(), value.as_str());
        }

        // Responses are never served from a cache.
        req = req.header("Cache-Control", "no-cache");

        if let Some(body) = request.body {
            let encoded: Bytes = match body {
                RequestBody::Json(value) => serde_json::to_vec(&value)?.into(),
                RequestBody::Text(text) => text.into(),
                RequestBody::Form(encoded) => encoded.into(),
                RequestBody::Multipart(multipart) => multipart.bytes(),
            };
            req = match request.progress {
                Some(observer) => req
                    .header("Content-Length", encoded.len().to_string())
                    .body(reqwest::Body::wrap_stream(observed_stream(encoded, observer))),
                None => req.body(encoded),
            };
        }

        if self.config.enable_tracing {
            debug!("Sending request");
        }

        let response = req.send().await?;
        let status = response.status().as_u16();

        if self.config.enable_tracing {
            let content_length = response.content_length();
            if response.status().is_success() {
                debug!(status, content_length, "Response received");
            } else {
                info!(status, content_length, "Non-success response");
            }
        }

        if !response.status().is_success() {
            return Err(into_error(response).await);
        }

        Ok(Response::new(response))
    }
}
