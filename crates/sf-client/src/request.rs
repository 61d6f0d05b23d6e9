//! HTTP request building with Salesforce-specific headers.

use serde::Serialize;

use crate::environment::Route;
use crate::error::Result;
use crate::multipart::MultipartBody;
use crate::progress::ProgressObserver;

/// HTTP request method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestMethod {
    #[default]
    Get,
    Post,
    Patch,
    Put,
    Delete,
    Head,
}

impl RequestMethod {
    /// Convert to reqwest::Method.
    pub fn to_reqwest(&self) -> reqwest::Method {
        match self {
            RequestMethod::Get => reqwest::Method::GET,
            RequestMethod::Post => reqwest::Method::POST,
            RequestMethod::Patch => reqwest::Method::PATCH,
            RequestMethod::Put => reqwest::Method::PUT,
            RequestMethod::Delete => reqwest::Method::DELETE,
            RequestMethod::Head => reqwest::Method::HEAD,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RequestMethod::Get => "GET",
            RequestMethod::Post => "POST",
            RequestMethod::Patch => "PATCH",
            RequestMethod::Put => "PUT",
            RequestMethod::Delete => "DELETE",
            RequestMethod::Head => "HEAD",
        }
    }
}

impl std::fmt::Display for RequestMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Builder for HTTP requests with Salesforce-specific options.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    pub(crate) method: RequestMethod,
    pub(crate) url: String,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) body: Option<RequestBody>,
    /// Real target when the request is relayed by a forwarding proxy.
    pub(crate) forward_to: Option<String>,
    pub(crate) progress: Option<ProgressObserver>,
}

/// Request body content.
#[derive(Debug, Clone)]
pub enum RequestBody {
    Json(serde_json::Value),
    Text(String),
    /// Pre-encoded `application/x-www-form-urlencoded` body.
    Form(String),
    Multipart(MultipartBody),
}

impl RequestBuilder {
    /// Create a new request builder.
    pub fn new(method: RequestMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            body: None,
            forward_to: None,
            progress: None,
        }
    }

    /// Create a request following a routing decision: sent to the proxy with
    /// the forwarding header, or straight to the target.
    pub fn for_route(method: RequestMethod, route: &Route) -> Self {
        let mut builder = Self::new(method, route.url());
        builder.forward_to = route.forwarded_to().map(str::to_string);
        builder
    }

    pub fn method(&self) -> RequestMethod {
        self.method
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Value of the forwarding header, if this request is proxied.
    pub fn forward_to(&self) -> Option<&str> {
        self.forward_to.as_deref()
    }

    /// Look up a header set on this builder (case-insensitive).
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .rev()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn body(&self) -> Option<&RequestBody> {
        self.body.as_ref()
    }

    /// Add a header, replacing any previous value of the same name.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        self.headers.retain(|(n, _)| !n.eq_ignore_ascii_case(&name));
        self.headers.push((name, value.into()));
        self
    }

    /// Set JSON body.
    pub fn json<T: Serialize>(self, body: &T) -> Result<Self> {
        let value = serde_json::to_value(body)?;
        Ok(self.json_value(value))
    }

    /// Set raw JSON body.
    pub fn json_value(mut self, body: serde_json::Value) -> Self {
        self.body = Some(RequestBody::Json(body));
        self.header("Content-Type", "application/json")
    }

    /// Set an already-serialized body with the given content type.
    pub fn text(mut self, body: impl Into<String>, content_type: &str) -> Self {
        self.body = Some(RequestBody::Text(body.into()));
        self.header("Content-Type", content_type)
    }

    /// Set a form body from key/value pairs.
    pub fn form<T: Serialize>(mut self, data: &T) -> Result<Self> {
        let encoded = serde_urlencoded::to_string(data)
            .map_err(|e| crate::Error::with_source(crate::ErrorKind::Json(e.to_string()), e))?;
        self.body = Some(RequestBody::Form(encoded));
        Ok(self.header("Content-Type", "application/x-www-form-urlencoded"))
    }

    /// Set a multipart body; the content type carries its boundary.
    pub fn multipart(mut self, body: MultipartBody) -> Self {
        let content_type = body.content_type();
        self.body = Some(RequestBody::Multipart(body));
        self.header("Content-Type", content_type)
    }

    /// Report upload progress while the body is sent. Every body kind is
    /// streamed in chunks when an observer is set.
    pub fn on_progress(mut self, observer: Option<ProgressObserver>) -> Self {
        self.progress = observer;
        self
    }
}
