//! # sf-client
//!
//! HTTP transport for Salesforce APIs.
//!
//! This crate provides the layer underneath the authenticated dispatcher:
//! - A `reqwest` based client that sends exactly one attempt per call
//! - Environment policy: which authorization header to use and whether a
//!   call must go through a same-origin forwarding proxy
//! - Multipart body assembly with per-call random boundaries
//! - Upload progress reporting for streamed bodies
//! - Typed failures carrying status, status text and the raw body
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Dispatcher (sf-rest)                     │
//! │  - Surfaces, refresh-then-retry, convenience endpoints      │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 SessionStore (sf-auth)                      │
//! │  - Session / refresh tokens, token exchange                 │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    SfHttpClient                             │
//! │  - One attempt per call, proxy header, progress streaming   │
//! │  - Failure classification (401 vs everything else)          │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use relay_sf_client::{
//!     ClientConfig, Environment, RequestBuilder, RequestMethod, SfHttpClient, SurfaceKind,
//! };
//!
//! let http = SfHttpClient::new(ClientConfig::default())?;
//! let policy = Environment::external("https://app.example.com/proxy")?.policy();
//!
//! let route = policy.route(SurfaceKind::Data, "https://na1.salesforce.com/services/data/v62.0/");
//! let request = RequestBuilder::for_route(RequestMethod::Get, &route)
//!     .header(policy.authorization_header(), "Bearer 00D...");
//! let response = http.execute(request).await?;
//! ```

mod client;
mod config;
mod environment;
mod error;
mod multipart;
mod progress;
mod request;
mod response;
pub mod security;

pub use client::SfHttpClient;
pub use config::{ClientConfig, ClientConfigBuilder};
pub use environment::{Environment, EnvironmentPolicy, Route, SurfaceKind};
pub use error::{ApiError, Error, ErrorKind, FailedResponse, Result};
pub use multipart::{BlobPart, MultipartBody};
pub use progress::{ProgressObserver, UploadProgress};
pub use request::{RequestBody, RequestBuilder, RequestMethod};
pub use response::Response;

/// Default Salesforce API version
pub const DEFAULT_API_VERSION: &str = "62.0";

/// User-Agent string for the client
pub const USER_AGENT: &str = concat!("relay-sf-api/", env!("CARGO_PKG_VERSION"));

/// Toolkit identifier sent in the `X-User-Agent` header, followed by `/v<api version>`.
pub const TOOLKIT_ID: &str = "salesforce-toolkit-rest-rust";

/// Header naming the real target when a call is relayed through a forwarding proxy.
pub const PROXY_ENDPOINT_HEADER: &str = "SalesforceProxy-Endpoint";

/// Identification header carrying the toolkit name and API version.
pub const IDENTIFICATION_HEADER: &str = "X-User-Agent";

/// Normalize an API version to its bare numeric form (`"v62.0"` -> `"62.0"`).
pub fn normalize_api_version(version: &str) -> String {
    version.trim().trim_start_matches(['v', 'V']).to_string()
}

/// Value of the `X-User-Agent` identification header for an API version.
pub fn identification(api_version: &str) -> String {
    format!("{}/v{}", TOOLKIT_ID, normalize_api_version(api_version))
}
