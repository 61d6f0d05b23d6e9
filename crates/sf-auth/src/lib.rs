//! # sf-auth
//!
//! Session credentials for the Salesforce REST client.
//!
//! ## Security
//!
//! - Tokens are redacted in Debug output
//! - Tracing skips credential parameters
//! - Error messages sanitize credential-looking text
//!
//! ## Overview
//!
//! - [`SessionStore`] owns the session token, refresh token, API version and
//!   instance origin, and performs the refresh exchange
//! - [`OAuthClient`] talks to the token endpoint, through the forwarding proxy
//!   when the environment requires it
//! - [`instance_from_host`] recovers the instance from a hosted page's host
//! - [`ForceConfig`] gathers settings, optionally from environment variables
//!
//! ## Example
//!
//! ```rust,ignore
//! use relay_sf_auth::{ForceConfig, SessionStore};
//! use relay_sf_client::SfHttpClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), relay_sf_auth::Error> {
//!     let config = ForceConfig::from_env()?;
//!     let store = SessionStore::from_config(&config, SfHttpClient::default_client()?)?;
//!
//!     store.set_refresh_token("5Aep861...").await;
//!     let session = store.refresh().await?;
//!     println!("instance: {:?}", session.instance_origin());
//!     Ok(())
//! }
//! ```

mod config;
mod error;
mod host;
mod oauth;
mod session;

pub use config::ForceConfig;
pub use error::{Error, ErrorKind, Result};
pub use host::{instance_from_host, instance_origin_from_host, INSTANCE_BASE_DOMAIN};
pub use oauth::{OAuthClient, TokenResponse, TOKEN_PATH};
pub use session::{Session, SessionStore};

/// Default Salesforce login URL for production.
pub const PRODUCTION_LOGIN_URL: &str = "https://login.salesforce.com";

/// Default Salesforce login URL for sandbox.
pub const SANDBOX_LOGIN_URL: &str = "https://test.salesforce.com";
