//! # relay-sf-api
//!
//! A proxy-aware Salesforce REST client with transparent session refresh.
//!
//! Calls go out with the current session token. When the server answers 401
//! and a refresh token is configured, the client exchanges it for a new
//! session once and retries the original request once, with the same body,
//! boundary and progress observer. Concurrent calls that expire together
//! share one exchange.
//!
//! ## Security
//!
//! - Tokens are redacted in Debug output
//! - Tracing skips credential parameters
//! - Error messages sanitize credential-looking text
//!
//! ## Crates
//!
//! - **relay-sf-client** - Transport: `reqwest` client, environment policy and
//!   proxy routing, multipart bodies, upload progress
//! - **relay-sf-auth** - Session store, refresh exchange, host name to
//!   instance derivation, settings
//! - **relay-sf-rest** - Dispatcher, record/query/apexrest/file endpoints,
//!   blocking mode
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use relay_sf_api::{ForceClient, ForceConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // SF_CLIENT_ID, SF_PROXY_URL, SF_ACCESS_TOKEN, SF_INSTANCE_URL, SF_REFRESH_TOKEN
//!     let config = ForceConfig::from_env()?;
//!     let client = ForceClient::new(&config)?;
//!
//!     let accounts: relay_sf_api::rest::QueryResult<serde_json::Value> = client
//!         .query("SELECT Id, Name FROM Account LIMIT 10")
//!         .await?;
//!
//!     for account in accounts.records {
//!         println!("{}", account["Name"]);
//!     }
//!
//!     Ok(())
//! }
//! ```

// Re-export all crates for convenient access
#[cfg(feature = "auth")]
pub use relay_sf_auth as auth;
#[cfg(feature = "client")]
pub use relay_sf_client as client;
#[cfg(feature = "rest")]
pub use relay_sf_rest as rest;

// Re-export commonly used types at the top level
#[cfg(feature = "auth")]
pub use relay_sf_auth::{ForceConfig, SessionStore};
#[cfg(feature = "client")]
pub use relay_sf_client::{ClientConfig, Environment, SfHttpClient};
#[cfg(feature = "rest")]
pub use relay_sf_rest::{BlockingForceClient, ForceClient};
