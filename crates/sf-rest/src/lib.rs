//! # sf-rest
//!
//! Authenticated Salesforce REST calls with transparent session refresh.
//!
//! ## Features
//!
//! - **Dispatcher** - One call against the data, apexrest or binary surface;
//!   a 401 triggers one refresh exchange and one retry of the same request
//! - **Coalesced refresh** - Concurrent calls that hit the same expired
//!   session share a single exchange
//! - **Records** - Create, retrieve, upsert, update, delete
//! - **Query and search** - SOQL pages and SOSL results
//! - **Discovery** - Versions, resources, describe-global, describe
//! - **Apex REST** - Custom procedures with caller-supplied headers
//! - **Files** - Multipart uploads with progress, raw downloads
//! - **Blocking mode** - [`BlockingForceClient`] for synchronous callers
//!
//! ## Example
//!
//! ```rust,ignore
//! use relay_sf_rest::{ForceClient, ForceConfig, QueryResult};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), relay_sf_rest::Error> {
//!     let config = ForceConfig::from_env()?;
//!     let client = ForceClient::new(&config)?;
//!
//!     let accounts: QueryResult<serde_json::Value> = client
//!         .query("SELECT Id, Name FROM Account LIMIT 10")
//!         .await?;
//!
//!     let created = client
//!         .create("Account", &serde_json::json!({"Name": "New Account"}))
//!         .await?;
//!     client
//!         .update("Account", &created.id, &serde_json::json!({"Name": "Updated"}))
//!         .await?;
//!     client.delete("Account", &created.id).await?;
//!
//!     Ok(())
//! }
//! ```

mod blocking;
mod client;
mod describe;
mod dispatch;
mod error;
mod query;
mod sobject;

// Clients
pub use blocking::BlockingForceClient;
pub use client::ForceClient;

// Dispatch
pub use dispatch::{Dispatcher, Payload, PendingRequest, ResponseBody, Surface};

// Error types
pub use error::{Error, ErrorKind, Result};

// Result types
pub use describe::{
    ApiVersion, ChildRelationship, DescribeGlobalResult, DescribeSObjectResult, FieldDescribe,
    PicklistValue, SObjectBasicInfo, SObjectInfo,
};
pub use query::{QueryResult, SearchResult};
pub use sobject::{CreateResult, SalesforceError, UpsertResult};

// Re-export what callers need to build a client
pub use relay_sf_auth::{ForceConfig, Session, SessionStore};
pub use relay_sf_client::{
    BlobPart, ClientConfig, ClientConfigBuilder, Environment, FailedResponse, ProgressObserver,
    RequestMethod, UploadProgress,
};
