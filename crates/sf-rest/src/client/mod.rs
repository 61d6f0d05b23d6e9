//! Salesforce REST client.
//!
//! [`ForceClient`] owns a [`Dispatcher`] and exposes the record, query,
//! discovery, apexrest and file endpoints as typed methods. Every method is a
//! single dispatch, so each one gets the same refresh-then-retry handling.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::instrument;

use relay_sf_auth::{ForceConfig, Session, SessionStore};
use relay_sf_client::security::names;
use relay_sf_client::{ClientConfig, SfHttpClient};

use crate::dispatch::{Dispatcher, PendingRequest, ResponseBody};
use crate::error::{Error, Result};

mod apex;
mod binary;
mod crud;
mod describe;
mod query;

/// Salesforce REST client with transparent session refresh.
///
/// Cloning is cheap; clones share the session.
///
/// # Example
///
/// ```rust,ignore
/// use relay_sf_rest::{ForceClient, ForceConfig};
///
/// let config = ForceConfig::new("3MVG9...")
///     .with_proxy_url("https://app.example.com/proxy")
///     .with_refresh_token(refresh_token);
/// let client = ForceClient::new(&config)?;
/// client
///     .set_session_token(access_token, None, Some("https://na1.salesforce.com"))
///     .await?;
///
/// let page: QueryResult<Account> = client.query("SELECT Id, Name FROM Account").await?;
/// let created = client.create("Account", &json!({"Name": "New Account"})).await?;
/// client.update("Account", &created.id, &json!({"Name": "Updated"})).await?;
/// client.delete("Account", &created.id).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ForceClient {
    dispatcher: Dispatcher,
}

impl ForceClient {
    /// Create a client from settings with the default HTTP configuration.
    pub fn new(config: &ForceConfig) -> Result<Self> {
        Self::with_http_config(config, ClientConfig::default())
    }

    /// Create a client from settings with a custom HTTP configuration.
    pub fn with_http_config(config: &ForceConfig, http_config: ClientConfig) -> Result<Self> {
        let http = SfHttpClient::new(http_config)?;
        let store = SessionStore::from_config(config, http.clone())?;
        Ok(Self::from_parts(http, Arc::new(store)))
    }

    /// Assemble a client around an existing store, e.g. one shared with
    /// another client.
    pub fn from_parts(http: SfHttpClient, store: Arc<SessionStore>) -> Self {
        Self {
            dispatcher: Dispatcher::new(http, store),
        }
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        self.dispatcher.store()
    }

    /// Snapshot of the current session.
    pub async fn session(&self) -> Session {
        self.store().snapshot().await
    }

    /// Install a session token.
    ///
    /// Without `instance_origin`, a hosted client derives the instance from
    /// the page's host name; other environments must pass it.
    #[instrument(skip(self, session_token))]
    pub async fn set_session_token(
        &self,
        session_token: impl Into<String>,
        api_version: Option<&str>,
        instance_origin: Option<&str>,
    ) -> Result<Session> {
        self.store()
            .set_session_token(session_token, api_version, instance_origin)
            .await
            .map_err(Into::into)
    }

    /// Install the refresh token used when a session expires.
    pub async fn set_refresh_token(&self, refresh_token: impl Into<String>) {
        self.store().set_refresh_token(refresh_token).await;
    }

    /// Force a refresh exchange now.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<Session> {
        self.store().refresh().await.map_err(Error::refresh_failed)
    }

    /// Dispatch a hand-built request.
    pub async fn dispatch(&self, request: PendingRequest) -> Result<ResponseBody> {
        self.dispatcher.dispatch(request).await
    }

    pub(crate) async fn fetch<T: DeserializeOwned>(&self, request: PendingRequest) -> Result<T> {
        self.dispatch(request).await?.json()
    }
}

pub(crate) fn check_type(sobject: &str) -> Result<()> {
    if names::is_safe_type_name(sobject) {
        Ok(())
    } else {
        Err(Error::invalid_input(format!("invalid object type name '{}'", sobject)))
    }
}

pub(crate) fn check_id(id: &str) -> Result<()> {
    if names::is_valid_record_id(id) {
        Ok(())
    } else {
        Err(Error::invalid_input(format!("invalid record id '{}'", id)))
    }
}

pub(crate) fn check_field(field: &str) -> Result<()> {
    if names::is_safe_field_name(field) {
        Ok(())
    } else {
        Err(Error::invalid_input(format!("invalid field name '{}'", field)))
    }
}
