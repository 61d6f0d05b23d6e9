//! Synchronous client.
//!
//! [`BlockingForceClient`] drives a [`ForceClient`] on its own current-thread
//! runtime. Each call blocks the calling thread until the whole lifecycle,
//! including any refresh and retry, has finished.
//!
//! Calling it from inside an async runtime panics: blocking a runtime thread
//! would stall every other task scheduled on it.

use std::collections::HashMap;
use std::future::Future;

use bytes::Bytes;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use relay_sf_auth::{ForceConfig, Session};
use relay_sf_client::{BlobPart, ProgressObserver, RequestMethod};

use crate::client::ForceClient;
use crate::describe::{ApiVersion, DescribeGlobalResult, DescribeSObjectResult, SObjectInfo};
use crate::dispatch::{PendingRequest, ResponseBody};
use crate::error::{Error, ErrorKind, Result};
use crate::query::{QueryResult, SearchResult};
use crate::sobject::{CreateResult, UpsertResult};

/// Blocking wrapper around [`ForceClient`].
#[derive(Debug)]
pub struct BlockingForceClient {
    inner: ForceClient,
    runtime: tokio::runtime::Runtime,
}

impl BlockingForceClient {
    pub fn new(config: &ForceConfig) -> Result<Self> {
        Self::from_client(ForceClient::new(config)?)
    }

    /// Wrap an existing client. The session stays shared with `client`.
    pub fn from_client(client: ForceClient) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| {
                Error::with_source(ErrorKind::Config(format!("cannot start runtime: {}", e)), e)
            })?;
        Ok(Self {
            inner: client,
            runtime,
        })
    }

    /// The wrapped async client.
    pub fn client(&self) -> &ForceClient {
        &self.inner
    }

    fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }

    pub fn session(&self) -> Session {
        self.block_on(self.inner.session())
    }

    pub fn set_session_token(
        &self,
        session_token: impl Into<String>,
        api_version: Option<&str>,
        instance_origin: Option<&str>,
    ) -> Result<Session> {
        self.block_on(
            self.inner
                .set_session_token(session_token, api_version, instance_origin),
        )
    }

    pub fn set_refresh_token(&self, refresh_token: impl Into<String>) {
        self.block_on(self.inner.set_refresh_token(refresh_token))
    }

    pub fn refresh(&self) -> Result<Session> {
        self.block_on(self.inner.refresh())
    }

    pub fn dispatch(&self, request: PendingRequest) -> Result<ResponseBody> {
        self.block_on(self.inner.dispatch(request))
    }

    pub fn versions(&self) -> Result<Vec<ApiVersion>> {
        self.block_on(self.inner.versions())
    }

    pub fn resources(&self) -> Result<HashMap<String, String>> {
        self.block_on(self.inner.resources())
    }

    pub fn describe_global(&self) -> Result<DescribeGlobalResult> {
        self.block_on(self.inner.describe_global())
    }

    pub fn metadata(&self, sobject: &str) -> Result<SObjectInfo> {
        self.block_on(self.inner.metadata(sobject))
    }

    pub fn describe(&self, sobject: &str) -> Result<DescribeSObjectResult> {
        self.block_on(self.inner.describe(sobject))
    }

    pub fn create<T: Serialize>(&self, sobject: &str, fields: &T) -> Result<CreateResult> {
        self.block_on(self.inner.create(sobject, fields))
    }

    pub fn retrieve<T: DeserializeOwned>(
        &self,
        sobject: &str,
        id: &str,
        fields: Option<&[&str]>,
    ) -> Result<T> {
        self.block_on(self.inner.retrieve(sobject, id, fields))
    }

    pub fn upsert<T: Serialize>(
        &self,
        sobject: &str,
        external_id_field: &str,
        external_id: &str,
        fields: &T,
    ) -> Result<Option<UpsertResult>> {
        self.block_on(
            self.inner
                .upsert(sobject, external_id_field, external_id, fields),
        )
    }

    pub fn update<T: Serialize>(&self, sobject: &str, id: &str, fields: &T) -> Result<()> {
        self.block_on(self.inner.update(sobject, id, fields))
    }

    pub fn delete(&self, sobject: &str, id: &str) -> Result<()> {
        self.block_on(self.inner.delete(sobject, id))
    }

    pub fn query<T: DeserializeOwned>(&self, soql: &str) -> Result<QueryResult<T>> {
        self.block_on(self.inner.query(soql))
    }

    pub fn query_more<T: DeserializeOwned>(&self, next_records_url: &str) -> Result<QueryResult<T>> {
        self.block_on(self.inner.query_more(next_records_url))
    }

    pub fn search<T: DeserializeOwned>(&self, sosl: &str) -> Result<SearchResult<T>> {
        self.block_on(self.inner.search(sosl))
    }

    pub fn apex_rest(
        &self,
        path: &str,
        method: RequestMethod,
        payload: Option<&Value>,
        headers: &[(&str, &str)],
    ) -> Result<ResponseBody> {
        self.block_on(self.inner.apex_rest(path, method, payload, headers))
    }

    pub fn create_blob<T: Serialize>(
        &self,
        sobject: &str,
        fields: &T,
        blob: BlobPart,
        progress: Option<ProgressObserver>,
    ) -> Result<Option<CreateResult>> {
        self.block_on(self.inner.create_blob(sobject, fields, blob, progress))
    }

    pub fn update_blob<T: Serialize>(
        &self,
        sobject: &str,
        id: &str,
        fields: &T,
        blob: BlobPart,
        progress: Option<ProgressObserver>,
    ) -> Result<Option<Value>> {
        self.block_on(self.inner.update_blob(sobject, id, fields, blob, progress))
    }

    pub fn download_file(&self, path: &str) -> Result<Bytes> {
        self.block_on(self.inner.download_file(path))
    }
}
