use serde::de::DeserializeOwned;
use tracing::instrument;

use relay_sf_client::security::url as url_security;

use crate::dispatch::{PendingRequest, Surface};
use crate::error::{Error, Result};
use crate::query::{QueryResult, SearchResult};

/// Origin-relative prefix of the data API.
const DATA_PREFIX: &str = "/services/data";

impl super::ForceClient {
    /// Execute a SOQL query and return the first page.
    ///
    /// Values from user input must be escaped by the caller before being
    /// placed in the statement; only the statement as a whole is encoded.
    #[instrument(skip(self))]
    pub async fn query<T: DeserializeOwned>(&self, soql: &str) -> Result<QueryResult<T>> {
        let path = format!("/query?q={}", url_security::encode_param(soql));
        self.fetch(PendingRequest::new(Surface::Data, path)).await
    }

    /// Fetch the page named by a previous result's `nextRecordsUrl`.
    ///
    /// Anything before `/services/data` (an origin, for instance) is dropped.
    /// A bare `/v<version>/...` locator is taken as relative to `/services/data`.
    #[instrument(skip(self))]
    pub async fn query_more<T: DeserializeOwned>(
        &self,
        next_records_url: &str,
    ) -> Result<QueryResult<T>> {
        let path = next_page_path(next_records_url)?;
        self.fetch(PendingRequest::new(Surface::Data, path)).await
    }

    /// Execute a SOSL search.
    #[instrument(skip(self))]
    pub async fn search<T: DeserializeOwned>(&self, sosl: &str) -> Result<SearchResult<T>> {
        let path = format!("/search?q={}", url_security::encode_param(sosl));
        self.fetch(PendingRequest::new(Surface::Data, path)).await
    }
}

fn next_page_path(next_records_url: &str) -> Result<String> {
    if next_records_url.trim().is_empty() {
        return Err(Error::invalid_input("next records URL must not be empty"));
    }

    Ok(match next_records_url.find(DATA_PREFIX) {
        Some(index) => next_records_url[index..].to_string(),
        None if next_records_url.starts_with('/') => {
            format!("{}{}", DATA_PREFIX, next_records_url)
        }
        None => format!("{}/{}", DATA_PREFIX, next_records_url),
    })
}
