//! Query and search result pages.

use serde::{Deserialize, Serialize};

/// One page of query results.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct QueryResult<T> {
    /// Total number of records matching the query.
    #[serde(rename = "totalSize")]
    pub total_size: u64,

    /// Whether this is the last page.
    pub done: bool,

    /// Origin-relative URL of the next page, for [`query_more`].
    ///
    /// [`query_more`]: crate::ForceClient::query_more
    #[serde(rename = "nextRecordsUrl")]
    pub next_records_url: Option<String>,

    pub records: Vec<T>,
}

impl<T> QueryResult<T> {
    /// Whether another page can be fetched.
    pub fn has_more(&self) -> bool {
        !self.done && self.next_records_url.is_some()
    }
}

/// Result of a search.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchResult<T> {
    #[serde(rename = "searchRecords")]
    pub search_records: Vec<T>,
}
