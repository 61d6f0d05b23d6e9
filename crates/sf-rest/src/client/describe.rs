use std::collections::HashMap;

use tracing::instrument;

use super::check_type;
use crate::describe::{ApiVersion, DescribeGlobalResult, DescribeSObjectResult, SObjectInfo};
use crate::dispatch::{PendingRequest, Surface};
use crate::error::Result;

impl super::ForceClient {
    /// List the API versions the instance serves.
    #[instrument(skip(self))]
    pub async fn versions(&self) -> Result<Vec<ApiVersion>> {
        self.fetch(PendingRequest::new(Surface::Data, "/services/data/"))
            .await
    }

    /// Resources available at the current API version, keyed by name.
    #[instrument(skip(self))]
    pub async fn resources(&self) -> Result<HashMap<String, String>> {
        self.fetch(PendingRequest::new(Surface::Data, "/")).await
    }

    /// List every object type the user can see.
    #[instrument(skip(self))]
    pub async fn describe_global(&self) -> Result<DescribeGlobalResult> {
        self.fetch(PendingRequest::new(Surface::Data, "/sobjects/"))
            .await
    }

    /// Basic metadata for one object type.
    #[instrument(skip(self))]
    pub async fn metadata(&self, sobject: &str) -> Result<SObjectInfo> {
        check_type(sobject)?;
        self.fetch(PendingRequest::new(
            Surface::Data,
            format!("/sobjects/{}/", sobject),
        ))
        .await
    }

    /// Full field-level describe of one object type.
    #[instrument(skip(self))]
    pub async fn describe(&self, sobject: &str) -> Result<DescribeSObjectResult> {
        check_type(sobject)?;
        self.fetch(PendingRequest::new(
            Surface::Data,
            format!("/sobjects/{}/describe/", sobject),
        ))
        .await
    }
}
