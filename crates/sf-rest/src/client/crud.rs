use serde::{de::DeserializeOwned, Serialize};
use tracing::instrument;

use relay_sf_client::security::{names, url as url_security};
use relay_sf_client::RequestMethod;

use super::{check_field, check_id, check_type};
use crate::dispatch::{PendingRequest, Surface};
use crate::error::{Error, Result};
use crate::sobject::{CreateResult, UpsertResult};

/// Method override for partial updates sent as POST.
const PATCH_OVERRIDE: &str = "?_HttpMethod=PATCH";

impl super::ForceClient {
    /// Create a record.
    #[instrument(skip(self, fields))]
    pub async fn create<T: Serialize>(&self, sobject: &str, fields: &T) -> Result<CreateResult> {
        check_type(sobject)?;
        let request = PendingRequest::new(Surface::Data, format!("/sobjects/{}/", sobject))
            .method(RequestMethod::Post)
            .json(fields)?;
        self.fetch(request).await
    }

    /// Retrieve a record by id, optionally limited to `fields`.
    #[instrument(skip(self))]
    pub async fn retrieve<T: DeserializeOwned>(
        &self,
        sobject: &str,
        id: &str,
        fields: Option<&[&str]>,
    ) -> Result<T> {
        check_type(sobject)?;
        check_id(id)?;

        let field_list = names::field_list(fields.unwrap_or_default().iter().copied())
            .map_err(|bad| Error::invalid_input(format!("invalid field name '{}'", bad)))?;
        let path = match field_list {
            Some(list) => format!("/sobjects/{}/{}?fields={}", sobject, id, list),
            None => format!("/sobjects/{}/{}", sobject, id),
        };
        self.fetch(PendingRequest::new(Surface::Data, path)).await
    }

    /// Insert or update a record matched on an external id field.
    ///
    /// Returns `None` when the server answers with no body (an update).
    #[instrument(skip(self, fields))]
    pub async fn upsert<T: Serialize>(
        &self,
        sobject: &str,
        external_id_field: &str,
        external_id: &str,
        fields: &T,
    ) -> Result<Option<UpsertResult>> {
        check_type(sobject)?;
        check_field(external_id_field)?;
        if external_id.is_empty() {
            return Err(Error::invalid_input("external id must not be empty"));
        }

        let path = format!(
            "/sobjects/{}/{}/{}{}",
            sobject,
            external_id_field,
            url_security::encode_param(external_id),
            PATCH_OVERRIDE
        );
        let request = PendingRequest::new(Surface::Data, path)
            .method(RequestMethod::Post)
            .json(fields)?;
        self.fetch(request).await
    }

    /// Update fields of a record.
    #[instrument(skip(self, fields))]
    pub async fn update<T: Serialize>(&self, sobject: &str, id: &str, fields: &T) -> Result<()> {
        check_type(sobject)?;
        check_id(id)?;

        let path = format!("/sobjects/{}/{}{}", sobject, id, PATCH_OVERRIDE);
        let request = PendingRequest::new(Surface::Data, path)
            .method(RequestMethod::Post)
            .json(fields)?;
        self.dispatch(request).await?;
        Ok(())
    }

    /// Delete a record.
    #[instrument(skip(self))]
    pub async fn delete(&self, sobject: &str, id: &str) -> Result<()> {
        check_type(sobject)?;
        check_id(id)?;

        let path = format!("/sobjects/{}/{}", sobject, id);
        self.dispatch(PendingRequest::new(Surface::Data, path).method(RequestMethod::Delete))
            .await?;
        Ok(())
    }
}
