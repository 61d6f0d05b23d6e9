use bytes::Bytes;
use serde::Serialize;
use tracing::instrument;

use relay_sf_client::{BlobPart, MultipartBody, ProgressObserver, RequestMethod};

use super::{check_field, check_id, check_type};
use crate::dispatch::{Payload, PendingRequest, Surface};
use crate::error::{Error, ErrorKind, Result};
use crate::sobject::CreateResult;

impl super::ForceClient {
    /// Create a record with binary content, e.g. a `ContentVersion` with its
    /// `VersionData`.
    ///
    /// `fields` go in the JSON part and `blob` in the binary part. Returns
    /// `None` if the server answers with an empty body.
    #[instrument(skip(self, fields, blob, progress), fields(file_name = %blob.file_name, size = blob.content.len()))]
    pub async fn create_blob<T: Serialize>(
        &self,
        sobject: &str,
        fields: &T,
        blob: BlobPart,
        progress: Option<ProgressObserver>,
    ) -> Result<Option<CreateResult>> {
        check_type(sobject)?;
        let request = upload(format!("/sobjects/{}/", sobject), fields, &blob, progress)?;
        self.fetch(request).await
    }

    /// Replace the binary content of an existing record.
    #[instrument(skip(self, fields, blob, progress), fields(file_name = %blob.file_name, size = blob.content.len()))]
    pub async fn update_blob<T: Serialize>(
        &self,
        sobject: &str,
        id: &str,
        fields: &T,
        blob: BlobPart,
        progress: Option<ProgressObserver>,
    ) -> Result<Option<serde_json::Value>> {
        check_type(sobject)?;
        check_id(id)?;
        let path = format!("/sobjects/{}/{}?_HttpMethod=PATCH", sobject, id);
        let request = upload(path, fields, &blob, progress)?;
        self.fetch(request).await
    }

    /// Download raw content, e.g. a file's `/services/data/v62.0/connect/files/<id>/content`.
    ///
    /// Paths under `/services/` are used as given; anything else is relative
    /// to the data API base.
    #[instrument(skip(self))]
    pub async fn download_file(&self, path: &str) -> Result<Bytes> {
        if path.is_empty() {
            return Err(Error::invalid_input("download path must not be empty"));
        }
        self.dispatch(PendingRequest::new(Surface::Binary, path))
            .await?
            .into_bytes()
    }
}

fn upload<T: Serialize>(
    path: String,
    fields: &T,
    blob: &BlobPart,
    progress: Option<ProgressObserver>,
) -> Result<PendingRequest> {
    check_field(&blob.field_name)?;
    if blob.file_name.is_empty() {
        return Err(Error::invalid_input("file name must not be empty"));
    }

    let body = MultipartBody::new(fields, blob)
        .map_err(|e| Error::with_source(ErrorKind::InvalidInput(e.to_string()), e))?;
    Ok(PendingRequest::new(Surface::Binary, path)
        .method(RequestMethod::Post)
        .payload(Payload::Multipart(body))
        .on_progress(progress))
}
