//! Multipart bodies for binary record uploads.
//!
//! The body is always two parts: a JSON `entity_content` part with the
//! record fields, then the binary part. The boundary is drawn fresh from the
//! thread RNG for every body so it cannot be predicted from a previous call.

use bytes::{BufMut, Bytes, BytesMut};
use rand::Rng;
use serde::Serialize;

use crate::error::Result;

const BOUNDARY_PREFIX: &str = "boundary_";

/// The binary half of a multipart upload.
#[derive(Debug, Clone)]
pub struct BlobPart {
    /// File name reported to the server, e.g. `"Q1 Sales Brochure.pdf"`.
    pub file_name: String,
    /// Field receiving the content: `VersionData` for ContentVersion, `Body` for Document.
    pub field_name: String,
    /// Raw content.
    pub content: Bytes,
}

impl BlobPart {
    pub fn new(
        file_name: impl Into<String>,
        field_name: impl Into<String>,
        content: impl Into<Bytes>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            field_name: field_name.into(),
            content: content.into(),
        }
    }
}

/// An assembled `multipart/form-data` body and its boundary.
#[derive(Debug, Clone)]
pub struct MultipartBody {
    boundary: String,
    body: Bytes,
}

impl MultipartBody {
    /// Assemble the metadata part from `fields` and the binary part from `blob`.
    pub fn new<F: Serialize>(fields: &F, blob: &BlobPart) -> Result<Self> {
        let metadata = serde_json::to_vec(fields)?;

        let boundary = loop {
            let candidate = random_boundary();
            let delimiter = format!("--{}", candidate);
            if !contains(&blob.content, delimiter.as_bytes()) && !contains(&metadata, delimiter.as_bytes()) {
                break candidate;
            }
        };

        let mut buf = BytesMut::with_capacity(metadata.len() + blob.content.len() + 512);
        buf.put_slice(format!("--{}\n", boundary).as_bytes());
        buf.put_slice(b"Content-Disposition: form-data; name=\"entity_content\";\n");
        buf.put_slice(b"Content-Type: application/json\n\n");
        buf.put_slice(&metadata);
        buf.put_slice(b"\n\n");
        buf.put_slice(format!("--{}\n", boundary).as_bytes());
        buf.put_slice(b"Content-Type: application/octet-stream\n");
        buf.put_slice(
            format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\n\n",
                quote(&blob.field_name),
                quote(&blob.file_name)
            )
            .as_bytes(),
        );
        buf.put_slice(&blob.content);
        buf.put_slice(format!("\n--{}--", boundary).as_bytes());

        Ok(Self {
            boundary,
            body: buf.freeze(),
        })
    }

    /// Boundary token, including its `boundary_` prefix.
    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// Value for the `Content-Type` header.
    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary=\"{}\"", self.boundary)
    }

    /// Encoded body. Cloning is cheap, so retries reuse the same bytes.
    pub fn bytes(&self) -> Bytes {
        self.body.clone()
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}

fn random_boundary() -> String {
    let token: u128 = rand::rng().random();
    format!("{}{:032x}", BOUNDARY_PREFIX, token)
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

// Quotes would end the disposition parameter early.
fn quote(value: &str) -> String {
    value.replace('"', "%22").replace(['\r', '\n'], " ")
}
