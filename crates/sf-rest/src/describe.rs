//! Types returned by the discovery endpoints: API versions, the global
//! object list, per-object metadata and full object describes.
//!
//! Only the commonly used members are typed. Everything else the server
//! returns is kept in the `extra` map of each struct.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One entry of the `/services/data/` version listing.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ApiVersion {
    /// Bare version, e.g. `"62.0"`.
    pub version: String,
    pub label: String,
    /// Origin-relative base path of this version.
    pub url: String,
}

/// Result of the describe-global call.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DescribeGlobalResult {
    /// Character encoding (e.g., "UTF-8").
    pub encoding: String,

    #[serde(rename = "maxBatchSize")]
    pub max_batch_size: u32,

    pub sobjects: Vec<SObjectBasicInfo>,
}

/// Summary of one object type, as listed by describe-global.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SObjectBasicInfo {
    pub name: String,
    pub label: String,
    #[serde(rename = "labelPlural")]
    pub label_plural: String,
    #[serde(rename = "keyPrefix")]
    pub key_prefix: Option<String>,
    pub custom: bool,
    pub queryable: bool,
    pub createable: bool,
    pub updateable: bool,
    pub deletable: bool,
    pub searchable: bool,
    pub retrieveable: bool,
    #[serde(default)]
    pub urls: HashMap<String, String>,
}

/// Object metadata with the user's recently viewed records.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SObjectInfo {
    #[serde(rename = "objectDescribe")]
    pub object_describe: SObjectBasicInfo,
    #[serde(rename = "recentItems", default)]
    pub recent_items: Vec<serde_json::Value>,
}

/// Field-level describe of one object type.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DescribeSObjectResult {
    pub name: String,
    pub label: String,
    #[serde(rename = "keyPrefix")]
    pub key_prefix: Option<String>,
    pub custom: bool,
    #[serde(default)]
    pub createable: bool,
    #[serde(default)]
    pub updateable: bool,
    #[serde(default)]
    pub deletable: bool,
    #[serde(default)]
    pub queryable: bool,
    pub fields: Vec<FieldDescribe>,
    #[serde(rename = "childRelationships", default)]
    pub child_relationships: Vec<ChildRelationship>,
    #[serde(default)]
    pub urls: HashMap<String, String>,
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl DescribeSObjectResult {
    /// Look up a field by API name, ignoring case.
    pub fn field(&self, name: &str) -> Option<&FieldDescribe> {
        self.fields.iter().find(|f| f.name.eq_ignore_ascii_case(name))
    }
}

/// One field of a [`DescribeSObjectResult`].
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FieldDescribe {
    pub name: String,
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: String,
    pub length: Option<i32>,
    #[serde(default)]
    pub createable: bool,
    #[serde(default)]
    pub updateable: bool,
    #[serde(default)]
    pub nillable: bool,
    #[serde(rename = "externalId", default)]
    pub external_id: bool,
    #[serde(rename = "referenceTo", default)]
    pub reference_to: Vec<String>,
    #[serde(rename = "relationshipName")]
    pub relationship_name: Option<String>,
    #[serde(rename = "picklistValues", default)]
    pub picklist_values: Vec<PicklistValue>,
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChildRelationship {
    #[serde(rename = "childSObject")]
    pub child_sobject: String,
    pub field: String,
    #[serde(rename = "relationshipName")]
    pub relationship_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PicklistValue {
    pub value: String,
    pub label: Option<String>,
    pub active: bool,
    #[serde(rename = "defaultValue")]
    pub default_value: bool,
}
