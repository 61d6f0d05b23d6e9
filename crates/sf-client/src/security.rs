//! Input validation and encoding for values placed in request paths.
//!
//! Object type names, field names and record ids are spliced into URL paths
//! by the convenience endpoints. They are checked here before any request is
//! built, and free-form values (queries, external ids) are percent-encoded.
//!
//! ```rust
//! use relay_sf_client::security::{names, url};
//!
//! assert!(names::is_safe_type_name("Custom_Object__c"));
//! assert!(!names::is_safe_type_name("Account/../User"));
//!
//! let q = url::encode_param("SELECT Id FROM Account");
//! assert_eq!(q, "SELECT%20Id%20FROM%20Account");
//! ```

/// Validation of object type, field and record identifiers.
pub mod names {
    /// Validate a field or object name: starts with a letter, then
    /// alphanumerics and underscores only (`Custom_Field__c`, `Account__r`).
    #[must_use]
    pub fn is_safe_field_name(name: &str) -> bool {
        let mut chars = name.chars();
        match chars.next() {
            Some(first) if first.is_ascii_alphabetic() => {}
            _ => return false,
        }
        chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
    }

    /// Validate an object type name such as `Account` or `Invoice__c`.
    #[must_use]
    pub fn is_safe_type_name(name: &str) -> bool {
        is_safe_field_name(name)
    }

    /// Validate a record id: 15 or 18 alphanumeric characters.
    #[must_use]
    pub fn is_valid_record_id(id: &str) -> bool {
        let len = id.len();
        (len == 15 || len == 18) && id.chars().all(|c| c.is_ascii_alphanumeric())
    }

    /// Join a field list for a `fields=` parameter.
    ///
    /// Returns the first offending name if any field is unsafe; an empty list
    /// yields `Ok(None)`.
    pub fn field_list<'a, I>(fields: I) -> Result<Option<String>, &'a str>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut joined: Vec<&str> = Vec::new();
        for field in fields {
            if !is_safe_field_name(field) {
                return Err(field);
            }
            joined.push(field);
        }
        Ok((!joined.is_empty()).then(|| joined.join(",")))
    }
}

/// URL encoding for path segments and query values.
pub mod url {
    /// Percent-encode a value so it cannot break out of its path segment or
    /// query parameter.
    ///
    /// ```rust
    /// use relay_sf_client::security::url;
    ///
    /// assert_eq!(url::encode_param("001/../../secret"), "001%2F..%2F..%2Fsecret");
    /// ```
    #[must_use]
    pub fn encode_param(value: &str) -> String {
        urlencoding::encode(value).into_owned()
    }

    /// Encode key/value pairs as a query string, without the leading `?`.
    pub fn encode_query<K, V>(pairs: &[(K, V)]) -> String
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        pairs
            .iter()
            .map(|(k, v)| format!("{}={}", encode_param(k.as_ref()), encode_param(v.as_ref())))
            .collect::<Vec<_>>()
            .join("&")
    }
}
