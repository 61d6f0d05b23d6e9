use serde_json::Value;
use tracing::instrument;

use relay_sf_client::security::url as url_security;
use relay_sf_client::RequestMethod;

use crate::dispatch::{Payload, PendingRequest, ResponseBody, Surface};
use crate::error::{Error, Result};

impl super::ForceClient {
    /// Call a custom procedure under `/services/apexrest`.
    ///
    /// For GET the payload, if any, must be a JSON object and becomes the
    /// query string. For other methods a JSON string payload is sent as is
    /// (it is taken to be serialized already) and any other value is
    /// serialized. `headers` are added to the request unchanged.
    #[instrument(skip(self, payload, headers))]
    pub async fn apex_rest(
        &self,
        path: &str,
        method: RequestMethod,
        payload: Option<&Value>,
        headers: &[(&str, &str)],
    ) -> Result<ResponseBody> {
        let mut path = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{}", path)
        };

        let body = match (method, payload) {
            (_, None) => Payload::Empty,
            (RequestMethod::Get, Some(params)) => {
                let query = query_string(params)?;
                if !query.is_empty() {
                    path.push(if path.contains('?') { '&' } else { '?' });
                    path.push_str(&query);
                }
                Payload::Empty
            }
            (_, Some(Value::String(raw))) => Payload::Raw(raw.clone()),
            (_, Some(value)) => Payload::Json(value.clone()),
        };

        let mut request = PendingRequest::new(Surface::CustomProcedure, path)
            .method(method)
            .payload(body);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }
        self.dispatch(request).await
    }
}

/// Flatten a JSON object into `key=value` pairs. Arrays repeat their key;
/// nested objects are sent as JSON text.
fn query_string(params: &Value) -> Result<String> {
    let object = params
        .as_object()
        .ok_or_else(|| Error::invalid_input("GET payload must be a JSON object"))?;

    let mut pairs: Vec<(&str, String)> = Vec::with_capacity(object.len());
    for (key, value) in object {
        match value {
            Value::Array(items) => pairs.extend(items.iter().map(|item| (key.as_str(), scalar(item)))),
            other => pairs.push((key.as_str(), scalar(other))),
        }
    }
    Ok(url_security::encode_query(&pairs))
}

fn scalar(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
