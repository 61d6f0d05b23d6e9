//! Authenticated request dispatch.
//!
//! A [`PendingRequest`] describes one call against a [`Surface`]. The
//! [`Dispatcher`] sends it with the current session and, when the server
//! rejects the session with a 401, refreshes once and sends the same request
//! again. Per original call the states are:
//!
//! ```text
//! Initial -> Sent -> Succeeded
//!                 -> OtherFailed
//!                 -> AuthFailed -> Refreshing -> Retried-Succeeded
//!                                             -> Retried-Failed
//! ```
//!
//! `Refreshing` is entered at most once; a 401 on the retried attempt is
//! returned to the caller as is.

use std::sync::Arc;

use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, instrument, warn};

use relay_sf_auth::{Session, SessionStore};
use relay_sf_client::{
    identification, EnvironmentPolicy, MultipartBody, ProgressObserver, RequestBuilder,
    RequestMethod, Response, SfHttpClient, SurfaceKind, IDENTIFICATION_HEADER,
};

use crate::error::{Error, ErrorKind, Result};

/// Prefix of paths that are already origin-relative.
const SERVICES_PREFIX: &str = "/services/";

/// API path family a request targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Surface {
    /// Record CRUD, query and search under `/services/data/v<version>`.
    Data,
    /// Caller-defined procedures under `/services/apexrest`.
    CustomProcedure,
    /// Multipart uploads and raw downloads, under the data base path.
    Binary,
}

impl Surface {
    /// Routing family of this surface.
    pub fn kind(self) -> SurfaceKind {
        match self {
            Surface::Data => SurfaceKind::Data,
            Surface::CustomProcedure => SurfaceKind::CustomProcedure,
            Surface::Binary => SurfaceKind::Binary,
        }
    }

    /// Base path for the given bare API version.
    pub fn base_path(self, api_version: &str) -> String {
        match self {
            Surface::Data | Surface::Binary => format!("/services/data/v{}", api_version),
            Surface::CustomProcedure => "/services/apexrest".to_string(),
        }
    }

    /// Origin-relative path for `relative`.
    ///
    /// Paths that already start with `/services/` (next-page URLs, version
    /// listings, file downloads) are used verbatim.
    pub fn resolve(self, api_version: &str, relative: &str) -> String {
        if relative.starts_with(SERVICES_PREFIX) {
            return relative.to_string();
        }

        let base = self.base_path(api_version);
        if relative.is_empty() || relative.starts_with('/') || relative.starts_with('?') {
            format!("{}{}", base, relative)
        } else {
            format!("{}/{}", base, relative)
        }
    }
}

/// Request body for a dispatched call.
#[derive(Debug, Clone, Default)]
pub enum Payload {
    /// No body (GET, DELETE).
    #[default]
    Empty,
    /// JSON value, serialized at send time.
    Json(serde_json::Value),
    /// Already-serialized body, sent as `application/json`.
    Raw(String),
    /// Two-part multipart body for the binary surface.
    Multipart(MultipartBody),
}

/// Immutable description of one call, reused unchanged for its retry.
#[derive(Debug, Clone)]
pub struct PendingRequest {
    surface: Surface,
    path: String,
    method: RequestMethod,
    headers: Vec<(String, String)>,
    payload: Payload,
    progress: Option<ProgressObserver>,
    retry: bool,
}

impl PendingRequest {
    /// A GET against `path` on `surface`.
    pub fn new(surface: Surface, path: impl Into<String>) -> Self {
        Self {
            surface,
            path: path.into(),
            method: RequestMethod::Get,
            headers: Vec::new(),
            payload: Payload::Empty,
            progress: None,
            retry: false,
        }
    }

    pub fn method(mut self, method: RequestMethod) -> Self {
        self.method = method;
        self
    }

    /// Extra header. It may replace `Accept` or `Content-Type` but not the
    /// authorization or identification headers.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn payload(mut self, payload: Payload) -> Self {
        self.payload = payload;
        self
    }

    /// Serialize `body` as the JSON payload.
    pub fn json<T: Serialize>(self, body: &T) -> Result<Self> {
        let value = serde_json::to_value(body)
            .map_err(|e| Error::with_source(ErrorKind::InvalidInput(e.to_string()), e))?;
        Ok(self.payload(Payload::Json(value)))
    }

    /// Observe the upload of any payload, on every surface. The observer is
    /// kept on the retry.
    pub fn on_progress(mut self, observer: Option<ProgressObserver>) -> Self {
        self.progress = observer;
        self
    }

    pub fn surface(&self) -> Surface {
        self.surface
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn http_method(&self) -> RequestMethod {
        self.method
    }

    pub fn is_retry_attempt(&self) -> bool {
        self.retry
    }

    /// The same request, marked as its single retry.
    pub(crate) fn into_retry(self) -> Self {
        Self {
            retry: true,
            ..self
        }
    }

    fn returns_raw_bytes(&self) -> bool {
        self.surface == Surface::Binary && self.method == RequestMethod::Get
    }
}

/// Parsed body of a successful response.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    /// Success with an empty body (e.g. 204 from an update).
    Empty,
    /// JSON document.
    Json(serde_json::Value),
    /// Raw content from a binary download.
    Binary(Bytes),
}

impl ResponseBody {
    pub fn is_empty(&self) -> bool {
        matches!(self, ResponseBody::Empty)
    }

    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            ResponseBody::Json(value) => Some(value),
            _ => None,
        }
    }

    /// Deserialize the body. An empty body deserializes from `null`, so
    /// `Option<T>` and `()` targets accept it.
    pub fn json<T: DeserializeOwned>(self) -> Result<T> {
        match self {
            ResponseBody::Empty => Ok(serde_json::from_value(serde_json::Value::Null)?),
            ResponseBody::Json(value) => Ok(serde_json::from_value(value)?),
            ResponseBody::Binary(bytes) => Ok(serde_json::from_slice(&bytes)?),
        }
    }

    /// Raw bytes of the body.
    pub fn into_bytes(self) -> Result<Bytes> {
        match self {
            ResponseBody::Empty => Ok(Bytes::new()),
            ResponseBody::Json(value) => Ok(Bytes::from(serde_json::to_vec(&value)?)),
            ResponseBody::Binary(bytes) => Ok(bytes),
        }
    }
}

/// Sends [`PendingRequest`]s with the shared session and recovers from an
/// expired session once per call.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    http: SfHttpClient,
    store: Arc<SessionStore>,
}

impl Dispatcher {
    pub fn new(http: SfHttpClient, store: Arc<SessionStore>) -> Self {
        Self { http, store }
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    pub fn policy(&self) -> &EnvironmentPolicy {
        self.store.policy()
    }

    /// Run one call to completion, including at most one refresh and retry.
    #[instrument(skip(self, request), fields(surface = ?request.surface, method = %request.method, path = %request.path))]
    pub async fn dispatch(&self, request: PendingRequest) -> Result<ResponseBody> {
        let mut request = request;
        let mut session = self.store.snapshot().await;

        loop {
            let err = match self.attempt(&request, &session).await {
                Ok(body) => return Ok(body),
                Err(err) => err,
            };

            if !err.is_auth_error() || request.is_retry_attempt() || !session.has_refresh_token() {
                return Err(err);
            }

            warn!(status = 401, "Session rejected, refreshing before retry");
            session = self
                .store
                .refresh_if_stale(session.generation())
                .await
                .map_err(Error::refresh_failed)?;
            request = request.into_retry();
        }
    }

    async fn attempt(&self, request: &PendingRequest, session: &Session) -> Result<ResponseBody> {
        let bearer = session.bearer().ok_or_else(|| {
            Error::new(ErrorKind::Config("no session token set".to_string()))
        })?;

        let policy = self.policy();
        let kind = request.surface.kind();
        let origin = policy.origin_for(kind, session.instance_origin())?;
        let target = format!(
            "{}{}",
            origin,
            request.surface.resolve(session.api_version(), &request.path)
        );
        let route = policy.route(kind, target);

        debug!(
            target = %route.target(),
            proxied = route.is_proxied(),
            retry = request.retry,
            "Dispatching request"
        );

        let mut builder = RequestBuilder::for_route(request.method, &route);
        if !request.returns_raw_bytes() {
            builder = builder.header("Accept", "application/json");
        }
        builder = match &request.payload {
            Payload::Empty => builder,
            Payload::Json(value) => builder.json_value(value.clone()),
            Payload::Raw(body) => builder.text(body.clone(), "application/json"),
            Payload::Multipart(body) => builder.multipart(body.clone()),
        };
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        builder = builder
            .header(IDENTIFICATION_HEADER, identification(session.api_version()))
            .header(policy.authorization_header(), bearer)
            .on_progress(request.progress.clone());

        let response = self.http.execute(builder).await?;
        read_body(request, response).await
    }
}

async fn read_body(request: &PendingRequest, response: Response) -> Result<ResponseBody> {
    let bytes = response.bytes().await?;

    if request.returns_raw_bytes() {
        return Ok(ResponseBody::Binary(bytes));
    }
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(ResponseBody::Empty);
    }
    Ok(ResponseBody::Json(serde_json::from_slice(&bytes)?))
}
