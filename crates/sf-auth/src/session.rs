//! Session state shared by every call of a client.
//!
//! [`SessionStore`] is the single owner of the session token, the refresh
//! token and the endpoint metadata. Reads take a [`Session`] snapshot; the
//! setters and the refresh path are the only writers. Every session token
//! write bumps a generation counter, which lets concurrent callers that all
//! saw the same expired session share one refresh exchange.

use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, instrument};

use relay_sf_client::{
    normalize_api_version, EnvironmentPolicy, SfHttpClient, DEFAULT_API_VERSION,
};

use crate::config::ForceConfig;
use crate::error::{Error, ErrorKind, Result};
use crate::host::instance_origin_from_host;
use crate::oauth::{OAuthClient, TokenResponse};

/// Point-in-time copy of the session.
///
/// The session token is redacted in Debug output.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    session_token: Option<String>,
    api_version: String,
    instance_origin: Option<String>,
    has_refresh_token: bool,
    generation: u64,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("session_token", &self.session_token.as_ref().map(|_| "[REDACTED]"))
            .field("api_version", &self.api_version)
            .field("instance_origin", &self.instance_origin)
            .field("has_refresh_token", &self.has_refresh_token)
            .field("generation", &self.generation)
            .finish()
    }
}

impl Session {
    pub fn session_token(&self) -> Option<&str> {
        self.session_token.as_deref()
    }

    /// Bare API version, e.g. `"62.0"`.
    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    pub fn instance_origin(&self) -> Option<&str> {
        self.instance_origin.as_deref()
    }

    pub fn has_refresh_token(&self) -> bool {
        self.has_refresh_token
    }

    /// Write counter at the time of the snapshot.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// `Bearer <token>` value for the authorization header.
    pub fn bearer(&self) -> Option<String> {
        self.session_token.as_ref().map(|t| format!("Bearer {}", t))
    }
}

struct SessionState {
    session_token: Option<String>,
    refresh_token: Option<String>,
    api_version: String,
    instance_origin: Option<String>,
    generation: u64,
}

impl SessionState {
    fn snapshot(&self) -> Session {
        Session {
            session_token: self.session_token.clone(),
            api_version: self.api_version.clone(),
            instance_origin: self.instance_origin.clone(),
            has_refresh_token: self.refresh_token.is_some(),
            generation: self.generation,
        }
    }
}

/// Holder of the current credentials and the refresh exchange.
pub struct SessionStore {
    state: RwLock<SessionState>,
    refresh_gate: Mutex<()>,
    oauth: OAuthClient,
    policy: EnvironmentPolicy,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("oauth", &self.oauth)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl SessionStore {
    /// Create an empty store. No session is set until
    /// [`set_session_token`](Self::set_session_token) or a refresh succeeds.
    pub fn new(oauth: OAuthClient, policy: EnvironmentPolicy) -> Self {
        Self {
            state: RwLock::new(SessionState {
                session_token: None,
                refresh_token: None,
                api_version: DEFAULT_API_VERSION.to_string(),
                instance_origin: None,
                generation: 0,
            }),
            refresh_gate: Mutex::new(()),
            oauth,
            policy,
        }
    }

    /// Build a store from settings, seeding any tokens they carry.
    pub fn from_config(config: &ForceConfig, http: SfHttpClient) -> Result<Self> {
        let policy = config.environment()?.policy();
        let oauth = OAuthClient::new(&config.client_id, &config.login_url, http, policy.clone());
        let store = Self::new(oauth, policy).with_api_version(&config.api_version);

        let origin = match config.access_token() {
            Some(_) => Some(store.resolve_origin(config.instance_url.as_deref())?),
            None => None,
        };

        let mut state = store.state.into_inner();
        state.refresh_token = config.refresh_token().map(str::to_string);
        if let Some(token) = config.access_token() {
            state.session_token = Some(token.to_string());
            state.instance_origin = origin;
            state.generation = 1;
        }

        Ok(Self {
            state: RwLock::new(state),
            ..store
        })
    }

    /// Use `api_version` until a session token sets another one.
    pub fn with_api_version(self, api_version: &str) -> Self {
        let mut state = self.state.into_inner();
        state.api_version = normalize_api_version(api_version);
        Self {
            state: RwLock::new(state),
            ..self
        }
    }

    pub fn policy(&self) -> &EnvironmentPolicy {
        &self.policy
    }

    pub fn oauth(&self) -> &OAuthClient {
        &self.oauth
    }

    /// Current session.
    pub async fn snapshot(&self) -> Session {
        self.state.read().await.snapshot()
    }

    /// Store the long-lived credential used to mint new session tokens.
    /// Any string is accepted.
    pub async fn set_refresh_token(&self, refresh_token: impl Into<String>) {
        self.state.write().await.refresh_token = Some(refresh_token.into());
    }

    /// Store the active session token.
    ///
    /// `api_version` defaults to the store's current version. Without an
    /// `instance_origin` the origin is derived from the hosted page's host
    /// name; outside a hosted page that is an error.
    pub async fn set_session_token(
        &self,
        session_token: impl Into<String>,
        api_version: Option<&str>,
        instance_origin: Option<&str>,
    ) -> Result<Session> {
        let origin = self.resolve_origin(instance_origin)?;

        let mut state = self.state.write().await;
        state.session_token = Some(session_token.into());
        if let Some(version) = api_version {
            state.api_version = normalize_api_version(version);
        }
        state.instance_origin = Some(origin);
        state.generation += 1;
        Ok(state.snapshot())
    }

    /// Run the refresh exchange unconditionally and install the new session.
    ///
    /// Errors from the exchange are returned unchanged and leave the session
    /// as it was.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<Session> {
        let _gate = self.refresh_gate.lock().await;
        self.exchange().await
    }

    /// Refresh unless the session has been written since generation
    /// `observed`.
    ///
    /// Callers pass the generation of the snapshot their rejected request was
    /// sent with. Concurrent callers queue on the refresh gate; the first one
    /// performs the exchange and the rest find a newer session and reuse it.
    #[instrument(skip(self))]
    pub async fn refresh_if_stale(&self, observed: u64) -> Result<Session> {
        let _gate = self.refresh_gate.lock().await;

        let current = self.snapshot().await;
        if current.generation() != observed && current.session_token().is_some() {
            debug!(
                observed,
                current = current.generation(),
                "Session already refreshed by a concurrent call"
            );
            return Ok(current);
        }

        self.exchange().await
    }

    // Caller holds the refresh gate.
    async fn exchange(&self) -> Result<Session> {
        let refresh_token = self
            .state
            .read()
            .await
            .refresh_token
            .clone()
            .ok_or_else(|| {
                Error::new(ErrorKind::Config("no refresh token configured".to_string()))
            })?;

        let token = self.oauth.refresh_token(&refresh_token).await?;
        let session = self.apply(token).await;
        info!(generation = session.generation(), "Session refreshed");
        Ok(session)
    }

    // The API version is kept as configured; only the token and origin change.
    async fn apply(&self, token: TokenResponse) -> Session {
        let mut state = self.state.write().await;
        state.session_token = Some(token.access_token);
        state.instance_origin = Some(token.instance_url.trim_end_matches('/').to_string());
        if let Some(rotated) = token.refresh_token {
            state.refresh_token = Some(rotated);
        }
        state.generation += 1;
        state.snapshot()
    }

    fn resolve_origin(&self, instance_origin: Option<&str>) -> Result<String> {
        if let Some(origin) = instance_origin {
            return Ok(origin.trim_end_matches('/').to_string());
        }

        if !self.policy.is_hosted() {
            return Err(Error::new(ErrorKind::InvalidInput(
                "instance origin is required outside a hosted page".to_string(),
            )));
        }

        let host = self.policy.page_host().ok_or_else(|| {
            Error::new(ErrorKind::Config("hosted page has no host name".to_string()))
        })?;
        instance_origin_from_host(host).ok_or_else(|| {
            Error::new(ErrorKind::InvalidInput(format!(
                "cannot derive an instance from host '{}'",
                host
            )))
        })
    }
}
