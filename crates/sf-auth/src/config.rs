//! Client settings, loadable from the environment.

use relay_sf_client::{normalize_api_version, Environment, DEFAULT_API_VERSION};

use crate::error::{Error, ErrorKind, Result};
use crate::PRODUCTION_LOGIN_URL;

/// Everything needed to build a session store.
///
/// Tokens are redacted in Debug output.
#[derive(Clone)]
pub struct ForceConfig {
    /// Connected app consumer key.
    pub client_id: String,
    /// Login host for the refresh exchange.
    pub login_url: String,
    /// Forwarding proxy; setting it selects the external environment.
    pub proxy_url: Option<String>,
    /// URL of the hosting page, when running inside one.
    pub page_url: Option<String>,
    /// Bare API version, e.g. `"62.0"`.
    pub api_version: String,
    access_token: Option<String>,
    refresh_token: Option<String>,
    /// Instance origin matching `access_token`.
    pub instance_url: Option<String>,
}

impl std::fmt::Debug for ForceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ForceConfig")
            .field("client_id", &self.client_id)
            .field("login_url", &self.login_url)
            .field("proxy_url", &self.proxy_url)
            .field("page_url", &self.page_url)
            .field("api_version", &self.api_version)
            .field("access_token", &self.access_token.as_ref().map(|_| "[REDACTED]"))
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "[REDACTED]"))
            .field("instance_url", &self.instance_url)
            .finish()
    }
}

impl ForceConfig {
    /// Settings for a connected app, logging in at the production host.
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            login_url: PRODUCTION_LOGIN_URL.to_string(),
            proxy_url: None,
            page_url: None,
            api_version: DEFAULT_API_VERSION.to_string(),
            access_token: None,
            refresh_token: None,
            instance_url: None,
        }
    }

    pub fn with_login_url(mut self, login_url: impl Into<String>) -> Self {
        self.login_url = login_url.into();
        self
    }

    pub fn with_proxy_url(mut self, proxy_url: impl Into<String>) -> Self {
        self.proxy_url = Some(proxy_url.into());
        self
    }

    pub fn with_page_url(mut self, page_url: impl Into<String>) -> Self {
        self.page_url = Some(page_url.into());
        self
    }

    /// Set the API version; a leading `v` is accepted.
    pub fn with_api_version(mut self, api_version: &str) -> Self {
        self.api_version = normalize_api_version(api_version);
        self
    }

    pub fn with_session(
        mut self,
        access_token: impl Into<String>,
        instance_url: Option<String>,
    ) -> Self {
        self.access_token = Some(access_token.into());
        self.instance_url = instance_url;
        self
    }

    pub fn with_refresh_token(mut self, refresh_token: impl Into<String>) -> Self {
        self.refresh_token = Some(refresh_token.into());
        self
    }

    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref()
    }

    /// Environment implied by the proxy and page settings.
    pub fn environment(&self) -> Result<Environment> {
        Environment::detect(self.page_url.as_deref(), self.proxy_url.as_deref())
            .map_err(|e| Error::with_source(ErrorKind::Config(e.to_string()), e))
    }

    /// Load settings from environment variables.
    ///
    /// Required:
    /// - `SF_CLIENT_ID` or `SALESFORCE_CLIENT_ID`
    ///
    /// Optional:
    /// - `SF_LOGIN_URL` (default: production login host)
    /// - `SF_PROXY_URL`
    /// - `SF_API_VERSION` (default: "62.0")
    /// - `SF_ACCESS_TOKEN` with `SF_INSTANCE_URL`
    /// - `SF_REFRESH_TOKEN`
    ///
    /// Each optional variable is also read under the `SALESFORCE_` prefix.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |suffix: &str| {
            lookup(&format!("SF_{}", suffix))
                .or_else(|| lookup(&format!("SALESFORCE_{}", suffix)))
                .filter(|v| !v.trim().is_empty())
        };

        let client_id = var("CLIENT_ID")
            .ok_or_else(|| Error::new(ErrorKind::EnvVar("SF_CLIENT_ID".to_string())))?;

        let mut config = Self::new(client_id);
        if let Some(login_url) = var("LOGIN_URL") {
            config = config.with_login_url(login_url);
        }
        if let Some(proxy_url) = var("PROXY_URL") {
            config = config.with_proxy_url(proxy_url);
        }
        if let Some(version) = var("API_VERSION") {
            config = config.with_api_version(&version);
        }
        if let Some(token) = var("ACCESS_TOKEN") {
            config = config.with_session(token, var("INSTANCE_URL"));
        }
        if let Some(token) = var("REFRESH_TOKEN") {
            config = config.with_refresh_token(token);
        }

        Ok(config)
    }
}
