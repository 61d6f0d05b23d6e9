//! Refresh-token exchange against the OAuth token endpoint.
//!
//! Only the refresh grant is supported: the session token is minted elsewhere
//! (injected into a hosted page, or obtained by the application's own login
//! flow) and this client renews it.

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use relay_sf_client::{
    EnvironmentPolicy, RequestBuilder, RequestMethod, SfHttpClient, SurfaceKind,
};

use crate::error::{Error, ErrorKind, Result};

/// Path of the token endpoint on the login host.
pub const TOKEN_PATH: &str = "/services/oauth2/token";

/// Client for the token endpoint.
///
/// The exchange is routed with the same environment policy as every other
/// call, so external contexts reach the login host through the forwarding
/// proxy while hosted pages call it directly.
#[derive(Clone)]
pub struct OAuthClient {
    client_id: String,
    login_url: String,
    http: SfHttpClient,
    policy: EnvironmentPolicy,
}

impl std::fmt::Debug for OAuthClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthClient")
            .field("client_id", &self.client_id)
            .field("login_url", &self.login_url)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl OAuthClient {
    /// Create a new OAuth client.
    pub fn new(
        client_id: impl Into<String>,
        login_url: impl Into<String>,
        http: SfHttpClient,
        policy: EnvironmentPolicy,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            login_url: login_url.into().trim_end_matches('/').to_string(),
            http,
            policy,
        }
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn login_url(&self) -> &str {
        &self.login_url
    }

    /// Full URL of the token endpoint.
    pub fn token_url(&self) -> String {
        format!("{}{}", self.login_url, TOKEN_PATH)
    }

    /// Exchange a refresh token for a new session token.
    ///
    /// The refresh_token parameter is not logged to prevent credential exposure.
    #[instrument(skip(self, refresh_token), fields(login_url = %self.login_url))]
    pub async fn refresh_token(&self, refresh_token: &str) -> Result<TokenResponse> {
        let route = self.policy.route(SurfaceKind::Token, self.token_url());
        debug!(proxied = route.is_proxied(), "Exchanging refresh token");

        let params = [
            ("grant_type", "refresh_token"),
            ("client_id", self.client_id.as_str()),
            ("refresh_token", refresh_token),
        ];

        let request = RequestBuilder::for_route(RequestMethod::Post, &route)
            .header("Accept", "application/json")
            .form(&params)?;

        match self.http.execute(request).await {
            Ok(response) => {
                let token: TokenResponse = response.json().await?;
                Ok(token)
            }
            Err(err) => Err(oauth_error(err)),
        }
    }
}

/// Prefer the endpoint's `{error, error_description}` payload when present.
fn oauth_error(err: relay_sf_client::Error) -> Error {
    let parsed = err
        .response()
        .and_then(|r| serde_json::from_slice::<OAuthErrorResponse>(&r.body).ok());

    match parsed {
        Some(body) => Error::with_source(
            ErrorKind::OAuth {
                error: body.error,
                description: body.error_description.unwrap_or_default(),
            },
            err,
        ),
        None => err.into(),
    }
}

/// Token response from the refresh exchange.
///
/// Sensitive fields like `access_token` and `refresh_token` are redacted
/// in Debug output to prevent accidental exposure in logs.
#[derive(Clone, Deserialize, Serialize)]
pub struct TokenResponse {
    /// Access token.
    pub access_token: String,
    /// Rotated refresh token, when the connected app issues one.
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Instance URL.
    pub instance_url: String,
    /// User ID URL.
    #[serde(default)]
    pub id: Option<String>,
    /// Token type (usually "Bearer").
    #[serde(default)]
    pub token_type: Option<String>,
    /// Scopes granted.
    #[serde(default)]
    pub scope: Option<String>,
    /// Signature for verification.
    #[serde(default)]
    pub signature: Option<String>,
    /// Issued at timestamp (milliseconds since the epoch, as a string).
    #[serde(default)]
    pub issued_at: Option<String>,
}

impl std::fmt::Debug for TokenResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenResponse")
            .field("access_token", &"[REDACTED]")
            .field(
                "refresh_token",
                &self.refresh_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("instance_url", &self.instance_url)
            .field("id", &self.id)
            .field("token_type", &self.token_type)
            .field("scope", &self.scope)
            .field("signature", &self.signature.as_ref().map(|_| "[REDACTED]"))
            .field("issued_at", &self.issued_at)
            .finish()
    }
}

impl TokenResponse {
    /// Issue time, if the endpoint reported one.
    pub fn issued_at_time(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        let millis: i64 = self.issued_at.as_deref()?.parse().ok()?;
        chrono::DateTime::from_timestamp_millis(millis)
    }
}

/// OAuth error response.
#[derive(Debug, Deserialize)]
struct OAuthErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}
