//! Execution environment and proxy routing.
//!
//! The environment is fixed when a client is built. Everything that used to
//! depend on "are we inside a hosted page?" is answered by the
//! [`EnvironmentPolicy`] derived from it, so the dispatcher and the
//! credential store never re-check it per call.

use url::Url;

use crate::error::{Error, ErrorKind, Result};

/// Path of the forwarding proxy served by a hosted page's own origin.
const HOSTED_PROXY_PATH: &str = "/services/proxy";

/// Where the client is running.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    /// Inside a platform-served page. The page origin serves the data API
    /// directly and relays custom-procedure calls through its own proxy.
    Hosted { page_url: Url },
    /// Packaged or native app without cross-origin restrictions.
    PackagedApp,
    /// Any other context; all traffic goes through a configured forwarding proxy.
    External { proxy_url: Url },
}

impl Environment {
    /// Hosted page environment for the given page URL.
    pub fn hosted(page_url: &str) -> Result<Self> {
        let page_url = Url::parse(page_url)?;
        if page_url.host_str().is_none() {
            return Err(Error::new(ErrorKind::InvalidUrl(
                "hosted page URL has no host".to_string(),
            )));
        }
        Ok(Environment::Hosted { page_url })
    }

    /// External environment relaying through `proxy_url`.
    pub fn external(proxy_url: &str) -> Result<Self> {
        Ok(Environment::External {
            proxy_url: Url::parse(proxy_url)?,
        })
    }

    /// Packaged app environment (direct calls, no proxy).
    pub fn packaged_app() -> Self {
        Environment::PackagedApp
    }

    /// Pick the environment the same way for every construction path.
    ///
    /// An explicit proxy always means [`Environment::External`]. Without one,
    /// `file:` and `ms-appx:` pages (or no page at all) are packaged apps and
    /// anything else is a hosted page.
    pub fn detect(page_url: Option<&str>, proxy_url: Option<&str>) -> Result<Self> {
        if let Some(proxy) = proxy_url {
            return Self::external(proxy);
        }

        match page_url {
            None => Ok(Environment::PackagedApp),
            Some(page) => {
                let parsed = Url::parse(page)?;
                match parsed.scheme() {
                    "file" | "ms-appx" => Ok(Environment::PackagedApp),
                    _ => Self::hosted(page),
                }
            }
        }
    }

    /// Compute the immutable policy for this environment.
    pub fn policy(&self) -> EnvironmentPolicy {
        match self {
            Environment::Hosted { page_url } => {
                let origin = page_url.origin().ascii_serialization();
                EnvironmentPolicy {
                    hosted: true,
                    page_host: page_url.host_str().map(str::to_string),
                    proxy_url: Some(format!("{}{}", origin, HOSTED_PROXY_PATH)),
                    page_origin: Some(origin),
                    authorization_header: "Authorization",
                }
            }
            Environment::PackagedApp => EnvironmentPolicy {
                hosted: false,
                page_origin: None,
                page_host: None,
                proxy_url: None,
                authorization_header: "Authorization",
            },
            Environment::External { proxy_url } => EnvironmentPolicy {
                hosted: false,
                page_origin: None,
                page_host: None,
                proxy_url: Some(proxy_url.to_string()),
                authorization_header: "X-Authorization",
            },
        }
    }
}

/// Family of endpoints a call targets, as far as routing is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SurfaceKind {
    /// Record CRUD/query/search under `/services/data/v<version>`.
    Data,
    /// Caller-defined procedures under `/services/apexrest`.
    CustomProcedure,
    /// Multipart uploads and raw downloads under the data base path.
    Binary,
    /// The OAuth token endpoint on the login host.
    Token,
}

/// Routing decision for one outbound call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Send straight to the target.
    Direct { url: String },
    /// Send to the proxy and name the target in `SalesforceProxy-Endpoint`.
    Proxied { proxy_url: String, target: String },
}

impl Route {
    /// URL the request is actually sent to.
    pub fn url(&self) -> &str {
        match self {
            Route::Direct { url } => url,
            Route::Proxied { proxy_url, .. } => proxy_url,
        }
    }

    /// The real target, whether or not it is proxied.
    pub fn target(&self) -> &str {
        match self {
            Route::Direct { url } => url,
            Route::Proxied { target, .. } => target,
        }
    }

    /// Value for the forwarding header, if any.
    pub fn forwarded_to(&self) -> Option<&str> {
        match self {
            Route::Direct { .. } => None,
            Route::Proxied { target, .. } => Some(target),
        }
    }

    pub fn is_proxied(&self) -> bool {
        matches!(self, Route::Proxied { .. })
    }
}

/// Immutable, environment-derived behavior shared by the dispatcher and the
/// credential store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentPolicy {
    hosted: bool,
    page_origin: Option<String>,
    page_host: Option<String>,
    proxy_url: Option<String>,
    authorization_header: &'static str,
}

impl EnvironmentPolicy {
    /// Whether the client runs inside a hosted page.
    pub fn is_hosted(&self) -> bool {
        self.hosted
    }

    /// Name of the header carrying `Bearer <token>`.
    pub fn authorization_header(&self) -> &'static str {
        self.authorization_header
    }

    /// Origin of the hosting page (hosted environment only).
    pub fn page_origin(&self) -> Option<&str> {
        self.page_origin.as_deref()
    }

    /// Host name of the hosting page (hosted environment only).
    pub fn page_host(&self) -> Option<&str> {
        self.page_host.as_deref()
    }

    /// Configured or implied forwarding proxy.
    pub fn proxy_url(&self) -> Option<&str> {
        self.proxy_url.as_deref()
    }

    /// Decide whether a call to `target` is sent directly or via the proxy.
    ///
    /// Hosted pages reach everything except custom procedures directly; the
    /// retry of a call goes through here again and gets the same answer.
    pub fn route(&self, kind: SurfaceKind, target: impl Into<String>) -> Route {
        let target = target.into();
        match &self.proxy_url {
            None => Route::Direct { url: target },
            Some(_) if self.hosted && kind != SurfaceKind::CustomProcedure => {
                Route::Direct { url: target }
            }
            Some(proxy) => Route::Proxied {
                proxy_url: proxy.clone(),
                target,
            },
        }
    }

    /// Origin that paths of the given surface are resolved against.
    ///
    /// Hosted pages address data and binary paths on the page origin; custom
    /// procedures and every non-hosted call use the instance origin.
    pub fn origin_for(&self, kind: SurfaceKind, instance_origin: Option<&str>) -> Result<String> {
        let origin = match (self.hosted, kind) {
            (true, SurfaceKind::Data | SurfaceKind::Binary) => self.page_origin.as_deref(),
            _ => instance_origin,
        };

        origin
            .map(|o| o.trim_end_matches('/').to_string())
            .ok_or_else(|| {
                Error::new(ErrorKind::Config(
                    "no instance URL known; set a session token first".to_string(),
                ))
            })
    }
}
