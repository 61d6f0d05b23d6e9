use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Once};

use relay_sf_rest::{ClientConfig, ForceClient, ForceConfig};
use tracing_subscriber::EnvFilter;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

pub const TOKEN_PATH: &str = "/services/oauth2/token";
pub const PROXY_HEADER: &str = "SalesforceProxy-Endpoint";

static TRACING: Once = Once::new();

/// Install a test-writer subscriber once, filtered by `RUST_LOG`.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

pub fn http_config() -> ClientConfig {
    ClientConfig::builder().with_tracing(false).build()
}

pub fn build_client(config: &ForceConfig) -> ForceClient {
    init_tracing();
    ForceClient::with_http_config(config, http_config()).expect("client should build")
}

/// Mount a direct token endpoint that answers every refresh with
/// `access_token` for `instance_url` and counts the exchanges.
pub async fn mount_token_endpoint(
    server: &MockServer,
    access_token: &str,
    instance_url: &str,
) -> Arc<AtomicU32> {
    let calls = Arc::new(AtomicU32::new(0));
    let counter = calls.clone();
    let body = serde_json::json!({
        "access_token": access_token,
        "instance_url": instance_url,
        "token_type": "Bearer"
    });

    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .and(body_string_contains("grant_type=refresh_token"))
        .respond_with(move |_: &Request| {
            counter.fetch_add(1, Ordering::SeqCst);
            ResponseTemplate::new(200).set_body_json(body.clone())
        })
        .mount(server)
        .await;

    calls
}

/// Mount a token exchange reached through the forwarding proxy at `/proxy`.
pub async fn mount_proxied_token_endpoint(
    server: &MockServer,
    login_url: &str,
    access_token: &str,
    instance_url: &str,
) -> Arc<AtomicU32> {
    let calls = Arc::new(AtomicU32::new(0));
    let counter = calls.clone();
    let body = serde_json::json!({
        "access_token": access_token,
        "instance_url": instance_url
    });

    Mock::given(method("POST"))
        .and(path("/proxy"))
        .and(header(PROXY_HEADER, format!("{}{}", login_url, TOKEN_PATH).as_str()))
        .respond_with(move |_: &Request| {
            counter.fetch_add(1, Ordering::SeqCst);
            ResponseTemplate::new(200).set_body_json(body.clone())
        })
        .mount(server)
        .await;

    calls
}

pub fn header_value(request: &Request, name: &str) -> Option<String> {
    request
        .headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}
