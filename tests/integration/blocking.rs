//! Synchronous mode.

use std::sync::atomic::Ordering;

use relay_sf_rest::{BlockingForceClient, ForceConfig, QueryResult};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::common::{build_client, mount_proxied_token_endpoint, PROXY_HEADER};

/// The blocking client needs a thread outside any runtime, so the mock
/// proxy runs on a runtime of its own.
fn mock_runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()
        .unwrap()
}

#[test]
fn test_blocking_query_through_proxy_with_refresh() {
    let rt = mock_runtime();
    let server = rt.block_on(MockServer::start());
    let login_url = "https://login.salesforce.com";

    let exchanges = rt.block_on(async {
        Mock::given(method("GET"))
            .and(path("/proxy"))
            .and(header("X-Authorization", "Bearer stale"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/proxy"))
            .and(header(
                PROXY_HEADER,
                "https://na1.salesforce.com/services/data/v62.0/query?q=SELECT%20Id%20FROM%20Lead",
            ))
            .and(header("X-Authorization", "Bearer fresh"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "totalSize": 1,
                "done": true,
                "records": [{"Id": "00QD000000FzqUnMAJ"}]
            })))
            .expect(1)
            .mount(&server)
            .await;
        mount_proxied_token_endpoint(&server, login_url, "fresh", "https://na1.salesforce.com")
            .await
    });

    let config = ForceConfig::new("3MVG9client")
        .with_proxy_url(format!("{}/proxy", server.uri()))
        .with_session("stale", Some("https://na1.salesforce.com".to_string()))
        .with_refresh_token("rt");
    let client = BlockingForceClient::from_client(build_client(&config)).unwrap();

    let page: QueryResult<serde_json::Value> = client.query("SELECT Id FROM Lead").unwrap();
    assert_eq!(page.records[0]["Id"], "00QD000000FzqUnMAJ");
    assert_eq!(exchanges.load(Ordering::SeqCst), 1);
    assert_eq!(client.session().session_token(), Some("fresh"));
}
