//! Session expiry, refresh and retry through the public client.

use std::sync::atomic::Ordering;

use relay_sf_rest::{ErrorKind, ForceConfig, QueryResult};
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::common::{build_client, mount_token_endpoint, TOKEN_PATH};

const ACCOUNT_PATH: &str = "/services/data/v62.0/sobjects/Account/001D000000IqhSLIAZ";

fn config(server: &MockServer) -> ForceConfig {
    ForceConfig::new("3MVG9client")
        .with_login_url(server.uri())
        .with_session("stale", Some(server.uri()))
        .with_refresh_token("rt1")
}

#[tokio::test]
async fn test_expired_session_is_refreshed_and_retried_once() {
    let server = MockServer::start().await;
    let exchanges = mount_token_endpoint(&server, "fresh", &server.uri()).await;

    Mock::given(method("GET"))
        .and(path(ACCOUNT_PATH))
        .and(header("Authorization", "Bearer stale"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!([{
            "errorCode": "INVALID_SESSION_ID",
            "message": "Session expired or invalid"
        }])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(ACCOUNT_PATH))
        .and(header("Authorization", "Bearer fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "Id": "001D000000IqhSLIAZ",
            "Name": "Acme"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = build_client(&config(&server));
    let record: serde_json::Value = client
        .retrieve("Account", "001D000000IqhSLIAZ", None)
        .await
        .expect("retried call should succeed");

    assert_eq!(record["Name"], "Acme");
    assert_eq!(exchanges.load(Ordering::SeqCst), 1);
    assert_eq!(client.session().await.session_token(), Some("fresh"));
}

#[tokio::test]
async fn test_rejected_retry_is_surfaced_without_second_refresh() {
    let server = MockServer::start().await;
    let exchanges = mount_token_endpoint(&server, "also-rejected", &server.uri()).await;

    Mock::given(method("GET"))
        .and(path(ACCOUNT_PATH))
        .respond_with(ResponseTemplate::new(401))
        .expect(2)
        .mount(&server)
        .await;

    let client = build_client(&config(&server));
    let err = client
        .retrieve::<serde_json::Value>("Account", "001D000000IqhSLIAZ", None)
        .await
        .unwrap_err();

    assert!(matches!(err.kind, ErrorKind::Authentication(_)));
    assert_eq!(err.response().unwrap().status_text, "Unauthorized");
    assert_eq!(exchanges.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_missing_refresh_token_surfaces_401_immediately() {
    let server = MockServer::start().await;
    let exchanges = mount_token_endpoint(&server, "fresh", &server.uri()).await;

    Mock::given(method("GET"))
        .and(path(ACCOUNT_PATH))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let config = ForceConfig::new("3MVG9client")
        .with_login_url(server.uri())
        .with_session("stale", Some(server.uri()));
    let client = build_client(&config);
    let err = client
        .retrieve::<serde_json::Value>("Account", "001D000000IqhSLIAZ", None)
        .await
        .unwrap_err();

    assert!(err.is_auth_error());
    assert_eq!(exchanges.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_refresh_failure_is_terminal() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "error": "invalid_grant",
            "error_description": "expired access/refresh token"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(ACCOUNT_PATH))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let client = build_client(&config(&server));
    let err = client
        .retrieve::<serde_json::Value>("Account", "001D000000IqhSLIAZ", None)
        .await
        .unwrap_err();

    assert!(err.is_refresh_error());
    assert_eq!(err.status(), Some(400));
    assert_eq!(client.session().await.session_token(), Some("stale"));
}

#[tokio::test]
async fn test_application_errors_are_not_retried() {
    let server = MockServer::start().await;
    let exchanges = mount_token_endpoint(&server, "fresh", &server.uri()).await;

    Mock::given(method("POST"))
        .and(path("/services/data/v62.0/sobjects/Account/"))
        .respond_with(
            ResponseTemplate::new(400)
                .insert_header("Sforce-Limit-Info", "api-usage=25/15000")
                .set_body_json(serde_json::json!([{
                    "errorCode": "REQUIRED_FIELD_MISSING",
                    "message": "Required fields are missing: [Name]",
                    "fields": ["Name"]
                }])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = build_client(&config(&server));
    let err = client
        .create("Account", &serde_json::json!({}))
        .await
        .unwrap_err();

    let response = err.response().unwrap();
    assert_eq!(response.status, 400);
    assert_eq!(response.header("sforce-limit-info"), Some("api-usage=25/15000"));
    assert_eq!(response.api_errors()[0].fields, vec!["Name"]);
    assert_eq!(exchanges.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_rotated_refresh_token_is_used_next_time() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .and(body_string_contains("refresh_token=rt1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "first",
            "refresh_token": "rt2",
            "instance_url": server.uri()
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .and(body_string_contains("refresh_token=rt2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "second",
            "instance_url": server.uri()
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = build_client(&config(&server));
    assert_eq!(client.refresh().await.unwrap().session_token(), Some("first"));
    assert_eq!(client.refresh().await.unwrap().session_token(), Some("second"));
}

#[tokio::test]
async fn test_refresh_keeps_configured_api_version() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server, "fresh", &server.uri()).await;

    Mock::given(method("GET"))
        .and(path("/services/data/v58.0/query"))
        .and(header("Authorization", "Bearer stale"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/services/data/v58.0/query"))
        .and(query_param("q", "SELECT Id FROM Contact"))
        .and(header("Authorization", "Bearer fresh"))
        .and(header("X-User-Agent", "salesforce-toolkit-rest-rust/v58.0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "totalSize": 0,
            "done": true,
            "records": []
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = build_client(&config(&server).with_api_version("v58.0"));
    let page: QueryResult<serde_json::Value> =
        client.query("SELECT Id FROM Contact").await.unwrap();
    assert!(page.done);
    assert_eq!(client.session().await.api_version(), "58.0");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_expiry_shares_one_exchange() {
    let server = MockServer::start().await;
    let exchanges = mount_token_endpoint(&server, "fresh", &server.uri()).await;

    Mock::given(method("GET"))
        .and(path(ACCOUNT_PATH))
        .and(header("Authorization", "Bearer stale"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(ACCOUNT_PATH))
        .and(header("Authorization", "Bearer fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"Name": "Acme"})))
        .expect(8)
        .mount(&server)
        .await;

    let client = build_client(&config(&server));
    let tasks: Vec<_> = (0..8)
        .map(|_| {
            let client = client.clone();
            tokio::spawn(async move {
                client
                    .retrieve::<serde_json::Value>("Account", "001D000000IqhSLIAZ", None)
                    .await
            })
        })
        .collect();

    for task in tasks {
        let record = task.await.unwrap().unwrap();
        assert_eq!(record["Name"], "Acme");
    }
    assert_eq!(exchanges.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_repeated_gets_are_independent() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/services/data/v62.0/limits"))
        .and(header("Authorization", "Bearer stale"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "DailyApiRequests": {"Max": 15000, "Remaining": 14990}
        })))
        .expect(2)
        .mount(&server)
        .await;

    let client = build_client(&config(&server));
    let request = relay_sf_rest::PendingRequest::new(relay_sf_rest::Surface::Data, "/limits");

    let first = client.dispatch(request.clone()).await.unwrap();
    let second = client.dispatch(request).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(client.session().await.generation(), 1);
}
