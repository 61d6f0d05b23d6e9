//! Header naming and proxy routing per execution environment.

use std::sync::atomic::Ordering;

use relay_sf_rest::{ForceConfig, RequestMethod};
use wiremock::matchers::{header, header_exists, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

use super::common::{
    build_client, header_value, mount_proxied_token_endpoint, mount_token_endpoint, PROXY_HEADER,
};

const LOGIN_URL: &str = "https://login.salesforce.com";

#[tokio::test]
async fn test_external_context_relays_everything_through_proxy() {
    let server = MockServer::start().await;
    let proxy_url = format!("{}/proxy", server.uri());
    let exchanges =
        mount_proxied_token_endpoint(&server, LOGIN_URL, "fresh", "https://na2.salesforce.com")
            .await;

    Mock::given(method("GET"))
        .and(path("/proxy"))
        .and(header(
            PROXY_HEADER,
            "https://na1.salesforce.com/services/data/v62.0/sobjects/",
        ))
        .and(header("X-Authorization", "Bearer stale"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/proxy"))
        .and(header(
            PROXY_HEADER,
            "https://na2.salesforce.com/services/data/v62.0/sobjects/",
        ))
        .and(header("X-Authorization", "Bearer fresh"))
        .and(header("X-User-Agent", "salesforce-toolkit-rest-rust/v62.0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "encoding": "UTF-8",
            "maxBatchSize": 200,
            "sobjects": []
        })))
        .expect(1)
        .mount(&server)
        .await;

    let config = ForceConfig::new("3MVG9client")
        .with_proxy_url(&proxy_url)
        .with_session("stale", Some("https://na1.salesforce.com".to_string()))
        .with_refresh_token("rt");
    let client = build_client(&config);

    let global = client.describe_global().await.unwrap();
    assert_eq!(global.max_batch_size, 200);
    assert_eq!(exchanges.load(Ordering::SeqCst), 1);
    assert_eq!(
        client.session().await.instance_origin(),
        Some("https://na2.salesforce.com")
    );

    for request in server.received_requests().await.unwrap() {
        assert!(request.headers.get("authorization").is_none());
    }
}

#[tokio::test]
async fn test_external_apex_call_is_proxied() {
    let server = MockServer::start().await;
    let proxy_url = format!("{}/proxy", server.uri());

    Mock::given(method("PATCH"))
        .and(path("/proxy"))
        .and(header(
            PROXY_HEADER,
            "https://na1.salesforce.com/services/apexrest/Widgets/7",
        ))
        .and(header("X-Authorization", "Bearer 00Dsession"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;

    let config = ForceConfig::new("3MVG9client")
        .with_proxy_url(&proxy_url)
        .with_session("00Dsession", Some("https://na1.salesforce.com".to_string()));
    let client = build_client(&config);

    let body = client
        .apex_rest(
            "/Widgets/7",
            RequestMethod::Patch,
            Some(&serde_json::json!({"color": "red"})),
            &[],
        )
        .await
        .unwrap();
    assert_eq!(body.as_json().unwrap()["ok"], true);
}

#[tokio::test]
async fn test_hosted_page_calls_data_directly_and_apex_via_page_proxy() {
    let server = MockServer::start().await;
    let page_url = format!("{}/apex/AccountPage", server.uri());

    Mock::given(method("GET"))
        .and(path("/services/data/v62.0/sobjects/Account/describe/"))
        .and(header("Authorization", "Bearer 00Dhosted"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "name": "Account",
            "label": "Account",
            "custom": false,
            "fields": []
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/services/proxy"))
        .and(header(
            PROXY_HEADER,
            "https://na7.salesforce.com/services/apexrest/Widgets",
        ))
        .and(header("Authorization", "Bearer 00Dhosted"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let config = ForceConfig::new("3MVG9client").with_page_url(&page_url);
    let client = build_client(&config);
    client
        .set_session_token("00Dhosted", None, Some("https://na7.salesforce.com"))
        .await
        .unwrap();

    let describe = client.describe("Account").await.unwrap();
    assert_eq!(describe.name, "Account");

    client
        .apex_rest("/Widgets", RequestMethod::Get, None, &[])
        .await
        .unwrap();

    for request in server.received_requests().await.unwrap() {
        assert!(request.headers.get("x-authorization").is_none());
    }
}

#[tokio::test]
async fn test_hosted_refresh_goes_straight_to_login_host() {
    let server = MockServer::start().await;
    let page_url = format!("{}/apex/AccountPage", server.uri());
    let exchanges = mount_token_endpoint(&server, "fresh", "https://na7.salesforce.com").await;

    Mock::given(method("GET"))
        .and(path("/services/data/v62.0/"))
        .and(header("Authorization", "Bearer stale"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/services/data/v62.0/"))
        .and(header("Authorization", "Bearer fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "sobjects": "/services/data/v62.0/sobjects"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let config = ForceConfig::new("3MVG9client")
        .with_page_url(&page_url)
        .with_login_url(server.uri())
        .with_session("stale", Some("https://na7.salesforce.com".to_string()))
        .with_refresh_token("rt");
    let client = build_client(&config);

    let resources = client.resources().await.unwrap();
    assert!(resources.contains_key("sobjects"));
    assert_eq!(exchanges.load(Ordering::SeqCst), 1);

    let requests = server.received_requests().await.unwrap();
    assert!(requests
        .iter()
        .all(|r: &Request| header_value(r, PROXY_HEADER).is_none()));
}

#[tokio::test]
async fn test_packaged_app_calls_instance_directly() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/services/data/"))
        .and(header("Authorization", "Bearer 00Dapp"))
        .and(header_exists("X-User-Agent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"label": "Winter '25", "url": "/services/data/v62.0", "version": "62.0"}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let config = ForceConfig::new("3MVG9client").with_page_url("file:///app/index.html");
    let client = build_client(&config);
    assert!(!client.store().policy().is_hosted());
    client
        .set_session_token("00Dapp", None, Some(&server.uri()))
        .await
        .unwrap();

    let versions = client.versions().await.unwrap();
    assert_eq!(versions.len(), 1);

    let requests = server.received_requests().await.unwrap();
    assert!(header_value(&requests[0], PROXY_HEADER).is_none());
}
