//! Multipart uploads and raw downloads on the binary surface.

use std::sync::atomic::Ordering;
use std::sync::{Arc, Mutex};

use relay_sf_rest::{BlobPart, ForceConfig, ProgressObserver, UploadProgress};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

use super::common::{build_client, header_value, mount_token_endpoint, PROXY_HEADER};

const CONTENT_VERSION_PATH: &str = "/services/data/v62.0/sobjects/ContentVersion/";

fn pdf_bytes(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}

fn boundary_of(content_type: &str) -> String {
    content_type
        .split("boundary=\"")
        .nth(1)
        .and_then(|rest| rest.strip_suffix('"'))
        .expect("content type carries a quoted boundary")
        .to_string()
}

#[tokio::test]
async fn test_each_upload_gets_a_fresh_boundary() {
    let server = MockServer::start().await;
    let content_types: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = content_types.clone();

    Mock::given(method("POST"))
        .and(path(CONTENT_VERSION_PATH))
        .respond_with(move |req: &Request| {
            sink.lock()
                .unwrap()
                .push(header_value(req, "content-type").unwrap_or_default());
            ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "id": "068D00000000pgOIAQ",
                "success": true
            }))
        })
        .expect(2)
        .mount(&server)
        .await;

    let config = ForceConfig::new("3MVG9client").with_session("00Dsession", Some(server.uri()));
    let client = build_client(&config);
    let fields = serde_json::json!({"ContentDocumentId": "069D0000", "PathOnClient": "a.pdf"});

    for _ in 0..2 {
        client
            .create_blob(
                "ContentVersion",
                &fields,
                BlobPart::new("a.pdf", "VersionData", pdf_bytes(512)),
                None,
            )
            .await
            .unwrap();
    }

    let content_types = content_types.lock().unwrap();
    assert_ne!(boundary_of(&content_types[0]), boundary_of(&content_types[1]));
}

#[tokio::test]
async fn test_upload_retry_resends_identical_body() {
    let server = MockServer::start().await;
    let exchanges = mount_token_endpoint(&server, "fresh", &server.uri()).await;
    let bodies: Arc<Mutex<Vec<Vec<u8>>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = bodies.clone();

    Mock::given(method("POST"))
        .and(path(CONTENT_VERSION_PATH))
        .respond_with(move |req: &Request| {
            sink.lock().unwrap().push(req.body.clone());
            if header_value(req, "authorization").as_deref() == Some("Bearer fresh") {
                ResponseTemplate::new(201).set_body_json(serde_json::json!({
                    "id": "068D00000000pgOIAQ",
                    "success": true
                }))
            } else {
                ResponseTemplate::new(401)
            }
        })
        .expect(2)
        .mount(&server)
        .await;

    let seen: Arc<Mutex<Vec<UploadProgress>>> = Arc::new(Mutex::new(Vec::new()));
    let progress_sink = seen.clone();
    let observer = ProgressObserver::new(move |p| progress_sink.lock().unwrap().push(p));

    let config = ForceConfig::new("3MVG9client")
        .with_login_url(server.uri())
        .with_session("stale", Some(server.uri()))
        .with_refresh_token("rt");
    let client = build_client(&config);

    // Large enough to stream in several chunks.
    let content = pdf_bytes(200 * 1024);
    let result = client
        .create_blob(
            "ContentVersion",
            &serde_json::json!({"PathOnClient": "big.pdf"}),
            BlobPart::new("big.pdf", "VersionData", content),
            Some(observer),
        )
        .await
        .unwrap()
        .unwrap();
    assert!(result.success);
    assert_eq!(exchanges.load(Ordering::SeqCst), 1);

    let bodies = bodies.lock().unwrap();
    assert_eq!(bodies.len(), 2);
    assert_eq!(bodies[0], bodies[1]);

    let seen = seen.lock().unwrap();
    let completions: Vec<_> = seen.iter().filter(|p| p.is_complete()).collect();
    assert_eq!(completions.len(), 2);
    assert!(completions.iter().all(|p| p.total == bodies[0].len() as u64));
    assert!(seen.len() > 2);
}

#[tokio::test]
async fn test_download_through_proxy() {
    let server = MockServer::start().await;
    let content = pdf_bytes(4096);

    Mock::given(method("GET"))
        .and(path("/proxy"))
        .and(header(
            PROXY_HEADER,
            "https://na1.salesforce.com/services/data/v62.0/connect/files/069D00000000so2IAA/content",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(content.clone()))
        .expect(1)
        .mount(&server)
        .await;

    let config = ForceConfig::new("3MVG9client")
        .with_proxy_url(format!("{}/proxy", server.uri()))
        .with_session("00Dsession", Some("https://na1.salesforce.com".to_string()));
    let client = build_client(&config);

    let bytes = client
        .download_file("/services/data/v62.0/connect/files/069D00000000so2IAA/content")
        .await
        .unwrap();
    assert_eq!(bytes.len(), content.len());
    assert_eq!(bytes.as_ref(), content.as_slice());
}
