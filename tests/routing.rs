//! Forwarding tests: every route reaches the right upstream URL, and
//! rejected requests never leave the gateway.

use serde_json::{json, Value};

mod common;
use common::{client, spawn_gateway, test_config, RecordingBackend};

async fn setup() -> (RecordingBackend, RecordingBackend, common::Gateway) {
    let data_collector = RecordingBackend::start(200, r#"{"source":"data-collector"}"#).await;
    let script_generator = RecordingBackend::start(200, r#"{"source":"script-generator"}"#).await;
    let gateway = spawn_gateway(test_config(data_collector.addr, script_generator.addr)).await;
    (data_collector, script_generator, gateway)
}

fn full_script_request() -> Value {
    json!({
        "content": "The history of tea",
        "script_type": "documentary",
        "language": "en",
        "voice_id": "v-42",
        "style_description": "calm narration"
    })
}

#[tokio::test]
async fn test_get_routes_forward_to_exact_upstream_paths() {
    let (data_collector, script_generator, gateway) = setup().await;
    let client = client();

    let cases = [
        ("/api/collections", "data-collector", "/api/collections"),
        ("/api/collections/c-1", "data-collector", "/api/collections/c-1"),
        ("/api/collections?page=2&size=10", "data-collector", "/api/collections?page=2&size=10"),
        ("/api/collections/", "data-collector", "/api/collections"),
        ("/api/scripts/s-9", "script-generator", "/api/v1/scripts/s-9"),
        ("/api/scripts/s-9/status", "script-generator", "/api/v1/scripts/s-9/status"),
        ("/api/configurations/styles", "data-collector", "/api/configurations/styles"),
        ("/api/configurations/languages", "data-collector", "/api/configurations/languages"),
        ("/api/configurations/voices", "data-collector", "/api/configurations/voices"),
        ("/api/configurations/visual-styles", "data-collector", "/api/configurations/visual-styles"),
    ];

    for (path, expected_source, expected_uri) in cases {
        let res = client.get(gateway.url(path)).send().await.unwrap();
        assert_eq!(res.status(), 200, "GET {path}");
        let body: Value = res.json().await.unwrap();
        assert_eq!(body["source"], expected_source, "GET {path}");

        let backend = if expected_source == "data-collector" {
            &data_collector
        } else {
            &script_generator
        };
        let last = backend.requests().pop().unwrap();
        assert_eq!(last.method, "GET");
        assert_eq!(last.uri, expected_uri, "GET {path}");
    }

    assert_eq!(data_collector.requests().len(), 8);
    assert_eq!(script_generator.requests().len(), 2);
}

#[tokio::test]
async fn test_post_routes_forward_bodies() {
    let (data_collector, script_generator, gateway) = setup().await;
    let client = client();

    let res = client
        .post(gateway.url("/api/collections/wikipedia"))
        .json(&json!({ "url": "https://en.wikipedia.org/wiki/Tea", "language": "en" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);

    let res = client
        .post(gateway.url("/api/collections/script"))
        .json(&json!({ "content": "Once upon a time", "title": "Story" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);

    let res = client
        .post(gateway.url("/api/scripts"))
        .json(&full_script_request())
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);

    let dc = data_collector.requests();
    assert_eq!(dc.len(), 2);
    assert_eq!(dc[0].uri, "/api/collections/wikipedia");
    assert_eq!(dc[0].json()["url"], "https://en.wikipedia.org/wiki/Tea");
    assert_eq!(dc[1].uri, "/api/collections/script");
    assert_eq!(dc[1].json()["title"], "Story");

    let sg = script_generator.requests();
    assert_eq!(sg.len(), 1);
    assert_eq!(sg[0].method, "POST");
    assert_eq!(sg[0].uri, "/api/v1/scripts");
}

#[tokio::test]
async fn test_script_defaults_filled_in() {
    let (_data_collector, script_generator, gateway) = setup().await;
    let client = client();

    client
        .post(gateway.url("/api/scripts"))
        .json(&full_script_request())
        .send()
        .await
        .unwrap();

    let mut explicit = full_script_request();
    explicit["tone"] = json!("playful");
    explicit["duration_seconds"] = json!(60);
    client
        .post(gateway.url("/api/scripts"))
        .json(&explicit)
        .send()
        .await
        .unwrap();

    let sg = script_generator.requests();
    assert_eq!(sg.len(), 2);

    let defaulted = sg[0].json();
    assert_eq!(defaulted["target_audience"], "general");
    assert_eq!(defaulted["duration_seconds"], 300);
    assert_eq!(defaulted["tone"], "informative");
    assert_eq!(defaulted["voice_id"], "v-42");
    assert_eq!(
        sg[0].headers["content-length"].to_str().unwrap(),
        sg[0].body.len().to_string()
    );

    let kept = sg[1].json();
    assert_eq!(kept["tone"], "playful");
    assert_eq!(kept["duration_seconds"], 60);
    assert_eq!(kept["target_audience"], "general");
}

#[tokio::test]
async fn test_forwarding_headers() {
    let (data_collector, _script_generator, gateway) = setup().await;

    client()
        .get(gateway.url("/api/collections"))
        .header("x-request-id", "trace-me")
        .header("authorization", "Bearer token")
        .send()
        .await
        .unwrap();

    let seen = data_collector.requests().pop().unwrap();
    assert_eq!(seen.headers["x-request-id"], "trace-me");
    assert_eq!(seen.headers["authorization"], "Bearer token");
    assert_eq!(seen.headers["x-forwarded-for"], "127.0.0.1");
    assert_eq!(seen.headers["x-forwarded-proto"], "http");
    assert_eq!(
        seen.headers["x-forwarded-host"].to_str().unwrap(),
        gateway.addr.to_string()
    );
}

#[tokio::test]
async fn test_unknown_paths_never_reach_upstreams() {
    let (data_collector, script_generator, gateway) = setup().await;
    let client = client();

    for path in ["/", "/api", "/api/collectionsx", "/api/scripts/s-1/extra/deep", "/api/configurations/fonts"] {
        let res = client.get(gateway.url(path)).send().await.unwrap();
        assert_eq!(res.status(), 404, "GET {path}");
        let body: Value = res.json().await.unwrap();
        assert_eq!(body["error"], "NOT_FOUND", "GET {path}");
        assert!(body["message"].is_string());
    }

    assert!(data_collector.requests().is_empty());
    assert!(script_generator.requests().is_empty());
}

#[tokio::test]
async fn test_invalid_bodies_rejected_locally() {
    let (data_collector, script_generator, gateway) = setup().await;
    let client = client();

    let res = client
        .post(gateway.url("/api/collections/wikipedia"))
        .json(&json!({ "language": "en" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 400);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "VALIDATION_ERROR");
    assert!(body["message"].as_str().unwrap().contains("url"));

    let mut missing_voice = full_script_request();
    missing_voice["voice_id"] = json!("");
    let res = client
        .post(gateway.url("/api/scripts"))
        .json(&missing_voice)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 400);
    let body: Value = res.json().await.unwrap();
    assert!(body["message"].as_str().unwrap().contains("voice_id"));

    let res = client
        .post(gateway.url("/api/collections/script"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 400);

    let res = client
        .post(gateway.url("/api/collections/upload-file"))
        .header("content-type", "application/octet-stream")
        .body("raw bytes")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 400);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "VALIDATION_ERROR");

    assert!(data_collector.requests().is_empty());
    assert!(script_generator.requests().is_empty());
}

#[tokio::test]
async fn test_wrong_method_is_405_with_allow() {
    let (data_collector, _script_generator, gateway) = setup().await;

    let res = client()
        .delete(gateway.url("/api/collections/c-1"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 405);
    assert_eq!(res.headers()["allow"], "GET");
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "VALIDATION_ERROR");
    assert!(data_collector.requests().is_empty());
}

#[tokio::test]
async fn test_empty_identifier_is_not_found() {
    let (_data_collector, script_generator, gateway) = setup().await;

    let res = client()
        .get(gateway.url("/api/scripts//status"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 404);
    assert!(script_generator.requests().is_empty());
}

#[tokio::test]
async fn test_health_does_not_touch_upstreams() {
    let (data_collector, script_generator, gateway) = setup().await;

    let res = client().get(gateway.url("/health")).send().await.unwrap();
    assert_eq!(res.status(), 200);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({ "status": "ok" }));

    assert!(data_collector.requests().is_empty());
    assert!(script_generator.requests().is_empty());
}

#[tokio::test]
async fn test_preflight_for_listed_origin() {
    let data_collector = RecordingBackend::start(200, "[]").await;
    let script_generator = RecordingBackend::start(200, "{}").await;
    let mut config = test_config(data_collector.addr, script_generator.addr);
    config.cors.allowed_origins = vec!["http://studio.example".into()];
    let gateway = spawn_gateway(config).await;
    let client = client();

    let res = client
        .request(reqwest::Method::OPTIONS, gateway.url("/api/collections/wikipedia"))
        .header("origin", "http://studio.example")
        .header("access-control-request-method", "POST")
        .header("access-control-request-headers", "content-type")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(res.headers()["access-control-allow-origin"], "http://studio.example");
    assert_eq!(res.headers()["access-control-allow-credentials"], "true");

    let res = client
        .request(reqwest::Method::OPTIONS, gateway.url("/api/collections/wikipedia"))
        .header("origin", "http://other.example")
        .header("access-control-request-method", "POST")
        .send()
        .await
        .unwrap();
    assert!(res.headers().get("access-control-allow-origin").is_none());

    assert!(data_collector.requests().is_empty());
}

async fn small_upload_gateway() -> (RecordingBackend, common::Gateway) {
    let data_collector = RecordingBackend::start(200, "{}").await;
    let script_generator = RecordingBackend::start(200, "{}").await;
    let mut config = test_config(data_collector.addr, script_generator.addr);
    config.limits.max_upload_bytes = 1024;
    let gateway = spawn_gateway(config).await;
    (data_collector, gateway)
}

#[tokio::test]
async fn test_declared_oversize_upload_is_json_413() {
    let (data_collector, gateway) = small_upload_gateway().await;

    let res = client()
        .post(gateway.url("/api/collections/upload-file"))
        .header("content-type", "multipart/form-data; boundary=XBOUNDARY")
        .body(vec![b'a'; 4096])
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 413);
    assert!(res.headers()["content-type"]
        .to_str()
        .unwrap()
        .starts_with("application/json"));
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "VALIDATION_ERROR");
    assert_eq!(body["message"], "request body exceeds 1024 bytes");
    assert!(data_collector.requests().is_empty());
}

#[tokio::test]
async fn test_streamed_oversize_upload_is_json_413() {
    let (_data_collector, gateway) = small_upload_gateway().await;

    let chunks = (0..4).map(|_| Ok::<_, std::io::Error>(vec![b'a'; 1024]));
    let res = client()
        .post(gateway.url("/api/collections/upload-file"))
        .header("content-type", "multipart/form-data; boundary=XBOUNDARY")
        .body(reqwest::Body::wrap_stream(futures_util::stream::iter(chunks)))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 413);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "VALIDATION_ERROR");
    assert_eq!(body["message"], "request body exceeds 1024 bytes");
}

#[tokio::test]
async fn test_upload_within_limit_is_forwarded() {
    let (data_collector, gateway) = small_upload_gateway().await;

    let res = client()
        .post(gateway.url("/api/collections/upload-file"))
        .header("content-type", "multipart/form-data; boundary=XBOUNDARY")
        .body(vec![b'a'; 512])
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 200);
    assert_eq!(data_collector.requests()[0].body.len(), 512);
}

#[tokio::test]
async fn test_non_get_health_is_json_405() {
    let (_data_collector, _script_generator, gateway) = setup().await;

    let res = client().post(gateway.url("/health")).send().await.unwrap();

    assert_eq!(res.status(), 405);
    assert_eq!(res.headers()["allow"], "GET");
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "VALIDATION_ERROR");
}

