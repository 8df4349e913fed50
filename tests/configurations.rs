//! Configuration lookups: relayed from the Data Collector, or served from a
//! static catalog directory.

use std::fs;
use std::path::PathBuf;

use api_gateway::catalog::CatalogError;
use api_gateway::http::HttpServer;

mod common;
use common::{client, spawn_gateway, test_config, RecordingBackend};

const STYLES: &str = r#"[{"id":"cinematic","name":"Cinematic"},{"id":"minimal","name":"Minimal"}]"#;

fn catalog_dir(files: &[(&str, &str)]) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("gateway-catalog-{}", uuid::Uuid::new_v4()));
    fs::create_dir_all(&dir).unwrap();
    for (name, content) in files {
        fs::write(dir.join(name), content).unwrap();
    }
    dir
}

#[tokio::test]
async fn test_upstream_payload_relayed_verbatim() {
    let data_collector = RecordingBackend::start(200, STYLES).await;
    let script_generator = RecordingBackend::start(200, "{}").await;
    let gateway = spawn_gateway(test_config(data_collector.addr, script_generator.addr)).await;

    let res = client()
        .get(gateway.url("/api/configurations/styles"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 200);
    assert_eq!(res.headers()["content-type"], "application/json");
    assert_eq!(res.text().await.unwrap(), STYLES);
    assert_eq!(data_collector.requests()[0].uri, "/api/configurations/styles");
}

#[tokio::test]
async fn test_static_catalog_served_without_upstream() {
    let pretty_voices = "[\n  {\"id\": \"v-1\", \"name\": \"Ada\"}\n]\n";
    let dir = catalog_dir(&[
        ("styles.json", STYLES),
        ("voices.json", pretty_voices),
        ("visual_styles.json", r#"["flat","noir"]"#),
    ]);

    let data_collector = RecordingBackend::start(200, r#"["from-upstream"]"#).await;
    let script_generator = RecordingBackend::start(200, "{}").await;
    let mut config = test_config(data_collector.addr, script_generator.addr);
    config.catalog.static_dir = Some(dir.clone());
    let gateway = spawn_gateway(config).await;
    let client = client();

    let cases = [
        ("/api/configurations/styles", STYLES),
        ("/api/configurations/voices", pretty_voices),
        ("/api/configurations/visual-styles", r#"["flat","noir"]"#),
        ("/api/configurations/languages", "[]"),
        ("/api/configurations/target-audiences", "[]"),
        ("/api/configurations/durations", "[]"),
    ];
    for (path, expected) in cases {
        let res = client.get(gateway.url(path)).send().await.unwrap();
        assert_eq!(res.status(), 200, "GET {path}");
        assert_eq!(res.headers()["content-type"], "application/json");
        assert_eq!(res.text().await.unwrap(), expected, "GET {path}");
    }

    assert!(data_collector.requests().is_empty());
    let _ = fs::remove_dir_all(dir);
}

#[tokio::test]
async fn test_non_array_catalog_fails_startup() {
    let dir = catalog_dir(&[("languages.json", r#"{"en":"English"}"#)]);
    let mut config = test_config(common::unused_addr().await, common::unused_addr().await);
    config.catalog.static_dir = Some(dir.clone());

    let result = HttpServer::new(config);
    assert!(matches!(result, Err(CatalogError::NotAnArray(_))));
    let _ = fs::remove_dir_all(dir);
}

#[tokio::test]
async fn test_missing_catalog_dir_fails_startup() {
    let mut config = test_config(common::unused_addr().await, common::unused_addr().await);
    config.catalog.static_dir = Some(std::env::temp_dir().join("gateway-catalog-does-not-exist"));

    assert!(matches!(
        HttpServer::new(config),
        Err(CatalogError::NotADirectory(_))
    ));
}
