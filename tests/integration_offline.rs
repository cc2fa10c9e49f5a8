//! Integration tests for the offline asset proxy.

#![cfg(feature = "serve")]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use tower::util::ServiceExt;

use microgrid_monitor::offline::proxy::{SERVED_FROM_HEADER, router};
use microgrid_monitor::offline::{CachePolicy, CacheStorage, HttpAssetFetcher, OfflineLayer};

async fn origin() -> mockito::ServerGuard {
    let mut server = mockito::Server::new_async().await;
    for (path, body) in [("/", "<html>home</html>"), ("/static/style.css", "body{}")] {
        server
            .mock("GET", path)
            .with_status(200)
            .with_header("content-type", "text/plain")
            .with_body(body)
            .create_async()
            .await;
    }
    server
        .mock("GET", "/reports")
        .with_status(200)
        .with_body("live reports")
        .create_async()
        .await;
    server
}

fn layer(dir: &tempfile::TempDir, origin: &str, version: &str) -> Arc<OfflineLayer> {
    Arc::new(OfflineLayer::new(
        CacheStorage::new(dir.path()),
        version,
        vec!["/".to_string(), "/static/style.css".to_string()],
        CachePolicy::CacheFirst,
        Arc::new(HttpAssetFetcher::new(origin, reqwest::Client::new())),
    ))
}

async fn get(layer: &Arc<OfflineLayer>, uri: &str) -> (StatusCode, Option<String>, String) {
    let response = router(Arc::clone(layer))
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let served_from = response
        .headers()
        .get(SERVED_FROM_HEADER)
        .map(|v| v.to_str().unwrap().to_string());
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, served_from, String::from_utf8(bytes.to_vec()).unwrap())
}

#[tokio::test]
async fn installed_assets_served_from_cache() {
    let server = origin().await;
    let dir = tempfile::tempdir().unwrap();
    let layer = layer(&dir, &server.url(), "microgrid-pwa-v1");
    assert_eq!(layer.install().await.unwrap(), 2);
    drop(server);

    let (status, from, body) = get(&layer, "/static/style.css").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(from.as_deref(), Some("cache"));
    assert_eq!(body, "body{}");
}

#[tokio::test]
async fn uncached_path_goes_to_network() {
    let server = origin().await;
    let dir = tempfile::tempdir().unwrap();
    let layer = layer(&dir, &server.url(), "microgrid-pwa-v1");
    layer.install().await.unwrap();

    let (status, from, body) = get(&layer, "/reports").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(from.as_deref(), Some("network"));
    assert_eq!(body, "live reports");
}

#[tokio::test]
async fn offline_miss_is_bad_gateway() {
    let dir = tempfile::tempdir().unwrap();
    let layer = layer(&dir, "http://127.0.0.1:9", "microgrid-pwa-v1");

    let (status, from, _) = get(&layer, "/about").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(from.is_none());
}

#[tokio::test]
async fn non_get_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let layer = layer(&dir, "http://127.0.0.1:9", "microgrid-pwa-v1");
    let response = router(layer)
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn version_bump_then_activate_drops_old_cache() {
    let server = origin().await;
    let dir = tempfile::tempdir().unwrap();

    let v1 = layer(&dir, &server.url(), "microgrid-pwa-v1");
    v1.install().await.unwrap();

    let v2 = layer(&dir, &server.url(), "microgrid-pwa-v2");
    v2.install().await.unwrap();
    assert_eq!(v2.activate().await.unwrap(), vec!["microgrid-pwa-v1"]);
    assert_eq!(
        v2.storage().keys().await.unwrap(),
        vec!["microgrid-pwa-v2"]
    );

    let (_, from, _) = get(&v2, "/").await;
    assert_eq!(from.as_deref(), Some("cache"));
}

#[tokio::test]
async fn query_string_reaches_the_origin() {
    let mut server = mockito::Server::new_async().await;
    let simulate = server
        .mock("GET", "/simulate")
        .match_query(mockito::Matcher::AllOf(vec![
            mockito::Matcher::UrlEncoded("weather".into(), "cloudy".into()),
            mockito::Matcher::UrlEncoded("homes".into(), "20".into()),
            mockito::Matcher::UrlEncoded("batteryCap".into(), "10".into()),
        ]))
        .with_status(200)
        .with_body("cloudy-result")
        .create_async()
        .await;
    let dir = tempfile::tempdir().unwrap();
    let layer = layer(&dir, &server.url(), "microgrid-pwa-v1");

    let (status, from, body) = get(&layer, "/simulate?weather=cloudy&homes=20&batteryCap=10").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(from.as_deref(), Some("network"));
    assert_eq!(body, "cloudy-result");
    simulate.assert_async().await;
}

#[tokio::test]
async fn cached_root_does_not_answer_a_query() {
    let server = origin().await;
    let dir = tempfile::tempdir().unwrap();
    let layer = layer(&dir, &server.url(), "microgrid-pwa-v1");
    layer.install().await.unwrap();
    drop(server);

    let (_, from, _) = get(&layer, "/").await;
    assert_eq!(from.as_deref(), Some("cache"));
    let (status, from, _) = get(&layer, "/?x=1").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(from.is_none());
}
