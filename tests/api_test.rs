//! HTTP API tests.
//!
//! Drives the router directly with `tower::ServiceExt::oneshot` against a
//! temporary storage directory.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use framestore::config::Config;
use framestore::server::{create_router, AppContext};
use http_body_util::BodyExt;
use std::collections::HashSet;
use tempfile::{tempdir, TempDir};
use tower::ServiceExt;

const PNG_URI: &str = "data:image/png;base64,iVBORw0KGgo=";

/// Create a router over a fresh storage directory
fn test_app() -> (TempDir, Router) {
    test_app_with(Config::default())
}

fn test_app_with(mut config: Config) -> (TempDir, Router) {
    let temp = tempdir().unwrap();
    config.storage.dir = temp.path().join("uploads");
    let ctx = AppContext::new(config).unwrap();
    (temp, create_router(ctx))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, json)
}

fn upload_request(body: serde_json::Value) -> Request<Body> {
    Request::post("/upload")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get_request(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

async fn upload(app: &Router, image: &str) -> String {
    let (status, json) = send(app, upload_request(serde_json::json!({ "image": image }))).await;
    assert_eq!(status, StatusCode::OK, "{json}");
    assert_eq!(json["success"], true);
    json["filename"].as_str().unwrap().to_string()
}

// ---------------------------------------------------------------------------
// Upload
// ---------------------------------------------------------------------------

#[tokio::test]
async fn upload_returns_generated_filename() {
    let (temp, app) = test_app();

    let filename = upload(&app, PNG_URI).await;

    assert!(filename.starts_with("frame-"));
    assert!(filename.ends_with("-0.png"));
    let millis = filename
        .trim_start_matches("frame-")
        .trim_end_matches("-0.png");
    assert!(millis.parse::<i64>().unwrap() > 0);

    let on_disk = std::fs::read(temp.path().join("uploads").join(&filename)).unwrap();
    assert_eq!(on_disk, STANDARD.decode("iVBORw0KGgo=").unwrap());
}

#[tokio::test]
async fn upload_counter_increments_per_upload() {
    let (_temp, app) = test_app();

    let first = upload(&app, PNG_URI).await;
    let second = upload(&app, "data:image/jpeg;base64,/9j/4AAQ").await;

    assert!(first.ends_with("-0.png"));
    assert!(second.ends_with("-1.jpeg"));
}

#[tokio::test]
async fn upload_without_image_field() {
    let (_temp, app) = test_app();

    let (status, json) = send(&app, upload_request(serde_json::json!({}))).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["success"], false);
    assert_eq!(json["error"], "missing image");
}

#[tokio::test]
async fn upload_with_empty_image_is_missing() {
    let (_temp, app) = test_app();

    let (status, json) = send(&app, upload_request(serde_json::json!({ "image": "" }))).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "missing image");
}

#[tokio::test]
async fn upload_with_invalid_data_uri() {
    let (temp, app) = test_app();

    let (status, json) = send(
        &app,
        upload_request(serde_json::json!({ "image": "not-an-image" })),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["success"], false);
    assert_eq!(json["error"], "invalid image data");

    let stored = std::fs::read_dir(temp.path().join("uploads")).unwrap().count();
    assert_eq!(stored, 0);
}

#[tokio::test]
async fn upload_with_non_json_body() {
    let (_temp, app) = test_app();

    let request = Request::post("/upload")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, json) = send(&app, request).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["success"], false);
    assert!(json["error"].as_str().unwrap().starts_with("invalid image data"));
}

#[tokio::test]
async fn upload_without_json_content_type_is_missing_image() {
    let (temp, app) = test_app();

    let request = Request::post("/upload")
        .body(Body::from(serde_json::json!({}).to_string()))
        .unwrap();
    let (status, json) = send(&app, request).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        json,
        serde_json::json!({ "success": false, "error": "missing image" })
    );

    let request = Request::post("/upload")
        .header(header::CONTENT_TYPE, "text/plain")
        .body(Body::from(serde_json::json!({ "image": PNG_URI }).to_string()))
        .unwrap();
    let (status, json) = send(&app, request).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "missing image");

    let stored = std::fs::read_dir(temp.path().join("uploads")).unwrap().count();
    assert_eq!(stored, 0);
}

#[tokio::test]
async fn upload_with_malformed_base64_is_stored_anyway() {
    let (temp, app) = test_app();

    let filename = upload(&app, "data:image/png;base64,@@not base64@@").await;

    assert!(temp.path().join("uploads").join(&filename).exists());
}

#[tokio::test]
async fn upload_over_body_limit() {
    let mut config = Config::default();
    config.server.body_limit_bytes = 1024;
    let (_temp, app) = test_app_with(config);

    let image = format!("data:image/png;base64,{}", STANDARD.encode(vec![7u8; 4096]));
    let (status, json) = send(&app, upload_request(serde_json::json!({ "image": image }))).await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(json["success"], false);
}

#[tokio::test]
async fn concurrent_uploads_get_distinct_filenames() {
    let (_temp, app) = test_app();

    let uploads = (0..50).map(|_| upload(&app, PNG_URI));
    let names = futures::future::join_all(uploads).await;

    let unique: HashSet<_> = names.iter().collect();
    assert_eq!(unique.len(), 50);

    let (_, json) = send(&app, get_request("/images")).await;
    assert_eq!(json["images"].as_array().unwrap().len(), 50);
}

// ---------------------------------------------------------------------------
// Listing
// ---------------------------------------------------------------------------

#[tokio::test]
async fn list_empty_store() {
    let (_temp, app) = test_app();

    let (status, json) = send(&app, get_request("/images")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, serde_json::json!({ "success": true, "images": [] }));
}

#[tokio::test]
async fn list_includes_uploads_and_skips_other_files() {
    let (temp, app) = test_app();
    let uploads = temp.path().join("uploads");
    std::fs::write(uploads.join("manual.jpg"), b"jpeg").unwrap();
    std::fs::write(uploads.join("notes.txt"), b"text").unwrap();
    std::fs::write(uploads.join("shout.PNG"), b"png").unwrap();

    let png = upload(&app, PNG_URI).await;
    let gif = upload(&app, "data:image/gif;base64,R0lGODlh").await;

    let (status, json) = send(&app, get_request("/images")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);

    let mut images: Vec<String> = json["images"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap().to_string())
        .collect();
    images.sort();

    let mut expected = vec![png, "manual.jpg".to_string()];
    expected.sort();
    assert_eq!(images, expected);
    assert!(!images.contains(&gif));
}

#[tokio::test]
async fn list_fails_when_storage_directory_is_gone() {
    let (temp, app) = test_app();
    std::fs::remove_dir_all(temp.path().join("uploads")).unwrap();

    let (status, json) = send(&app, get_request("/images")).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["success"], false);
    assert!(!json["error"].as_str().unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// Fetch
// ---------------------------------------------------------------------------

#[tokio::test]
async fn upload_list_fetch_round_trip() {
    let (_temp, app) = test_app();

    let filename = upload(&app, PNG_URI).await;

    let (_, json) = send(&app, get_request("/images")).await;
    assert!(json["images"]
        .as_array()
        .unwrap()
        .iter()
        .any(|v| v == filename.as_str()));

    let (status, json) = send(&app, get_request(&format!("/image/{filename}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json,
        serde_json::json!({
            "success": true,
            "filename": filename,
            "base64": PNG_URI,
        })
    );
}

#[tokio::test]
async fn fetch_round_trips_arbitrary_bytes() {
    let (_temp, app) = test_app();
    let original: Vec<u8> = (0..=255u8).cycle().take(3000).collect();
    let uri = format!("data:image/jpeg;base64,{}", STANDARD.encode(&original));

    let filename = upload(&app, &uri).await;
    let (_, json) = send(&app, get_request(&format!("/image/{filename}"))).await;

    let returned = json["base64"].as_str().unwrap();
    let payload = returned
        .strip_prefix("data:image/jpeg;base64,")
        .expect("data URI prefix");
    assert_eq!(STANDARD.decode(payload).unwrap(), original);
}

#[tokio::test]
async fn fetch_missing_file_is_404() {
    let (_temp, app) = test_app();

    let (status, json) = send(&app, get_request("/image/frame-0-0.png")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        json,
        serde_json::json!({ "success": false, "error": "File not found" })
    );
}

#[tokio::test]
async fn fetch_cannot_escape_storage_directory() {
    let (temp, app) = test_app();
    std::fs::write(temp.path().join("secret.png"), b"secret").unwrap();

    let (status, json) = send(&app, get_request("/image/..%2Fsecret.png")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "File not found");
}

#[tokio::test]
async fn fetch_file_placed_manually() {
    let (temp, app) = test_app();
    std::fs::write(temp.path().join("uploads").join("cam.jpg"), b"abc").unwrap();

    let (status, json) = send(&app, get_request("/image/cam.jpg")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["filename"], "cam.jpg");
    assert_eq!(json["base64"], "data:image/jpg;base64,YWJj");
}

// ---------------------------------------------------------------------------
// Misc
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_check_returns_ok() {
    let (_temp, app) = test_app();

    let response = app.clone().oneshot(get_request("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], b"ok");
}

#[tokio::test]
async fn cors_allows_any_origin() {
    let (_temp, app) = test_app();

    let request = Request::get("/images")
        .header(header::ORIGIN, "http://camera.local:3000")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        "*"
    );
}

#[tokio::test]
async fn storage_directory_created_on_startup() {
    let temp = tempdir().unwrap();
    let mut config = Config::default();
    config.storage.dir = temp.path().join("nested").join("frames");

    let _ctx = AppContext::new(config).unwrap();

    assert!(temp.path().join("nested").join("frames").is_dir());
}
