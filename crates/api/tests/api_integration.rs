//! API integration tests.
//!
//! These drive the full router over a mock database.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, Response, StatusCode, header},
};
use maplit::btreemap;
use museum_api::{AppState, router as api_router};
use museum_common::config::{
    CatalogConfig, Config, DatabaseConfig, I18nConfig, QrConfig, ServerConfig, StorageConfig,
};
use museum_common::{AppResult, NoOpStorage};
use museum_core::QrRenderer;
use museum_db::test_utils::fixtures;
use sea_orm::{DatabaseBackend, MockDatabase, Value};
use serde_json::Value as Json;
use tower::ServiceExt;

struct StubQr;

impl QrRenderer for StubQr {
    fn payload(&self, museum_slug: &str, exhibit_slug: &str) -> String {
        format!("https://museum.example/{museum_slug}/{exhibit_slug}")
    }

    fn render(&self, _museum_slug: &str, _exhibit_slug: &str) -> AppResult<Vec<u8>> {
        Ok(b"png".to_vec())
    }
}

/// Create a test configuration.
fn create_test_config() -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8000,
            url: "https://museum.example".to_string(),
        },
        database: DatabaseConfig {
            url: "postgres://localhost/test".to_string(),
            max_connections: 10,
            min_connections: 1,
        },
        storage: StorageConfig {
            base_path: PathBuf::from("/tmp/museum-media"),
            base_url: "/media".to_string(),
        },
        qr: QrConfig {
            base_url: "https://museum.example".to_string(),
            font_path: PathBuf::from("/nonexistent.ttf"),
            qr_size: 700,
            padding: 10,
            caption_height: 70,
            font_size: 40.0,
        },
        i18n: I18nConfig::default(),
        catalog: CatalogConfig::default(),
    }
}

/// Create the test router over a prepared mock database.
fn create_test_router(db: MockDatabase) -> Router {
    let state = AppState::new(
        Arc::new(db.into_connection()),
        Arc::new(NoOpStorage::new("/media".to_string())),
        Arc::new(StubQr),
        &create_test_config(),
    );
    api_router().with_state(state)
}

fn empty_db() -> MockDatabase {
    MockDatabase::new(DatabaseBackend::Postgres)
}

async fn json_body(response: Response<Body>) -> Json {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

/// Rows served to the exhibit page of `ISC-REN2-1.0001`.
fn detail_db() -> MockDatabase {
    let mut exhibit = fixtures::exhibit("e1", "ISC-REN2-1.0001");
    exhibit.title_en = "Statue".to_string();
    exhibit.title_uz = "Haykal".to_string();

    empty_db()
        .append_query_results([[exhibit]])
        .append_query_results([[fixtures::block("b1", "m1", "REN2")]])
        .append_query_results([[fixtures::museum("m1", "ISC")]])
        .append_query_results([[btreemap! {
            "num_items" => Value::BigInt(Some(36)),
        }]])
        .append_query_results([Vec::<museum_db::entities::exhibit_photo::Model>::new()])
}

#[tokio::test]
async fn test_ci360_manifest() {
    let app = create_test_router(
        empty_db()
            .append_query_results([[fixtures::exhibit("e1", "ISC-REN2-1.0001")]])
            .append_query_results([[btreemap! {
                "num_items" => Value::BigInt(Some(36)),
            }]]),
    );

    let response = app
        .oneshot(get("/exhibits/api/ISC-REN2-1.0001/ci360.json"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["slug"], "ISC-REN2-1.0001");
    assert_eq!(body["frames"], 36);
    assert_eq!(body["folder"], "/media/exhibits/ISC-REN2-1.0001/frames/");
    assert_eq!(body["filename"], "frame-{index}.webp");
}

#[tokio::test]
async fn test_ci360_manifest_unknown_exhibit() {
    let app = create_test_router(
        empty_db().append_query_results([Vec::<museum_db::entities::exhibit::Model>::new()]),
    );

    let response = app
        .oneshot(get("/exhibits/api/NOPE/ci360.json"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "EXHIBIT_NOT_FOUND");
}

#[tokio::test]
async fn test_exhibit_detail_uses_lang_parameter() {
    let app = create_test_router(detail_db());

    let response = app
        .oneshot(get("/ISC/ISC-REN2-1.0001?lang=en"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["data"]["title"], "Statue");
    assert_eq!(body["data"]["lang"], "en");
    assert_eq!(body["data"]["frames_count"], 36);
}

#[tokio::test]
async fn test_exhibit_detail_uses_accept_language() {
    let app = create_test_router(detail_db());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/ISC/ISC-REN2-1.0001")
                .header(header::ACCEPT_LANGUAGE, "uz-UZ,uz;q=0.9,ru;q=0.8")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["data"]["title"], "Haykal");
}

#[tokio::test]
async fn test_exhibit_detail_cookie_beats_accept_language() {
    let app = create_test_router(detail_db());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/ISC/ISC-REN2-1.0001")
                .header(header::COOKIE, "museum_language=en")
                .header(header::ACCEPT_LANGUAGE, "uz")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let body = json_body(response).await;
    assert_eq!(body["data"]["title"], "Statue");
}

#[tokio::test]
async fn test_exhibit_detail_wrong_museum_is_not_found() {
    let app = create_test_router(
        empty_db()
            .append_query_results([[fixtures::exhibit("e1", "ISC-REN2-1.0001")]])
            .append_query_results([[fixtures::block("b1", "m1", "REN2")]])
            .append_query_results([[fixtures::museum("m1", "ISC")]]),
    );

    let response = app
        .oneshot(get("/OTHER/ISC-REN2-1.0001"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_set_language_redirects_to_next() {
    let app = create_test_router(empty_db());

    let response = app.oneshot(get("/i18n/uz?next=/ISC")).await.unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/ISC");
    let cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
    assert!(cookie.contains("museum_language=uz"));
    assert!(cookie.contains("SameSite=Lax"));
    assert!(cookie.contains("Max-Age=31536000"));
}

#[tokio::test]
async fn test_set_language_unknown_code_falls_back_to_default() {
    let app = create_test_router(empty_db());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/i18n/fr")
                .header(header::HOST, "museum.example")
                .header(header::REFERER, "https://museum.example/ISC")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(
        response.headers()[header::LOCATION],
        "https://museum.example/ISC"
    );
    let cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
    assert!(cookie.contains("museum_language=ru"));
}

#[tokio::test]
async fn test_set_language_ignores_foreign_next() {
    let app = create_test_router(empty_db());

    let response = app
        .oneshot(get("/i18n/en?next=https://evil.example/"))
        .await
        .unwrap();

    assert_eq!(response.headers()[header::LOCATION], "/");
}

#[tokio::test]
async fn test_sections_json_without_block_is_empty() {
    let app = create_test_router(empty_db());

    let response = app.oneshot(get("/sections-json")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["data"], Json::Array(Vec::new()));
}

#[tokio::test]
async fn test_sections_json_lists_block_sections() {
    let app = create_test_router(empty_db().append_query_results([[
        fixtures::section("s1", "m1", "b1", 1),
        fixtures::section("s2", "m1", "b1", 2),
    ]]));

    let response = app.oneshot(get("/sections-json?block=b1")).await.unwrap();

    let body = json_body(response).await;
    assert_eq!(body["data"][0]["title"], "1 - Экспозиция 1");
    assert_eq!(body["data"][1]["code_num"], 2);
}

#[tokio::test]
async fn test_admin_create_exhibit_rejects_few_frames() {
    let app = create_test_router(empty_db());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/admin/exhibits")
                .method("POST")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    r#"{"block_id":"b1","section_id":"s1","title_ru":"Статуя","frames_required":4}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(body["error"]["field"], "frames_required");
}

#[tokio::test]
async fn test_admin_get_museum() {
    let app = create_test_router(
        empty_db().append_query_results([[fixtures::museum("m1", "ISC")]]),
    );

    let response = app.oneshot(get("/api/admin/museums/m1")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["data"]["slug"], "ISC");
}

#[tokio::test]
async fn test_admin_regenerate_qr_requires_selection() {
    let app = create_test_router(empty_db());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/admin/exhibits/regenerate-qr")
                .method("POST")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"ids":[]}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_admin_endpoint_returns_404() {
    let app = create_test_router(empty_db());

    let response = app
        .oneshot(get("/api/admin/nonexistent/x/y"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
