//! Integration tests for anime search [MB-ANI]
//!
//! A small axum app on an ephemeral port stands in for the upstream anime
//! master-data API.

use std::time::Duration;

use anicolle_server::anime_client::AnimeClient;
use anicolle_server::{build_router, AppState};
use axum::{
    body::Body,
    extract::Path,
    http::{header, Request, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::util::ServiceExt; // for `oneshot` method

fn titles(count: usize, cours: u8) -> Value {
    let entries: Vec<Value> = (1..=count)
        .map(|i| {
            json!({
                "id": i,
                "title": format!("Title {}", i),
                "title_short1": format!("T{}", i),
                "cours_id": cours,
            })
        })
        .collect();
    Value::Array(entries)
}

async fn year_handler(Path(year): Path<u16>) -> axum::response::Response {
    match year {
        2020 => Json(titles(25, 0)).into_response(),
        1999 => Json(json!({ "error": "not a list" })).into_response(),
        2001 => (StatusCode::INTERNAL_SERVER_ERROR, "upstream down").into_response(),
        _ => Json(json!([])).into_response(),
    }
}

async fn cours_handler(Path((year, cours)): Path<(u16, u8)>) -> axum::response::Response {
    if year == 2020 && cours == 2 {
        Json(titles(3, 2)).into_response()
    } else {
        Json(json!([])).into_response()
    }
}

/// Start the mock upstream; returns its base URL
async fn spawn_mock_upstream() -> String {
    let app = Router::new()
        .route("/master/:year", get(year_handler))
        .route("/master/:year/:cours", get(cours_handler));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}/master", addr)
}

async fn setup_app() -> (Router, TempDir) {
    let dir = TempDir::new().unwrap();
    let db = anicolle_common::db::init_database(&dir.path().join("anicolle.db"))
        .await
        .unwrap();
    let base_url = spawn_mock_upstream().await;
    let client = AnimeClient::new(&base_url, Duration::from_secs(5)).unwrap();
    (build_router(AppState::new(db, client, 24)), dir)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder().method("GET").uri(uri).body(Body::empty()).unwrap()
}

fn post_request(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/anime/search")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_search_by_year_is_paginated() {
    let (app, _dir) = setup_app().await;

    let (status, body) = send(&app, post_request(json!({ "year": 2020 }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["year"], 2020);
    assert!(body.get("cours").is_none());
    assert_eq!(body["total_results"], 25);
    assert_eq!(body["total_pages"], 3);
    assert_eq!(body["anime_list"].as_array().unwrap().len(), 10);
    assert_eq!(body["anime_list"][0]["title"], "Title 1");

    let (status, body) = send(&app, get_request("/api/anime/search?year=2020&cours=&page=3")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["page"], 3);
    assert_eq!(body["anime_list"].as_array().unwrap().len(), 5);
    assert_eq!(body["anime_list"][0]["title"], "Title 21");
    assert_eq!(body["has_next"], false);
}

#[tokio::test]
async fn test_search_by_year_and_cours() {
    let (app, _dir) = setup_app().await;

    let (status, body) = send(&app, get_request("/api/anime/search?year=2020&cours=2")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["cours"], 2);
    assert_eq!(body["total_results"], 3);
    assert_eq!(body["anime_list"][2]["cours_id"], 2);
}

#[tokio::test]
async fn test_search_empty_result() {
    let (app, _dir) = setup_app().await;

    let (status, body) = send(&app, post_request(json!({ "year": 2030 }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["anime_list"], json!([]));
    assert_eq!(body["page"], 1);
    assert_eq!(body["total_pages"], 1);
}

#[tokio::test]
async fn test_search_requires_year() {
    let (app, _dir) = setup_app().await;

    let (status, body) = send(&app, post_request(json!({ "cours": 1 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]["message"].as_str().unwrap().contains("broadcast year"));

    let (status, _) = send(&app, get_request("/api/anime/search?year=")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, get_request("/api/anime/search?year=2020&cours=7")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_upstream_failures_are_bad_gateway() {
    let (app, _dir) = setup_app().await;

    let (status, body) = send(&app, post_request(json!({ "year": 1999 }))).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"]["code"], "BAD_GATEWAY");

    let (status, _) = send(&app, post_request(json!({ "year": 2001 }))).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_form_style_post_body() {
    let (app, _dir) = setup_app().await;

    let (status, body) = send(&app, post_request(json!({ "year": "2020", "cours": "2", "page": "1" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["cours"], 2);
    assert_eq!(body["total_results"], 3);

    let (status, body) = send(&app, post_request(json!({ "year": "", "cours": "" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]["message"].as_str().unwrap().contains("broadcast year"));

    let (status, body) = send(&app, post_request(json!({ "year": "heisei" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]["message"].as_str().unwrap().contains("broadcast year"));

    let (status, body) = send(&app, get_request("/api/anime/search?year=abc")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]["message"].as_str().unwrap().contains("broadcast year"));
}

#[tokio::test]
async fn test_post_page_past_end_lands_on_last_page() {
    let (app, _dir) = setup_app().await;

    let (status, body) = send(&app, post_request(json!({ "year": 2020, "page": "99999999999999999999" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["page"], 3);
    assert_eq!(body["anime_list"].as_array().unwrap().len(), 5);
}
