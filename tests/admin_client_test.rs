use axum::extract::{Multipart, Query};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use resultgate::config::AdminConfig;
use resultgate::domain::auth::AdminSession;
use resultgate::domain::ports::{AdminApi, DynAdminApi};
use resultgate::error::GateError;
use resultgate::infrastructure::http_admin::HttpAdminClient;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Arc;

const PASSWORD: &str = "correct horse";
const TOKEN: &str = "admin-token-1";

fn authorized(headers: &HeaderMap) -> bool {
    let expected = format!("Bearer {TOKEN}");
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        == Some(expected.as_str())
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "success": false, "message": "Invalid token" })),
    )
        .into_response()
}

async fn login(Json(body): Json<Value>) -> Json<Value> {
    if body["password"] == PASSWORD {
        Json(json!({ "success": true, "token": TOKEN, "message": "Login successful" }))
    } else {
        Json(json!({ "success": false, "message": "Invalid password" }))
    }
}

async fn stats(headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    Json(json!({ "success": true, "data": { "totalSales": 1200, "availablePins": 340 } }))
        .into_response()
}

async fn pins(headers: HeaderMap, Query(params): Query<HashMap<String, String>>) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    let page = params.get("page").cloned().unwrap_or_default();
    Json(json!({
        "success": true,
        "data": [{ "serial": format!("WA2024{page:0>9}"), "status": "available" }],
        "pagination": { "total": 41 }
    }))
    .into_response()
}

async fn import_pins(headers: HeaderMap, mut multipart: Multipart) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    while let Some(field) = multipart.next_field().await.unwrap() {
        if field.name() != Some("file") {
            continue;
        }
        let name = field.file_name().unwrap_or_default().to_string();
        let text = field.text().await.unwrap();
        let rows = text.lines().skip(1).filter(|l| !l.trim().is_empty()).count();
        if rows == 0 {
            return Json(json!({ "success": false, "message": "File is empty" })).into_response();
        }
        let message = format!("Imported {rows} pins from {name}");
        return Json(json!({ "success": true, "message": message })).into_response();
    }
    Json(json!({ "success": false, "message": "No file uploaded" })).into_response()
}

async fn spawn_server() -> DynAdminApi {
    let app = Router::new()
        .route("/api/admin/login", post(login))
        .route("/api/admin/stats", get(stats))
        .route("/api/admin/pins", get(pins))
        .route("/api/admin/import-pins", post(import_pins));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let config = AdminConfig {
        base_url: format!("http://{addr}/api"),
        request_timeout_secs: 5,
    };
    Arc::new(HttpAdminClient::new(&config).unwrap())
}

#[tokio::test]
async fn test_login_and_authenticated_calls() {
    let admin = spawn_server().await;
    let session = admin.login(PASSWORD).await.unwrap();
    assert_eq!(session.token(), TOKEN);

    let stats = admin.stats(&session).await.unwrap();
    assert_eq!(stats["availablePins"], 340);

    let page = admin.pins(&session, 3).await.unwrap();
    assert_eq!(page.page, 3);
    assert_eq!(page.total, 41);
    assert_eq!(page.pins[0]["serial"], "WA2024000000003");

    session.logout();
}

#[tokio::test]
async fn test_wrong_password_is_rejected() {
    let admin = spawn_server().await;
    let err = admin.login("guess").await.unwrap_err();
    assert!(matches!(err, GateError::Rejected(ref m) if m == "Invalid password"));
}

#[tokio::test]
async fn test_bad_token_maps_to_unauthorized() {
    let admin = spawn_server().await;
    let session = AdminSession::new("expired");
    assert!(matches!(admin.stats(&session).await, Err(GateError::Unauthorized)));
    assert!(matches!(admin.pins(&session, 1).await, Err(GateError::Unauthorized)));
}

#[tokio::test]
async fn test_import_uploads_multipart_file() {
    let admin = spawn_server().await;
    let session = admin.login(PASSWORD).await.unwrap();

    let csv = b"pin,serial\nABCD1234,WA2024000000001\nEFGH5678,WA2024000000002\n".to_vec();
    let summary = admin.import_pins(&session, "batch.csv", csv).await.unwrap();
    assert_eq!(summary.message, "Imported 2 pins from batch.csv");

    let err = admin
        .import_pins(&session, "empty.csv", b"pin,serial\n".to_vec())
        .await
        .unwrap_err();
    assert!(matches!(err, GateError::Rejected(ref m) if m == "File is empty"));
}

#[tokio::test]
async fn test_unreachable_server_is_an_http_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let admin = HttpAdminClient::new(&AdminConfig {
        base_url: format!("http://{addr}/api"),
        request_timeout_secs: 2,
    })
    .unwrap();
    assert!(matches!(admin.login(PASSWORD).await, Err(GateError::HttpError(_))));
}
