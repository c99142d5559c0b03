use std::sync::Arc;

use acp_nullables::{NullClock, NullStore};
use acp_rpc::{build_router, AppState};
use acp_store::VerificationLogStore;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

const TOKEN: &str = "s3cret";
const BOUNDARY: &str = "acp-test-boundary";

fn app_with(store: Arc<NullStore>) -> Router {
    let clock = Arc::new(NullClock::new(1_717_200_000));
    let state = AppState::with_clock(store, clock).admin_token(Some(TOKEN.into()));
    build_router(state, true)
}

fn seeded() -> Arc<NullStore> {
    let store = NullStore::new();
    store.seed_brand(
        "Hennessy",
        &["^HN[0-9]{6,8}$", "^[0-9]{13}$"],
        &["^00000", "^12345", "^FAKE"],
    );
    store.seed_brand("Dior", &["^DR[0-9]{6}$"], &[]);
    Arc::new(store)
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn admin(method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {TOKEN}"));
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

fn multipart(images: usize, fields: &[(&str, &str)]) -> Request<Body> {
    let mut body = String::new();
    for i in 0..images {
        body.push_str(&format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"images\"; filename=\"shot{i}.jpg\"\r\nContent-Type: image/jpeg\r\n\r\nJPEGDATA{i}\r\n"
        ));
    }
    for (name, value) in fields {
        body.push_str(&format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
        ));
    }
    body.push_str(&format!("--{BOUNDARY}--\r\n"));
    Request::post("/api/verify/image")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn health_reports_ok() {
    let (status, body) = send(
        app_with(seeded()),
        Request::get("/api/health").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn verify_code_genuine() {
    let store = seeded();
    let (status, body) = send(
        app_with(store.clone()),
        Request::post("/api/verify/code")
            .header(header::CONTENT_TYPE, "application/json")
            .header("x-forwarded-for", "203.0.113.5, 10.0.0.1")
            .header("x-user-email", "buyer@example.com")
            .body(Body::from(
                json!({
                    "brand": "Hennessy",
                    "batchNumber": "HN123456",
                    "serialNumber": "SN000001",
                    "barcode": "00000000001"
                })
                .to_string(),
            ))
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["result"], "verified");
    assert_eq!(body["score"], 90);
    assert_eq!(body["matchedPattern"], true);
    assert_eq!(body["message"], "Product appears to be authentic");

    let attempt = store.last_attempt().unwrap();
    assert_eq!(attempt.origin, "203.0.113.5");
    assert_eq!(attempt.submitter.as_deref(), Some("buyer@example.com"));
}

#[tokio::test]
async fn verify_code_missing_field_is_400_and_unlogged() {
    let store = seeded();
    let (status, body) = send(
        app_with(store.clone()),
        post_json(
            "/api/verify/code",
            json!({ "brand": "Hennessy", "batchNumber": "HN123456", "barcode": "1" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("required"));
    assert_eq!(store.attempt_count(), 0);
}

#[tokio::test]
async fn verify_code_store_down_is_503() {
    let store = seeded();
    store.set_fail_reads(true);
    let (status, _) = send(
        app_with(store),
        post_json(
            "/api/verify/code",
            json!({
                "brand": "Hennessy",
                "batchNumber": "HN123456",
                "serialNumber": "SN000001",
                "barcode": "00000000001"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn verify_image_with_codes() {
    let (status, body) = send(
        app_with(seeded()),
        multipart(
            3,
            &[
                ("brand", "Dior"),
                ("batchNumber", "DR123456"),
                ("serialNumber", "SN000001"),
                ("barcode", "3348901234567"),
            ],
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"], "verified");
    assert_eq!(body["score"], 100);
    assert_eq!(body["imageCount"], 3);
    assert_eq!(body["codeVerification"], "verified");
    assert_eq!(body["brand"], "Dior");
}

#[tokio::test]
async fn verify_image_alone_is_pending() {
    let (status, body) = send(app_with(seeded()), multipart(1, &[("brand", "")])).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"], "pending");
    assert_eq!(body["score"], 45);
    assert_eq!(body["codeVerification"], Value::Null);
    assert!(body.get("brand").is_none());
}

#[tokio::test]
async fn verify_image_without_images_is_400() {
    let (status, _) = send(app_with(seeded()), multipart(0, &[("brand", "Dior")])).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn brands_sorted_and_degrade_to_empty() {
    let store = seeded();
    let (_, body) = send(
        app_with(store.clone()),
        Request::get("/api/brands").body(Body::empty()).unwrap(),
    )
    .await;
    let names: Vec<_> = body["brands"]
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, ["Dior", "Hennessy"]);

    store.set_fail_reads(true);
    let (status, body) = send(
        app_with(store),
        Request::get("/api/brands").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["brands"], json!([]));
}

#[tokio::test]
async fn history_pages_with_cursor() {
    let store = seeded();
    for batch in ["HN123456", "FAKE0001", "ZZZZ"] {
        let (status, _) = send(
            app_with(store.clone()),
            post_json(
                "/api/verify/code",
                json!({
                    "brand": "Hennessy",
                    "batchNumber": batch,
                    "serialNumber": "SN000001",
                    "barcode": "4444444444"
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (_, body) = send(
        app_with(store.clone()),
        admin("GET", "/api/admin/history?count=2", None),
    )
    .await;
    let attempts = body["attempts"].as_array().unwrap();
    assert_eq!(attempts.len(), 2);
    assert_eq!(attempts[0]["result"], "pending");
    assert_eq!(attempts[1]["result"], "fake");
    let cursor = body["cursor"].as_str().unwrap().to_string();

    let (_, body) = send(
        app_with(store.clone()),
        admin("GET", &format!("/api/admin/history?count=2&cursor={cursor}"), None),
    )
    .await;
    let attempts = body["attempts"].as_array().unwrap();
    assert_eq!(attempts.len(), 1);
    assert_eq!(attempts[0]["result"], "verified");
    assert!(body.get("cursor").is_none());
    assert_eq!(store.attempt_stats().unwrap().total, 3);
}

#[tokio::test]
async fn history_is_not_served_anonymously() {
    let store = seeded();
    send(
        app_with(store.clone()),
        Request::post("/api/verify/code")
            .header(header::CONTENT_TYPE, "application/json")
            .header("x-forwarded-for", "198.51.100.7")
            .header("x-user-email", "alice@example.com")
            .body(Body::from(
                json!({
                    "brand": "Hennessy",
                    "batchNumber": "HN123456",
                    "serialNumber": "SN000001",
                    "barcode": "00000000001"
                })
                .to_string(),
            ))
            .unwrap(),
    )
    .await;

    let (status, body) = send(
        app_with(store.clone()),
        Request::get("/api/admin/history").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(!body.to_string().contains("alice@example.com"));

    let (status, _) = send(
        app_with(store.clone()),
        Request::get("/api/history").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(app_with(store), admin("GET", "/api/admin/history", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["attempts"][0]["origin"], "198.51.100.7");
    assert_eq!(body["attempts"][0]["submitter"], "alice@example.com");
}

#[tokio::test]
async fn admin_requires_token() {
    let (status, _) = send(
        app_with(seeded()),
        Request::get("/api/admin/stats").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        app_with(seeded()),
        Request::get("/api/admin/stats")
            .header(header::AUTHORIZATION, "Bearer wrong")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn admin_disabled_without_configured_token() {
    let state = AppState::new(seeded());
    let (status, _) = send(build_router(state, false), admin("GET", "/api/admin/brands", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn admin_brand_lifecycle() {
    let store = seeded();
    let (status, body) = send(
        app_with(store.clone()),
        admin(
            "POST",
            "/api/admin/brands",
            Some(json!({ "name": "Martell", "description": "Cognac house", "tags": ["cognac"] })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let id = body["brand"]["id"].as_u64().unwrap();

    let (status, _) = send(
        app_with(store.clone()),
        admin(
            "POST",
            "/api/admin/brands",
            Some(json!({ "name": "Martell", "description": "again" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(
        app_with(store.clone()),
        admin(
            "POST",
            "/api/admin/fake-patterns",
            Some(json!({ "brand_id": id, "pattern": "^MT000", "risk_level": "high" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        app_with(store.clone()),
        admin("DELETE", &format!("/api/admin/brands/{id}"), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["removedPatterns"], 1);

    let (status, _) = send(
        app_with(store),
        admin("DELETE", &format!("/api/admin/brands/{id}"), None),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn admin_pattern_for_unknown_brand_is_404() {
    let (status, _) = send(
        app_with(seeded()),
        admin(
            "POST",
            "/api/admin/code-patterns",
            Some(json!({ "brand_id": 999, "pattern": "^XX" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn admin_code_patterns_carry_brand_name() {
    let (status, body) = send(
        app_with(seeded()),
        admin("GET", "/api/admin/code-patterns", None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let patterns = body["patterns"].as_array().unwrap();
    assert_eq!(patterns.len(), 3);
    assert_eq!(patterns[0]["brandName"], "Hennessy");
    assert_eq!(patterns[2]["brandName"], "Dior");
}

#[tokio::test]
async fn admin_stats_counts() {
    let store = seeded();
    send(
        app_with(store.clone()),
        post_json(
            "/api/verify/code",
            json!({
                "brand": "Hennessy",
                "batchNumber": "00000123",
                "serialNumber": "SN000001",
                "barcode": "4444444444"
            }),
        ),
    )
    .await;
    let (status, body) = send(app_with(store), admin("GET", "/api/admin/stats", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalVerifications"], 1);
    assert_eq!(body["brandCount"], 2);
    assert_eq!(body["systemAlerts"], 1);
    assert_eq!(body["pendingVerifications"], 0);
    assert!(body["requestCounters"].is_object());
}
