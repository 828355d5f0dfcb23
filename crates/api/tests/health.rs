mod common;

use axum::http::StatusCode;
use common::{build_test_app, fake_mailer, get, FakeMailServer};

#[tokio::test]
async fn health_reports_degraded_without_database() {
    let app = build_test_app(fake_mailer(FakeMailServer::healthy()));

    let (status, json) = get(app, "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["db_healthy"], false);
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn health_does_not_verify_mail() {
    let server = FakeMailServer::healthy();
    let app = build_test_app(fake_mailer(server.clone()));

    let (_, json) = get(app, "/health", None).await;

    assert!(json["email_transport"].is_null());
    assert_eq!(server.verifies.load(std::sync::atomic::Ordering::SeqCst), 0);
}

#[tokio::test]
async fn responses_carry_a_request_id() {
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    let app = build_test_app(fake_mailer(FakeMailServer::healthy()));
    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn unknown_route_returns_json_404() {
    let app = build_test_app(fake_mailer(FakeMailServer::healthy()));

    let (status, json) = get(app, "/api/v1/nope", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
    assert_eq!(json["error"], "Route not found");
}
