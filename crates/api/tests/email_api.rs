mod common;

use std::sync::atomic::Ordering;

use axum::http::StatusCode;
use common::{
    bearer, build_test_app, fake_mailer, get, post_json, unavailable_mailer, FakeMailServer,
};
use serde_json::json;
use signoff_notify::FailureKind;

#[tokio::test]
async fn status_requires_authentication() {
    let app = build_test_app(fake_mailer(FakeMailServer::healthy()));

    let (status, _) = get(app, "/api/v1/email/status", None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn status_acquires_and_reverifies() {
    let server = FakeMailServer::healthy();
    let app = build_test_app(fake_mailer(server.clone()));

    let (status, json) = get(app, "/api/v1/email/status", Some(&bearer(1))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(json["message"], "Email configuration is working");
    assert_eq!(json["config"], "Primary");
    // One probe to acquire, one to re-verify.
    assert_eq!(server.verifies.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn status_reports_failure_in_body() {
    let server = FakeMailServer::scripted(Some(FailureKind::AuthenticationFailed), None);
    let app = build_test_app(fake_mailer(server));

    let (status, json) = get(app, "/api/v1/email/status", Some(&bearer(1))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], false);
    assert_eq!(json["message"], "Email transporter could not be initialized");
    assert_eq!(
        json["error"],
        "Email service unavailable: no transport could be verified"
    );
    assert!(json.get("config").is_none());
}

#[tokio::test]
async fn test_email_without_transport_is_503() {
    let app = build_test_app(unavailable_mailer());

    let (status, json) = post_json(app, "/api/v1/email/test", Some(&bearer(1)), json!({})).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["code"], "EMAIL_UNAVAILABLE");
}
