mod common;

use actix_web::test;
use serde_json::json;

use common::TestApp;

#[actix_rt::test]
async fn test_bookings_require_auth() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::get()
        .uri("/api/account/507f1f77bcf86cd799439011/bookings")
        .to_request();

    let resp = test::try_call_service(&app, req).await;
    let err = resp.expect_err("request without a token should be rejected");
    assert_eq!(err.as_response_error().status_code(), 401);
}

#[actix_rt::test]
async fn test_bookings_reject_garbage_token() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::get()
        .uri("/api/account/507f1f77bcf86cd799439011/bookings")
        .insert_header(("Authorization", "Bearer not.a.jwt"))
        .to_request();

    let resp = test::try_call_service(&app, req).await;
    let err = resp.expect_err("request with a bad token should be rejected");
    assert_eq!(err.as_response_error().status_code(), 401);
}

#[actix_rt::test]
async fn test_session_requires_auth() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::get().uri("/api/auth/session").to_request();

    let resp = test::try_call_service(&app, req).await;
    let err = resp.expect_err("session without a token should be rejected");
    assert_eq!(err.as_response_error().status_code(), 401);
}

#[actix_rt::test]
async fn test_payment_intent_requires_auth() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/payment/payment-intent")
        .set_json(&json!({
            "user_id": "u1",
            "amount": 1000,
            "customer_id": "cus_123",
            "payment_method_id": "pm_123"
        }))
        .to_request();

    let resp = test::try_call_service(&app, req).await;
    let err = resp.expect_err("payment without a token should be rejected");
    assert_eq!(err.as_response_error().status_code(), 401);
}

#[actix_rt::test]
async fn test_admin_listings_require_auth() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/admin/listings")
        .set_json(&json!({}))
        .to_request();

    let resp = test::try_call_service(&app, req).await;
    let err = resp.expect_err("admin route without a token should be rejected");
    assert_eq!(err.as_response_error().status_code(), 401);
}
