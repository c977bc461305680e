mod common;

use actix_web::test;
use serde_json::json;

use common::TestApp;

#[actix_rt::test]
async fn test_get_listing_invalid_id() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::get()
        .uri("/api/listings/not-an-object-id")
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);

    let body = test::read_body(resp).await;
    assert_eq!(body, "Invalid listing ID format");
}

#[actix_rt::test]
async fn test_check_availability_invalid_id() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::get()
        .uri("/api/listings/nope/availability?start=2024-09-01&end=2024-09-05")
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
}

#[actix_rt::test]
async fn test_check_availability_missing_dates() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    // Valid listing ID but no start/end query parameters.
    let req = test::TestRequest::get()
        .uri("/api/listings/507f1f77bcf86cd799439011/availability")
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
}

#[actix_rt::test]
async fn test_quote_cart_malformed_listing_id() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/cart/quote")
        .set_json(&json!({
            "lines": [{
                "listing_id": "not-an-object-id",
                "guests": 2,
                "addons": []
            }]
        }))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
}

#[actix_rt::test]
async fn test_stripe_webhook_missing_signature() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/stripe/webhook")
        .set_json(&json!({"type": "payment_intent.succeeded"}))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);

    let body = test::read_body(resp).await;
    assert_eq!(body, "Missing stripe-signature header");
}
