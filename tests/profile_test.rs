mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::TestApp;

#[tokio::test]
async fn registration_returns_a_usable_token() {
    let app = TestApp::spawn().await;
    let token = app.register("Stitch & Co", "usable@example.com").await;

    let (status, profile) = app
        .request("GET", "/api/v1/profile", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["shop_name"], "Stitch & Co");
    assert_eq!(profile["email"], "usable@example.com");
}

#[tokio::test]
async fn duplicate_email_is_a_conflict() {
    let app = TestApp::spawn().await;
    app.register("Stitch & Co", "dup@example.com").await;

    let (status, _) = app
        .request_with_client(
            "POST",
            "/auth/register",
            None,
            Some(json!({
                "shop_name": "Another Shop",
                "owner_name": "Someone Else",
                "email": "DUP@example.com",
                "phone_number": "9876543210",
            })),
            Some("10.2.2.2"),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn invalid_registration_payloads_are_rejected() {
    let app = TestApp::spawn().await;

    let (status, _) = app
        .request_with_client(
            "POST",
            "/auth/register",
            None,
            Some(json!({
                "shop_name": "",
                "owner_name": "Owner",
                "email": "not-an-email",
                "phone_number": "123",
            })),
            Some("10.3.3.3"),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn repeated_registrations_hit_the_cooldown() {
    let app = TestApp::spawn().await;

    for i in 0..3 {
        let (status, _) = app
            .request_with_client(
                "POST",
                "/auth/register",
                None,
                Some(json!({
                    "shop_name": format!("Shop {i}"),
                    "owner_name": "Owner",
                    "email": format!("cooldown{i}@example.com"),
                    "phone_number": "9876543210",
                })),
                Some("10.4.4.4"),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, _) = app
        .request_with_client(
            "POST",
            "/auth/register",
            None,
            Some(json!({
                "shop_name": "One Too Many",
                "owner_name": "Owner",
                "email": "cooldown4@example.com",
                "phone_number": "9876543210",
            })),
            Some("10.4.4.4"),
        )
        .await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn profile_update_is_partial_and_email_immutable() {
    let app = TestApp::spawn().await;
    let token = app.register("Old Name", "update@example.com").await;

    let (status, updated) = app
        .request(
            "PUT",
            "/api/v1/profile",
            Some(&token),
            Some(json!({ "shop_name": "New Name" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["shop_name"], "New Name");
    assert_eq!(updated["owner_name"], "Test Owner");
    assert_eq!(updated["email"], "update@example.com");

    let (status, _) = app
        .request("GET", "/api/v1/profile", None, None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn schema_endpoint_lists_categories_and_fields() {
    let app = TestApp::spawn().await;
    let token = app.register("Stitch & Co", "schema@example.com").await;

    let (status, body) = app
        .request("GET", "/api/v1/schema?gender=women", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 8);

    let (status, body) = app
        .request(
            "GET",
            "/api/v1/schema?gender=men&category=shirt",
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let entry = &body[0];
    assert_eq!(entry["category"], "shirt");
    assert!(entry["fields"]
        .as_array()
        .unwrap()
        .iter()
        .any(|f| f == "Collar"));

    let (status, _) = app
        .request(
            "GET",
            "/api/v1/schema?gender=men&category=lehenga",
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
