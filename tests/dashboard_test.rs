mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{days_from_now, TestApp};

#[tokio::test]
async fn dashboard_aggregates_stats_and_reminders() {
    let app = TestApp::spawn().await;
    let token = app.register("Stitch & Co", "dash@example.com").await;

    let tomorrow = app
        .create_shirt_order(&token, "9876543210", &days_from_now(1))
        .await;
    app.create_shirt_order(&token, "9123456780", &days_from_now(2))
        .await;
    app.create_shirt_order(&token, "9111111111", &days_from_now(10))
        .await;

    let (status, body) = app
        .request("GET", "/api/v1/dashboard", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(body["stats"]["total"], 3);
    assert_eq!(body["stats"]["active"], 3);
    assert_eq!(body["stats"]["completed"], 0);
    // Due tomorrow and due in two days both fall in the due-soon window.
    assert_eq!(body["stats"]["due_soon"], 2);
    assert_eq!(body["stats"]["overdue"], 0);

    let due_tomorrow = body["due_tomorrow"].as_array().unwrap();
    assert_eq!(due_tomorrow.len(), 1);
    assert_eq!(due_tomorrow[0]["id"], tomorrow["id"]);

    assert_eq!(body["recent_orders"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn completing_an_order_clears_its_reminder() {
    let app = TestApp::spawn().await;
    let token = app.register("Stitch & Co", "clear@example.com").await;

    let order = app
        .create_shirt_order(&token, "9876543210", &days_from_now(1))
        .await;
    let id = order["id"].as_str().unwrap();

    let (_, body) = app
        .request("GET", "/api/v1/dashboard", Some(&token), None)
        .await;
    assert_eq!(body["due_tomorrow"].as_array().unwrap().len(), 1);

    app.request(
        "PUT",
        &format!("/api/v1/orders/{id}/status"),
        Some(&token),
        Some(json!({ "status": "completed" })),
    )
    .await;

    let (_, body) = app
        .request("GET", "/api/v1/dashboard", Some(&token), None)
        .await;
    assert!(body["due_tomorrow"].as_array().unwrap().is_empty());
    assert_eq!(body["stats"]["completed"], 1);
    assert_eq!(body["stats"]["active"], 0);
    assert_eq!(body["stats"]["due_soon"], 0);
}

#[tokio::test]
async fn dashboard_only_sees_its_own_tailor() {
    let app = TestApp::spawn().await;
    let token_a = app.register("Shop A", "dash-a@example.com").await;
    let token_b = app.register("Shop B", "dash-b@example.com").await;

    app.create_shirt_order(&token_a, "9876543210", &days_from_now(5))
        .await;

    let (_, body) = app
        .request("GET", "/api/v1/dashboard", Some(&token_b), None)
        .await;
    assert_eq!(body["stats"]["total"], 0);
    assert!(body["recent_orders"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn recent_orders_are_capped_at_five() {
    let app = TestApp::spawn().await;
    let token = app.register("Stitch & Co", "recent@example.com").await;

    for i in 0..6 {
        let phone = format!("90000000{i:02}");
        app.create_shirt_order(&token, &phone, &days_from_now(5))
            .await;
    }

    let (_, body) = app
        .request("GET", "/api/v1/dashboard", Some(&token), None)
        .await;
    assert_eq!(body["stats"]["total"], 6);
    assert_eq!(body["recent_orders"].as_array().unwrap().len(), 5);
}
