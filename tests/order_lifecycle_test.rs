mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{days_from_now, TestApp};

#[tokio::test]
async fn order_creation_assigns_code_token_and_schema_snapshot() {
    let app = TestApp::spawn().await;
    let token = app.register("Stitch & Co", "stitch@example.com").await;

    let order = app
        .create_shirt_order(&token, "9876543210", &days_from_now(5))
        .await;

    let code = order["order_id"].as_str().unwrap();
    assert!(code.starts_with("TB"), "unexpected order code {code}");
    assert_eq!(code.len(), 12);
    assert_eq!(order["token_number"], 1);
    assert_eq!(order["status"], "pattern_cutting");
    assert_eq!(order["is_completed"], false);
    assert_eq!(order["customer"]["name"], "Asha");

    // Snapshot keeps every registry field; unmeasured ones are empty.
    let measurements = order["measurements"].as_object().unwrap();
    assert_eq!(measurements.len(), 7);
    assert_eq!(measurements["Chest"], "40");
    assert_eq!(measurements["Collar"], "");

    // Progress strip covers the whole pipeline with one current stage.
    let progress = order["progress"].as_array().unwrap();
    assert_eq!(progress.len(), 5);
    assert_eq!(progress[0]["state"], "current");
    assert!(progress[1..].iter().all(|p| p["state"] == "pending"));
}

#[tokio::test]
async fn status_walks_the_pipeline_and_derives_completion() {
    let app = TestApp::spawn().await;
    let token = app.register("Stitch & Co", "walk@example.com").await;
    let order = app
        .create_shirt_order(&token, "9876543210", &days_from_now(5))
        .await;
    let id = order["id"].as_str().unwrap();

    for stage in ["assembly", "sewing_seams", "finishing"] {
        let (status, body) = app
            .request(
                "PUT",
                &format!("/api/v1/orders/{id}/status"),
                Some(&token),
                Some(json!({ "status": stage })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], stage);
        assert_eq!(body["is_completed"], false);
    }

    let (status, body) = app
        .request(
            "PUT",
            &format!("/api/v1/orders/{id}/status"),
            Some(&token),
            Some(json!({ "status": "completed" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_completed"], true);

    // Regression reopens the order.
    let (status, body) = app
        .request(
            "PUT",
            &format!("/api/v1/orders/{id}/status"),
            Some(&token),
            Some(json!({ "status": "finishing" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_completed"], false);

    // Stages outside the pipeline are rejected and leave the order alone.
    let (status, _) = app
        .request(
            "PUT",
            &format!("/api/v1/orders/{id}/status"),
            Some(&token),
            Some(json!({ "status": "ironing" })),
        )
        .await;
    assert!(status.is_client_error(), "expected rejection, got {status}");

    let (_, body) = app
        .request("GET", &format!("/api/v1/orders/{id}"), Some(&token), None)
        .await;
    assert_eq!(body["status"], "finishing");
}

#[tokio::test]
async fn customers_dedup_by_phone_within_one_tailor() {
    let app = TestApp::spawn().await;
    let token_a = app.register("Shop A", "a@example.com").await;
    let token_b = app.register("Shop B", "b@example.com").await;

    let first = app
        .create_shirt_order(&token_a, "9876543210", &days_from_now(5))
        .await;
    let second = app
        .create_shirt_order(&token_a, "9876543210", &days_from_now(6))
        .await;

    // Same customer; per-tailor token keeps counting.
    assert_eq!(first["token_number"], 1);
    assert_eq!(second["token_number"], 2);

    // Another tailor with the same phone starts from its own scope.
    let other = app
        .create_shirt_order(&token_b, "9876543210", &days_from_now(5))
        .await;
    assert_eq!(other["token_number"], 1);

    // Daily order-code sequence is global.
    let seq: Vec<&str> = [&first, &second, &other]
        .iter()
        .map(|o| &o["order_id"].as_str().unwrap()[8..])
        .collect();
    assert_eq!(seq, vec!["0001", "0002", "0003"]);
}

#[tokio::test]
async fn creation_rejects_bad_input() {
    let app = TestApp::spawn().await;
    let token = app.register("Stitch & Co", "reject@example.com").await;

    // Unknown category for the gender
    let (status, _) = app
        .request(
            "POST",
            "/api/v1/orders",
            Some(&token),
            Some(json!({
                "gender": "men",
                "stitch_category": "saree_blouse",
                "measurements": { "Chest": "40" },
                "customer_name": "Asha",
                "customer_phone": "9876543210",
                "due_date": days_from_now(5),
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Measurement key outside the schema
    let (status, _) = app
        .request(
            "POST",
            "/api/v1/orders",
            Some(&token),
            Some(json!({
                "gender": "men",
                "stitch_category": "shirt",
                "measurements": { "Wingspan": "72" },
                "customer_name": "Asha",
                "customer_phone": "9876543210",
                "due_date": days_from_now(5),
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // No measurements at all
    let (status, _) = app
        .request(
            "POST",
            "/api/v1/orders",
            Some(&token),
            Some(json!({
                "gender": "men",
                "stitch_category": "shirt",
                "measurements": {},
                "customer_name": "Asha",
                "customer_phone": "9876543210",
                "due_date": days_from_now(5),
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Due date in the past
    let (status, _) = app
        .request(
            "POST",
            "/api/v1/orders",
            Some(&token),
            Some(json!({
                "gender": "men",
                "stitch_category": "shirt",
                "measurements": { "Chest": "40" },
                "customer_name": "Asha",
                "customer_phone": "9876543210",
                "due_date": days_from_now(-1),
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn list_supports_search_and_status_filter() {
    let app = TestApp::spawn().await;
    let token = app.register("Stitch & Co", "list@example.com").await;

    let first = app
        .create_shirt_order(&token, "9876543210", &days_from_now(5))
        .await;
    app.create_shirt_order(&token, "9123456780", &days_from_now(6))
        .await;

    let id = first["id"].as_str().unwrap();
    let (_, _) = app
        .request(
            "PUT",
            &format!("/api/v1/orders/{id}/status"),
            Some(&token),
            Some(json!({ "status": "finishing" })),
        )
        .await;

    let (status, body) = app
        .request("GET", "/api/v1/orders", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 2);

    // Search by order code fragment, case-insensitive
    let code = first["order_id"].as_str().unwrap().to_lowercase();
    let (_, body) = app
        .request(
            "GET",
            &format!("/api/v1/orders?search={code}"),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["orders"][0]["id"], first["id"]);

    // Search by customer phone fragment
    let (_, body) = app
        .request("GET", "/api/v1/orders?search=912345", Some(&token), None)
        .await;
    assert_eq!(body["total"], 1);

    // Stage filter
    let (_, body) = app
        .request(
            "GET",
            "/api/v1/orders?status=finishing",
            Some(&token),
            None,
        )
        .await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["orders"][0]["status"], "finishing");
}

#[tokio::test]
async fn orders_are_scoped_to_their_tailor() {
    let app = TestApp::spawn().await;
    let token_a = app.register("Shop A", "scope-a@example.com").await;
    let token_b = app.register("Shop B", "scope-b@example.com").await;

    let order = app
        .create_shirt_order(&token_a, "9876543210", &days_from_now(5))
        .await;
    let id = order["id"].as_str().unwrap();

    let (status, _) = app
        .request("GET", &format!("/api/v1/orders/{id}"), Some(&token_b), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .request("GET", "/api/v1/orders", None, None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
