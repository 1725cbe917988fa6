//! Shared harness: each test gets an isolated sqlite database and artifact
//! store inside a temp directory, with the full router driven through
//! `tower::ServiceExt::oneshot`.

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use tailorbook_api::{
    app_router,
    config::AppConfig,
    db::{establish_connection, run_migrations},
    storage::FsObjectStore,
    AppState,
};

const TEST_JWT_SECRET: &str =
    "integration_test_secret_key_that_is_definitely_longer_than_sixty_four_characters";

pub struct TestApp {
    pub router: Router,
    pub storage_root: PathBuf,
    _dir: TempDir,
}

impl TestApp {
    pub async fn spawn() -> Self {
        let dir = tempfile::tempdir().expect("temp dir");
        let db_path = dir.path().join("test.db");
        let storage_root = dir.path().join("files");

        let mut config = AppConfig::new(
            format!("sqlite://{}?mode=rwc", db_path.display()),
            TEST_JWT_SECRET,
            "127.0.0.1",
            8080,
            "test",
        );
        config.storage_root = storage_root.display().to_string();

        let pool = establish_connection(&config.database_url)
            .await
            .expect("db connection");
        run_migrations(&pool).await.expect("migrations");

        let store = Arc::new(FsObjectStore::new(
            storage_root.clone(),
            config.public_base_url.clone(),
        ));
        let state = Arc::new(AppState::new(Arc::new(pool), config, store));

        Self {
            router: app_router(state),
            storage_root,
            _dir: dir,
        }
    }

    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        self.request_with_client(method, uri, token, body, None).await
    }

    /// Like `request`, but with an `X-Forwarded-For` value so rate-limit
    /// buckets can be controlled per test.
    pub async fn request_with_client(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
        client: Option<&str>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {token}"));
        }
        if let Some(client) = client {
            builder = builder.header("X-Forwarded-For", client);
        }

        let request = match body {
            Some(body) => builder
                .header("Content-Type", "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("response");
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("body")
            .to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    /// Registers a tailor account and returns its bearer token. Each
    /// registration uses its own client key so the cooldown never interferes
    /// with unrelated tests.
    pub async fn register(&self, shop_name: &str, email: &str) -> String {
        let (status, body) = self
            .request_with_client(
                "POST",
                "/auth/register",
                None,
                Some(json!({
                    "shop_name": shop_name,
                    "owner_name": "Test Owner",
                    "email": email,
                    "phone_number": "9876543210",
                })),
                Some(email),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {body}");
        body["token"].as_str().expect("token").to_string()
    }

    /// Creates an order for a men's shirt with sensible defaults.
    pub async fn create_shirt_order(
        &self,
        token: &str,
        customer_phone: &str,
        due_date: &str,
    ) -> Value {
        let (status, body) = self
            .request(
                "POST",
                "/api/v1/orders",
                Some(token),
                Some(json!({
                    "gender": "men",
                    "stitch_category": "shirt",
                    "measurements": { "Chest": "40", "Waist": "34", "Length": "29.5" },
                    "customer_name": "Asha",
                    "customer_phone": customer_phone,
                    "work_description": "Full sleeves, single pocket",
                    "due_date": due_date,
                    "charges": "450.00",
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create order failed: {body}");
        body
    }
}

pub fn days_from_now(days: i64) -> String {
    (chrono::Utc::now().date_naive() + chrono::Duration::days(days))
        .format("%Y-%m-%d")
        .to_string()
}
