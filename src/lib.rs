//! Order management backend for small tailoring shops: customer and order
//! records with garment measurements, a fixed production pipeline, PDF bill
//! generation, share-message construction, and anonymous order tracking.

pub mod auth;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod handlers;
pub mod migrator;
pub mod rate_limiter;
pub mod schema;
pub mod services;
pub mod stage;
pub mod storage;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::HeaderValue,
    routing::{get, post, put},
    Extension, Json, Router,
};
use serde::Serialize;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing::warn;

use crate::{
    auth::{AuthConfig, AuthService},
    config::AppConfig,
    db::DbPool,
    rate_limiter::{RateLimitConfig, RateLimiter},
    services::{
        billing::BillingService, customers::CustomerService, orders::OrderService,
        profiles::ProfileService, sharing::SharingService, tracking::TrackingService,
    },
    storage::ObjectStore,
};

/// Service registry shared by all handlers.
pub struct AppServices {
    pub orders: OrderService,
    pub customers: CustomerService,
    pub profiles: ProfileService,
    pub billing: BillingService,
    pub sharing: SharingService,
    pub tracking: TrackingService,
}

pub struct AppState {
    pub db: Arc<DbPool>,
    pub config: AppConfig,
    pub auth: Arc<AuthService>,
    pub services: AppServices,
    pub tracking_limiter: RateLimiter,
    pub registration_limiter: RateLimiter,
}

impl AppState {
    pub fn new(db: Arc<DbPool>, config: AppConfig, store: Arc<dyn ObjectStore>) -> Self {
        let auth = Arc::new(AuthService::new(AuthConfig::new(
            config.jwt_secret.clone(),
            config.jwt_expiration,
        )));

        let customers = CustomerService::new(db.clone());
        let services = AppServices {
            orders: OrderService::new(db.clone(), customers.clone()),
            customers,
            profiles: ProfileService::new(db.clone()),
            billing: BillingService::new(store, config.regional.clone()),
            sharing: SharingService::new(config.regional.clone(), config.public_base_url.clone()),
            tracking: TrackingService::new(db.clone()),
        };

        let tracking_limiter = RateLimiter::new(RateLimitConfig {
            requests_per_window: config.tracking_requests_per_window,
            window: Duration::from_secs(config.tracking_window_seconds),
        });
        let registration_limiter = RateLimiter::new(RateLimitConfig {
            requests_per_window: config.registration_requests_per_window,
            window: Duration::from_secs(config.registration_cooldown_seconds),
        });

        Self {
            db,
            config,
            auth,
            services,
            tracking_limiter,
            registration_limiter,
        }
    }
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Authenticated API surface under `/api/v1`.
fn api_v1_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/orders",
            post(handlers::orders::create_order).get(handlers::orders::list_orders),
        )
        .route("/orders/{id}", get(handlers::orders::get_order))
        .route("/orders/{id}/status", put(handlers::orders::update_status))
        .route("/orders/{id}/bill", post(handlers::orders::generate_bill))
        .route("/orders/{id}/share", get(handlers::orders::share_order))
        .route("/dashboard", get(handlers::dashboard::dashboard))
        .route(
            "/profile",
            get(handlers::profiles::get_profile).put(handlers::profiles::update_profile),
        )
        .route("/schema", get(handlers::schema::get_schema))
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    match config.cors_allowed_origins.as_deref() {
        Some(origins) => {
            let parsed: Vec<HeaderValue> = origins
                .split(',')
                .filter_map(|origin| match origin.trim().parse::<HeaderValue>() {
                    Ok(value) => Some(value),
                    Err(_) => {
                        warn!(origin = origin.trim(), "Ignoring unparseable CORS origin");
                        None
                    }
                })
                .collect();
            CorsLayer::new()
                .allow_origin(parsed)
                .allow_methods(Any)
                .allow_headers(Any)
        }
        None => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
    }
}

/// Builds the full application router: versioned API, public registration
/// and tracking, the generated-document file server, and health probes.
pub fn app_router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.config);
    let files = ServeDir::new(&state.config.storage_root);

    Router::new()
        .nest("/api/v1", api_v1_routes())
        .route("/auth/register", post(handlers::profiles::register))
        .route("/track", get(handlers::tracking::track_order))
        .route("/health", get(health_check))
        .nest_service("/files", files)
        .layer(Extension(state.auth.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
