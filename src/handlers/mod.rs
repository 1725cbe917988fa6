pub mod dashboard;
pub mod orders;
pub mod profiles;
pub mod schema;
pub mod tracking;

use axum::http::HeaderMap;

/// Rate-limit key for unauthenticated requests. Behind a proxy the first
/// `X-Forwarded-For` hop identifies the client; otherwise every caller
/// shares one bucket.
pub(crate) fn client_key(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| "anon".to_string())
}
