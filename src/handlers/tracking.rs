use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::HeaderMap,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::{errors::ServiceError, services::tracking::TrackingView, AppState};

use super::client_key;

#[derive(Debug, Deserialize)]
pub struct TrackQuery {
    #[serde(default)]
    pub id: String,
}

/// An unknown code is a normal outcome for this endpoint, so it is part of
/// the success body instead of a 404.
#[derive(Debug, Serialize)]
pub struct TrackResponse {
    pub found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<TrackingView>,
}

/// Public, unauthenticated order lookup by order code. Rate limited per
/// client.
pub async fn track_order(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<TrackQuery>,
) -> Result<Json<TrackResponse>, ServiceError> {
    state
        .tracking_limiter
        .check(&client_key(&headers))
        .map_err(|_| ServiceError::RateLimitExceeded)?;

    let order = state.services.tracking.track(&query.id).await?;
    Ok(Json(TrackResponse {
        found: order.is_some(),
        order,
    }))
}
