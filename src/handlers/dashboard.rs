use std::sync::Arc;

use axum::{extract::State, Json};
use chrono::Utc;

use crate::{
    auth::AuthUser, errors::ServiceError, services::orders::DashboardResponse, AppState,
};

/// Dashboard rollup for the authenticated tailor: order stats, recent
/// orders, and due-tomorrow reminders.
pub async fn dashboard(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<Json<DashboardResponse>, ServiceError> {
    let today = Utc::now().date_naive();
    let response = state
        .services
        .orders
        .dashboard(user.tailor_id, today)
        .await?;
    Ok(Json(response))
}
