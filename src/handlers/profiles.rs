use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::Serialize;

use crate::{
    auth::AuthUser,
    entities::profile::Model as ProfileModel,
    errors::ServiceError,
    services::profiles::{RegisterRequest, UpdateProfileRequest},
    AppState,
};

use super::client_key;

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub profile: ProfileModel,
    pub token: String,
}

/// Registers a new tailor account and returns its first bearer token.
/// Repeated attempts from one client hit a cooldown.
pub async fn register(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), ServiceError> {
    state
        .registration_limiter
        .check(&client_key(&headers))
        .map_err(|_| ServiceError::RateLimitExceeded)?;

    let profile = state.services.profiles.register(request).await?;
    let token = state.auth.issue_token(profile.id)?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse { profile, token }),
    ))
}

pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<Json<ProfileModel>, ServiceError> {
    let profile = state.services.profiles.get(user.tailor_id).await?;
    Ok(Json(profile))
}

pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<Json<ProfileModel>, ServiceError> {
    let profile = state
        .services
        .profiles
        .update(user.tailor_id, request)
        .await?;
    Ok(Json(profile))
}
