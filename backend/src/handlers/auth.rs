//! Authentication handlers

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::error::AppError;
use crate::middleware::CurrentUser;
use crate::services::auth::{AuthResponse, AuthTokens, LoginInput, RefreshInput, RegisterInput};
use crate::services::user::UserProfile;
use crate::services::{AuthService, UserService};
use crate::AppState;

/// Register endpoint handler
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterInput>,
) -> impl IntoResponse {
    let auth_service = AuthService::new(state.db.clone(), &state.config);

    match auth_service.register(body).await {
        Ok(response) => (StatusCode::CREATED, Json(response)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Login endpoint handler
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginInput>,
) -> Result<Json<AuthResponse>, AppError> {
    let auth_service = AuthService::new(state.db.clone(), &state.config);
    let response = auth_service.login(body).await?;
    Ok(Json(response))
}

/// Refresh token endpoint handler
pub async fn refresh(
    State(state): State<AppState>,
    Json(body): Json<RefreshInput>,
) -> Result<Json<AuthTokens>, AppError> {
    let auth_service = AuthService::new(state.db.clone(), &state.config);
    let tokens = auth_service.refresh(body).await?;
    Ok(Json(tokens))
}

/// Profile of the signed-in user
pub async fn me(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<UserProfile>, AppError> {
    let profile = UserService::new(state.db.clone())
        .get_profile(user.user_id)
        .await?;
    Ok(Json(profile))
}
