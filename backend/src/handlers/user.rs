//! User administration handlers

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::CurrentUser;
use crate::services::user::{UpdateRoleInput, UserProfile};
use crate::services::UserService;
use crate::AppState;

/// List all user accounts
pub async fn list_users(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<UserProfile>>, AppError> {
    let users = UserService::new(state.db.clone()).list_users(&user).await?;
    Ok(Json(users))
}

/// Change the role of a user account
pub async fn update_user_role(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(user_id): Path<Uuid>,
    Json(input): Json<UpdateRoleInput>,
) -> Result<Json<UserProfile>, AppError> {
    let profile = UserService::new(state.db.clone())
        .update_role(&user, user_id, input)
        .await?;
    Ok(Json(profile))
}
