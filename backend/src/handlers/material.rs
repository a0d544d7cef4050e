//! Material management HTTP handlers
//!
//! Responses carry the read-time shortage countdown and recommended order
//! quantity alongside the stored fields.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use shared::models::MaterialView;
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::CurrentUser;
use crate::services::material::{CreateMaterialInput, MaterialFilter, UpdateMaterialInput};
use crate::services::MaterialService;
use crate::AppState;

/// List materials, optionally filtered by status, supplier, warehouse or search text
pub async fn list_materials(
    State(state): State<AppState>,
    _user: CurrentUser,
    Query(filter): Query<MaterialFilter>,
) -> Result<Json<serde_json::Value>, AppError> {
    let materials = MaterialService::new(state.db.clone())
        .list_materials(&filter)
        .await?;
    Ok(Json(serde_json::json!({ "materials": materials })))
}

/// Get a specific material
pub async fn get_material(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(material_id): Path<Uuid>,
) -> Result<Json<MaterialView>, AppError> {
    let material = MaterialService::new(state.db.clone())
        .get_material(material_id)
        .await?;
    Ok(Json(material.view(Utc::now())))
}

/// Create a new material
pub async fn create_material(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(input): Json<CreateMaterialInput>,
) -> impl IntoResponse {
    let service = MaterialService::new(state.db.clone());

    match service.create_material(&user, input).await {
        Ok(material) => (StatusCode::CREATED, Json(material.view(Utc::now()))).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Update a material's descriptive fields and thresholds
pub async fn update_material(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(material_id): Path<Uuid>,
    Json(input): Json<UpdateMaterialInput>,
) -> Result<Json<MaterialView>, AppError> {
    let material = MaterialService::new(state.db.clone())
        .update_material(&user, material_id, input)
        .await?;
    Ok(Json(material.view(Utc::now())))
}

/// Delete a material
pub async fn delete_material(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(material_id): Path<Uuid>,
) -> impl IntoResponse {
    let service = MaterialService::new(state.db.clone());

    match service.delete_material(&user, material_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}
