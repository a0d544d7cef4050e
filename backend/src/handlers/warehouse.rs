//! Warehouse management HTTP handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::middleware::CurrentUser;
use crate::services::warehouse::{CreateWarehouseInput, UpdateWarehouseInput};
use crate::services::WarehouseService;
use crate::AppState;

/// List all warehouses with their material counts
pub async fn list_warehouses(State(state): State<AppState>, _user: CurrentUser) -> impl IntoResponse {
    let service = WarehouseService::new(state.db.clone());

    match service.list_warehouses().await {
        Ok(warehouses) => (StatusCode::OK, Json(serde_json::json!({ "warehouses": warehouses }))).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Get a specific warehouse
pub async fn get_warehouse(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(warehouse_id): Path<Uuid>,
) -> impl IntoResponse {
    let service = WarehouseService::new(state.db.clone());

    match service.get_warehouse(warehouse_id).await {
        Ok(warehouse) => (StatusCode::OK, Json(warehouse)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Create a new warehouse
pub async fn create_warehouse(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(input): Json<CreateWarehouseInput>,
) -> impl IntoResponse {
    let service = WarehouseService::new(state.db.clone());

    match service.create_warehouse(&user, input).await {
        Ok(warehouse) => (StatusCode::CREATED, Json(warehouse)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Update a warehouse
pub async fn update_warehouse(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(warehouse_id): Path<Uuid>,
    Json(input): Json<UpdateWarehouseInput>,
) -> impl IntoResponse {
    let service = WarehouseService::new(state.db.clone());

    match service.update_warehouse(&user, warehouse_id, input).await {
        Ok(warehouse) => (StatusCode::OK, Json(warehouse)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Delete a warehouse
pub async fn delete_warehouse(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(warehouse_id): Path<Uuid>,
) -> impl IntoResponse {
    let service = WarehouseService::new(state.db.clone());

    match service.delete_warehouse(&user, warehouse_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}
