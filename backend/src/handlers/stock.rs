//! Stock adjustment and history handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use shared::types::PaginatedResponse;
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::CurrentUser;
use crate::services::stock::{HistoryFilter, StockAdjustmentInput, StockHistoryRecord};
use crate::services::StockService;
use crate::AppState;

/// Record a stock adjustment
pub async fn adjust_stock(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(input): Json<StockAdjustmentInput>,
) -> impl IntoResponse {
    let service = StockService::new(state.db.clone());

    match service.adjust_stock(Some(&user), input).await {
        Ok(result) => (StatusCode::CREATED, Json(result)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Paginated stock history across materials
pub async fn list_stock_history(
    State(state): State<AppState>,
    _user: CurrentUser,
    Query(filter): Query<HistoryFilter>,
) -> Result<Json<PaginatedResponse<StockHistoryRecord>>, AppError> {
    let history = StockService::new(state.db.clone())
        .list_history(filter)
        .await?;
    Ok(Json(history))
}

/// Stock history of one material
pub async fn get_material_history(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(material_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    let history = StockService::new(state.db.clone())
        .material_history(material_id)
        .await?;
    Ok(Json(serde_json::json!({ "history": history })))
}
