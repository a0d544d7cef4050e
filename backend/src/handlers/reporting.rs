//! Reporting handlers

use axum::{extract::State, Json};

use crate::error::AppError;
use crate::middleware::CurrentUser;
use crate::services::reporting::{DashboardMetrics, ReorderReport};
use crate::services::ReportingService;
use crate::AppState;

/// Materials that need reordering
pub async fn get_reorder_report(
    State(state): State<AppState>,
    _user: CurrentUser,
) -> Result<Json<ReorderReport>, AppError> {
    let report = ReportingService::new(state.db.clone()).reorder_report().await?;
    Ok(Json(report))
}

/// Inventory dashboard figures
pub async fn get_dashboard(
    State(state): State<AppState>,
    _user: CurrentUser,
) -> Result<Json<DashboardMetrics>, AppError> {
    let metrics = ReportingService::new(state.db.clone()).dashboard().await?;
    Ok(Json(metrics))
}
