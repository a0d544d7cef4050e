//! Reporting service for reorder lists and dashboard metrics

use chrono::{Duration, Utc};
use serde::Serialize;
use shared::reorder::{build_reorder_report, ReorderLine};
use shared::stock_status::StatusCounts;
use sqlx::PgPool;

use crate::error::AppResult;
use crate::services::material::MaterialService;
use crate::services::stock::StockService;

/// Window for the "recent adjustments" dashboard figure
const RECENT_ADJUSTMENT_DAYS: i64 = 7;

/// Reporting service
#[derive(Clone)]
pub struct ReportingService {
    db: PgPool,
}

/// Dashboard metrics
#[derive(Debug, Serialize)]
pub struct DashboardMetrics {
    pub total_materials: i64,
    pub status_counts: StatusCounts,
    pub total_suppliers: i64,
    pub total_warehouses: i64,
    pub recent_adjustments: i64,
}

/// Reorder report with the time it was computed
#[derive(Debug, Serialize)]
pub struct ReorderReport {
    pub generated_at: chrono::DateTime<Utc>,
    pub items: Vec<ReorderLine>,
}

impl ReportingService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Materials at or below their reorder point, critical first
    pub async fn reorder_report(&self) -> AppResult<ReorderReport> {
        let materials = MaterialService::new(self.db.clone()).all_materials().await?;
        let now = Utc::now();
        let items = build_reorder_report(materials, now);

        tracing::debug!(count = items.len(), "Built reorder report");

        Ok(ReorderReport {
            generated_at: now,
            items,
        })
    }

    /// Get dashboard metrics
    pub async fn dashboard(&self) -> AppResult<DashboardMetrics> {
        let materials = MaterialService::new(self.db.clone()).all_materials().await?;
        let status_counts = StatusCounts::tally(materials.iter().map(|m| m.status()));

        let total_suppliers = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM suppliers")
            .fetch_one(&self.db)
            .await?;

        let total_warehouses = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM warehouses")
            .fetch_one(&self.db)
            .await?;

        let since = Utc::now() - Duration::days(RECENT_ADJUSTMENT_DAYS);
        let recent_adjustments = StockService::new(self.db.clone()).count_since(since).await?;

        Ok(DashboardMetrics {
            total_materials: status_counts.total(),
            status_counts,
            total_suppliers,
            total_warehouses,
            recent_adjustments,
        })
    }
}
