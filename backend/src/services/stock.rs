//! Stock adjustment service
//!
//! Persists ledger adjustments. The material update and the history insert
//! share one transaction, and the material row is locked first so
//! concurrent adjustments of the same material apply one after another.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::ledger::apply_adjustment;
use shared::models::{Action, MaterialView, NewStockHistoryEntry, StockHistoryEntry, StockReason};
use shared::types::{DateRange, PaginatedResponse, Pagination};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;
use crate::services::material::{lock_material, store_material};

/// Stock service for recording adjustments and reading the ledger
#[derive(Clone)]
pub struct StockService {
    db: PgPool,
}

/// Input for adjusting a material's stock
#[derive(Debug, Deserialize, Validate)]
pub struct StockAdjustmentInput {
    pub material_id: Uuid,
    /// Signed change: positive adds stock, negative removes it
    pub quantity_change: Decimal,
    pub reason: StockReason,
    #[validate(length(max = 1000, message = "Notes must be at most 1000 characters"))]
    pub notes: Option<String>,
}

/// Result of a committed adjustment
#[derive(Debug, Serialize)]
pub struct AdjustmentResult {
    pub material: MaterialView,
    pub entry: StockHistoryEntry,
}

/// History entry joined with material and user names
#[derive(Debug, Serialize)]
pub struct StockHistoryRecord {
    #[serde(flatten)]
    pub entry: StockHistoryEntry,
    pub material_code: String,
    pub material_name: String,
    pub user_full_name: Option<String>,
}

/// Row for history queries
#[derive(Debug, sqlx::FromRow)]
struct StockHistoryRow {
    id: Uuid,
    material_id: Uuid,
    user_id: Uuid,
    quantity_before: Decimal,
    quantity_after: Decimal,
    quantity_change: Decimal,
    reason: String,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    material_code: String,
    material_name: String,
    user_full_name: Option<String>,
}

impl TryFrom<StockHistoryRow> for StockHistoryRecord {
    type Error = AppError;

    fn try_from(row: StockHistoryRow) -> AppResult<Self> {
        let reason = row.reason.parse::<StockReason>().map_err(AppError::Internal)?;
        Ok(Self {
            entry: StockHistoryEntry {
                id: row.id,
                material_id: row.material_id,
                user_id: row.user_id,
                quantity_before: row.quantity_before,
                quantity_after: row.quantity_after,
                quantity_change: row.quantity_change,
                reason,
                notes: row.notes,
                created_at: row.created_at,
            },
            material_code: row.material_code,
            material_name: row.material_name,
            user_full_name: row.user_full_name,
        })
    }
}

/// Query parameters for the history listing
#[derive(Debug, Default, Deserialize)]
pub struct HistoryFilter {
    pub material_id: Option<Uuid>,
    pub reason: Option<StockReason>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

const HISTORY_SELECT: &str = r#"
    SELECT h.id, h.material_id, h.user_id, h.quantity_before, h.quantity_after,
           h.quantity_change, h.reason, h.notes, h.created_at,
           m.material_code, m.name AS material_name, u.full_name AS user_full_name
    FROM stock_history h
    JOIN materials m ON m.id = h.material_id
    LEFT JOIN user_profiles u ON u.id = h.user_id
"#;

const HISTORY_WHERE: &str = r#"
    WHERE ($1::uuid IS NULL OR h.material_id = $1)
      AND ($2::text IS NULL OR h.reason = $2)
      AND ($3::date IS NULL OR h.created_at >= $3::date)
      AND ($4::date IS NULL OR h.created_at < $4::date + INTERVAL '1 day')
"#;

/// Append one ledger entry
async fn insert_entry(conn: &mut PgConnection, entry: &NewStockHistoryEntry) -> AppResult<Uuid> {
    let id = sqlx::query_scalar::<_, Uuid>(
        r#"
        INSERT INTO stock_history (
            material_id, user_id, quantity_before, quantity_after, quantity_change,
            reason, notes, created_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING id
        "#,
    )
    .bind(entry.material_id)
    .bind(entry.user_id)
    .bind(entry.quantity_before)
    .bind(entry.quantity_after)
    .bind(entry.quantity_change)
    .bind(entry.reason.as_str())
    .bind(&entry.notes)
    .bind(entry.created_at)
    .fetch_one(conn)
    .await
    .map_err(|e| AppError::from_db(e, "stock_history"))?;

    Ok(id)
}

impl StockService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Apply a signed adjustment and append its ledger entry atomically.
    ///
    /// Rejected adjustments roll back without writing anything.
    pub async fn adjust_stock(
        &self,
        actor: Option<&AuthUser>,
        input: StockAdjustmentInput,
    ) -> AppResult<AdjustmentResult> {
        let actor = actor.ok_or(AppError::Unauthenticated)?;
        actor.require(Action::AdjustStock)?;
        input.validate()?;

        let mut tx = self.db.begin().await?;

        let material = lock_material(&mut *tx, input.material_id).await?;

        let now = Utc::now();
        let adjustment = apply_adjustment(
            &material,
            input.quantity_change,
            input.reason,
            Some(actor.user_id),
            input.notes,
            now,
        )?;

        store_material(&mut *tx, &adjustment.material).await?;
        let entry_id = insert_entry(&mut *tx, &adjustment.entry).await?;

        tx.commit().await?;

        tracing::info!(
            material_id = %adjustment.material.id,
            user_id = %actor.user_id,
            reason = %input.reason,
            before = %adjustment.entry.quantity_before,
            after = %adjustment.entry.quantity_after,
            status = %adjustment.material.status(),
            "Recorded stock adjustment"
        );

        Ok(AdjustmentResult {
            material: adjustment.material.view(now),
            entry: StockHistoryEntry::from_new(entry_id, adjustment.entry),
        })
    }

    /// Paginated ledger, newest first
    pub async fn list_history(
        &self,
        filter: HistoryFilter,
    ) -> AppResult<PaginatedResponse<StockHistoryRecord>> {
        if let (Some(start), Some(end)) = (filter.start_date, filter.end_date) {
            if !(DateRange { start, end }).is_valid() {
                return Err(AppError::validation(
                    "start_date",
                    "Start date must not be after end date",
                ));
            }
        }

        let pagination = Pagination::normalized(filter.page, filter.per_page);
        let reason = filter.reason.map(|r| r.as_str());

        let total = sqlx::query_scalar::<_, i64>(&format!(
            "SELECT COUNT(*) FROM stock_history h {}",
            HISTORY_WHERE
        ))
        .bind(filter.material_id)
        .bind(reason)
        .bind(filter.start_date)
        .bind(filter.end_date)
        .fetch_one(&self.db)
        .await?;

        let rows = sqlx::query_as::<_, StockHistoryRow>(&format!(
            "{} {} ORDER BY h.created_at DESC, h.id DESC LIMIT $5 OFFSET $6",
            HISTORY_SELECT, HISTORY_WHERE
        ))
        .bind(filter.material_id)
        .bind(reason)
        .bind(filter.start_date)
        .bind(filter.end_date)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.db)
        .await?;

        let records = rows
            .into_iter()
            .map(StockHistoryRecord::try_from)
            .collect::<AppResult<Vec<_>>>()?;

        Ok(PaginatedResponse::new(
            records,
            &pagination,
            u64::try_from(total).unwrap_or_default(),
        ))
    }

    /// Full history of one material, newest first
    pub async fn material_history(&self, material_id: Uuid) -> AppResult<Vec<StockHistoryRecord>> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM materials WHERE id = $1)",
        )
        .bind(material_id)
        .fetch_one(&self.db)
        .await?;

        if !exists {
            return Err(AppError::NotFound("Material".to_string()));
        }

        let rows = sqlx::query_as::<_, StockHistoryRow>(&format!(
            "{} WHERE h.material_id = $1 ORDER BY h.created_at DESC, h.id DESC",
            HISTORY_SELECT
        ))
        .bind(material_id)
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(StockHistoryRecord::try_from).collect()
    }

    /// Number of adjustments recorded since `since`
    pub async fn count_since(&self, since: DateTime<Utc>) -> AppResult<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM stock_history WHERE created_at >= $1",
        )
        .bind(since)
        .fetch_one(&self.db)
        .await?;

        Ok(count)
    }
}
