//! Warehouse service

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::models::Action;
use shared::validation::validate_name;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;

/// Warehouse service for managing storage locations
#[derive(Clone)]
pub struct WarehouseService {
    db: PgPool,
}

/// Warehouse information
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Warehouse {
    pub id: Uuid,
    pub name: String,
    pub location: Option<String>,
    pub manager_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Warehouse with the number of materials stored there
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct WarehouseSummary {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub warehouse: Warehouse,
    pub material_count: i64,
}

/// Input for creating a warehouse
#[derive(Debug, Deserialize, Validate)]
pub struct CreateWarehouseInput {
    #[validate(length(min = 1, max = 200, message = "Warehouse name is required"))]
    pub name: String,
    pub location: Option<String>,
    pub manager_name: Option<String>,
}

/// Input for updating a warehouse
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateWarehouseInput {
    #[validate(length(min = 1, max = 200, message = "Warehouse name cannot be empty"))]
    pub name: Option<String>,
    pub location: Option<String>,
    pub manager_name: Option<String>,
}

impl WarehouseService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Get all warehouses with their material counts
    pub async fn list_warehouses(&self) -> AppResult<Vec<WarehouseSummary>> {
        let warehouses = sqlx::query_as::<_, WarehouseSummary>(
            r#"
            SELECT w.id, w.name, w.location, w.manager_name, w.created_at, w.updated_at,
                   COUNT(m.id) AS material_count
            FROM warehouses w
            LEFT JOIN materials m ON m.warehouse_id = w.id
            GROUP BY w.id
            ORDER BY w.name ASC
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(warehouses)
    }

    /// Get a warehouse by ID
    pub async fn get_warehouse(&self, warehouse_id: Uuid) -> AppResult<Warehouse> {
        sqlx::query_as::<_, Warehouse>(
            r#"
            SELECT id, name, location, manager_name, created_at, updated_at
            FROM warehouses
            WHERE id = $1
            "#,
        )
        .bind(warehouse_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Warehouse".to_string()))
    }

    /// Create a new warehouse
    pub async fn create_warehouse(
        &self,
        actor: &AuthUser,
        input: CreateWarehouseInput,
    ) -> AppResult<Warehouse> {
        actor.require(Action::Create)?;
        input.validate()?;
        validate_name(&input.name).map_err(|m| AppError::validation("name", m))?;

        let warehouse = sqlx::query_as::<_, Warehouse>(
            r#"
            INSERT INTO warehouses (name, location, manager_name)
            VALUES ($1, $2, $3)
            RETURNING id, name, location, manager_name, created_at, updated_at
            "#,
        )
        .bind(input.name.trim())
        .bind(&input.location)
        .bind(&input.manager_name)
        .fetch_one(&self.db)
        .await
        .map_err(|e| AppError::from_db(e, "warehouse"))?;

        tracing::info!(warehouse_id = %warehouse.id, "Created warehouse");
        Ok(warehouse)
    }

    /// Update a warehouse
    pub async fn update_warehouse(
        &self,
        actor: &AuthUser,
        warehouse_id: Uuid,
        input: UpdateWarehouseInput,
    ) -> AppResult<Warehouse> {
        actor.require(Action::Edit)?;
        input.validate()?;
        if let Some(name) = &input.name {
            validate_name(name).map_err(|m| AppError::validation("name", m))?;
        }

        let existing = self.get_warehouse(warehouse_id).await?;

        let warehouse = sqlx::query_as::<_, Warehouse>(
            r#"
            UPDATE warehouses
            SET name = $1, location = $2, manager_name = $3, updated_at = NOW()
            WHERE id = $4
            RETURNING id, name, location, manager_name, created_at, updated_at
            "#,
        )
        .bind(input.name.as_deref().map(str::trim).unwrap_or(&existing.name))
        .bind(input.location.or(existing.location))
        .bind(input.manager_name.or(existing.manager_name))
        .bind(warehouse_id)
        .fetch_one(&self.db)
        .await
        .map_err(|e| AppError::from_db(e, "warehouse"))?;

        Ok(warehouse)
    }

    /// Delete a warehouse. Materials keep existing with the reference cleared.
    pub async fn delete_warehouse(&self, actor: &AuthUser, warehouse_id: Uuid) -> AppResult<()> {
        actor.require(Action::Delete)?;

        let result = sqlx::query("DELETE FROM warehouses WHERE id = $1")
            .bind(warehouse_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Warehouse".to_string()));
        }

        tracing::info!(warehouse_id = %warehouse_id, actor = %actor.user_id, "Deleted warehouse");
        Ok(())
    }
}
