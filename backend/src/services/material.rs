//! Material service
//!
//! Every write recomputes the derived stock fields through the shared
//! engine before the row is stored.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use shared::models::{Action, Material, MaterialUpdate, MaterialView, NewMaterial};
use shared::stock_status::MaterialStatus;
use shared::validation::{validate_lead_time, validate_name, validate_new_material, validate_non_negative};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;

/// Material service for managing tracked materials
#[derive(Clone)]
pub struct MaterialService {
    db: PgPool,
}

/// Row from materials. The stored status column is only used for filtering;
/// the model re-derives it from the quantities.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct MaterialRow {
    id: Uuid,
    material_code: String,
    name: String,
    supplier_id: Option<Uuid>,
    warehouse_id: Option<Uuid>,
    unit: String,
    current_quantity: Decimal,
    reorder_point: Decimal,
    safety_stock: Decimal,
    avg_daily_usage: Decimal,
    lead_time_days: i32,
    shortage_date: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<MaterialRow> for Material {
    fn from(row: MaterialRow) -> Self {
        Material::restore(
            row.id,
            NewMaterial {
                material_code: row.material_code,
                name: row.name,
                supplier_id: row.supplier_id,
                warehouse_id: row.warehouse_id,
                unit: row.unit,
                current_quantity: row.current_quantity,
                reorder_point: row.reorder_point,
                safety_stock: row.safety_stock,
                avg_daily_usage: row.avg_daily_usage,
                lead_time_days: row.lead_time_days,
            },
            row.shortage_date,
            row.created_at,
            row.updated_at,
        )
    }
}

pub(crate) const MATERIAL_COLUMNS: &str = r#"
    id, material_code, name, supplier_id, warehouse_id, unit, current_quantity,
    reorder_point, safety_stock, avg_daily_usage, lead_time_days, shortage_date,
    created_at, updated_at
"#;

/// Input for creating a material
#[derive(Debug, Deserialize, Validate)]
pub struct CreateMaterialInput {
    #[validate(length(min = 1, max = 32, message = "Material code must be 1-32 characters"))]
    pub material_code: String,
    #[validate(length(min = 1, max = 200, message = "Material name is required"))]
    pub name: String,
    pub supplier_id: Option<Uuid>,
    pub warehouse_id: Option<Uuid>,
    #[validate(length(min = 1, max = 20, message = "Unit is required"))]
    pub unit: String,
    #[serde(default)]
    pub current_quantity: Decimal,
    pub reorder_point: Decimal,
    pub safety_stock: Decimal,
    #[serde(default)]
    pub avg_daily_usage: Decimal,
    pub lead_time_days: i32,
}

impl From<CreateMaterialInput> for NewMaterial {
    fn from(input: CreateMaterialInput) -> Self {
        NewMaterial {
            material_code: input.material_code.trim().to_string(),
            name: input.name.trim().to_string(),
            supplier_id: input.supplier_id,
            warehouse_id: input.warehouse_id,
            unit: input.unit.trim().to_string(),
            current_quantity: input.current_quantity,
            reorder_point: input.reorder_point,
            safety_stock: input.safety_stock,
            avg_daily_usage: input.avg_daily_usage,
            lead_time_days: input.lead_time_days,
        }
    }
}

/// Input for updating a material. The quantity is not editable here;
/// it only changes through stock adjustments.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateMaterialInput {
    #[validate(length(min = 1, max = 200, message = "Material name cannot be empty"))]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub supplier_id: Option<Option<Uuid>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub warehouse_id: Option<Option<Uuid>>,
    #[validate(length(min = 1, max = 20, message = "Unit cannot be empty"))]
    pub unit: Option<String>,
    pub reorder_point: Option<Decimal>,
    pub safety_stock: Option<Decimal>,
    pub avg_daily_usage: Option<Decimal>,
    pub lead_time_days: Option<i32>,
}

/// Distinguish an explicit `null` (detach) from an absent field (keep)
fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

impl UpdateMaterialInput {
    fn check(&self) -> AppResult<()> {
        self.validate()?;
        if let Some(name) = &self.name {
            validate_name(name).map_err(|m| AppError::validation("name", m))?;
        }
        for (field, value) in [
            ("reorder_point", self.reorder_point),
            ("safety_stock", self.safety_stock),
            ("avg_daily_usage", self.avg_daily_usage),
        ] {
            if let Some(value) = value {
                validate_non_negative(value).map_err(|m| AppError::validation(field, m))?;
            }
        }
        if let Some(days) = self.lead_time_days {
            validate_lead_time(days).map_err(|m| AppError::validation("lead_time_days", m))?;
        }
        Ok(())
    }
}

impl From<UpdateMaterialInput> for MaterialUpdate {
    fn from(input: UpdateMaterialInput) -> Self {
        MaterialUpdate {
            name: input.name.map(|n| n.trim().to_string()),
            supplier_id: input.supplier_id,
            warehouse_id: input.warehouse_id,
            unit: input.unit.map(|u| u.trim().to_string()),
            reorder_point: input.reorder_point,
            safety_stock: input.safety_stock,
            avg_daily_usage: input.avg_daily_usage,
            lead_time_days: input.lead_time_days,
        }
    }
}

/// Filters for listing materials
#[derive(Debug, Default, Deserialize)]
pub struct MaterialFilter {
    pub status: Option<MaterialStatus>,
    pub supplier_id: Option<Uuid>,
    pub warehouse_id: Option<Uuid>,
    /// Case-insensitive match on code or name
    pub search: Option<String>,
}

/// Lock a material row for the rest of the transaction
pub(crate) async fn lock_material(conn: &mut PgConnection, material_id: Uuid) -> AppResult<Material> {
    sqlx::query_as::<_, MaterialRow>(&format!(
        "SELECT {} FROM materials WHERE id = $1 FOR UPDATE",
        MATERIAL_COLUMNS
    ))
    .bind(material_id)
    .fetch_optional(conn)
    .await?
    .map(Material::from)
    .ok_or_else(|| AppError::NotFound("Material".to_string()))
}

/// Write back every mutable column of a material, derived fields included
pub(crate) async fn store_material(conn: &mut PgConnection, material: &Material) -> AppResult<()> {
    sqlx::query(
        r#"
        UPDATE materials
        SET name = $1, supplier_id = $2, warehouse_id = $3, unit = $4,
            current_quantity = $5, reorder_point = $6, safety_stock = $7,
            avg_daily_usage = $8, lead_time_days = $9, status = $10,
            shortage_date = $11, updated_at = $12
        WHERE id = $13
        "#,
    )
    .bind(&material.name)
    .bind(material.supplier_id)
    .bind(material.warehouse_id)
    .bind(&material.unit)
    .bind(material.current_quantity)
    .bind(material.reorder_point)
    .bind(material.safety_stock)
    .bind(material.avg_daily_usage)
    .bind(material.lead_time_days)
    .bind(material.status().as_str())
    .bind(material.shortage_date())
    .bind(material.updated_at)
    .bind(material.id)
    .execute(conn)
    .await
    .map_err(|e| AppError::from_db(e, "material"))?;

    Ok(())
}

impl MaterialService {
    /// Create a new MaterialService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List materials with read-time shortage figures
    pub async fn list_materials(&self, filter: &MaterialFilter) -> AppResult<Vec<MaterialView>> {
        let search = filter
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| format!("%{}%", s));

        let rows = sqlx::query_as::<_, MaterialRow>(&format!(
            r#"
            SELECT {}
            FROM materials
            WHERE ($1::text IS NULL OR status = $1)
              AND ($2::uuid IS NULL OR supplier_id = $2)
              AND ($3::uuid IS NULL OR warehouse_id = $3)
              AND ($4::text IS NULL OR material_code ILIKE $4 OR name ILIKE $4)
            ORDER BY material_code ASC
            "#,
            MATERIAL_COLUMNS
        ))
        .bind(filter.status.map(|s| s.as_str()))
        .bind(filter.supplier_id)
        .bind(filter.warehouse_id)
        .bind(search)
        .fetch_all(&self.db)
        .await?;

        let now = Utc::now();
        Ok(rows
            .into_iter()
            .map(|row| Material::from(row).view(now))
            .collect())
    }

    /// Load every material, for reports
    pub async fn all_materials(&self) -> AppResult<Vec<Material>> {
        let rows = sqlx::query_as::<_, MaterialRow>(&format!(
            "SELECT {} FROM materials ORDER BY material_code ASC",
            MATERIAL_COLUMNS
        ))
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Material::from).collect())
    }

    /// Get a material by ID
    pub async fn get_material(&self, material_id: Uuid) -> AppResult<Material> {
        sqlx::query_as::<_, MaterialRow>(&format!(
            "SELECT {} FROM materials WHERE id = $1",
            MATERIAL_COLUMNS
        ))
        .bind(material_id)
        .fetch_optional(&self.db)
        .await?
        .map(Material::from)
        .ok_or_else(|| AppError::NotFound("Material".to_string()))
    }

    /// Create a new material with derived stock fields
    pub async fn create_material(
        &self,
        actor: &AuthUser,
        input: CreateMaterialInput,
    ) -> AppResult<Material> {
        actor.require(Action::Create)?;
        input.validate()?;

        let new_material = NewMaterial::from(input);
        validate_new_material(&new_material)
            .map_err(|(field, message)| AppError::validation(field, message))?;

        self.ensure_references(new_material.supplier_id, new_material.warehouse_id)
            .await?;

        let material = Material::new(Uuid::new_v4(), new_material, Utc::now());

        sqlx::query(
            r#"
            INSERT INTO materials (
                id, material_code, name, supplier_id, warehouse_id, unit,
                current_quantity, reorder_point, safety_stock, avg_daily_usage,
                lead_time_days, status, shortage_date, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            "#,
        )
        .bind(material.id)
        .bind(&material.material_code)
        .bind(&material.name)
        .bind(material.supplier_id)
        .bind(material.warehouse_id)
        .bind(&material.unit)
        .bind(material.current_quantity)
        .bind(material.reorder_point)
        .bind(material.safety_stock)
        .bind(material.avg_daily_usage)
        .bind(material.lead_time_days)
        .bind(material.status().as_str())
        .bind(material.shortage_date())
        .bind(material.created_at)
        .bind(material.updated_at)
        .execute(&self.db)
        .await
        .map_err(|e| AppError::from_db(e, "material_code"))?;

        tracing::info!(
            material_id = %material.id,
            code = %material.material_code,
            status = %material.status(),
            "Created material"
        );

        Ok(material)
    }

    /// Update the editable fields of a material and re-derive its status
    pub async fn update_material(
        &self,
        actor: &AuthUser,
        material_id: Uuid,
        input: UpdateMaterialInput,
    ) -> AppResult<Material> {
        actor.require(Action::Edit)?;
        input.check()?;

        let update = MaterialUpdate::from(input);
        self.ensure_references(
            update.supplier_id.flatten(),
            update.warehouse_id.flatten(),
        )
        .await?;

        let mut tx = self.db.begin().await?;

        let mut material = lock_material(&mut *tx, material_id).await?;
        material.apply_update(update, Utc::now());
        store_material(&mut *tx, &material).await?;

        tx.commit().await?;

        tracing::info!(
            material_id = %material.id,
            status = %material.status(),
            "Updated material"
        );

        Ok(material)
    }

    /// Delete a material that has no stock history
    pub async fn delete_material(&self, actor: &AuthUser, material_id: Uuid) -> AppResult<()> {
        actor.require(Action::Delete)?;

        let result = sqlx::query("DELETE FROM materials WHERE id = $1")
            .bind(material_id)
            .execute(&self.db)
            .await
            .map_err(|e| match AppError::from_db(e, "material") {
                AppError::Conflict { resource, .. } => AppError::Conflict {
                    resource,
                    message: "Material has stock history and cannot be deleted".to_string(),
                },
                other => other,
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Material".to_string()));
        }

        tracing::info!(material_id = %material_id, actor = %actor.user_id, "Deleted material");
        Ok(())
    }

    /// Check that referenced supplier and warehouse exist
    async fn ensure_references(
        &self,
        supplier_id: Option<Uuid>,
        warehouse_id: Option<Uuid>,
    ) -> AppResult<()> {
        if let Some(supplier_id) = supplier_id {
            let exists = sqlx::query_scalar::<_, bool>(
                "SELECT EXISTS(SELECT 1 FROM suppliers WHERE id = $1)",
            )
            .bind(supplier_id)
            .fetch_one(&self.db)
            .await?;

            if !exists {
                return Err(AppError::NotFound("Supplier".to_string()));
            }
        }

        if let Some(warehouse_id) = warehouse_id {
            let exists = sqlx::query_scalar::<_, bool>(
                "SELECT EXISTS(SELECT 1 FROM warehouses WHERE id = $1)",
            )
            .bind(warehouse_id)
            .fetch_one(&self.db)
            .await?;

            if !exists {
                return Err(AppError::NotFound("Warehouse".to_string()));
            }
        }

        Ok(())
    }
}
