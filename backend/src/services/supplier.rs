//! Supplier service

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::models::Action;
use shared::validation::{validate_email, validate_name};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;

/// Supplier service for managing material suppliers
#[derive(Clone)]
pub struct SupplierService {
    db: PgPool,
}

/// Supplier information
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Supplier {
    pub id: Uuid,
    pub name: String,
    pub contact_person: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a supplier
#[derive(Debug, Deserialize, Validate)]
pub struct CreateSupplierInput {
    #[validate(length(min = 1, max = 200, message = "Supplier name is required"))]
    pub name: String,
    pub contact_person: Option<String>,
    pub email: Option<String>,
    #[validate(length(max = 50, message = "Phone number is too long"))]
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// Input for updating a supplier
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateSupplierInput {
    #[validate(length(min = 1, max = 200, message = "Supplier name cannot be empty"))]
    pub name: Option<String>,
    pub contact_person: Option<String>,
    pub email: Option<String>,
    #[validate(length(max = 50, message = "Phone number is too long"))]
    pub phone: Option<String>,
    pub address: Option<String>,
}

fn check_email(email: Option<&String>) -> AppResult<()> {
    match email {
        Some(email) => validate_email(email).map_err(|m| AppError::validation("email", m)),
        None => Ok(()),
    }
}

impl SupplierService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Get all suppliers
    pub async fn list_suppliers(&self) -> AppResult<Vec<Supplier>> {
        let suppliers = sqlx::query_as::<_, Supplier>(
            r#"
            SELECT id, name, contact_person, email, phone, address, created_at, updated_at
            FROM suppliers
            ORDER BY name ASC
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(suppliers)
    }

    /// Get a supplier by ID
    pub async fn get_supplier(&self, supplier_id: Uuid) -> AppResult<Supplier> {
        sqlx::query_as::<_, Supplier>(
            r#"
            SELECT id, name, contact_person, email, phone, address, created_at, updated_at
            FROM suppliers
            WHERE id = $1
            "#,
        )
        .bind(supplier_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Supplier".to_string()))
    }

    /// Create a new supplier
    pub async fn create_supplier(
        &self,
        actor: &AuthUser,
        input: CreateSupplierInput,
    ) -> AppResult<Supplier> {
        actor.require(Action::Create)?;
        input.validate()?;
        validate_name(&input.name).map_err(|m| AppError::validation("name", m))?;
        check_email(input.email.as_ref())?;

        let supplier = sqlx::query_as::<_, Supplier>(
            r#"
            INSERT INTO suppliers (name, contact_person, email, phone, address)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, contact_person, email, phone, address, created_at, updated_at
            "#,
        )
        .bind(input.name.trim())
        .bind(&input.contact_person)
        .bind(&input.email)
        .bind(&input.phone)
        .bind(&input.address)
        .fetch_one(&self.db)
        .await
        .map_err(|e| AppError::from_db(e, "supplier"))?;

        tracing::info!(supplier_id = %supplier.id, "Created supplier");
        Ok(supplier)
    }

    /// Update a supplier
    pub async fn update_supplier(
        &self,
        actor: &AuthUser,
        supplier_id: Uuid,
        input: UpdateSupplierInput,
    ) -> AppResult<Supplier> {
        actor.require(Action::Edit)?;
        input.validate()?;
        if let Some(name) = &input.name {
            validate_name(name).map_err(|m| AppError::validation("name", m))?;
        }
        check_email(input.email.as_ref())?;

        let existing = self.get_supplier(supplier_id).await?;

        let supplier = sqlx::query_as::<_, Supplier>(
            r#"
            UPDATE suppliers
            SET name = $1, contact_person = $2, email = $3, phone = $4, address = $5,
                updated_at = NOW()
            WHERE id = $6
            RETURNING id, name, contact_person, email, phone, address, created_at, updated_at
            "#,
        )
        .bind(input.name.as_deref().map(str::trim).unwrap_or(&existing.name))
        .bind(input.contact_person.or(existing.contact_person))
        .bind(input.email.or(existing.email))
        .bind(input.phone.or(existing.phone))
        .bind(input.address.or(existing.address))
        .bind(supplier_id)
        .fetch_one(&self.db)
        .await
        .map_err(|e| AppError::from_db(e, "supplier"))?;

        Ok(supplier)
    }

    /// Delete a supplier. Materials keep existing with the reference cleared.
    pub async fn delete_supplier(&self, actor: &AuthUser, supplier_id: Uuid) -> AppResult<()> {
        actor.require(Action::Delete)?;

        let result = sqlx::query("DELETE FROM suppliers WHERE id = $1")
            .bind(supplier_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Supplier".to_string()));
        }

        tracing::info!(supplier_id = %supplier_id, actor = %actor.user_id, "Deleted supplier");
        Ok(())
    }
}
