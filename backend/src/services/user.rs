//! User profile service

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::models::{Action, UserRole};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;

/// User profile service
#[derive(Clone)]
pub struct UserService {
    db: PgPool,
}

/// Row from user_profiles
#[derive(Debug, sqlx::FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub role: String,
    pub password_hash: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

impl UserRow {
    pub fn into_profile(self) -> AppResult<UserProfile> {
        let role = self
            .role
            .parse::<UserRole>()
            .map_err(AppError::Internal)?;

        Ok(UserProfile {
            id: self.id,
            email: self.email,
            full_name: self.full_name,
            role,
            is_active: self.is_active,
            created_at: self.created_at,
            last_login_at: self.last_login_at,
        })
    }
}

/// Public view of a user account
#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub role: UserRole,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

/// Current role and status of an account, as stored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountAccess {
    pub role: UserRole,
    pub is_active: bool,
}

/// Input for changing a user's role
#[derive(Debug, Deserialize)]
pub struct UpdateRoleInput {
    pub role: UserRole,
}

const SELECT_USER: &str = r#"
    SELECT id, email, full_name, role, password_hash, is_active, created_at, last_login_at
    FROM user_profiles
"#;

impl UserService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Get the profile of a user
    pub async fn get_profile(&self, user_id: Uuid) -> AppResult<UserProfile> {
        sqlx::query_as::<_, UserRow>(&format!("{} WHERE id = $1", SELECT_USER))
            .bind(user_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("User".to_string()))?
            .into_profile()
    }

    /// Stored role and active flag of an account, if it exists
    pub async fn account_access(&self, user_id: Uuid) -> AppResult<Option<AccountAccess>> {
        let row = sqlx::query_as::<_, (String, bool)>(
            "SELECT role, is_active FROM user_profiles WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?;

        row.map(|(role, is_active)| {
            let role = role.parse::<UserRole>().map_err(AppError::Internal)?;
            Ok(AccountAccess { role, is_active })
        })
        .transpose()
    }

    /// List all users
    pub async fn list_users(&self, actor: &AuthUser) -> AppResult<Vec<UserProfile>> {
        actor.require(Action::ManageUsers)?;

        sqlx::query_as::<_, UserRow>(&format!("{} ORDER BY full_name ASC", SELECT_USER))
            .fetch_all(&self.db)
            .await?
            .into_iter()
            .map(UserRow::into_profile)
            .collect()
    }

    /// Change a user's role
    pub async fn update_role(
        &self,
        actor: &AuthUser,
        user_id: Uuid,
        input: UpdateRoleInput,
    ) -> AppResult<UserProfile> {
        actor.require(Action::ManageUsers)?;

        if actor.user_id == user_id {
            return Err(AppError::Conflict {
                resource: "role".to_string(),
                message: "You cannot change your own role".to_string(),
            });
        }

        let row = sqlx::query_as::<_, UserRow>(
            r#"
            UPDATE user_profiles
            SET role = $1
            WHERE id = $2
            RETURNING id, email, full_name, role, password_hash, is_active, created_at, last_login_at
            "#,
        )
        .bind(input.role.as_str())
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("User".to_string()))?;

        tracing::info!(
            actor = %actor.user_id,
            user_id = %user_id,
            role = %input.role,
            "Changed user role"
        );

        row.into_profile()
    }
}
