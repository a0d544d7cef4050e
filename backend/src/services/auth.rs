//! Authentication service for account registration, login, and tokens

use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use shared::models::UserRole;
use shared::validation::{validate_email, validate_password};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::services::user::{UserProfile, UserRow};

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    db: PgPool,
    jwt_secret: String,
    access_token_expiry: i64,
    refresh_token_expiry: i64,
}

/// Input for registering a new account
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterInput {
    #[validate(length(min = 1, max = 200, message = "Full name is required"))]
    pub full_name: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

/// Input for logging in
#[derive(Debug, Deserialize, Validate)]
pub struct LoginInput {
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Input for exchanging a refresh token
#[derive(Debug, Deserialize)]
pub struct RefreshInput {
    pub refresh_token: String,
}

/// Which flow a token may be used for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub role: UserRole,
    pub kind: TokenKind,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn user_id(&self) -> AppResult<Uuid> {
        Uuid::parse_str(&self.sub).map_err(|_| AppError::InvalidToken)
    }
}

/// Authentication tokens
#[derive(Debug, Serialize)]
pub struct AuthTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// Response after successful registration or login
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: UserProfile,
    #[serde(flatten)]
    pub tokens: AuthTokens,
}

/// Decode and validate a token signed with `secret`
pub fn decode_token(token: &str, secret: &str) -> AppResult<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => AppError::TokenExpired,
        _ => AppError::InvalidToken,
    })
}

impl AuthService {
    /// Create a new AuthService instance
    pub fn new(db: PgPool, config: &Config) -> Self {
        Self {
            db,
            jwt_secret: config.jwt.secret.clone(),
            access_token_expiry: config.jwt.access_token_expiry,
            refresh_token_expiry: config.jwt.refresh_token_expiry,
        }
    }

    /// Register a new account.
    ///
    /// The first account on an empty installation becomes admin; every
    /// later account starts as staff and is promoted by an admin.
    pub async fn register(&self, input: RegisterInput) -> AppResult<AuthResponse> {
        input.validate()?;
        validate_email(&input.email).map_err(|m| AppError::validation("email", m))?;
        validate_password(&input.password).map_err(|m| AppError::validation("password", m))?;

        let email = input.email.trim().to_lowercase();

        let password_hash = hash(&input.password, DEFAULT_COST)
            .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))?;

        let mut tx = self.db.begin().await?;

        // Serializes concurrent first registrations
        sqlx::query("LOCK TABLE user_profiles IN SHARE ROW EXCLUSIVE MODE")
            .execute(&mut *tx)
            .await?;

        let existing_users = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM user_profiles")
            .fetch_one(&mut *tx)
            .await?;

        let role = if existing_users == 0 {
            UserRole::Admin
        } else {
            UserRole::Staff
        };

        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO user_profiles (email, full_name, role, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING id, email, full_name, role, password_hash, is_active, created_at, last_login_at
            "#,
        )
        .bind(&email)
        .bind(input.full_name.trim())
        .bind(role.as_str())
        .bind(&password_hash)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::from_db(e, "email"))?;

        tx.commit().await?;

        let user = row.into_profile()?;
        tracing::info!(user_id = %user.id, role = %user.role, "Registered user");

        let tokens = self.generate_tokens(user.id, user.role)?;
        Ok(AuthResponse { user, tokens })
    }

    /// Authenticate user with email and password
    pub async fn login(&self, input: LoginInput) -> AppResult<AuthResponse> {
        input.validate()?;

        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, full_name, role, password_hash, is_active, created_at, last_login_at
            FROM user_profiles
            WHERE email = $1
            "#,
        )
        .bind(input.email.trim().to_lowercase())
        .fetch_optional(&self.db)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

        if !row.is_active {
            return Err(AppError::Unauthorized("Account is disabled".to_string()));
        }

        let valid = verify(&input.password, &row.password_hash)
            .map_err(|e| AppError::Internal(format!("Password verification failed: {}", e)))?;

        if !valid {
            return Err(AppError::InvalidCredentials);
        }

        sqlx::query("UPDATE user_profiles SET last_login_at = NOW() WHERE id = $1")
            .bind(row.id)
            .execute(&self.db)
            .await?;

        let user = row.into_profile()?;
        let tokens = self.generate_tokens(user.id, user.role)?;
        Ok(AuthResponse { user, tokens })
    }

    /// Issue new tokens from a refresh token, picking up role changes
    pub async fn refresh(&self, input: RefreshInput) -> AppResult<AuthTokens> {
        let claims = decode_token(&input.refresh_token, &self.jwt_secret)?;
        if claims.kind != TokenKind::Refresh {
            return Err(AppError::InvalidToken);
        }

        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, full_name, role, password_hash, is_active, created_at, last_login_at
            FROM user_profiles
            WHERE id = $1
            "#,
        )
        .bind(claims.user_id()?)
        .fetch_optional(&self.db)
        .await?
        .filter(|row| row.is_active)
        .ok_or_else(|| AppError::Unauthorized("Invalid or expired refresh token".to_string()))?;

        let user = row.into_profile()?;
        self.generate_tokens(user.id, user.role)
    }

    /// Generate access and refresh tokens
    fn generate_tokens(&self, user_id: Uuid, role: UserRole) -> AppResult<AuthTokens> {
        let access_token = self.sign(user_id, role, TokenKind::Access, self.access_token_expiry)?;
        let refresh_token =
            self.sign(user_id, role, TokenKind::Refresh, self.refresh_token_expiry)?;

        Ok(AuthTokens {
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: self.access_token_expiry,
        })
    }

    fn sign(&self, user_id: Uuid, role: UserRole, kind: TokenKind, ttl: i64) -> AppResult<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            role,
            kind,
            exp: (now + Duration::seconds(ttl)).timestamp(),
            iat: now.timestamp(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    fn signed(claims: &Claims) -> String {
        encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn test_decode_round_trips_claims() {
        let user_id = Uuid::new_v4();
        let token = signed(&Claims {
            sub: user_id.to_string(),
            role: UserRole::Manager,
            kind: TokenKind::Access,
            exp: (Utc::now() + Duration::minutes(5)).timestamp(),
            iat: Utc::now().timestamp(),
        });

        let claims = decode_token(&token, SECRET).unwrap();
        assert_eq!(claims.user_id().unwrap(), user_id);
        assert_eq!(claims.role, UserRole::Manager);
        assert_eq!(claims.kind, TokenKind::Access);
    }

    #[test]
    fn test_expired_token_is_reported() {
        let token = signed(&Claims {
            sub: Uuid::new_v4().to_string(),
            role: UserRole::Staff,
            kind: TokenKind::Access,
            exp: (Utc::now() - Duration::hours(2)).timestamp(),
            iat: (Utc::now() - Duration::hours(3)).timestamp(),
        });

        assert!(matches!(decode_token(&token, SECRET), Err(AppError::TokenExpired)));
    }

    #[test]
    fn test_wrong_secret_is_invalid() {
        let token = signed(&Claims {
            sub: Uuid::new_v4().to_string(),
            role: UserRole::Staff,
            kind: TokenKind::Refresh,
            exp: (Utc::now() + Duration::minutes(5)).timestamp(),
            iat: Utc::now().timestamp(),
        });

        assert!(matches!(decode_token(&token, "other"), Err(AppError::InvalidToken)));
    }
}
