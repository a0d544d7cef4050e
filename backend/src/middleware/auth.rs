//! Authentication middleware
//!
//! JWT authentication and role-based access control

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::{IntoResponse, Response},
};
use shared::models::{Action, UserRole};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::auth::{decode_token, TokenKind};
use crate::services::user::{AccountAccess, UserService};
use crate::AppState;

/// Authenticated user information extracted from JWT
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub role: UserRole,
}

impl AuthUser {
    /// Check if the user's role allows an action
    pub fn can(&self, action: Action) -> bool {
        self.role.can(action)
    }

    /// Permission guard for use in handlers and services
    pub fn require(&self, action: Action) -> AppResult<()> {
        if self.can(action) {
            Ok(())
        } else {
            tracing::warn!(
                user_id = %self.user_id,
                role = %self.role,
                ?action,
                "Permission denied"
            );
            Err(AppError::InsufficientPermissions)
        }
    }
}

/// Build the request identity from the stored account.
///
/// Unknown or deactivated accounts are rejected even with a valid token.
pub fn resolve_auth_user(user_id: Uuid, access: Option<AccountAccess>) -> AppResult<AuthUser> {
    match access {
        Some(AccountAccess { role, is_active: true }) => Ok(AuthUser { user_id, role }),
        Some(_) => Err(AppError::Unauthorized("Account is disabled".to_string())),
        None => Err(AppError::Unauthenticated),
    }
}

/// Authentication middleware that validates bearer access tokens
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "));

    let Some(token) = token else {
        return AppError::Unauthorized("Missing or invalid Authorization header".to_string())
            .into_response();
    };

    let claims = match decode_token(token, &state.config.jwt.secret) {
        Ok(claims) => claims,
        Err(e) => return e.into_response(),
    };

    if claims.kind != TokenKind::Access {
        return AppError::InvalidToken.into_response();
    }

    let user_id = match claims.user_id() {
        Ok(id) => id,
        Err(e) => return e.into_response(),
    };

    // Roles change without reissuing tokens, so permissions come from the stored account
    let access = match UserService::new(state.db.clone()).account_access(user_id).await {
        Ok(access) => access,
        Err(e) => return e.into_response(),
    };

    let auth_user = match resolve_auth_user(user_id, access) {
        Ok(user) => user,
        Err(e) => return e.into_response(),
    };

    request.extensions_mut().insert(auth_user);

    next.run(request).await
}

/// Extractor for authenticated user
/// Use this in handlers to get the current user
#[derive(Clone, Debug)]
pub struct CurrentUser(pub AuthUser);

#[axum::async_trait]
impl<S> axum::extract::FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .map(CurrentUser)
            .ok_or(AppError::Unauthenticated)
    }
}
