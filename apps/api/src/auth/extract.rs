//! The `AuthUser` extractor: the server-side guard.
//!
//! Missing or invalid credentials reject with 401; an authenticated user
//! lacking a required permission is rejected with 403 by `require`. Handlers
//! call `user.require(permission)?` before touching data.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use uuid::Uuid;

use crate::auth::permissions::{has_permission, is_admin, Permission, Role};
use crate::errors::AppError;
use crate::state::AppState;

/// An authenticated user extracted from the `Authorization: Bearer <token>`
/// header.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub role: Role,
}

impl AuthUser {
    /// Guard: passes iff the user's role grants `permission`.
    pub fn require(&self, permission: Permission) -> Result<(), AppError> {
        if has_permission(self.role, permission) {
            Ok(())
        } else {
            Err(AppError::Forbidden)
        }
    }

    /// Guard for admin-only operations.
    pub fn require_admin(&self) -> Result<(), AppError> {
        if is_admin(self.role) {
            Ok(())
        } else {
            Err(AppError::Forbidden)
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or(AppError::Unauthorized)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(AppError::Unauthorized)?;

        let claims = state.jwt.verify(token).map_err(|e| {
            tracing::debug!("token rejected: {e}");
            AppError::Unauthorized
        })?;

        Ok(AuthUser {
            user_id: claims.user_id,
            role: claims.role,
        })
    }
}
