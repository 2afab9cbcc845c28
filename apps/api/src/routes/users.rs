use std::str::FromStr;

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::extract::AuthUser;
use crate::auth::permissions::{Permission, Role};
use crate::errors::AppError;
use crate::identity::{IdentityError, IdentityUser};
use crate::models::user::UserRow;
use crate::routes::{message_only, ok, ApiResponse};
use crate::state::AppState;
use crate::store::publish_snapshot;
use crate::sync::Collection;

#[derive(Deserialize)]
pub struct CreateUserRequest {
    pub external_id: String,
    pub email: String,
    pub name: String,
    pub role: String,
}

#[derive(Deserialize)]
pub struct UpdateUserRequest {
    pub email: Option<String>,
    pub name: Option<String>,
    pub role: Option<String>,
}

#[derive(Serialize)]
pub struct SyncResponse {
    pub synced: usize,
}

fn validate_role(role: &str) -> Result<Role, AppError> {
    Role::from_str(role).map_err(AppError::Validation)
}

/// GET /api/v1/users
pub async fn handle_list(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<ApiResponse<Vec<UserRow>>>, AppError> {
    user.require(Permission::ViewUsers)?;
    let users = sqlx::query_as::<_, UserRow>("SELECT * FROM users ORDER BY created_at DESC")
        .fetch_all(&state.db)
        .await?;
    Ok(ok(users))
}

/// GET /api/v1/users/:id
pub async fn handle_get(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    user: AuthUser,
) -> Result<Json<ApiResponse<UserRow>>, AppError> {
    user.require(Permission::ViewUsers)?;
    let row = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {id} not found")))?;
    Ok(ok(row))
}

/// POST /api/v1/users
pub async fn handle_create(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<CreateUserRequest>,
) -> Result<Json<ApiResponse<UserRow>>, AppError> {
    user.require(Permission::ManageUsers)?;
    let role = validate_role(&req.role)?;

    let row = sqlx::query_as::<_, UserRow>(
        r#"
        INSERT INTO users (external_id, email, name, role)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(&req.external_id)
    .bind(&req.email)
    .bind(&req.name)
    .bind(role.as_str())
    .fetch_one(&state.db)
    .await?;

    publish_snapshot(&state, Collection::Users).await;
    Ok(ok(row))
}

/// PATCH /api/v1/users/:id
pub async fn handle_update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    user: AuthUser,
    Json(req): Json<UpdateUserRequest>,
) -> Result<Json<ApiResponse<UserRow>>, AppError> {
    user.require(Permission::ManageUsers)?;
    if let Some(role) = req.role.as_deref() {
        validate_role(role)?;
    }

    let row = sqlx::query_as::<_, UserRow>(
        r#"
        UPDATE users
        SET email = COALESCE($2, email),
            name = COALESCE($3, name),
            role = COALESCE($4, role)
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(req.email)
    .bind(req.name)
    .bind(req.role)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("User {id} not found")))?;

    publish_snapshot(&state, Collection::Users).await;
    Ok(ok(row))
}

/// DELETE /api/v1/users/:id
pub async fn handle_delete(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    user: AuthUser,
) -> Result<Json<ApiResponse<()>>, AppError> {
    user.require(Permission::ManageUsers)?;
    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id)
        .execute(&state.db)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("User {id} not found")));
    }

    publish_snapshot(&state, Collection::Users).await;
    Ok(message_only("User deleted"))
}

/// GET /api/v1/users/directory/:external_id
///
/// Looks a single entry up in the identity-provider directory without
/// touching the local `users` table.
pub async fn handle_lookup(
    State(state): State<AppState>,
    Path(external_id): Path<String>,
    user: AuthUser,
) -> Result<Json<ApiResponse<IdentityUser>>, AppError> {
    user.require(Permission::ViewUsers)?;

    match state.identity.get_user(&external_id).await {
        Ok(entry) => Ok(ok(entry)),
        Err(IdentityError::Api { status: 404, .. }) => Err(AppError::NotFound(format!(
            "Directory entry {external_id} not found"
        ))),
        Err(e) => Err(e.into()),
    }
}

/// POST /api/v1/users/sync
///
/// Pulls the identity-provider directory and upserts it into the local
/// `users` table. New entries default to viewer unless the directory carries
/// a recognizable role; existing rows keep their locally assigned role.
pub async fn handle_sync(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<ApiResponse<SyncResponse>>, AppError> {
    user.require(Permission::ManageUsers)?;

    let directory = state.identity.list_users().await?;
    let synced = directory.len();

    for entry in directory {
        let role = entry
            .role
            .as_deref()
            .and_then(|r| Role::from_str(r).ok())
            .unwrap_or(Role::Viewer);

        sqlx::query(
            r#"
            INSERT INTO users (external_id, email, name, role)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (external_id)
            DO UPDATE SET email = EXCLUDED.email, name = EXCLUDED.name
            "#,
        )
        .bind(&entry.id)
        .bind(&entry.email)
        .bind(&entry.name)
        .bind(role.as_str())
        .execute(&state.db)
        .await?;
    }

    tracing::info!(requested_by = %user.user_id, "synced {synced} directory users");

    publish_snapshot(&state, Collection::Users).await;
    Ok(ok(SyncResponse { synced }))
}
