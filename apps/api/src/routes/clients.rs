use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use crate::auth::extract::AuthUser;
use crate::auth::permissions::Permission;
use crate::errors::AppError;
use crate::models::candidate::CandidateApplicationRow;
use crate::models::client::ClientRow;
use crate::models::job::JobRow;
use crate::pipeline::stats::{client_statistics, ClientStatistics};
use crate::routes::{message_only, ok, ApiResponse};
use crate::state::AppState;
use crate::store::publish_snapshot;
use crate::sync::Collection;

#[derive(Deserialize)]
pub struct CreateClientRequest {
    pub company_name: String,
    pub industry: Option<String>,
    pub website: Option<String>,
    pub location: Option<String>,
    #[serde(default = "empty_contacts")]
    pub contacts: Value,
}

#[derive(Deserialize)]
pub struct UpdateClientRequest {
    pub company_name: Option<String>,
    pub industry: Option<String>,
    pub website: Option<String>,
    pub location: Option<String>,
    pub contacts: Option<Value>,
}

fn empty_contacts() -> Value {
    Value::Array(vec![])
}

fn validate_contacts(contacts: &Value) -> Result<(), AppError> {
    if contacts.is_array() {
        Ok(())
    } else {
        Err(AppError::Validation(
            "contacts must be an array of contact records".to_string(),
        ))
    }
}

/// GET /api/v1/clients
pub async fn handle_list(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<ApiResponse<Vec<ClientRow>>>, AppError> {
    user.require(Permission::ViewClients)?;
    let clients = sqlx::query_as::<_, ClientRow>("SELECT * FROM clients ORDER BY created_at DESC")
        .fetch_all(&state.db)
        .await?;
    Ok(ok(clients))
}

/// GET /api/v1/clients/:id
pub async fn handle_get(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    user: AuthUser,
) -> Result<Json<ApiResponse<ClientRow>>, AppError> {
    user.require(Permission::ViewClients)?;
    let row = fetch_client(&state, id).await?;
    Ok(ok(row))
}

/// POST /api/v1/clients
pub async fn handle_create(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<CreateClientRequest>,
) -> Result<Json<ApiResponse<ClientRow>>, AppError> {
    user.require(Permission::CreateClients)?;
    validate_contacts(&req.contacts)?;
    if req.company_name.trim().is_empty() {
        return Err(AppError::Validation("company_name is required".to_string()));
    }

    let row = sqlx::query_as::<_, ClientRow>(
        r#"
        INSERT INTO clients (company_name, industry, website, location, contacts)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(&req.company_name)
    .bind(&req.industry)
    .bind(&req.website)
    .bind(&req.location)
    .bind(&req.contacts)
    .fetch_one(&state.db)
    .await?;

    publish_snapshot(&state, Collection::Clients).await;
    Ok(ok(row))
}

/// PATCH /api/v1/clients/:id
pub async fn handle_update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    user: AuthUser,
    Json(req): Json<UpdateClientRequest>,
) -> Result<Json<ApiResponse<ClientRow>>, AppError> {
    user.require(Permission::EditClients)?;
    if let Some(contacts) = &req.contacts {
        validate_contacts(contacts)?;
    }

    let row = sqlx::query_as::<_, ClientRow>(
        r#"
        UPDATE clients
        SET company_name = COALESCE($2, company_name),
            industry = COALESCE($3, industry),
            website = COALESCE($4, website),
            location = COALESCE($5, location),
            contacts = COALESCE($6, contacts)
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(req.company_name)
    .bind(req.industry)
    .bind(req.website)
    .bind(req.location)
    .bind(req.contacts)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Client {id} not found")))?;

    publish_snapshot(&state, Collection::Clients).await;
    Ok(ok(row))
}

/// DELETE /api/v1/clients/:id
pub async fn handle_delete(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    user: AuthUser,
) -> Result<Json<ApiResponse<()>>, AppError> {
    user.require(Permission::DeleteClients)?;
    let result = sqlx::query("DELETE FROM clients WHERE id = $1")
        .bind(id)
        .execute(&state.db)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Client {id} not found")));
    }

    publish_snapshot(&state, Collection::Clients).await;
    Ok(message_only("Client deleted"))
}

/// GET /api/v1/clients/:id/statistics
///
/// Recomputed from full scans on every call; nothing is cached.
pub async fn handle_statistics(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    user: AuthUser,
) -> Result<Json<ApiResponse<ClientStatistics>>, AppError> {
    user.require(Permission::ViewReports)?;
    fetch_client(&state, id).await?;

    let jobs = sqlx::query_as::<_, JobRow>("SELECT * FROM jobs ORDER BY created_at DESC")
        .fetch_all(&state.db)
        .await?;
    let candidate_apps = sqlx::query_as::<_, CandidateApplicationRow>(
        "SELECT * FROM candidate_applications ORDER BY created_at DESC",
    )
    .fetch_all(&state.db)
    .await?;

    Ok(ok(client_statistics(id, &jobs, &candidate_apps)))
}

async fn fetch_client(state: &AppState, id: Uuid) -> Result<ClientRow, AppError> {
    sqlx::query_as::<_, ClientRow>("SELECT * FROM clients WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Client {id} not found")))
}
