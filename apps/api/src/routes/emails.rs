//! Email records and templates. Sending records an `EmailRow`; delivery
//! itself happens outside this service.

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::extract::AuthUser;
use crate::auth::permissions::Permission;
use crate::errors::AppError;
use crate::models::email::{EmailRow, EmailTemplateRow};
use crate::routes::{message_only, ok, ApiResponse};
use crate::state::AppState;
use crate::store::publish_snapshot;
use crate::sync::Collection;

#[derive(Deserialize)]
pub struct SendEmailRequest {
    pub recipient: String,
    /// Explicit subject/body, or fall back to the template's.
    pub subject: Option<String>,
    pub body: Option<String>,
    pub template_id: Option<Uuid>,
}

#[derive(Deserialize)]
pub struct CreateTemplateRequest {
    pub name: String,
    pub subject: String,
    pub body: String,
}

#[derive(Deserialize)]
pub struct UpdateTemplateRequest {
    pub name: Option<String>,
    pub subject: Option<String>,
    pub body: Option<String>,
}

/// GET /api/v1/emails
pub async fn handle_list(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<ApiResponse<Vec<EmailRow>>>, AppError> {
    user.require(Permission::ViewEmails)?;
    let rows = sqlx::query_as::<_, EmailRow>("SELECT * FROM emails ORDER BY created_at DESC")
        .fetch_all(&state.db)
        .await?;
    Ok(ok(rows))
}

/// POST /api/v1/emails
pub async fn handle_send(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<SendEmailRequest>,
) -> Result<Json<ApiResponse<EmailRow>>, AppError> {
    user.require(Permission::SendEmails)?;
    if req.recipient.trim().is_empty() {
        return Err(AppError::Validation("recipient is required".to_string()));
    }

    let template = match req.template_id {
        Some(template_id) => Some(fetch_template(&state, template_id).await?),
        None => None,
    };

    let subject = req
        .subject
        .or_else(|| template.as_ref().map(|t| t.subject.clone()))
        .ok_or_else(|| {
            AppError::Validation("subject is required without a template".to_string())
        })?;
    let body = req
        .body
        .or_else(|| template.as_ref().map(|t| t.body.clone()))
        .ok_or_else(|| AppError::Validation("body is required without a template".to_string()))?;

    let row = sqlx::query_as::<_, EmailRow>(
        r#"
        INSERT INTO emails (recipient, subject, body, template_id)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(&req.recipient)
    .bind(&subject)
    .bind(&body)
    .bind(req.template_id)
    .fetch_one(&state.db)
    .await?;

    publish_snapshot(&state, Collection::Emails).await;
    Ok(ok(row))
}

/// GET /api/v1/email-templates
pub async fn handle_list_templates(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<ApiResponse<Vec<EmailTemplateRow>>>, AppError> {
    user.require(Permission::ViewEmails)?;
    let rows = sqlx::query_as::<_, EmailTemplateRow>(
        "SELECT * FROM email_templates ORDER BY created_at DESC",
    )
    .fetch_all(&state.db)
    .await?;
    Ok(ok(rows))
}

/// GET /api/v1/email-templates/:id
pub async fn handle_get_template(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    user: AuthUser,
) -> Result<Json<ApiResponse<EmailTemplateRow>>, AppError> {
    user.require(Permission::ViewEmails)?;
    Ok(ok(fetch_template(&state, id).await?))
}

/// POST /api/v1/email-templates
pub async fn handle_create_template(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<CreateTemplateRequest>,
) -> Result<Json<ApiResponse<EmailTemplateRow>>, AppError> {
    user.require(Permission::ManageEmailTemplates)?;

    let row = sqlx::query_as::<_, EmailTemplateRow>(
        r#"
        INSERT INTO email_templates (name, subject, body)
        VALUES ($1, $2, $3)
        RETURNING *
        "#,
    )
    .bind(&req.name)
    .bind(&req.subject)
    .bind(&req.body)
    .fetch_one(&state.db)
    .await?;

    publish_snapshot(&state, Collection::EmailTemplates).await;
    Ok(ok(row))
}

/// PATCH /api/v1/email-templates/:id
pub async fn handle_update_template(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    user: AuthUser,
    Json(req): Json<UpdateTemplateRequest>,
) -> Result<Json<ApiResponse<EmailTemplateRow>>, AppError> {
    user.require(Permission::ManageEmailTemplates)?;

    let row = sqlx::query_as::<_, EmailTemplateRow>(
        r#"
        UPDATE email_templates
        SET name = COALESCE($2, name),
            subject = COALESCE($3, subject),
            body = COALESCE($4, body)
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(req.name)
    .bind(req.subject)
    .bind(req.body)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Email template {id} not found")))?;

    publish_snapshot(&state, Collection::EmailTemplates).await;
    Ok(ok(row))
}

/// DELETE /api/v1/email-templates/:id
pub async fn handle_delete_template(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    user: AuthUser,
) -> Result<Json<ApiResponse<()>>, AppError> {
    user.require(Permission::ManageEmailTemplates)?;
    let result = sqlx::query("DELETE FROM email_templates WHERE id = $1")
        .bind(id)
        .execute(&state.db)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Email template {id} not found")));
    }

    publish_snapshot(&state, Collection::EmailTemplates).await;
    Ok(message_only("Email template deleted"))
}

async fn fetch_template(state: &AppState, id: Uuid) -> Result<EmailTemplateRow, AppError> {
    sqlx::query_as::<_, EmailTemplateRow>("SELECT * FROM email_templates WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Email template {id} not found")))
}
