use std::str::FromStr;

use axum::extract::{Path, State};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::extract::AuthUser;
use crate::auth::permissions::Permission;
use crate::errors::AppError;
use crate::models::interview::InterviewRow;
use crate::models::status::InterviewStatus;
use crate::routes::{message_only, ok, ApiResponse};
use crate::state::AppState;
use crate::store::publish_snapshot;
use crate::sync::Collection;

#[derive(Deserialize)]
pub struct CreateInterviewRequest {
    pub candidate_id: Uuid,
    pub job_id: Uuid,
    pub scheduled_at: DateTime<Utc>,
    pub interviewer: String,
    pub notes: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateInterviewRequest {
    pub scheduled_at: Option<DateTime<Utc>>,
    pub interviewer: Option<String>,
    pub status: Option<String>,
    pub notes: Option<String>,
}

/// GET /api/v1/interviews
pub async fn handle_list(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<ApiResponse<Vec<InterviewRow>>>, AppError> {
    user.require(Permission::ViewInterviews)?;
    let rows =
        sqlx::query_as::<_, InterviewRow>("SELECT * FROM interviews ORDER BY created_at DESC")
            .fetch_all(&state.db)
            .await?;
    Ok(ok(rows))
}

/// GET /api/v1/interviews/:id
pub async fn handle_get(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    user: AuthUser,
) -> Result<Json<ApiResponse<InterviewRow>>, AppError> {
    user.require(Permission::ViewInterviews)?;
    let row = sqlx::query_as::<_, InterviewRow>("SELECT * FROM interviews WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Interview {id} not found")))?;
    Ok(ok(row))
}

/// POST /api/v1/interviews
pub async fn handle_create(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<CreateInterviewRequest>,
) -> Result<Json<ApiResponse<InterviewRow>>, AppError> {
    user.require(Permission::ScheduleInterviews)?;

    // The candidate must already be in the job's pipeline.
    let attached = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS (SELECT 1 FROM candidate_applications WHERE candidate_id = $1 AND job_id = $2)",
    )
    .bind(req.candidate_id)
    .bind(req.job_id)
    .fetch_one(&state.db)
    .await?;
    if !attached {
        return Err(AppError::Validation(
            "candidate is not in this job's pipeline".to_string(),
        ));
    }

    let row = sqlx::query_as::<_, InterviewRow>(
        r#"
        INSERT INTO interviews (candidate_id, job_id, scheduled_at, interviewer, status, notes)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(req.candidate_id)
    .bind(req.job_id)
    .bind(req.scheduled_at)
    .bind(&req.interviewer)
    .bind(InterviewStatus::Scheduled.as_str())
    .bind(&req.notes)
    .fetch_one(&state.db)
    .await?;

    publish_snapshot(&state, Collection::Interviews).await;
    Ok(ok(row))
}

/// PATCH /api/v1/interviews/:id
pub async fn handle_update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    user: AuthUser,
    Json(req): Json<UpdateInterviewRequest>,
) -> Result<Json<ApiResponse<InterviewRow>>, AppError> {
    user.require(Permission::EditInterviews)?;
    if let Some(status) = req.status.as_deref() {
        InterviewStatus::from_str(status).map_err(AppError::Validation)?;
    }

    let row = sqlx::query_as::<_, InterviewRow>(
        r#"
        UPDATE interviews
        SET scheduled_at = COALESCE($2, scheduled_at),
            interviewer = COALESCE($3, interviewer),
            status = COALESCE($4, status),
            notes = COALESCE($5, notes)
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(req.scheduled_at)
    .bind(req.interviewer)
    .bind(req.status)
    .bind(req.notes)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Interview {id} not found")))?;

    publish_snapshot(&state, Collection::Interviews).await;
    Ok(ok(row))
}

/// DELETE /api/v1/interviews/:id
pub async fn handle_delete(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    user: AuthUser,
) -> Result<Json<ApiResponse<()>>, AppError> {
    user.require(Permission::EditInterviews)?;
    let result = sqlx::query("DELETE FROM interviews WHERE id = $1")
        .bind(id)
        .execute(&state.db)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Interview {id} not found")));
    }

    publish_snapshot(&state, Collection::Interviews).await;
    Ok(message_only("Interview deleted"))
}
