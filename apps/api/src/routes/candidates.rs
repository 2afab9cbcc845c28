use std::str::FromStr;

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::extract::AuthUser;
use crate::auth::permissions::Permission;
use crate::errors::AppError;
use crate::models::candidate::{CandidateApplicationRow, CandidateRow};
use crate::models::status::PipelineStatus;
use crate::pipeline::transitions::check_pipeline_transition;
use crate::pipeline::workflow::map_stage_to_status;
use crate::routes::{message_only, ok, ApiResponse};
use crate::state::AppState;
use crate::store::publish_snapshot;
use crate::sync::Collection;

#[derive(Deserialize)]
pub struct CreateCandidateRequest {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub experience_years: i32,
    pub education: Option<String>,
    pub resume_text: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateCandidateRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub skills: Option<Vec<String>>,
    pub experience_years: Option<i32>,
    pub education: Option<String>,
    pub resume_text: Option<String>,
}

#[derive(Deserialize)]
pub struct AttachJobRequest {
    pub job_id: Uuid,
    /// Pipeline-board stage id; unrecognized values land the candidate in
    /// the default stage.
    pub stage_id: Option<String>,
}

#[derive(Deserialize)]
pub struct StageMoveRequest {
    /// Either a stage id (mapped through the stage table)...
    pub stage_id: Option<String>,
    /// ...or a pipeline status directly.
    pub status: Option<String>,
}

/// GET /api/v1/candidates
pub async fn handle_list(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<ApiResponse<Vec<CandidateRow>>>, AppError> {
    user.require(Permission::ViewCandidates)?;
    let rows =
        sqlx::query_as::<_, CandidateRow>("SELECT * FROM candidates ORDER BY created_at DESC")
            .fetch_all(&state.db)
            .await?;
    Ok(ok(rows))
}

/// GET /api/v1/candidates/:id
pub async fn handle_get(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    user: AuthUser,
) -> Result<Json<ApiResponse<CandidateRow>>, AppError> {
    user.require(Permission::ViewCandidates)?;
    Ok(ok(fetch_candidate(&state, id).await?))
}

/// POST /api/v1/candidates
pub async fn handle_create(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<CreateCandidateRequest>,
) -> Result<Json<ApiResponse<CandidateRow>>, AppError> {
    user.require(Permission::CreateCandidates)?;
    if req.name.trim().is_empty() || req.email.trim().is_empty() {
        return Err(AppError::Validation(
            "name and email are required".to_string(),
        ));
    }

    let row = sqlx::query_as::<_, CandidateRow>(
        r#"
        INSERT INTO candidates
            (name, email, phone, skills, experience_years, education, resume_text)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING *
        "#,
    )
    .bind(&req.name)
    .bind(&req.email)
    .bind(&req.phone)
    .bind(&req.skills)
    .bind(req.experience_years)
    .bind(&req.education)
    .bind(&req.resume_text)
    .fetch_one(&state.db)
    .await?;

    publish_snapshot(&state, Collection::Candidates).await;
    Ok(ok(row))
}

/// PATCH /api/v1/candidates/:id
pub async fn handle_update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    user: AuthUser,
    Json(req): Json<UpdateCandidateRequest>,
) -> Result<Json<ApiResponse<CandidateRow>>, AppError> {
    user.require(Permission::EditCandidates)?;

    let row = sqlx::query_as::<_, CandidateRow>(
        r#"
        UPDATE candidates
        SET name = COALESCE($2, name),
            email = COALESCE($3, email),
            phone = COALESCE($4, phone),
            skills = COALESCE($5, skills),
            experience_years = COALESCE($6, experience_years),
            education = COALESCE($7, education),
            resume_text = COALESCE($8, resume_text)
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(req.name)
    .bind(req.email)
    .bind(req.phone)
    .bind(req.skills)
    .bind(req.experience_years)
    .bind(req.education)
    .bind(req.resume_text)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Candidate {id} not found")))?;

    publish_snapshot(&state, Collection::Candidates).await;
    Ok(ok(row))
}

/// DELETE /api/v1/candidates/:id
pub async fn handle_delete(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    user: AuthUser,
) -> Result<Json<ApiResponse<()>>, AppError> {
    user.require(Permission::DeleteCandidates)?;
    let result = sqlx::query("DELETE FROM candidates WHERE id = $1")
        .bind(id)
        .execute(&state.db)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Candidate {id} not found")));
    }

    publish_snapshot(&state, Collection::Candidates).await;
    Ok(message_only("Candidate deleted"))
}

/// POST /api/v1/candidates/:id/applications
///
/// Attaches the candidate to a job pipeline. Membership lives only in
/// `candidate_applications`; there are no id arrays to keep in step.
pub async fn handle_attach_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    user: AuthUser,
    Json(req): Json<AttachJobRequest>,
) -> Result<Json<ApiResponse<CandidateApplicationRow>>, AppError> {
    user.require(Permission::EditCandidates)?;
    fetch_candidate(&state, id).await?;

    let job_exists =
        sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM jobs WHERE id = $1)")
            .bind(req.job_id)
            .fetch_one(&state.db)
            .await?;
    if !job_exists {
        return Err(AppError::Validation(format!(
            "job {} does not exist",
            req.job_id
        )));
    }

    let already_attached = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS (SELECT 1 FROM candidate_applications WHERE candidate_id = $1 AND job_id = $2)",
    )
    .bind(id)
    .bind(req.job_id)
    .fetch_one(&state.db)
    .await?;
    if already_attached {
        return Err(AppError::Validation(
            "candidate is already in this job's pipeline".to_string(),
        ));
    }

    let status = map_stage_to_status(req.stage_id.as_deref().unwrap_or("applied"));
    let row = sqlx::query_as::<_, CandidateApplicationRow>(
        r#"
        INSERT INTO candidate_applications (candidate_id, job_id, status)
        VALUES ($1, $2, $3)
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(req.job_id)
    .bind(status.as_str())
    .fetch_one(&state.db)
    .await?;

    publish_snapshot(&state, Collection::CandidateApplications).await;
    Ok(ok(row))
}

/// PATCH /api/v1/candidates/:id/applications/:job_id/status
pub async fn handle_stage_move(
    State(state): State<AppState>,
    Path((id, job_id)): Path<(Uuid, Uuid)>,
    user: AuthUser,
    Json(req): Json<StageMoveRequest>,
) -> Result<Json<ApiResponse<CandidateApplicationRow>>, AppError> {
    user.require(Permission::EditCandidates)?;

    let target = match (req.stage_id.as_deref(), req.status.as_deref()) {
        (Some(stage), _) => map_stage_to_status(stage),
        (None, Some(status)) => PipelineStatus::from_str(status).map_err(AppError::Validation)?,
        (None, None) => {
            return Err(AppError::Validation(
                "either stage_id or status is required".to_string(),
            ))
        }
    };

    let existing = sqlx::query_as::<_, CandidateApplicationRow>(
        "SELECT * FROM candidate_applications WHERE candidate_id = $1 AND job_id = $2",
    )
    .bind(id)
    .bind(job_id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| {
        AppError::NotFound(format!("Candidate {id} has no application for job {job_id}"))
    })?;

    let current = PipelineStatus::from_str(&existing.status).map_err(AppError::Validation)?;
    check_pipeline_transition(current, target)?;

    let row = sqlx::query_as::<_, CandidateApplicationRow>(
        "UPDATE candidate_applications SET status = $2 WHERE id = $1 RETURNING *",
    )
    .bind(existing.id)
    .bind(target.as_str())
    .fetch_one(&state.db)
    .await?;

    publish_snapshot(&state, Collection::CandidateApplications).await;
    Ok(ok(row))
}

async fn fetch_candidate(state: &AppState, id: Uuid) -> Result<CandidateRow, AppError> {
    sqlx::query_as::<_, CandidateRow>("SELECT * FROM candidates WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Candidate {id} not found")))
}
