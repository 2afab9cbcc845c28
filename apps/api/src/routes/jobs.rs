use std::str::FromStr;

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::extract::AuthUser;
use crate::auth::permissions::Permission;
use crate::errors::AppError;
use crate::models::candidate::CandidateApplicationRow;
use crate::models::job::JobRow;
use crate::models::status::{JobStatus, JobType};
use crate::pipeline::stats::{job_statistics, JobStatistics};
use crate::pipeline::transitions::check_job_transition;
use crate::routes::{message_only, ok, ApiResponse};
use crate::state::AppState;
use crate::store::publish_snapshot;
use crate::sync::Collection;

#[derive(Deserialize)]
pub struct CreateJobRequest {
    pub client_id: Uuid,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub job_type: Option<String>,
    #[serde(default)]
    pub required_skills: Vec<String>,
    #[serde(default)]
    pub min_experience_years: i32,
    pub education_requirement: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateJobRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub job_type: Option<String>,
    pub required_skills: Option<Vec<String>>,
    pub min_experience_years: Option<i32>,
    pub education_requirement: Option<String>,
}

#[derive(Deserialize)]
pub struct StatusRequest {
    pub status: String,
}

/// GET /api/v1/jobs
pub async fn handle_list(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<ApiResponse<Vec<JobRow>>>, AppError> {
    user.require(Permission::ViewJobs)?;
    let jobs = sqlx::query_as::<_, JobRow>("SELECT * FROM jobs ORDER BY created_at DESC")
        .fetch_all(&state.db)
        .await?;
    Ok(ok(jobs))
}

/// GET /api/v1/jobs/:id
pub async fn handle_get(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    user: AuthUser,
) -> Result<Json<ApiResponse<JobRow>>, AppError> {
    user.require(Permission::ViewJobs)?;
    Ok(ok(fetch_job(&state, id).await?))
}

/// POST /api/v1/jobs
///
/// New jobs always start in draft; opening them is a status transition.
pub async fn handle_create(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<CreateJobRequest>,
) -> Result<Json<ApiResponse<JobRow>>, AppError> {
    user.require(Permission::CreateJobs)?;
    if req.title.trim().is_empty() {
        return Err(AppError::Validation("title is required".to_string()));
    }
    let job_type = match req.job_type.as_deref() {
        Some(t) => JobType::from_str(t).map_err(AppError::Validation)?,
        None => JobType::FullTime,
    };

    // Reject jobs for clients that do not exist; the consistency checker
    // only has to catch drift, not bad input.
    let client_exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS (SELECT 1 FROM clients WHERE id = $1)",
    )
    .bind(req.client_id)
    .fetch_one(&state.db)
    .await?;
    if !client_exists {
        return Err(AppError::Validation(format!(
            "client {} does not exist",
            req.client_id
        )));
    }

    let row = sqlx::query_as::<_, JobRow>(
        r#"
        INSERT INTO jobs
            (client_id, title, description, status, job_type,
             required_skills, min_experience_years, education_requirement)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING *
        "#,
    )
    .bind(req.client_id)
    .bind(&req.title)
    .bind(&req.description)
    .bind(JobStatus::Draft.as_str())
    .bind(job_type.as_str())
    .bind(&req.required_skills)
    .bind(req.min_experience_years)
    .bind(&req.education_requirement)
    .fetch_one(&state.db)
    .await?;

    publish_snapshot(&state, Collection::Jobs).await;
    Ok(ok(row))
}

/// PATCH /api/v1/jobs/:id
pub async fn handle_update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    user: AuthUser,
    Json(req): Json<UpdateJobRequest>,
) -> Result<Json<ApiResponse<JobRow>>, AppError> {
    user.require(Permission::EditJobs)?;
    if let Some(t) = req.job_type.as_deref() {
        JobType::from_str(t).map_err(AppError::Validation)?;
    }

    let row = sqlx::query_as::<_, JobRow>(
        r#"
        UPDATE jobs
        SET title = COALESCE($2, title),
            description = COALESCE($3, description),
            job_type = COALESCE($4, job_type),
            required_skills = COALESCE($5, required_skills),
            min_experience_years = COALESCE($6, min_experience_years),
            education_requirement = COALESCE($7, education_requirement)
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(req.title)
    .bind(req.description)
    .bind(req.job_type)
    .bind(req.required_skills)
    .bind(req.min_experience_years)
    .bind(req.education_requirement)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Job {id} not found")))?;

    publish_snapshot(&state, Collection::Jobs).await;
    Ok(ok(row))
}

/// PATCH /api/v1/jobs/:id/status
///
/// The only way a job's status changes; the transition table decides.
pub async fn handle_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    user: AuthUser,
    Json(req): Json<StatusRequest>,
) -> Result<Json<ApiResponse<JobRow>>, AppError> {
    user.require(Permission::EditJobs)?;

    let job = fetch_job(&state, id).await?;
    let current = JobStatus::from_str(&job.status).map_err(AppError::Validation)?;
    let target = JobStatus::from_str(&req.status).map_err(AppError::Validation)?;
    check_job_transition(current, target)?;

    let row = sqlx::query_as::<_, JobRow>(
        "UPDATE jobs SET status = $2 WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(target.as_str())
    .fetch_one(&state.db)
    .await?;

    tracing::info!(changed_by = %user.user_id, "job {id} moved {current} -> {target}");

    publish_snapshot(&state, Collection::Jobs).await;
    Ok(ok(row))
}

/// DELETE /api/v1/jobs/:id
pub async fn handle_delete(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    user: AuthUser,
) -> Result<Json<ApiResponse<()>>, AppError> {
    user.require(Permission::DeleteJobs)?;
    let result = sqlx::query("DELETE FROM jobs WHERE id = $1")
        .bind(id)
        .execute(&state.db)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Job {id} not found")));
    }

    publish_snapshot(&state, Collection::Jobs).await;
    Ok(message_only("Job deleted"))
}

/// GET /api/v1/jobs/:id/statistics
pub async fn handle_statistics(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    user: AuthUser,
) -> Result<Json<ApiResponse<JobStatistics>>, AppError> {
    user.require(Permission::ViewReports)?;
    fetch_job(&state, id).await?;

    let candidate_apps = sqlx::query_as::<_, CandidateApplicationRow>(
        "SELECT * FROM candidate_applications ORDER BY created_at DESC",
    )
    .fetch_all(&state.db)
    .await?;

    Ok(ok(job_statistics(id, &candidate_apps)))
}

async fn fetch_job(state: &AppState, id: Uuid) -> Result<JobRow, AppError> {
    sqlx::query_as::<_, JobRow>("SELECT * FROM jobs WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job {id} not found")))
}
