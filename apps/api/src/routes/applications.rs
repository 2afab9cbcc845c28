use std::str::FromStr;

use axum::extract::{Path, State};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::extract::AuthUser;
use crate::auth::permissions::Permission;
use crate::errors::AppError;
use crate::models::application::ApplicationRow;
use crate::models::candidate::CandidateRow;
use crate::models::job::JobRow;
use crate::models::status::{ApplicationStatus, PipelineStatus};
use crate::pipeline::scoring::ResumeScore;
use crate::pipeline::transitions::check_application_transition;
use crate::pipeline::workflow::approve_application;
use crate::routes::{message_only, ok, ApiResponse};
use crate::state::AppState;
use crate::store::publish_snapshot;
use crate::sync::Collection;

#[derive(Deserialize)]
pub struct CreateApplicationRequest {
    pub job_id: Uuid,
    pub applicant_name: String,
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
pub struct StatusRequest {
    pub status: String,
}

#[derive(Serialize)]
pub struct PromotionResponse {
    pub application: ApplicationRow,
    pub candidate: CandidateRow,
}

/// GET /api/v1/applications
pub async fn handle_list(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<ApiResponse<Vec<ApplicationRow>>>, AppError> {
    user.require(Permission::ViewApplications)?;
    let rows =
        sqlx::query_as::<_, ApplicationRow>("SELECT * FROM applications ORDER BY created_at DESC")
            .fetch_all(&state.db)
            .await?;
    Ok(ok(rows))
}

/// GET /api/v1/applications/:id
pub async fn handle_get(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    user: AuthUser,
) -> Result<Json<ApiResponse<ApplicationRow>>, AppError> {
    user.require(Permission::ViewApplications)?;
    Ok(ok(fetch_application(&state, id).await?))
}

/// POST /api/v1/applications
///
/// The client id is derived from the target job, never taken from the
/// payload, so the pair cannot disagree at the source.
pub async fn handle_create(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<CreateApplicationRequest>,
) -> Result<Json<ApiResponse<ApplicationRow>>, AppError> {
    user.require(Permission::CreateApplications)?;
    if req.applicant_name.trim().is_empty() || req.email.trim().is_empty() {
        return Err(AppError::Validation(
            "applicant_name and email are required".to_string(),
        ));
    }

    let job = sqlx::query_as::<_, JobRow>("SELECT * FROM jobs WHERE id = $1")
        .bind(req.job_id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::Validation(format!("job {} does not exist", req.job_id)))?;

    let row = sqlx::query_as::<_, ApplicationRow>(
        r#"
        INSERT INTO applications
            (job_id, client_id, applicant_name, email, phone,
             skills, experience_years, education, resume_text, status)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        RETURNING *
        "#,
    )
    .bind(job.id)
    .bind(job.client_id)
    .bind(&req.applicant_name)
    .bind(&req.email)
    .bind(&req.phone)
    .bind(&req.skills)
    .bind(req.experience_years)
    .bind(&req.education)
    .bind(&req.resume_text)
    .bind(ApplicationStatus::Pending.as_str())
    .fetch_one(&state.db)
    .await?;

    publish_snapshot(&state, Collection::Applications).await;
    Ok(ok(row))
}

/// PATCH /api/v1/applications/:id/status
///
/// Approval is not reachable here: it goes through `/approve` so the
/// candidate promotion can never be skipped.
pub async fn handle_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    user: AuthUser,
    Json(req): Json<StatusRequest>,
) -> Result<Json<ApiResponse<ApplicationRow>>, AppError> {
    user.require(Permission::ReviewApplications)?;

    let target = ApplicationStatus::from_str(&req.status).map_err(AppError::Validation)?;
    if target == ApplicationStatus::Approved {
        return Err(AppError::Validation(
            "use POST /applications/:id/approve to approve an application".to_string(),
        ));
    }

    let existing = fetch_application(&state, id).await?;
    let current = ApplicationStatus::from_str(&existing.status).map_err(AppError::Validation)?;
    check_application_transition(current, target)?;

    let row = sqlx::query_as::<_, ApplicationRow>(
        "UPDATE applications SET status = $2 WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(target.as_str())
    .fetch_one(&state.db)
    .await?;

    publish_snapshot(&state, Collection::Applications).await;
    Ok(ok(row))
}

/// POST /api/v1/applications/:id/approve
///
/// Promotes the application into a candidate record. The candidate insert,
/// pipeline attach, and application update commit in one transaction, so a
/// partial failure cannot leave the promotion half-applied.
pub async fn handle_approve(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    user: AuthUser,
) -> Result<Json<ApiResponse<PromotionResponse>>, AppError> {
    user.require(Permission::ReviewApplications)?;

    let existing = fetch_application(&state, id).await?;
    let current = ApplicationStatus::from_str(&existing.status).map_err(AppError::Validation)?;
    check_application_transition(current, ApplicationStatus::Approved)?;

    let promotion = approve_application(existing, Utc::now());
    let candidate = &promotion.candidate;
    let application = &promotion.application;

    let mut tx = state.db.begin().await?;

    sqlx::query(
        r#"
        INSERT INTO candidates
            (id, name, email, phone, skills, experience_years, education, resume_text, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        "#,
    )
    .bind(candidate.id)
    .bind(&candidate.name)
    .bind(&candidate.email)
    .bind(&candidate.phone)
    .bind(&candidate.skills)
    .bind(candidate.experience_years)
    .bind(&candidate.education)
    .bind(&candidate.resume_text)
    .bind(candidate.created_at)
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        "INSERT INTO candidate_applications (candidate_id, job_id, status) VALUES ($1, $2, $3)",
    )
    .bind(candidate.id)
    .bind(application.job_id)
    .bind(PipelineStatus::New.as_str())
    .execute(&mut *tx)
    .await?;

    sqlx::query("UPDATE applications SET status = $2, candidate_id = $3 WHERE id = $1")
        .bind(application.id)
        .bind(&application.status)
        .bind(application.candidate_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    tracing::info!(
        approved_by = %user.user_id,
        "application {} promoted to candidate {}",
        application.id,
        candidate.id
    );

    publish_snapshot(&state, Collection::Applications).await;
    publish_snapshot(&state, Collection::Candidates).await;
    publish_snapshot(&state, Collection::CandidateApplications).await;

    Ok(ok(PromotionResponse {
        application: promotion.application,
        candidate: promotion.candidate,
    }))
}

/// GET /api/v1/applications/:id/score
pub async fn handle_score(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    user: AuthUser,
) -> Result<Json<ApiResponse<ResumeScore>>, AppError> {
    user.require(Permission::ViewApplications)?;

    let application = fetch_application(&state, id).await?;
    let job = sqlx::query_as::<_, JobRow>("SELECT * FROM jobs WHERE id = $1")
        .bind(application.job_id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("Job {} not found", application.job_id))
        })?;

    let score = state.scorer.score(&application, &job).await?;
    Ok(ok(score))
}

/// DELETE /api/v1/applications/:id
pub async fn handle_delete(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    user: AuthUser,
) -> Result<Json<ApiResponse<()>>, AppError> {
    user.require(Permission::DeleteApplications)?;
    let result = sqlx::query("DELETE FROM applications WHERE id = $1")
        .bind(id)
        .execute(&state.db)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Application {id} not found")));
    }

    publish_snapshot(&state, Collection::Applications).await;
    Ok(message_only("Application deleted"))
}

async fn fetch_application(state: &AppState, id: Uuid) -> Result<ApplicationRow, AppError> {
    sqlx::query_as::<_, ApplicationRow>("SELECT * FROM applications WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Application {id} not found")))
}
