use axum::extract::State;
use axum::Json;

use crate::auth::extract::AuthUser;
use crate::auth::permissions::Permission;
use crate::errors::AppError;
use crate::models::application::ApplicationRow;
use crate::models::candidate::{CandidateApplicationRow, CandidateRow};
use crate::models::client::ClientRow;
use crate::models::job::JobRow;
use crate::relations::{check_consistency, ConsistencyReport};
use crate::routes::{ok, ApiResponse};
use crate::state::AppState;

/// GET /api/v1/admin/consistency
///
/// Runs the relationship validator over a full read of the entity tables.
/// Reports dangling references; repairs are left to a human.
pub async fn handle_consistency_check(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<ApiResponse<ConsistencyReport>>, AppError> {
    user.require(Permission::RunConsistencyCheck)?;

    let clients = sqlx::query_as::<_, ClientRow>("SELECT * FROM clients")
        .fetch_all(&state.db)
        .await?;
    let jobs = sqlx::query_as::<_, JobRow>("SELECT * FROM jobs")
        .fetch_all(&state.db)
        .await?;
    let candidates = sqlx::query_as::<_, CandidateRow>("SELECT * FROM candidates")
        .fetch_all(&state.db)
        .await?;
    let candidate_apps =
        sqlx::query_as::<_, CandidateApplicationRow>("SELECT * FROM candidate_applications")
            .fetch_all(&state.db)
            .await?;
    let applications = sqlx::query_as::<_, ApplicationRow>("SELECT * FROM applications")
        .fetch_all(&state.db)
        .await?;

    let report = check_consistency(
        &clients,
        &jobs,
        &candidates,
        &candidate_apps,
        &applications,
    );

    if !report.is_consistent() {
        tracing::warn!(
            "consistency check found {} issue(s)",
            report.issues.len()
        );
    }

    Ok(ok(report))
}
