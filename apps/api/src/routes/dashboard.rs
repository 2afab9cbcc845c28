use axum::extract::State;
use axum::Json;

use crate::auth::extract::AuthUser;
use crate::auth::permissions::Permission;
use crate::errors::AppError;
use crate::models::application::ApplicationRow;
use crate::models::candidate::{CandidateApplicationRow, CandidateRow};
use crate::models::client::ClientRow;
use crate::models::job::JobRow;
use crate::pipeline::stats::{dashboard_statistics, DashboardStatistics};
use crate::routes::{ok, ApiResponse};
use crate::state::AppState;

/// GET /api/v1/dashboard/statistics
///
/// Full O(n) scans of the four collections on every call.
pub async fn handle_statistics(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<ApiResponse<DashboardStatistics>>, AppError> {
    user.require(Permission::ViewDashboard)?;

    let clients = sqlx::query_as::<_, ClientRow>("SELECT * FROM clients ORDER BY created_at DESC")
        .fetch_all(&state.db)
        .await?;
    let jobs = sqlx::query_as::<_, JobRow>("SELECT * FROM jobs ORDER BY created_at DESC")
        .fetch_all(&state.db)
        .await?;
    let candidates =
        sqlx::query_as::<_, CandidateRow>("SELECT * FROM candidates ORDER BY created_at DESC")
            .fetch_all(&state.db)
            .await?;
    let candidate_apps = sqlx::query_as::<_, CandidateApplicationRow>(
        "SELECT * FROM candidate_applications ORDER BY created_at DESC",
    )
    .fetch_all(&state.db)
    .await?;
    let applications =
        sqlx::query_as::<_, ApplicationRow>("SELECT * FROM applications ORDER BY created_at DESC")
            .fetch_all(&state.db)
            .await?;

    Ok(ok(dashboard_statistics(
        &clients,
        &jobs,
        &candidates,
        &candidate_apps,
        &applications,
    )))
}
