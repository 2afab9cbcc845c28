pub mod admin;
pub mod applications;
pub mod candidates;
pub mod clients;
pub mod dashboard;
pub mod emails;
pub mod health;
pub mod interviews;
pub mod jobs;
pub mod stream;
pub mod users;

use axum::{
    routing::{get, patch, post},
    Json, Router,
};
use serde::Serialize;

use crate::state::AppState;

/// The response envelope every endpoint uses: `{ success, data, message? }`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

pub fn ok<T: Serialize>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse {
        success: true,
        data: Some(data),
        message: None,
    })
}

pub fn message_only(message: impl Into<String>) -> Json<ApiResponse<()>> {
    Json(ApiResponse {
        success: true,
        data: None,
        message: Some(message.into()),
    })
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Users
        .route(
            "/api/v1/users",
            get(users::handle_list).post(users::handle_create),
        )
        .route("/api/v1/users/sync", post(users::handle_sync))
        .route(
            "/api/v1/users/directory/:external_id",
            get(users::handle_lookup),
        )
        .route(
            "/api/v1/users/:id",
            get(users::handle_get)
                .patch(users::handle_update)
                .delete(users::handle_delete),
        )
        // Clients
        .route(
            "/api/v1/clients",
            get(clients::handle_list).post(clients::handle_create),
        )
        .route(
            "/api/v1/clients/:id",
            get(clients::handle_get)
                .patch(clients::handle_update)
                .delete(clients::handle_delete),
        )
        .route(
            "/api/v1/clients/:id/statistics",
            get(clients::handle_statistics),
        )
        // Jobs
        .route(
            "/api/v1/jobs",
            get(jobs::handle_list).post(jobs::handle_create),
        )
        .route(
            "/api/v1/jobs/:id",
            get(jobs::handle_get)
                .patch(jobs::handle_update)
                .delete(jobs::handle_delete),
        )
        .route("/api/v1/jobs/:id/status", patch(jobs::handle_status))
        .route("/api/v1/jobs/:id/statistics", get(jobs::handle_statistics))
        // Candidates
        .route(
            "/api/v1/candidates",
            get(candidates::handle_list).post(candidates::handle_create),
        )
        .route(
            "/api/v1/candidates/:id",
            get(candidates::handle_get)
                .patch(candidates::handle_update)
                .delete(candidates::handle_delete),
        )
        .route(
            "/api/v1/candidates/:id/applications",
            post(candidates::handle_attach_job),
        )
        .route(
            "/api/v1/candidates/:id/applications/:job_id/status",
            patch(candidates::handle_stage_move),
        )
        // Inbound applications
        .route(
            "/api/v1/applications",
            get(applications::handle_list).post(applications::handle_create),
        )
        .route(
            "/api/v1/applications/:id",
            get(applications::handle_get).delete(applications::handle_delete),
        )
        .route(
            "/api/v1/applications/:id/status",
            patch(applications::handle_status),
        )
        .route(
            "/api/v1/applications/:id/approve",
            post(applications::handle_approve),
        )
        .route(
            "/api/v1/applications/:id/score",
            get(applications::handle_score),
        )
        // Interviews
        .route(
            "/api/v1/interviews",
            get(interviews::handle_list).post(interviews::handle_create),
        )
        .route(
            "/api/v1/interviews/:id",
            get(interviews::handle_get)
                .patch(interviews::handle_update)
                .delete(interviews::handle_delete),
        )
        // Emails
        .route(
            "/api/v1/emails",
            get(emails::handle_list).post(emails::handle_send),
        )
        .route(
            "/api/v1/email-templates",
            get(emails::handle_list_templates).post(emails::handle_create_template),
        )
        .route(
            "/api/v1/email-templates/:id",
            get(emails::handle_get_template)
                .patch(emails::handle_update_template)
                .delete(emails::handle_delete_template),
        )
        // Rollups & ops
        .route(
            "/api/v1/dashboard/statistics",
            get(dashboard::handle_statistics),
        )
        .route(
            "/api/v1/admin/consistency",
            get(admin::handle_consistency_check),
        )
        // Real-time snapshots
        .route("/api/v1/stream/:collection", get(stream::handle_stream))
        .with_state(state)
}
