//! Collection snapshot fetches for the sync hub.
//!
//! Every collection is read in full, ordered by creation time descending,
//! which is exactly the shape subscribers receive. Snapshot publication
//! after a write is best-effort: failures are logged, the originating
//! request still succeeds.

use anyhow::Result;
use serde::Serialize;
use serde_json::Value;
use sqlx::PgPool;
use tracing::warn;

use crate::models::application::ApplicationRow;
use crate::models::candidate::{CandidateApplicationRow, CandidateRow};
use crate::models::client::ClientRow;
use crate::models::email::{EmailRow, EmailTemplateRow};
use crate::models::interview::InterviewRow;
use crate::models::job::JobRow;
use crate::models::user::UserRow;
use crate::state::AppState;
use crate::sync::Collection;

/// Fetches the full materialized result set for one collection, newest first.
pub async fn collection_snapshot(pool: &PgPool, collection: Collection) -> Result<Vec<Value>> {
    match collection {
        Collection::Users => {
            to_documents(
                sqlx::query_as::<_, UserRow>("SELECT * FROM users ORDER BY created_at DESC")
                    .fetch_all(pool)
                    .await?,
            )
        }
        Collection::Clients => {
            to_documents(
                sqlx::query_as::<_, ClientRow>("SELECT * FROM clients ORDER BY created_at DESC")
                    .fetch_all(pool)
                    .await?,
            )
        }
        Collection::Jobs => {
            to_documents(
                sqlx::query_as::<_, JobRow>("SELECT * FROM jobs ORDER BY created_at DESC")
                    .fetch_all(pool)
                    .await?,
            )
        }
        Collection::Candidates => to_documents(
            sqlx::query_as::<_, CandidateRow>("SELECT * FROM candidates ORDER BY created_at DESC")
                .fetch_all(pool)
                .await?,
        ),
        Collection::CandidateApplications => to_documents(
            sqlx::query_as::<_, CandidateApplicationRow>(
                "SELECT * FROM candidate_applications ORDER BY created_at DESC",
            )
            .fetch_all(pool)
            .await?,
        ),
        Collection::Applications => to_documents(
            sqlx::query_as::<_, ApplicationRow>(
                "SELECT * FROM applications ORDER BY created_at DESC",
            )
            .fetch_all(pool)
            .await?,
        ),
        Collection::Interviews => to_documents(
            sqlx::query_as::<_, InterviewRow>("SELECT * FROM interviews ORDER BY created_at DESC")
                .fetch_all(pool)
                .await?,
        ),
        Collection::Emails => {
            to_documents(
                sqlx::query_as::<_, EmailRow>("SELECT * FROM emails ORDER BY created_at DESC")
                    .fetch_all(pool)
                    .await?,
            )
        }
        Collection::EmailTemplates => to_documents(
            sqlx::query_as::<_, EmailTemplateRow>(
                "SELECT * FROM email_templates ORDER BY created_at DESC",
            )
            .fetch_all(pool)
            .await?,
        ),
    }
}

/// Re-reads `collection` and pushes the snapshot to the hub. Called after
/// every mutation; errors are logged only, never returned to the caller.
pub async fn publish_snapshot(state: &AppState, collection: Collection) {
    match collection_snapshot(&state.db, collection).await {
        Ok(documents) => state.hub.publish(collection, documents),
        Err(e) => warn!("snapshot publish for {collection} failed: {e}"),
    }
}

fn to_documents<T: Serialize>(rows: Vec<T>) -> Result<Vec<Value>> {
    rows.into_iter()
        .map(|row| serde_json::to_value(row).map_err(Into::into))
        .collect()
}
