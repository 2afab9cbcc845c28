use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CandidateRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub skills: Vec<String>,
    pub experience_years: i32,
    pub education: Option<String>,
    pub resume_text: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Per-job application sub-record. One row per (candidate, job); the single
/// source of truth for job/candidate membership.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CandidateApplicationRow {
    pub id: Uuid,
    pub candidate_id: Uuid,
    pub job_id: Uuid,
    pub status: String,
    pub created_at: DateTime<Utc>,
}
