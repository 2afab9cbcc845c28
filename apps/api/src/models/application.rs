use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// An inbound application. On approval it is promoted into a `CandidateRow`
/// and `candidate_id` records the promotion target.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ApplicationRow {
    pub id: Uuid,
    pub job_id: Uuid,
    pub client_id: Uuid,
    pub applicant_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub skills: Vec<String>,
    pub experience_years: i32,
    pub education: Option<String>,
    pub resume_text: Option<String>,
    pub status: String,
    pub candidate_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}
