use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobRow {
    pub id: Uuid,
    pub client_id: Uuid,
    pub title: String,
    pub description: String,
    pub status: String,
    pub job_type: String,
    pub required_skills: Vec<String>,
    pub min_experience_years: i32,
    pub education_requirement: Option<String>,
    pub created_at: DateTime<Utc>,
}
