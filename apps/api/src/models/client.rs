use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// A client company. Job membership is derived from `jobs.client_id`,
/// not stored here.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ClientRow {
    pub id: Uuid,
    pub company_name: String,
    pub industry: Option<String>,
    pub website: Option<String>,
    pub location: Option<String>,
    /// Contact records as a JSON array of `{name, email, phone?, title?}`.
    pub contacts: Value,
    pub created_at: DateTime<Utc>,
}
