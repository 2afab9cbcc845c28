use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EmailTemplateRow {
    pub id: Uuid,
    pub name: String,
    pub subject: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

/// A sent-email record. Delivery itself is out of scope; rows are the audit
/// trail the dashboard lists.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EmailRow {
    pub id: Uuid,
    pub recipient: String,
    pub subject: String,
    pub body: String,
    pub template_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}
