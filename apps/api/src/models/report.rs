use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// One row of `career_reports`. Exactly one of `user_id` / `session_id` is set.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CareerReportRow {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub session_id: Option<String>,
    pub profile: Value,
    pub report: Value,
    pub model: String,
    pub prompt_version: String,
    pub created_at: DateTime<Utc>,
}
