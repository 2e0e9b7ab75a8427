//! Report persistence. The pipeline itself never touches the database; the
//! HTTP layer stores what it returns.
//!
//! Expected table (migrations are managed outside this service):
//!
//! ```sql
//! CREATE TABLE career_reports (
//!     id             UUID PRIMARY KEY,
//!     user_id        UUID NULL,
//!     session_id     TEXT NULL,
//!     profile        JSONB NOT NULL,
//!     report         JSONB NOT NULL,
//!     model          TEXT NOT NULL,
//!     prompt_version TEXT NOT NULL,
//!     created_at     TIMESTAMPTZ NOT NULL DEFAULT now()
//! );
//! ```

use anyhow::{Context, Result};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::report::CareerReportRow;
use crate::profile::ProfileInput;
use crate::report::prompts::PROMPT_VERSION;
use crate::report::schema::CareerReport;

/// Who a report belongs to: a signed-in user or an anonymous browser session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Owner {
    User(Uuid),
    Session(String),
}

impl Owner {
    fn columns(&self) -> (Option<Uuid>, Option<&str>) {
        match self {
            Owner::User(id) => (Some(*id), None),
            Owner::Session(sid) => (None, Some(sid.as_str())),
        }
    }
}

/// A stored report decoded back into its typed form.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredReport {
    pub id: Uuid,
    pub profile: ProfileInput,
    pub report: CareerReport,
    pub model: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl TryFrom<CareerReportRow> for StoredReport {
    type Error = anyhow::Error;

    fn try_from(row: CareerReportRow) -> Result<Self> {
        Ok(StoredReport {
            id: row.id,
            profile: serde_json::from_value(row.profile)
                .with_context(|| format!("Stored profile for report {} is corrupt", row.id))?,
            report: serde_json::from_value(row.report)
                .with_context(|| format!("Stored report {} is corrupt", row.id))?,
            model: row.model,
            created_at: row.created_at,
        })
    }
}

pub async fn insert_report(
    pool: &PgPool,
    owner: &Owner,
    profile: &ProfileInput,
    report: &CareerReport,
    model: &str,
) -> Result<Uuid> {
    let id = Uuid::new_v4();
    let (user_id, session_id) = owner.columns();
    let profile_value = serde_json::to_value(profile).context("Failed to serialize profile")?;
    let report_value = serde_json::to_value(report).context("Failed to serialize report")?;

    sqlx::query(
        r#"
        INSERT INTO career_reports
            (id, user_id, session_id, profile, report, model, prompt_version)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#,
    )
    .bind(id)
    .bind(user_id)
    .bind(session_id)
    .bind(&profile_value)
    .bind(&report_value)
    .bind(model)
    .bind(PROMPT_VERSION)
    .execute(pool)
    .await
    .context("Failed to insert career report")?;

    Ok(id)
}

/// Fetches a report only if it belongs to `owner`.
pub async fn get_report(pool: &PgPool, id: Uuid, owner: &Owner) -> Result<Option<StoredReport>> {
    let (user_id, session_id) = owner.columns();
    let row: Option<CareerReportRow> = sqlx::query_as(
        r#"
        SELECT * FROM career_reports
        WHERE id = $1
          AND user_id IS NOT DISTINCT FROM $2
          AND session_id IS NOT DISTINCT FROM $3
        "#,
    )
    .bind(id)
    .bind(user_id)
    .bind(session_id)
    .fetch_optional(pool)
    .await
    .context("Failed to load career report")?;

    row.map(StoredReport::try_from).transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::models::EducationLevel;
    use crate::report::schema::fixtures::sample_report;
    use chrono::Utc;

    fn row(report: serde_json::Value) -> CareerReportRow {
        let profile = ProfileInput {
            education: EducationLevel::Graduate,
            skills: vec!["Go".to_string()],
            interests: vec!["Cloud".to_string()],
            goal: String::new(),
            name: "Sam".to_string(),
        };
        CareerReportRow {
            id: Uuid::new_v4(),
            user_id: None,
            session_id: Some("anon-1".to_string()),
            profile: serde_json::to_value(profile).unwrap(),
            report,
            model: "openai/gpt-4o-mini".to_string(),
            prompt_version: PROMPT_VERSION.to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_owner_columns_are_exclusive() {
        let id = Uuid::new_v4();
        assert_eq!(Owner::User(id).columns(), (Some(id), None));
        assert_eq!(
            Owner::Session("abc".to_string()).columns(),
            (None, Some("abc"))
        );
    }

    #[test]
    fn test_row_decodes_into_stored_report() {
        let stored =
            StoredReport::try_from(row(serde_json::to_value(sample_report()).unwrap())).unwrap();
        assert_eq!(stored.report, sample_report());
        assert_eq!(stored.profile.name, "Sam");
    }

    #[test]
    fn test_corrupt_row_is_an_error() {
        let err = StoredReport::try_from(row(serde_json::json!({"careerOverview": 1}))).unwrap_err();
        assert!(err.to_string().contains("is corrupt"));
    }
}
