//! Career report generation — the model call plus output validation and repair.
//!
//! Flow: build_messages → model.complete → parse_report →
//!       (rejected) append bad answer + repair prompt → model.complete → parse_report.
//!
//! Exactly one repair round trip is allowed. Transport failures are never
//! repaired: there is no answer to repair against.

use serde_json::Value;
use tracing::debug;

use crate::llm_client::{strip_json_fences, ChatMessage, ChatModel};
use crate::profile::{validate_profile, ProfileInput};
use crate::report::error::{OutputStage, ReportError};
use crate::report::prompts::{build_messages, build_repair_prompt};
use crate::report::schema::{validate_report, CareerReport};

/// Why a raw answer was rejected, with the fence-stripped text kept for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFailure {
    pub stage: OutputStage,
    pub message: String,
    pub cleaned: String,
}

/// Strips a markdown fence if present, parses, and validates against the schema.
pub fn parse_report(raw: &str) -> Result<CareerReport, OutputFailure> {
    let cleaned = strip_json_fences(raw);

    let value: Value = serde_json::from_str(cleaned).map_err(|e| OutputFailure {
        stage: OutputStage::Parse,
        message: format!("Response is not valid JSON: {e}"),
        cleaned: cleaned.to_string(),
    })?;

    validate_report(&value).map_err(|e| OutputFailure {
        stage: OutputStage::Schema,
        message: e.to_string(),
        cleaned: cleaned.to_string(),
    })
}

/// Produces a validated report for an already validated profile.
pub async fn generate_career_report(
    model: &dyn ChatModel,
    profile: &ProfileInput,
) -> Result<CareerReport, ReportError> {
    let mut messages = build_messages(profile);

    let first = model.complete(&messages).await?;
    let failure = match parse_report(&first) {
        Ok(report) => return Ok(report),
        Err(failure) => failure,
    };

    debug!(
        "First answer rejected at {:?} stage ({} chars), requesting repair",
        failure.stage,
        failure.cleaned.len()
    );

    let repair = build_repair_prompt(&first, &failure.message);
    messages.push(ChatMessage::assistant(first));
    messages.push(ChatMessage::user(repair));

    let second = model.complete(&messages).await?;
    parse_report(&second).map_err(|f| ReportError::Output {
        stage: f.stage,
        message: format!(
            "AI response failed validation after repair attempt: {}",
            f.message
        ),
    })
}

/// Validates an untrusted payload, then generates. Input errors never reach the model.
pub async fn generate_from_payload(
    model: &dyn ChatModel,
    payload: &Value,
) -> Result<(ProfileInput, CareerReport), ReportError> {
    let profile = validate_profile(payload)?;
    let report = generate_career_report(model, &profile).await?;
    Ok((profile, report))
}
