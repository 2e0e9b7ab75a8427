//! Input Validator — turns an untrusted form payload into a bounded `ProfileInput`.
//!
//! Every failing field is reported, not just the first one, so the form can
//! highlight all problems in a single round trip. Strings are trimmed before
//! their bounds are checked.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::profile::models::{EducationLevel, ProfileInput};

pub const MAX_LIST_ENTRIES: usize = 30;
pub const MAX_ENTRY_CHARS: usize = 100;
pub const MAX_GOAL_CHARS: usize = 300;
pub const MAX_NAME_CHARS: usize = 100;

/// One rejected field, e.g. `skills.3` / `Skill must be at most 100 characters`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldIssue {
    pub path: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", join_issues(.issues))]
pub struct InputValidationError {
    pub issues: Vec<FieldIssue>,
}

fn join_issues(issues: &[FieldIssue]) -> String {
    issues
        .iter()
        .map(|i| format!("{}: {}", i.path, i.reason))
        .collect::<Vec<_>>()
        .join("; ")
}

struct Issues(Vec<FieldIssue>);

impl Issues {
    fn push(&mut self, path: impl Into<String>, reason: impl Into<String>) {
        self.0.push(FieldIssue {
            path: path.into(),
            reason: reason.into(),
        });
    }
}

/// Validates a parsed JSON body. Pure: no I/O, no logging.
pub fn validate_profile(payload: &Value) -> Result<ProfileInput, InputValidationError> {
    let mut issues = Issues(Vec::new());

    let Some(obj) = payload.as_object() else {
        issues.push("body", "Expected a JSON object");
        return Err(InputValidationError { issues: issues.0 });
    };

    let education = education_field(obj, &mut issues);
    let skills = string_list_field(obj, "skills", "skill", "Skill", &mut issues);
    let interests = string_list_field(obj, "interests", "interest", "Interest", &mut issues);
    let goal = optional_text_field(obj, "goal", "Goal", MAX_GOAL_CHARS, &mut issues);
    let name = optional_text_field(obj, "name", "Name", MAX_NAME_CHARS, &mut issues);

    match (education, skills, interests, goal, name) {
        (Some(education), Some(skills), Some(interests), Some(goal), Some(name))
            if issues.0.is_empty() =>
        {
            Ok(ProfileInput {
                education,
                skills,
                interests,
                goal,
                name,
            })
        }
        _ => Err(InputValidationError { issues: issues.0 }),
    }
}

fn education_field(obj: &Map<String, Value>, issues: &mut Issues) -> Option<EducationLevel> {
    match obj.get("education") {
        None | Some(Value::Null) => {
            issues.push("education", "Education level is required");
            None
        }
        Some(Value::String(s)) => {
            let level = EducationLevel::parse(s.trim());
            if level.is_none() {
                issues.push(
                    "education",
                    format!(
                        "Invalid education level. Expected one of: {}",
                        EducationLevel::ALL
                            .iter()
                            .map(|l| l.as_str())
                            .collect::<Vec<_>>()
                            .join(", ")
                    ),
                );
            }
            level
        }
        Some(_) => {
            issues.push("education", "Expected a string");
            None
        }
    }
}

fn string_list_field(
    obj: &Map<String, Value>,
    field: &str,
    noun: &str,
    label: &str,
    issues: &mut Issues,
) -> Option<Vec<String>> {
    let items = match obj.get(field) {
        None | Some(Value::Null) => {
            issues.push(field, format!("At least one {noun} is required"));
            return None;
        }
        Some(Value::Array(items)) => items,
        Some(_) => {
            issues.push(field, format!("Expected a list of {field}"));
            return None;
        }
    };

    if items.is_empty() {
        issues.push(field, format!("At least one {noun} is required"));
        return None;
    }
    if items.len() > MAX_LIST_ENTRIES {
        issues.push(
            field,
            format!("At most {MAX_LIST_ENTRIES} {field} are allowed"),
        );
    }

    let mut values = Vec::with_capacity(items.len());
    for (idx, item) in items.iter().enumerate() {
        let path = format!("{field}.{idx}");
        let Some(text) = item.as_str() else {
            issues.push(path, "Expected a string");
            continue;
        };
        let text = text.trim();
        if text.is_empty() {
            issues.push(path, format!("{label} cannot be empty"));
        } else if text.chars().count() > MAX_ENTRY_CHARS {
            issues.push(
                path,
                format!("{label} must be at most {MAX_ENTRY_CHARS} characters"),
            );
        } else {
            values.push(text.to_string());
        }
    }
    Some(values)
}

fn optional_text_field(
    obj: &Map<String, Value>,
    field: &str,
    label: &str,
    max_chars: usize,
    issues: &mut Issues,
) -> Option<String> {
    match obj.get(field) {
        None | Some(Value::Null) => Some(String::new()),
        Some(Value::String(s)) => {
            let text = s.trim();
            if text.chars().count() > max_chars {
                issues.push(
                    field,
                    format!("{label} must be at most {max_chars} characters"),
                );
                None
            } else {
                Some(text.to_string())
            }
        }
        Some(_) => {
            issues.push(field, "Expected a string");
            None
        }
    }
}
