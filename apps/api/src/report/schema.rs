//! Career report schema — the contract every model answer must satisfy.
//!
//! Validation walks the parsed JSON value and collects *every* violation with
//! its field path before anything is accepted, so the repair prompt can tell
//! the model exactly what to fix. Only a fully valid value is converted into
//! the typed `CareerReport`. Unknown keys are ignored.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

pub const ROADMAP_MONTHS: u64 = 6;

// ────────────────────────────────────────────────────────────────────────────
// Typed report
// ────────────────────────────────────────────────────────────────────────────

/// Shared by `demandLevel` and `priority`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Level {
    High,
    Medium,
    Low,
}

impl Level {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "High" => Some(Level::High),
            "Medium" => Some(Level::Medium),
            "Low" => Some(Level::Low),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CareerMatch {
    pub title: String,
    pub why: String,
    pub demand_level: Level,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExistingSkill {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissingSkill {
    pub name: String,
    pub priority: Level,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillGap {
    pub career_title: String,
    pub existing_skills: Vec<ExistingSkill>,
    pub missing_skills: Vec<MissingSkill>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoadmapMonth {
    pub month: u8,
    pub topics: Vec<String>,
    pub tools: Vec<String>,
    pub platforms: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningRoadmap {
    pub duration_months: u8,
    pub months: Vec<RoadmapMonth>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRolesAndOpportunities {
    pub entry_level_roles: Vec<String>,
    pub internships: Vec<String>,
    pub freelance_or_project_ideas: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrowthStep {
    pub year_range: String,
    pub role_title: String,
    pub salary_range: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specializations: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CareerGrowthPath {
    pub career_title: String,
    pub steps: Vec<GrowthStep>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CareerReport {
    pub career_overview: Vec<CareerMatch>,
    pub skill_gap_analysis: Vec<SkillGap>,
    pub learning_roadmap: LearningRoadmap,
    pub job_roles_and_opportunities: JobRolesAndOpportunities,
    pub career_growth_path: Vec<CareerGrowthPath>,
    pub personalized_advice: Vec<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Validation
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaIssue {
    pub path: String,
    pub reason: String,
}

/// All violations found in one answer, rendered as `path: reason; path: reason`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", render_issues(.issues))]
pub struct SchemaError {
    pub issues: Vec<SchemaIssue>,
}

fn render_issues(issues: &[SchemaIssue]) -> String {
    issues
        .iter()
        .map(|i| {
            if i.path.is_empty() {
                i.reason.clone()
            } else {
                format!("{}: {}", i.path, i.reason)
            }
        })
        .collect::<Vec<_>>()
        .join("; ")
}

/// Validates a parsed model answer and converts it into a `CareerReport`.
/// All-or-nothing: a single violation rejects the whole value.
pub fn validate_report(value: &Value) -> Result<CareerReport, SchemaError> {
    let mut checker = Checker::default();
    checker.report(value);

    if !checker.issues.is_empty() {
        return Err(SchemaError {
            issues: checker.issues,
        });
    }

    serde_json::from_value(value.clone()).map_err(|e| SchemaError {
        issues: vec![SchemaIssue {
            path: String::new(),
            reason: e.to_string(),
        }],
    })
}

fn child(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{path}.{key}")
    }
}

fn index(path: &str, idx: usize) -> String {
    format!("{path}.{idx}")
}

#[derive(Default)]
struct Checker {
    issues: Vec<SchemaIssue>,
}

impl Checker {
    fn fail(&mut self, path: &str, reason: impl Into<String>) {
        self.issues.push(SchemaIssue {
            path: path.to_string(),
            reason: reason.into(),
        });
    }

    fn object<'a>(&mut self, path: &str, value: &'a Value) -> Option<&'a Map<String, Value>> {
        let obj = value.as_object();
        if obj.is_none() {
            self.fail(path, "Expected object");
        }
        obj
    }

    fn field<'a>(
        &mut self,
        path: &str,
        obj: &'a Map<String, Value>,
        key: &str,
    ) -> Option<(String, &'a Value)> {
        let field_path = child(path, key);
        match obj.get(key) {
            Some(value) => Some((field_path, value)),
            None => {
                self.fail(&field_path, "Required");
                None
            }
        }
    }

    fn array<'a>(
        &mut self,
        path: &str,
        value: &'a Value,
        min: usize,
        max: Option<usize>,
    ) -> Option<&'a Vec<Value>> {
        let Some(items) = value.as_array() else {
            self.fail(path, "Expected array");
            return None;
        };
        if items.len() < min {
            self.fail(
                path,
                format!("Must contain at least {min} entries, got {}", items.len()),
            );
        }
        if let Some(max) = max {
            if items.len() > max {
                self.fail(
                    path,
                    format!("Must contain at most {max} entries, got {}", items.len()),
                );
            }
        }
        Some(items)
    }

    fn string(&mut self, path: &str, value: &Value, non_empty: bool) {
        match value.as_str() {
            Some(s) if non_empty && s.trim().is_empty() => self.fail(path, "Must not be empty"),
            Some(_) => {}
            None => self.fail(path, "Expected string"),
        }
    }

    fn level(&mut self, path: &str, value: &Value) {
        match value.as_str() {
            Some(s) if Level::parse(s).is_some() => {}
            Some(s) => self.fail(
                path,
                format!("Invalid value '{s}', expected 'High', 'Medium' or 'Low'"),
            ),
            None => self.fail(path, "Expected string"),
        }
    }

    /// Array of non-empty strings with at least `min` entries.
    fn string_list(&mut self, path: &str, value: &Value, min: usize, max: Option<usize>) {
        if let Some(items) = self.array(path, value, min, max) {
            for (i, item) in items.iter().enumerate() {
                self.string(&index(path, i), item, true);
            }
        }
    }

    /// Visits `key` on `obj` if present, recording `Required` otherwise.
    fn with_field(
        &mut self,
        path: &str,
        obj: &Map<String, Value>,
        key: &str,
        visit: impl FnOnce(&mut Self, &str, &Value),
    ) {
        if let Some((field_path, value)) = self.field(path, obj, key) {
            visit(self, &field_path, value);
        }
    }

    fn report(&mut self, value: &Value) {
        let Some(obj) = self.object("", value) else {
            return;
        };
        self.with_field("", obj, "careerOverview", Self::career_overview);
        self.with_field("", obj, "skillGapAnalysis", Self::skill_gap_analysis);
        self.with_field("", obj, "learningRoadmap", Self::learning_roadmap);
        self.with_field("", obj, "jobRolesAndOpportunities", Self::job_roles);
        self.with_field("", obj, "careerGrowthPath", Self::career_growth_path);
        self.with_field("", obj, "personalizedAdvice", |c, p, v| {
            c.string_list(p, v, 3, Some(5))
        });
        self.aligned_with_overview(obj, "skillGapAnalysis");
        self.aligned_with_overview(obj, "careerGrowthPath");
    }

    /// `key` must list the overview's careers in the same order, matched on
    /// trimmed `careerTitle`. Skipped while the overview itself is malformed.
    fn aligned_with_overview(&mut self, obj: &Map<String, Value>, key: &str) {
        let (Some(overview), Some(section)) = (
            obj.get("careerOverview").and_then(Value::as_array),
            obj.get(key).and_then(Value::as_array),
        ) else {
            return;
        };
        if !(2..=3).contains(&overview.len()) {
            return;
        }
        if section.len() != overview.len() {
            self.fail(
                key,
                format!(
                    "Must have one entry per careerOverview entry (expected {}, got {})",
                    overview.len(),
                    section.len()
                ),
            );
            return;
        }
        for (i, (career, entry)) in overview.iter().zip(section).enumerate() {
            let expected = career.get("title").and_then(Value::as_str).map(str::trim);
            let actual = entry.get("careerTitle").and_then(Value::as_str).map(str::trim);
            if let (Some(expected), Some(actual)) = (expected, actual) {
                if expected != actual {
                    self.fail(
                        &child(&index(key, i), "careerTitle"),
                        format!("Must match careerOverview.{i}.title '{expected}', got '{actual}'"),
                    );
                }
            }
        }
    }

    fn career_overview(&mut self, path: &str, value: &Value) {
        let Some(items) = self.array(path, value, 2, Some(3)) else {
            return;
        };
        for (i, item) in items.iter().enumerate() {
            let item_path = index(path, i);
            let Some(obj) = self.object(&item_path, item) else {
                continue;
            };
            self.with_field(&item_path, obj, "title", |c, p, v| c.string(p, v, false));
            self.with_field(&item_path, obj, "why", |c, p, v| c.string(p, v, false));
            self.with_field(&item_path, obj, "demandLevel", Self::level);
        }
    }

    fn skill_gap_analysis(&mut self, path: &str, value: &Value) {
        let Some(items) = self.array(path, value, 2, Some(3)) else {
            return;
        };
        for (i, item) in items.iter().enumerate() {
            let item_path = index(path, i);
            let Some(obj) = self.object(&item_path, item) else {
                continue;
            };
            self.with_field(&item_path, obj, "careerTitle", |c, p, v| {
                c.string(p, v, false)
            });
            self.with_field(&item_path, obj, "existingSkills", |c, p, v| {
                c.skills(p, v, false)
            });
            self.with_field(&item_path, obj, "missingSkills", |c, p, v| {
                c.skills(p, v, true)
            });
        }
    }

    fn skills(&mut self, path: &str, value: &Value, with_priority: bool) {
        let Some(items) = self.array(path, value, 0, None) else {
            return;
        };
        for (i, item) in items.iter().enumerate() {
            let item_path = index(path, i);
            let Some(obj) = self.object(&item_path, item) else {
                continue;
            };
            self.with_field(&item_path, obj, "name", |c, p, v| c.string(p, v, false));
            if with_priority {
                self.with_field(&item_path, obj, "priority", Self::level);
            }
        }
    }

    fn learning_roadmap(&mut self, path: &str, value: &Value) {
        let Some(obj) = self.object(path, value) else {
            return;
        };
        self.with_field(path, obj, "durationMonths", |c, p, v| {
            if v.as_u64() != Some(ROADMAP_MONTHS) {
                c.fail(p, format!("Must be {ROADMAP_MONTHS}"));
            }
        });
        self.with_field(path, obj, "months", Self::roadmap_months);
    }

    fn roadmap_months(&mut self, path: &str, value: &Value) {
        let expected = ROADMAP_MONTHS as usize;
        let Some(items) = self.array(path, value, expected, Some(expected)) else {
            return;
        };

        let mut seen = BTreeSet::new();
        let mut duplicated = BTreeSet::new();
        for (i, item) in items.iter().enumerate() {
            let item_path = index(path, i);
            let Some(obj) = self.object(&item_path, item) else {
                continue;
            };
            self.with_field(&item_path, obj, "month", |c, p, v| {
                match v.as_u64().filter(|m| (1..=ROADMAP_MONTHS).contains(m)) {
                    Some(m) => {
                        if !seen.insert(m) {
                            duplicated.insert(m);
                        }
                    }
                    None => c.fail(p, format!("Expected integer between 1 and {ROADMAP_MONTHS}")),
                }
            });
            for key in ["topics", "tools", "platforms"] {
                self.with_field(&item_path, obj, key, |c, p, v| c.string_list(p, v, 1, None));
            }
        }

        let missing: Vec<String> = (1..=ROADMAP_MONTHS)
            .filter(|m| !seen.contains(m))
            .map(|m| m.to_string())
            .collect();
        if !missing.is_empty() || !duplicated.is_empty() {
            let mut reason = format!("Must cover months 1-{ROADMAP_MONTHS} exactly once each");
            if !missing.is_empty() {
                reason.push_str(&format!(" (missing: {})", missing.join(", ")));
            }
            if !duplicated.is_empty() {
                let dups: Vec<String> = duplicated.iter().map(|m| m.to_string()).collect();
                reason.push_str(&format!(" (duplicated: {})", dups.join(", ")));
            }
            self.fail(path, reason);
        }
    }

    fn job_roles(&mut self, path: &str, value: &Value) {
        let Some(obj) = self.object(path, value) else {
            return;
        };
        for key in ["entryLevelRoles", "internships", "freelanceOrProjectIdeas"] {
            self.with_field(path, obj, key, |c, p, v| c.string_list(p, v, 1, None));
        }
    }

    fn career_growth_path(&mut self, path: &str, value: &Value) {
        let Some(items) = self.array(path, value, 2, Some(3)) else {
            return;
        };
        for (i, item) in items.iter().enumerate() {
            let item_path = index(path, i);
            let Some(obj) = self.object(&item_path, item) else {
                continue;
            };
            self.with_field(&item_path, obj, "careerTitle", |c, p, v| {
                c.string(p, v, false)
            });
            self.with_field(&item_path, obj, "steps", Self::growth_steps);
        }
    }

    fn growth_steps(&mut self, path: &str, value: &Value) {
        let Some(items) = self.array(path, value, 1, None) else {
            return;
        };
        for (i, item) in items.iter().enumerate() {
            let item_path = index(path, i);
            let Some(obj) = self.object(&item_path, item) else {
                continue;
            };
            for key in ["yearRange", "roleTitle", "salaryRange"] {
                self.with_field(&item_path, obj, key, |c, p, v| c.string(p, v, false));
            }
            match obj.get("specializations") {
                None | Some(Value::Null) => {}
                Some(v) => {
                    let spec_path = child(&item_path, "specializations");
                    if let Some(specs) = self.array(&spec_path, v, 0, None) {
                        for (j, spec) in specs.iter().enumerate() {
                            self.string(&index(&spec_path, j), spec, false);
                        }
                    }
                }
            }
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Fixtures
// ────────────────────────────────────────────────────────────────────────────


#[cfg(test)]
mod tests {
    use super::fixtures::{sample_report, sample_report_json};
    use super::*;
    use serde_json::json;

    fn assert_rejected(value: &Value, expected_fragment: &str) {
        let err = validate_report(value).unwrap_err();
        assert!(
            err.to_string().contains(expected_fragment),
            "expected '{expected_fragment}' in '{err}'"
        );
    }

    #[test]
    fn test_valid_report_round_trips() {
        let report = sample_report();
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(validate_report(&value).unwrap(), report);
    }

    #[test]
    fn test_three_careers_round_trip() {
        let mut report = sample_report();
        report.career_overview.push(report.career_overview[0].clone());
        report.skill_gap_analysis.push(report.skill_gap_analysis[0].clone());
        report.career_growth_path.push(report.career_growth_path[0].clone());
        report.personalized_advice.push("Find a mentor.".to_string());
        report.personalized_advice.push("Ship one project a month.".to_string());
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(validate_report(&value).unwrap(), report);
    }

    #[test]
    fn test_serialized_keys_are_camel_case() {
        let value = sample_report_json();
        assert!(value.get("careerOverview").is_some());
        assert!(value["learningRoadmap"].get("durationMonths").is_some());
        assert!(value["jobRolesAndOpportunities"]
            .get("freelanceOrProjectIdeas")
            .is_some());
        assert_eq!(value["careerOverview"][0]["demandLevel"], "High");
        assert!(value["careerGrowthPath"][0]["steps"][0]
            .get("specializations")
            .is_none());
    }

    #[test]
    fn test_career_overview_cardinality() {
        let base = sample_report_json();
        for (count, ok) in [(1, false), (2, true), (3, true), (4, false)] {
            let mut value = base.clone();
            for key in ["careerOverview", "skillGapAnalysis", "careerGrowthPath"] {
                value[key] = Value::Array(vec![base[key][0].clone(); count]);
            }
            assert_eq!(
                validate_report(&value).is_ok(),
                ok,
                "careerOverview with {count} entries"
            );
        }
    }

    #[test]
    fn test_skill_gap_count_must_match_overview() {
        let mut value = sample_report_json();
        let extra = value["skillGapAnalysis"][0].clone();
        value["skillGapAnalysis"].as_array_mut().unwrap().push(extra);
        assert_rejected(
            &value,
            "skillGapAnalysis: Must have one entry per careerOverview entry (expected 2, got 3)",
        );
    }

    #[test]
    fn test_growth_path_count_must_match_overview() {
        let mut value = sample_report_json();
        value["careerGrowthPath"].as_array_mut().unwrap().pop();
        let err = validate_report(&value).unwrap_err().to_string();
        assert!(err.contains("careerGrowthPath: Must contain at least 2 entries"));
        assert!(err.contains("careerGrowthPath: Must have one entry per careerOverview entry (expected 2, got 1)"));
    }

    #[test]
    fn test_growth_path_titles_must_match_overview() {
        let mut value = sample_report_json();
        value["careerGrowthPath"][0]["careerTitle"] = json!("Astronaut");
        value["careerGrowthPath"][1]["careerTitle"] = json!("Chef");
        let err = validate_report(&value).unwrap_err();
        assert_eq!(err.issues.len(), 2);
        assert_eq!(err.issues[0].path, "careerGrowthPath.0.careerTitle");
        assert_eq!(
            err.issues[0].reason,
            "Must match careerOverview.0.title 'Data Analyst', got 'Astronaut'"
        );
        assert_eq!(err.issues[1].path, "careerGrowthPath.1.careerTitle");
    }

    #[test]
    fn test_skill_gap_order_must_match_overview() {
        let mut value = sample_report_json();
        value["skillGapAnalysis"].as_array_mut().unwrap().reverse();
        assert_rejected(
            &value,
            "skillGapAnalysis.0.careerTitle: Must match careerOverview.0.title 'Data Analyst', got 'Data Scientist'",
        );
    }

    #[test]
    fn test_titles_compared_after_trimming() {
        let mut value = sample_report_json();
        value["skillGapAnalysis"][1]["careerTitle"] = json!("  Data Scientist ");
        assert!(validate_report(&value).is_ok());
    }

    #[test]
    fn test_roadmap_missing_month_rejected() {
        let mut value = sample_report_json();
        value["learningRoadmap"]["months"][3]["month"] = json!(1);
        assert_rejected(&value, "learningRoadmap.months: Must cover months 1-6 exactly once each (missing: 4) (duplicated: 1)");
    }

    #[test]
    fn test_roadmap_five_months_rejected() {
        let mut value = sample_report_json();
        value["learningRoadmap"]["months"]
            .as_array_mut()
            .unwrap()
            .remove(3);
        assert_rejected(&value, "Must contain at least 6 entries, got 5");
        assert_rejected(&value, "missing: 4");
    }

    #[test]
    fn test_roadmap_any_order_accepted() {
        let mut value = sample_report_json();
        value["learningRoadmap"]["months"]
            .as_array_mut()
            .unwrap()
            .reverse();
        let report = validate_report(&value).unwrap();
        assert_eq!(report.learning_roadmap.months[0].month, 6);
    }

    #[test]
    fn test_roadmap_month_out_of_range_rejected() {
        let mut value = sample_report_json();
        value["learningRoadmap"]["months"][5]["month"] = json!(7);
        assert_rejected(
            &value,
            "learningRoadmap.months.5.month: Expected integer between 1 and 6",
        );
    }

    #[test]
    fn test_duration_must_be_six() {
        let mut value = sample_report_json();
        value["learningRoadmap"]["durationMonths"] = json!(12);
        assert_rejected(&value, "learningRoadmap.durationMonths: Must be 6");
    }

    #[test]
    fn test_empty_topic_rejected() {
        let mut value = sample_report_json();
        value["learningRoadmap"]["months"][0]["topics"] = json!([""]);
        assert_rejected(&value, "learningRoadmap.months.0.topics.0: Must not be empty");
    }

    #[test]
    fn test_unknown_demand_level_rejected() {
        let mut value = sample_report_json();
        value["careerOverview"][1]["demandLevel"] = json!("Critical");
        assert_rejected(&value, "careerOverview.1.demandLevel: Invalid value 'Critical'");
    }

    #[test]
    fn test_unknown_priority_rejected() {
        let mut value = sample_report_json();
        value["skillGapAnalysis"][0]["missingSkills"][0]["priority"] = json!("Critical");
        assert_rejected(&value, "skillGapAnalysis.0.missingSkills.0.priority");
    }

    #[test]
    fn test_lowercase_level_rejected() {
        let mut value = sample_report_json();
        value["careerOverview"][0]["demandLevel"] = json!("high");
        assert!(validate_report(&value).is_err());
    }

    #[test]
    fn test_empty_job_roles_rejected() {
        let mut value = sample_report_json();
        value["jobRolesAndOpportunities"]["internships"] = json!([]);
        assert_rejected(
            &value,
            "jobRolesAndOpportunities.internships: Must contain at least 1 entries",
        );
    }

    #[test]
    fn test_growth_path_requires_steps() {
        let mut value = sample_report_json();
        value["careerGrowthPath"][0]["steps"] = json!([]);
        assert_rejected(&value, "careerGrowthPath.0.steps");
    }

    #[test]
    fn test_advice_cardinality() {
        let mut value = sample_report_json();
        value["personalizedAdvice"] = json!(["one", "two"]);
        assert_rejected(&value, "personalizedAdvice: Must contain at least 3 entries");
        value["personalizedAdvice"] = json!(["1", "2", "3", "4", "5", "6"]);
        assert_rejected(&value, "personalizedAdvice: Must contain at most 5 entries");
    }

    #[test]
    fn test_missing_section_is_required() {
        let mut value = sample_report_json();
        value.as_object_mut().unwrap().remove("careerGrowthPath");
        assert_rejected(&value, "careerGrowthPath: Required");
    }

    #[test]
    fn test_every_issue_is_reported() {
        let mut value = sample_report_json();
        value["careerOverview"] = json!([]);
        value["personalizedAdvice"] = json!("be curious");
        value["learningRoadmap"]["durationMonths"] = json!(3);
        let err = validate_report(&value).unwrap_err();
        assert_eq!(err.issues.len(), 3);
        assert_eq!(err.to_string().matches("; ").count(), 2);
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let mut value = sample_report_json();
        value["summary"] = json!("extra");
        value["careerOverview"][0]["salary"] = json!("n/a");
        assert_eq!(validate_report(&value).unwrap(), sample_report());
    }

    #[test]
    fn test_non_object_rejected() {
        let err = validate_report(&json!([1, 2, 3])).unwrap_err();
        assert_eq!(err.to_string(), "Expected object");
    }

    #[test]
    fn test_null_specializations_accepted() {
        let mut value = sample_report_json();
        value["careerGrowthPath"][0]["steps"][0]["specializations"] = Value::Null;
        assert!(validate_report(&value).is_ok());
    }
}
