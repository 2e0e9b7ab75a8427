use std::fmt;

use serde::{Deserialize, Serialize};

/// Highest education level the student has reached (or is working toward).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EducationLevel {
    HighSchool,
    Undergraduate,
    Graduate,
    Postgraduate,
    SelfTaught,
}

impl EducationLevel {
    pub const ALL: [EducationLevel; 5] = [
        EducationLevel::HighSchool,
        EducationLevel::Undergraduate,
        EducationLevel::Graduate,
        EducationLevel::Postgraduate,
        EducationLevel::SelfTaught,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EducationLevel::HighSchool => "high-school",
            EducationLevel::Undergraduate => "undergraduate",
            EducationLevel::Graduate => "graduate",
            EducationLevel::Postgraduate => "postgraduate",
            EducationLevel::SelfTaught => "self-taught",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|level| level.as_str() == value)
    }
}

impl fmt::Display for EducationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated profile submission. Only `validate_profile` should build one
/// from untrusted input; every string in here is already length-bounded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileInput {
    pub education: EducationLevel,
    pub skills: Vec<String>,
    pub interests: Vec<String>,
    #[serde(default)]
    pub goal: String,
    #[serde(default)]
    pub name: String,
}
