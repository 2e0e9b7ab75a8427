// Career report prompt templates.
// All prompts for the report module are defined here. The builders are pure.

use crate::llm_client::prompts::{JSON_ONLY_INSTRUCTION, NO_EMOJI_INSTRUCTION};
use crate::llm_client::{truncate_chars, ChatMessage};
use crate::profile::ProfileInput;

/// Bumped whenever the wording below changes, so stored reports can be traced
/// back to the prompt that produced them.
pub const PROMPT_VERSION: &str = "2024-06-v2";

/// Longest slice of a rejected answer echoed back in a repair prompt.
pub const REPAIR_OUTPUT_MAX_CHARS: usize = 2000;
/// Longest validation error echoed back in a repair prompt.
pub const REPAIR_ERROR_MAX_CHARS: usize = 1000;

pub const CAREER_SYSTEM: &str = "\
You are an experienced career counselor, labour-market analyst and learning strategist \
who helps students choose realistic career paths. \
Be practical and specific to the student's actual skills, interests and goal. \
Never give generic platitudes such as 'follow your passion' or 'never stop learning'. \
Recommend concrete topics, tools and platforms that exist today. \
Keep the tone friendly, professional and simple enough for a first-year student.";

pub const CAREER_FORMAT: &str = r#"Return the report as ONE JSON object with EXACTLY this structure:
{
  "careerOverview": [
    {"title": "string", "why": "string", "demandLevel": "High" | "Medium" | "Low"}
  ],
  "skillGapAnalysis": [
    {
      "careerTitle": "string",
      "existingSkills": [{"name": "string"}],
      "missingSkills": [{"name": "string", "priority": "High" | "Medium" | "Low"}]
    }
  ],
  "learningRoadmap": {
    "durationMonths": 6,
    "months": [
      {"month": 1, "topics": ["string"], "tools": ["string"], "platforms": ["string"]}
    ]
  },
  "jobRolesAndOpportunities": {
    "entryLevelRoles": ["string"],
    "internships": ["string"],
    "freelanceOrProjectIdeas": ["string"]
  },
  "careerGrowthPath": [
    {
      "careerTitle": "string",
      "steps": [
        {"yearRange": "string", "roleTitle": "string", "salaryRange": "string", "specializations": ["string"]}
      ]
    }
  ],
  "personalizedAdvice": ["string"]
}

HARD RULES:
1. "careerOverview" has 2 or 3 careers.
2. "skillGapAnalysis" and "careerGrowthPath" each have one entry per career, in the same order and with the same titles as "careerOverview".
3. "demandLevel" and "priority" are exactly "High", "Medium" or "Low".
4. "learningRoadmap.months" has exactly 6 entries covering months 1, 2, 3, 4, 5 and 6, each exactly once, in ascending order.
5. Every "topics", "tools", "platforms", "entryLevelRoles", "internships" and "freelanceOrProjectIdeas" list is non-empty and contains no empty strings.
6. "careerGrowthPath[].steps" is non-empty; "specializations" is optional.
7. "personalizedAdvice" has 3 to 5 non-empty items.
8. Salary ranges and demand levels are conservative, approximate estimates; say so in the salary text (e.g. "approx.").
9. Do NOT add keys that are not in the structure above."#;

/// System message: persona plus the strict output contract.
pub fn system_prompt() -> String {
    format!("{CAREER_SYSTEM}\n\n{CAREER_FORMAT}\n\n{JSON_ONLY_INSTRUCTION} {NO_EMOJI_INSTRUCTION}")
}

/// Renders the profile into the labelled block the model reads.
pub fn build_user_prompt(profile: &ProfileInput) -> String {
    let mut lines = vec!["Student profile:".to_string()];
    if !profile.name.is_empty() {
        lines.push(format!("Name: {}", profile.name));
    }
    lines.push(format!("Education Level: {}", profile.education));
    lines.push(format!("Current Skills: {}", profile.skills.join(", ")));
    lines.push(format!("Interests: {}", profile.interests.join(", ")));
    let goal = if profile.goal.is_empty() {
        "Not specified"
    } else {
        profile.goal.as_str()
    };
    lines.push(format!("Career Goal: {goal}"));
    lines.push(String::new());
    lines.push(
        "Generate the complete career guidance report for this student as a single JSON object \
         that follows the required structure exactly."
            .to_string(),
    );
    lines.join("\n")
}

/// Initial conversation for one report.
pub fn build_messages(profile: &ProfileInput) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(system_prompt()),
        ChatMessage::user(build_user_prompt(profile)),
    ]
}

/// Follow-up asking the model to fix its own answer. Both echoed inputs are
/// truncated, so the prompt length is bounded no matter how large they were.
pub fn build_repair_prompt(bad_output: &str, error: &str) -> String {
    let excerpt = truncate_chars(bad_output, REPAIR_OUTPUT_MAX_CHARS);
    let error = truncate_chars(error, REPAIR_ERROR_MAX_CHARS);
    format!(
        "Your previous response could not be accepted.\n\n\
         VALIDATION ERROR:\n{error}\n\n\
         PREVIOUS RESPONSE (may be truncated):\n{excerpt}\n\n\
         Return the corrected report as a single JSON object that follows the required \
         structure and every hard rule. Return ONLY the JSON object, with no explanation."
    )
}
