// Shared prompt fragments.
// Each service that needs LLM calls defines its own prompts.rs alongside it;
// this file only holds the cross-cutting pieces.

/// Appended to every prompt whose answer is parsed as JSON.
pub const JSON_ONLY_INSTRUCTION: &str = "\
You MUST respond with a single valid JSON object only. \
Do NOT include any text outside the JSON object. \
Do NOT use markdown code fences. \
Do NOT include explanations or apologies.";

/// Keeps generated copy readable in plain-text surfaces.
pub const NO_EMOJI_INSTRUCTION: &str = "Do NOT use emoji anywhere in the output.";
