use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::report::prompts::PROMPT_VERSION;
use crate::state::AppState;

/// GET /health
/// Returns service version plus the model and prompt revision reports are generated with.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "careerpath-api",
        "model": state.llm.model_id(),
        "prompt_version": PROMPT_VERSION,
    }))
}
