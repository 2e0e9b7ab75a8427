use std::sync::Arc;

use sqlx::PgPool;

use crate::llm_client::ChatModel;
use crate::rate_limit::RateLimiter;

/// Shared application state injected into all route handlers via Axum extractors.
/// Everything in here is constructed once in `main` and read-only afterwards.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    /// The single model client. `LlmClient` in production.
    pub llm: Arc<dyn ChatModel>,
    /// Memory- or Redis-backed, chosen at startup from `REDIS_URL`.
    pub limiter: Arc<dyn RateLimiter>,
}
