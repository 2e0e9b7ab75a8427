pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::report::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/reports", post(handlers::handle_generate_report))
        .route("/api/v1/reports/:id", get(handlers::handle_get_report))
        .with_state(state)
}
