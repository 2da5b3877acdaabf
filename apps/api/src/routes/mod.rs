pub mod health;

use axum::{routing::get, routing::post, Router};

use crate::assessment::handlers as assessment;
use crate::chat::handlers as chat;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Assessment API
        .route("/api/v1/assessment/score", post(assessment::handle_score))
        .route(
            "/api/v1/assessment/recommendations",
            post(assessment::handle_recommendations),
        )
        // Chat API
        .route("/api/v1/chat", post(chat::handle_chat))
        .route("/api/v1/chat/greeting", post(chat::handle_greeting))
        .with_state(state)
}
