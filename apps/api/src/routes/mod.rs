pub mod health;

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::advisor::handlers as advisor;
use crate::matching::handlers as matching;
use crate::state::AppState;
use crate::tools::handlers as tools;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Analysis API
        .route("/api/v1/match", post(matching::handle_match))
        .route("/api/v1/qa", post(tools::handle_qa))
        .route("/api/v1/roles/suggest", post(matching::handle_suggest_roles))
        // Prompting tools
        .route("/api/v1/tools/skills", post(tools::handle_extract_skills))
        .route("/api/v1/tools/gap", post(tools::handle_analyze_gap))
        .route("/api/v1/tools/rewrite", post(tools::handle_rewrite))
        .route("/api/v1/tools/roles", post(tools::handle_suggest_roles))
        // Advisor chat API
        .route("/api/v1/advisor/session", post(advisor::handle_create_session))
        .route("/api/v1/advisor/message", post(advisor::handle_send_message))
        .route(
            "/api/v1/advisor/history/:session_id",
            get(advisor::handle_get_history),
        )
        .route(
            "/api/v1/advisor/session/:session_id/info",
            get(advisor::handle_session_info),
        )
        .route(
            "/api/v1/advisor/session/:session_id",
            delete(advisor::handle_clear_session),
        )
        .with_state(state)
}
