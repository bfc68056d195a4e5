//! Router assembly: HTTP endpoints, WebSocket upgrade, static files, CORS,
//! and HTTP tracing.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::state::AppState;

pub mod http;
pub mod ws;

/// Build the application router with:
/// - WebSocket at `/ws`
/// - REST-ish API under `/api/v1/...`
/// - Static SPA from `./static` with index fallback
/// - CORS (allow any origin/method/headers) – adjust for production if needed
/// - HTTP trace layer (per-request spans w/ method, path, status, latency)
pub fn build_router(state: Arc<AppState>) -> Router {
    // Static files with SPA fallback
    let static_service = ServeDir::new("./static")
        .append_index_html_on_directories(true)
        .not_found_service(ServeFile::new("./static/index.html"));

    Router::new()
        // WebSocket
        .route("/ws", get(ws::ws_upgrade))
        // HTTP API
        .route("/api/v1/health", get(http::http_health))
        // Question bank
        .route("/api/v1/questions", get(http::http_list_questions))
        .route("/api/v1/question/add", post(http::http_add_question))
        .route("/api/v1/question/update", post(http::http_update_question))
        .route("/api/v1/question/delete", post(http::http_delete_question))
        .route("/api/v1/question/generate", post(http::http_generate_question))
        .route("/api/v1/question/extract", post(http::http_extract_from_document))
        // Edit sessions
        .route("/api/v1/editor/begin", post(http::http_begin_edit))
        .route("/api/v1/editor/text", post(http::http_set_draft_text))
        .route("/api/v1/editor/subject", post(http::http_set_draft_subject))
        .route("/api/v1/editor/difficulty", post(http::http_set_draft_difficulty))
        .route("/api/v1/editor/codes", post(http::http_set_draft_codes))
        .route("/api/v1/editor/alternative", post(http::http_set_alternative_text))
        .route("/api/v1/editor/correct", post(http::http_mark_correct))
        .route("/api/v1/editor/phrasing/apply", post(http::http_apply_phrasing))
        .route("/api/v1/editor/save", post(http::http_save_draft))
        .route("/api/v1/editor/cancel", post(http::http_cancel_draft))
        // Per-draft AI assists
        .route("/api/v1/editor/classify", post(http::http_classify))
        .route("/api/v1/editor/phrasings", post(http::http_suggest_phrasings))
        .route("/api/v1/editor/distractors", post(http::http_generate_distractors))
        // Assessment builder
        .route("/api/v1/builder", get(http::http_builder_state))
        .route("/api/v1/builder/toggle", post(http::http_toggle_selection))
        .route("/api/v1/builder/title", post(http::http_set_title))
        .route("/api/v1/builder/pages", post(http::http_set_pages))
        .route("/api/v1/builder/layout", post(http::http_suggest_layout))
        .route("/api/v1/builder/preview", get(http::http_preview))
        // Reference data
        .route("/api/v1/assessments", get(http::http_assessments))
        .route("/api/v1/taxonomy", get(http::http_taxonomy))
        .route("/api/v1/templates", get(http::http_templates))
        // State + CORS + HTTP tracing
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Frontend fallback
        .fallback_service(static_service)
}
