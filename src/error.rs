//! API error surface shared by the HTTP handlers.
//!
//! Gateway failures stay retryable: they map to a transient 5xx and never
//! touch draft state. The WebSocket side flattens these into its own
//! `error` message instead.

use axum::{
  http::StatusCode,
  response::{IntoResponse, Response},
  Json,
};
use serde_json::json;
use thiserror::Error;

use crate::gemini::AssistError;

#[derive(Debug, Error)]
pub enum ApiError {
  #[error("AI features are disabled: GEMINI_API_KEY is not set")]
  AiDisabled,

  #[error(transparent)]
  Assist(#[from] AssistError),

  #[error("Unknown question: {0}")]
  UnknownQuestion(String),

  #[error("No active draft for question: {0}")]
  NoActiveDraft(String),
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::AiDisabled => (StatusCode::SERVICE_UNAVAILABLE, "AI features are disabled"),
      ApiError::Assist(_) => (StatusCode::BAD_GATEWAY, "AI operation failed"),
      ApiError::UnknownQuestion(_) => (StatusCode::NOT_FOUND, "Unknown question"),
      ApiError::NoActiveDraft(_) => (StatusCode::CONFLICT, "No active draft"),
    };

    let body = Json(json!({
      "error": {
        "message": message,
        "details": self.to_string(),
      }
    }));

    (status, body).into_response()
  }
}
