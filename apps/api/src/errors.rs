#![allow(dead_code)]

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::llm_client::LlmError;
use crate::rag::RagError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("RAG error: {0}")]
    Rag(#[from] RagError),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Rag(RagError::Timeout) => (
                StatusCode::GATEWAY_TIMEOUT,
                "CHAT_TIMEOUT",
                "The chat service took too long to respond".to_string(),
            ),
            AppError::Rag(RagError::Terminated) | AppError::Rag(RagError::ShuttingDown) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "CHAT_UNAVAILABLE",
                "The chat service is unavailable".to_string(),
            ),
            AppError::Rag(e) => {
                tracing::error!("RAG error: {e}");
                (
                    StatusCode::BAD_GATEWAY,
                    "CHAT_ERROR",
                    "A chat processing error occurred".to_string(),
                )
            }
            AppError::Llm(e) => {
                tracing::error!("LLM error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "LLM_ERROR",
                    "An AI processing error occurred".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
