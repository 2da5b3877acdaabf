use std::collections::HashMap;

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::assessment::likert::Language;
use crate::assessment::profile::{compute_profile, AnswerValue};
use crate::careers::match_careers;
use crate::errors::AppError;
use crate::rag::protocol::{ChatTurn, RetrievedSource, WorkerCommand, WorkerData};
use crate::rag::RagError;
use crate::recommendation::build_assessment_summary;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub chat_history: Vec<ChatTurn>,
    #[serde(default)]
    pub language: Language,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
    pub sources: Vec<RetrievedSource>,
}

/// POST /api/v1/chat
pub async fn handle_chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    if req.message.trim().is_empty() {
        return Err(AppError::Validation("message must not be empty".to_string()));
    }

    let command = WorkerCommand::Chat {
        message: req.message,
        chat_history: req.chat_history,
        language: req.language,
    };
    let reply = state.rag.send(&command).await?;
    Ok(Json(into_chat_response(reply.data)?))
}

#[derive(Deserialize)]
pub struct GreetingRequest {
    pub answers: HashMap<u32, AnswerValue>,
    #[serde(default)]
    pub language: Language,
}

/// POST /api/v1/chat/greeting
///
/// Scores the answers server-side so the greeting is grounded in the same
/// profile the recommendations were.
pub async fn handle_greeting(
    State(state): State<AppState>,
    Json(req): Json<GreetingRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    let profile = compute_profile(&req.answers);
    let careers = match_careers(&state.catalog, &profile.top3);
    let summary = build_assessment_summary(&profile, &careers);

    let command = WorkerCommand::Greeting {
        assessment_summary: summary,
        language: req.language,
    };
    let reply = state.rag.send(&command).await?;
    Ok(Json(into_chat_response(reply.data)?))
}

/// Unpacks a successful worker reply; the worker reports per-request errors
/// inside `data.error` even when the line status is success.
fn into_chat_response(data: Option<WorkerData>) -> Result<ChatResponse, AppError> {
    let data = data
        .ok_or_else(|| RagError::Protocol("worker reply missing data payload".to_string()))?;
    if let Some(error) = data.error {
        return Err(AppError::Rag(RagError::Worker(error)));
    }
    let response = data
        .response
        .ok_or_else(|| RagError::Protocol("worker reply missing response text".to_string()))?;
    Ok(ChatResponse {
        response,
        sources: data.sources,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worker_data_error_becomes_rag_error() {
        let data = WorkerData {
            response: None,
            sources: Vec::new(),
            error: Some("rate limited".to_string()),
        };
        let err = into_chat_response(Some(data)).unwrap_err();
        assert!(matches!(
            err,
            AppError::Rag(RagError::Worker(ref m)) if m == "rate limited"
        ));
    }

    #[test]
    fn test_missing_data_is_protocol_error() {
        let err = into_chat_response(None).unwrap_err();
        assert!(matches!(err, AppError::Rag(RagError::Protocol(_))));
    }

    #[test]
    fn test_successful_reply_unpacks() {
        let data = WorkerData {
            response: Some("try engineering".to_string()),
            sources: vec![RetrievedSource {
                title: "Engineer".to_string(),
                chunk_index: 0,
                snippet: "...".to_string(),
            }],
            error: None,
        };
        let resp = into_chat_response(Some(data)).unwrap();
        assert_eq!(resp.response, "try engineering");
        assert_eq!(resp.sources.len(), 1);
    }
}
