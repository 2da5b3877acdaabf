//! Line-delimited JSON protocol spoken with the retrieval worker.
//!
//! Parent → worker: one command object per stdin line.
//! Worker → parent: one `{status, message?, data?}` object per stdout line,
//! replied strictly in request order.

use serde::{Deserialize, Serialize};

use crate::assessment::likert::Language;
use crate::rag::RagError;

/// A single turn of chat history, as stored by the frontend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// Outbound worker commands.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum WorkerCommand {
    Initialize {
        careers_json_path: String,
        chroma_persist_dir: String,
        provider: String,
    },
    Chat {
        message: String,
        chat_history: Vec<ChatTurn>,
        language: Language,
    },
    Greeting {
        assessment_summary: String,
        language: Language,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkerStatus {
    Success,
    Error,
}

/// One line of worker output.
#[derive(Debug, Deserialize)]
pub struct WorkerResponse {
    pub status: WorkerStatus,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<WorkerData>,
}

/// Payload of a successful `chat` or `greeting` reply.
#[derive(Debug, Serialize, Deserialize)]
pub struct WorkerData {
    pub response: Option<String>,
    #[serde(default)]
    pub sources: Vec<RetrievedSource>,
    #[serde(default)]
    pub error: Option<String>,
}

/// A retrieved document chunk cited by the worker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedSource {
    pub title: String,
    #[serde(default)]
    pub chunk_index: u32,
    #[serde(default)]
    pub snippet: String,
}

impl WorkerResponse {
    /// Converts an error-status line into the worker's reported error.
    pub fn into_result(self) -> Result<WorkerResponse, RagError> {
        match self.status {
            WorkerStatus::Success => Ok(self),
            WorkerStatus::Error => Err(RagError::Worker(
                self.message
                    .unwrap_or_else(|| "unspecified worker error".to_string()),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initialize_command_wire_shape() {
        let cmd = WorkerCommand::Initialize {
            careers_json_path: "careers_cleaned.json".to_string(),
            chroma_persist_dir: "chroma_data_full".to_string(),
            provider: "google".to_string(),
        };
        let line = serde_json::to_string(&cmd).unwrap();
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["command"], "initialize");
        assert_eq!(value["careers_json_path"], "careers_cleaned.json");
        assert_eq!(value["provider"], "google");
    }

    #[test]
    fn test_chat_command_wire_shape() {
        let cmd = WorkerCommand::Chat {
            message: "मुझे इंजीनियरिंग के बारे में बताओ".to_string(),
            chat_history: vec![ChatTurn {
                role: ChatRole::Assistant,
                content: "नमस्ते!".to_string(),
            }],
            language: Language::Hi,
        };
        let value: serde_json::Value =
            serde_json::from_str(&serde_json::to_string(&cmd).unwrap()).unwrap();
        assert_eq!(value["command"], "chat");
        assert_eq!(value["language"], "hi");
        assert_eq!(value["chat_history"][0]["role"], "assistant");
    }

    #[test]
    fn test_success_response_parses() {
        let line = r#"{"status":"success","data":{"response":"try engineering","sources":[{"title":"Engineer","chunk_index":2,"snippet":"..."}],"error":null}}"#;
        let resp: WorkerResponse = serde_json::from_str(line).unwrap();
        assert_eq!(resp.status, WorkerStatus::Success);
        let data = resp.data.unwrap();
        assert_eq!(data.response.as_deref(), Some("try engineering"));
        assert_eq!(data.sources.len(), 1);
        assert!(data.error.is_none());
    }

    #[test]
    fn test_error_response_into_result() {
        let line = r#"{"status":"error","message":"Service not initialized"}"#;
        let resp: WorkerResponse = serde_json::from_str(line).unwrap();
        let err = resp.into_result().unwrap_err();
        assert!(matches!(err, RagError::Worker(ref m) if m.contains("not initialized")));
    }
}
