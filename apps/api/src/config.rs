use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the `<name>,<code>` career catalog used for matching.
    pub careers_catalog_path: String,
    /// Interpreter that runs the retrieval worker, e.g. `python3`.
    pub worker_command: String,
    /// Path to the retrieval worker script.
    pub worker_script: String,
    /// Careers corpus handed to the worker at initialization.
    pub careers_json_path: String,
    /// Vector store directory handed to the worker at initialization.
    pub chroma_persist_dir: String,
    /// Upstream LLM provider the worker should use.
    pub rag_provider: String,
    pub gemini_api_key: String,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            careers_catalog_path: require_env("CAREERS_CATALOG_PATH")?,
            worker_command: std::env::var("WORKER_COMMAND")
                .unwrap_or_else(|_| "python3".to_string()),
            worker_script: require_env("WORKER_SCRIPT")?,
            careers_json_path: require_env("CAREERS_JSON_PATH")?,
            chroma_persist_dir: require_env("CHROMA_PERSIST_DIR")?,
            rag_provider: std::env::var("RAG_PROVIDER").unwrap_or_else(|_| "google".to_string()),
            gemini_api_key: require_env("GEMINI_API_KEY")?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
