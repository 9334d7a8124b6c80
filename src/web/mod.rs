pub mod router;
mod routes;

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Json;
use axum::http::StatusCode;
use serde::Serialize;

use crate::config::ServiceConfig;
use crate::language::StopwordDetector;
use crate::llm::GeminiClient;
use crate::summarize::Summarizer;

pub const PROVIDER: &str = "gemini";

#[derive(Clone)]
pub struct AppState {
    summarizer: Arc<Summarizer>,
}

impl AppState {
    pub fn new(config: &ServiceConfig) -> Result<Self> {
        let client = GeminiClient::new(
            config.gemini_api_key.clone(),
            config.gemini_model.clone(),
            config.llm_timeout,
        )
        .context("failed to initialize generation client")?;

        let summarizer = Summarizer::new(
            Arc::new(client),
            Arc::new(StopwordDetector),
            config.summarize.clone(),
        )
        .context("invalid summarization settings")?;

        Ok(Self {
            summarizer: Arc::new(summarizer),
        })
    }

    pub fn summarizer(&self) -> &Summarizer {
        &self.summarizer
    }
}

/// Canonical JSON payload for error responses.
#[derive(Debug, Serialize, Clone)]
pub struct ApiMessage {
    pub message: String,
}

impl ApiMessage {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Helper for handlers that return `(StatusCode, Json<ApiMessage>)`.
pub fn json_error(
    status: StatusCode,
    message: impl Into<String>,
) -> (StatusCode, Json<ApiMessage>) {
    (status, Json(ApiMessage::new(message)))
}
