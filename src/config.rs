//! Environment-driven service configuration.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::summarize::SummarizeConfig;

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub llm_timeout: Duration,
    pub port: u16,
    pub summarize: SummarizeConfig,
}

impl ServiceConfig {
    /// Reads the configuration from the environment. Only the API key is
    /// required; everything else has a production default.
    pub fn from_env() -> Result<Self> {
        let gemini_api_key =
            env::var("GEMINI_API_KEY").context("GEMINI_API_KEY env var is missing")?;
        let gemini_model =
            env::var("GEMINI_MODEL").unwrap_or_else(|_| "gemini-2.5-flash".to_string());
        let llm_timeout = Duration::from_secs(env_parse("LLM_TIMEOUT_SECS", 120));
        let port = env_parse("PORT", 8080);

        let defaults = SummarizeConfig::default();
        let summarize = SummarizeConfig {
            chunk_size: env_parse("CHUNK_SIZE_WORDS", defaults.chunk_size),
            chunk_overlap: env_parse("CHUNK_OVERLAP_WORDS", defaults.chunk_overlap),
            chunk_threshold: env_parse("CHUNK_THRESHOLD_CHARS", defaults.chunk_threshold),
            max_prompt_chars: env_parse("MAX_PROMPT_CHARS", defaults.max_prompt_chars),
            temperature: env_parse("GENERATION_TEMPERATURE", defaults.temperature),
            max_concurrent_chunks: env_parse("MAX_CONCURRENT_CHUNKS", defaults.max_concurrent_chunks),
            ..defaults
        };

        Ok(Self {
            gemini_api_key,
            gemini_model,
            llm_timeout,
            port,
            summarize,
        })
    }
}

fn env_parse<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}
