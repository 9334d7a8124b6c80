use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::summarize::StructuredSummary;

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Error surface of a single generation call.
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("generation request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("generation backend returned status {status}: {body}")]
    Backend { status: u16, body: String },
    #[error("generation response contained no candidate text")]
    EmptyResponse,
}

/// The generation collaborator behind the summarization pipeline.
///
/// One invocation per call; retries and failure containment are the
/// orchestrator's concern, not the client's.
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, prompt: &str, temperature: f32) -> Result<String, GenerateError>;
}

/// Generation client for the Google Generative Language API.
#[derive(Clone)]
pub struct GeminiClient {
    http: Client,
    api_key: String,
    model: String,
}

impl GeminiClient {
    /// Builds a client with a per-call timeout baked into the HTTP client, so
    /// a hung backend call cannot stall a window indefinitely.
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            http,
            api_key: api_key.into(),
            model: model.into(),
        })
    }
}

#[async_trait]
impl Generator for GeminiClient {
    async fn generate(&self, prompt: &str, temperature: f32) -> Result<String, GenerateError> {
        let url = format!("{GEMINI_API_BASE}/{}:generateContent", self.model);
        let payload = serde_json::json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": { "temperature": temperature },
        });

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let preview: String = body.chars().take(500).collect();
            return Err(GenerateError::Backend {
                status: status.as_u16(),
                body: preview,
            });
        }

        let body: GenerateContentResponse = response.json().await?;
        let text = body
            .candidates
            .into_iter()
            .filter_map(|candidate| candidate.content)
            .flat_map(|content| content.parts)
            .filter_map(|part| part.text)
            .collect::<Vec<_>>()
            .join("");

        if text.is_empty() {
            return Err(GenerateError::EmptyResponse);
        }

        Ok(text)
    }
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

/// Two-stage parse of a structured generation response.
///
/// Tries a strict JSON parse first; if the model wrapped the object in prose
/// or code fences, salvages the first balanced `{...}` block and parses that.
/// Unknown top-level fields are ignored. Never fails: an unusable response
/// yields the structurally empty summary, which downstream stages treat as
/// valid-but-uninformative.
pub fn parse_structured(raw: &str) -> StructuredSummary {
    if let Ok(parsed) = serde_json::from_str::<StructuredSummary>(raw) {
        return parsed;
    }

    if let Some(block) = first_json_object(raw) {
        if let Ok(parsed) = serde_json::from_str::<StructuredSummary>(block) {
            return parsed;
        }
    }

    StructuredSummary::default()
}

/// Finds the first balanced top-level `{...}` block, skipping braces inside
/// string literals.
fn first_json_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in raw[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }

        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&raw[start..start + offset + ch.len_utf8()]);
                }
            }
            _ => {}
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strict_json_parses_directly() {
        let raw = r#"{"executive_summary": "Overview.", "bullets": ["a"], "highlights": ["b"]}"#;
        let parsed = parse_structured(raw);
        assert_eq!(parsed.executive_summary, "Overview.");
        assert_eq!(parsed.bullets, vec!["a"]);
        assert_eq!(parsed.highlights, vec!["b"]);
    }

    #[test]
    fn salvages_object_wrapped_in_prose_and_fences() {
        let raw = "Sure! Here is the JSON:\n```json\n{\"executive_summary\": \"S\", \"bullets\": [], \"highlights\": []}\n```\nLet me know.";
        let parsed = parse_structured(raw);
        assert_eq!(parsed.executive_summary, "S");
    }

    #[test]
    fn braces_inside_strings_do_not_break_salvage() {
        let raw = "note {\"executive_summary\": \"uses { and } inside\", \"bullets\": [], \"highlights\": []} trailing }";
        let parsed = parse_structured(raw);
        assert_eq!(parsed.executive_summary, "uses { and } inside");
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let raw = r#"{"executive_summary": "S", "bullets": [], "highlights": [], "confidence": 0.9}"#;
        assert_eq!(parse_structured(raw).executive_summary, "S");
    }

    #[test]
    fn missing_fields_default_to_empty() {
        let parsed = parse_structured(r#"{"executive_summary": "only this"}"#);
        assert_eq!(parsed.executive_summary, "only this");
        assert!(parsed.bullets.is_empty());
        assert!(parsed.highlights.is_empty());
    }

    #[test]
    fn unparseable_response_yields_empty_summary() {
        let parsed = parse_structured("the model refused to answer");
        assert_eq!(parsed, StructuredSummary::default());
        assert_eq!(parse_structured(""), StructuredSummary::default());
    }
}
