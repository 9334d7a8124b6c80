//! Long-document summarization pipeline.
//!
//! A document is split into overlapping word windows, each window is
//! summarized through the generation collaborator, and the partial results
//! are merged back into one summary. Prose tasks merge with one extra
//! generation call; structured tasks merge their array fields locally. A
//! failed window degrades the result instead of failing the request; only a
//! failure on the sole window of a request surfaces as an error.

mod chunker;
mod highlight;
mod prompts;
mod reduce;

use std::sync::Arc;

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tracing::{info, warn};

use crate::language::{self, LanguageDetector};
use crate::llm::{GenerateError, Generator, parse_structured};

use chunker::Window;
use highlight::highlight;

/// Separator between document texts when a batch is summarized as one unit.
pub const DOCUMENT_SEPARATOR: &str = "\n\n--- Next Document ---\n\n";

/// How many leading characters of a document feed language detection.
const DETECTION_SAMPLE_CHARS: usize = 1_000;

#[derive(Debug, thiserror::Error)]
pub enum SummarizeError {
    #[error("invalid summarization settings: {0}")]
    Config(String),
    #[error(transparent)]
    Generation(#[from] GenerateError),
}

/// The four instruction shapes the pipeline can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    Plain,
    Hierarchical,
    Structured,
    StructuredHierarchical,
}

/// The machine-readable summary shape.
///
/// Every field defaults when absent, so a sparse generation response still
/// parses into a usable value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StructuredSummary {
    #[serde(default)]
    pub executive_summary: String,
    #[serde(default)]
    pub bullets: Vec<String>,
    #[serde(default)]
    pub highlights: Vec<String>,
}

/// Tunables of the pipeline. Defaults match the service's production shape.
#[derive(Debug, Clone)]
pub struct SummarizeConfig {
    /// Window size in words.
    pub chunk_size: usize,
    /// Words shared between consecutive windows.
    pub chunk_overlap: usize,
    /// Documents above this many characters get windowed.
    pub chunk_threshold: usize,
    /// Character cap on the text embedded in a single prompt.
    pub max_prompt_chars: usize,
    pub temperature: f32,
    /// In-flight generation calls per request.
    pub max_concurrent_chunks: usize,
    /// Below this many highlights the extractive fallback kicks in.
    pub min_highlights: usize,
    /// How many sentences the extractive fallback selects.
    pub fallback_highlights: usize,
}

impl Default for SummarizeConfig {
    fn default() -> Self {
        Self {
            chunk_size: 10_000,
            chunk_overlap: 500,
            chunk_threshold: 100_000,
            max_prompt_chars: 30_000,
            temperature: 0.3,
            max_concurrent_chunks: 5,
            min_highlights: 3,
            fallback_highlights: 5,
        }
    }
}

/// One uploaded document, already extracted to plain text.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    pub filename: String,
    pub text: String,
}

/// Per-document result of a batch run.
#[derive(Debug, Serialize)]
pub struct DocumentSummary {
    pub filename: String,
    #[serde(flatten)]
    pub summary: StructuredSummary,
}

/// Result of summarizing several documents in one request.
#[derive(Debug, Serialize)]
pub struct BatchSummary {
    pub items: Vec<DocumentSummary>,
    pub combined_summary: String,
}

/// Drops everything past the first `max` characters, on a char boundary.
pub(crate) fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Orchestrates the window/summarize/merge pipeline over a generation
/// collaborator and a language detector.
pub struct Summarizer {
    generator: Arc<dyn Generator>,
    detector: Arc<dyn LanguageDetector>,
    config: SummarizeConfig,
}

impl Summarizer {
    pub fn new(
        generator: Arc<dyn Generator>,
        detector: Arc<dyn LanguageDetector>,
        config: SummarizeConfig,
    ) -> Result<Self, SummarizeError> {
        if config.chunk_size == 0 || config.chunk_overlap >= config.chunk_size {
            return Err(SummarizeError::Config(format!(
                "chunk overlap ({}) must be smaller than chunk size ({})",
                config.chunk_overlap, config.chunk_size
            )));
        }
        if config.max_concurrent_chunks == 0 {
            return Err(SummarizeError::Config(
                "max concurrent chunks must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            generator,
            detector,
            config,
        })
    }

    /// Picks the output language: an explicit request wins, otherwise the
    /// detector runs over the head of the text. Unknown detector codes fall
    /// back to the default language rather than failing the request.
    pub fn resolve_language(&self, explicit: Option<&str>, text: &str) -> String {
        if let Some(requested) = explicit {
            let requested = requested.trim();
            if !requested.is_empty() {
                return language::canonical(requested);
            }
        }

        let sample = truncate_chars(text, DETECTION_SAMPLE_CHARS);
        let code = self.detector.detect(sample);
        language::display_name(&code)
            .unwrap_or(language::DEFAULT_LANGUAGE)
            .to_string()
    }

    /// Summarizes a document into prose.
    ///
    /// A single-window request surfaces generation failures to the caller; a
    /// windowed request contains them per window and merges what succeeded.
    pub async fn summarize_prose(
        &self,
        kind: TaskKind,
        text: &str,
        language: &str,
    ) -> Result<String, SummarizeError> {
        let windows = self.windows_for(text)?;

        if windows.len() == 1 {
            let prompt = prompts::build(
                kind,
                language,
                truncate_chars(&windows[0].text, self.config.max_prompt_chars),
            );
            return Ok(self
                .generator
                .generate(&prompt, self.config.temperature)
                .await?);
        }

        let partials = self.map_windows(kind, &windows, language).await;
        Ok(reduce::reduce_text(
            self.generator.as_ref(),
            partials,
            language,
            self.config.temperature,
        )
        .await)
    }

    /// Summarizes a document into the structured shape, with the extractive
    /// highlight fallback when the generated highlights come up short.
    pub async fn summarize_structured(
        &self,
        kind: TaskKind,
        text: &str,
        language: &str,
    ) -> Result<StructuredSummary, SummarizeError> {
        let windows = self.windows_for(text)?;

        let mut summary = if windows.len() == 1 {
            let prompt = prompts::build(
                kind,
                language,
                truncate_chars(&windows[0].text, self.config.max_prompt_chars),
            );
            let raw = self
                .generator
                .generate(&prompt, self.config.temperature)
                .await?;
            parse_structured(&raw)
        } else {
            let partials = self
                .map_windows(kind, &windows, language)
                .await
                .iter()
                .map(|raw| parse_structured(raw))
                .collect();
            reduce::merge_structured(
                self.generator.as_ref(),
                partials,
                language,
                self.config.temperature,
            )
            .await
        };

        if summary.highlights.len() < self.config.min_highlights {
            let extracted = highlight(text, self.config.fallback_highlights);
            if !extracted.is_empty() {
                summary.highlights = extracted;
            }
        }

        Ok(summary)
    }

    /// Summarizes a batch: one structured summary per document (the
    /// hierarchical variant when the batch holds more than one) plus a prose
    /// summary of the whole set, all in a single language resolved once from
    /// the combined text.
    pub async fn summarize_batch(
        &self,
        documents: &[SourceDocument],
        explicit_language: Option<&str>,
    ) -> Result<BatchSummary, SummarizeError> {
        let combined = documents
            .iter()
            .map(|doc| doc.text.as_str())
            .collect::<Vec<_>>()
            .join(DOCUMENT_SEPARATOR);
        let language = self.resolve_language(explicit_language, &combined);

        let per_document_kind = if documents.len() > 1 {
            TaskKind::StructuredHierarchical
        } else {
            TaskKind::Structured
        };

        let mut items = Vec::with_capacity(documents.len());
        for document in documents {
            let summary = self
                .summarize_structured(per_document_kind, &document.text, &language)
                .await?;
            items.push(DocumentSummary {
                filename: document.filename.clone(),
                summary,
            });
        }

        let combined_kind = if documents.len() > 1 {
            TaskKind::Hierarchical
        } else {
            TaskKind::Plain
        };
        let combined_summary = self
            .summarize_prose(combined_kind, &combined, &language)
            .await?;

        Ok(BatchSummary {
            items,
            combined_summary,
        })
    }

    /// Answers a free-form question over the document text.
    pub async fn answer(
        &self,
        question: &str,
        text: &str,
        language: &str,
    ) -> Result<String, SummarizeError> {
        let prompt = prompts::question_answer(
            language,
            truncate_chars(text, self.config.max_prompt_chars),
            question,
        );
        Ok(self
            .generator
            .generate(&prompt, self.config.temperature)
            .await?)
    }

    fn windows_for(&self, text: &str) -> Result<Vec<Window>, SummarizeError> {
        if text.chars().count() > self.config.chunk_threshold {
            chunker::window(text, self.config.chunk_size, self.config.chunk_overlap)
        } else {
            Ok(vec![Window::whole(text)])
        }
    }

    /// Runs one generation call per window, bounded by the concurrency cap.
    /// Results come back in window order; a failed window yields an empty
    /// string for the reducer to drop.
    async fn map_windows(&self, kind: TaskKind, windows: &[Window], language: &str) -> Vec<String> {
        let semaphore = Semaphore::new(self.config.max_concurrent_chunks);
        let total = windows.len();

        let calls = windows.iter().enumerate().map(|(index, window)| {
            let semaphore = &semaphore;
            async move {
                let _permit = semaphore.acquire().await.expect("semaphore closed");
                info!(chunk = index + 1, total, "summarizing chunk");

                // The prompt cap applies only to unchunked documents; a
                // window always goes out whole.
                let prompt = prompts::build(kind, language, &window.text);
                match self
                    .generator
                    .generate(&prompt, self.config.temperature)
                    .await
                {
                    Ok(text) => text,
                    Err(err) => {
                        warn!(?err, chunk = index + 1, total, "chunk summarization failed");
                        String::new()
                    }
                }
            }
        });

        join_all(calls).await
    }
}
