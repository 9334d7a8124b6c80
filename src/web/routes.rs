use axum::{
    Json,
    extract::{Multipart, State},
    http::StatusCode,
};
use serde::Serialize;
use tracing::{error, info};

use crate::pdf::{self, ExtractError};
use crate::summarize::{
    DOCUMENT_SEPARATOR, DocumentSummary, SourceDocument, SummarizeError, TaskKind,
};
use crate::web::{ApiMessage, AppState, PROVIDER, json_error};

type HandlerError = (StatusCode, Json<ApiMessage>);

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub summary: String,
    pub provider: &'static str,
}

#[derive(Debug, Serialize)]
pub struct StructuredSummaryResponse {
    pub executive_summary: String,
    pub bullets: Vec<String>,
    pub highlights: Vec<String>,
    pub provider: &'static str,
}

#[derive(Debug, Serialize)]
pub struct MultiSummaryResponse {
    pub items: Vec<DocumentSummary>,
    pub combined_summary: String,
    pub provider: &'static str,
}

#[derive(Debug, Serialize)]
pub struct QaResponse {
    pub answer: String,
    pub provider: &'static str,
}

pub async fn service_info() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "provider": PROVIDER,
        "endpoints": ["/summarize", "/summarize-structured", "/summarize-multi", "/qa"],
    }))
}

/// Prose summary of the uploaded document(s), hierarchical when more than one
/// file is uploaded.
pub async fn summarize(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<SummaryResponse>, HandlerError> {
    let form = read_form(multipart).await?;
    let documents = extract_documents(form.files, form.pages).await?;
    info!(files = documents.len(), "summarize request");

    let combined = combine(&documents);
    let summarizer = state.summarizer();
    let language = summarizer.resolve_language(form.language.as_deref(), &combined);
    let kind = if documents.len() > 1 {
        TaskKind::Hierarchical
    } else {
        TaskKind::Plain
    };

    let summary = summarizer
        .summarize_prose(kind, &combined, &language)
        .await
        .map_err(generation_error)?;

    Ok(Json(SummaryResponse {
        summary,
        provider: PROVIDER,
    }))
}

/// Machine-readable summary: executive summary, bullets, and highlights.
pub async fn summarize_structured(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<StructuredSummaryResponse>, HandlerError> {
    let form = read_form(multipart).await?;
    let documents = extract_documents(form.files, form.pages).await?;
    info!(files = documents.len(), "structured summarize request");

    let combined = combine(&documents);
    let summarizer = state.summarizer();
    let language = summarizer.resolve_language(form.language.as_deref(), &combined);
    let kind = if documents.len() > 1 {
        TaskKind::StructuredHierarchical
    } else {
        TaskKind::Structured
    };

    let summary = summarizer
        .summarize_structured(kind, &combined, &language)
        .await
        .map_err(generation_error)?;

    Ok(Json(StructuredSummaryResponse {
        executive_summary: summary.executive_summary,
        bullets: summary.bullets,
        highlights: summary.highlights,
        provider: PROVIDER,
    }))
}

/// Per-document structured summaries plus a combined overview.
pub async fn summarize_multi(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<MultiSummaryResponse>, HandlerError> {
    let form = read_form(multipart).await?;
    let documents = extract_documents(form.files, form.pages).await?;
    info!(files = documents.len(), "multi-document summarize request");

    let batch = state
        .summarizer()
        .summarize_batch(&documents, form.language.as_deref())
        .await
        .map_err(generation_error)?;

    Ok(Json(MultiSummaryResponse {
        items: batch.items,
        combined_summary: batch.combined_summary,
        provider: PROVIDER,
    }))
}

/// Free-form question answering over the uploaded document(s).
pub async fn qa(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<QaResponse>, HandlerError> {
    let form = read_form(multipart).await?;
    let question = match form.question.as_deref().map(str::trim) {
        Some(question) if !question.is_empty() => question.to_string(),
        _ => {
            return Err(json_error(
                StatusCode::BAD_REQUEST,
                "question field is required",
            ));
        }
    };

    let documents = extract_documents(form.files, form.pages).await?;
    info!(files = documents.len(), "qa request");

    let combined = combine(&documents);
    let summarizer = state.summarizer();
    let language = summarizer.resolve_language(form.language.as_deref(), &combined);

    let answer = summarizer
        .answer(&question, &combined, &language)
        .await
        .map_err(generation_error)?;

    Ok(Json(QaResponse {
        answer,
        provider: PROVIDER,
    }))
}

struct UploadedFile {
    filename: String,
    bytes: Vec<u8>,
}

#[derive(Default)]
struct UploadForm {
    files: Vec<UploadedFile>,
    language: Option<String>,
    pages: Option<String>,
    question: Option<String>,
}

/// Drains the multipart form: any number of `files` parts plus the optional
/// text fields. Unknown fields are ignored.
async fn read_form(mut multipart: Multipart) -> Result<UploadForm, HandlerError> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart.next_field().await.map_err(|err| {
        json_error(StatusCode::BAD_REQUEST, format!("invalid form data: {err}"))
    })? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        match name.as_str() {
            "files" => {
                let filename = field
                    .file_name()
                    .map(str::to_string)
                    .unwrap_or_else(|| "upload.pdf".to_string());
                let bytes = field.bytes().await.map_err(|err| {
                    json_error(
                        StatusCode::BAD_REQUEST,
                        format!("failed to read {filename}: {err}"),
                    )
                })?;
                form.files.push(UploadedFile {
                    filename,
                    bytes: bytes.to_vec(),
                });
            }
            "language" => form.language = read_text(field, "language").await?,
            "pages" => form.pages = read_text(field, "pages").await?,
            "question" => form.question = read_text(field, "question").await?,
            _ => {}
        }
    }

    if form.files.is_empty() {
        return Err(json_error(
            StatusCode::BAD_REQUEST,
            "at least one PDF file is required",
        ));
    }

    Ok(form)
}

async fn read_text(
    field: axum::extract::multipart::Field<'_>,
    name: &str,
) -> Result<Option<String>, HandlerError> {
    let value = field.text().await.map_err(|err| {
        json_error(
            StatusCode::BAD_REQUEST,
            format!("failed to read {name}: {err}"),
        )
    })?;
    let value = value.trim();
    Ok(if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    })
}

/// PDF parsing is CPU-bound, so it runs off the async worker threads.
async fn extract_documents(
    files: Vec<UploadedFile>,
    pages: Option<String>,
) -> Result<Vec<SourceDocument>, HandlerError> {
    tokio::task::spawn_blocking(move || {
        let mut documents = Vec::with_capacity(files.len());

        for file in files {
            if !file.filename.to_lowercase().ends_with(".pdf") {
                return Err(json_error(
                    StatusCode::BAD_REQUEST,
                    format!("{} must be a PDF", file.filename),
                ));
            }

            let text =
                pdf::extract_document(&file.bytes, pages.as_deref()).map_err(|err| match err {
                    ExtractError::EmptyText => json_error(
                        StatusCode::BAD_REQUEST,
                        format!("could not extract text from {}", file.filename),
                    ),
                    ExtractError::Malformed(detail) => json_error(
                        StatusCode::BAD_REQUEST,
                        format!("failed to read {}: {detail}", file.filename),
                    ),
                })?;

            documents.push(SourceDocument {
                filename: file.filename,
                text,
            });
        }

        Ok(documents)
    })
    .await
    .map_err(|err| {
        error!(?err, "extraction task failed");
        json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal error")
    })?
}

fn combine(documents: &[SourceDocument]) -> String {
    documents
        .iter()
        .map(|doc| doc.text.as_str())
        .collect::<Vec<_>>()
        .join(DOCUMENT_SEPARATOR)
}

fn generation_error(err: SummarizeError) -> HandlerError {
    match err {
        SummarizeError::Generation(err) => {
            error!(?err, "generation backend failed");
            json_error(
                StatusCode::BAD_GATEWAY,
                format!("generation backend failed: {err}"),
            )
        }
        SummarizeError::Config(message) => {
            error!(%message, "summarization misconfigured");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal error")
        }
    }
}
