// src/error.rs
use thiserror::Error;

/// Failures surfaced by the rate-limited HTTP client after its own retry
/// budget is spent. Transient errors were retried and still failed; permanent
/// errors are not worth retrying.
#[derive(Debug, Error)]
pub enum HttpClientError {
    #[error("transient failure after retries: {0}")]
    Transient(String),

    #[error("permanent failure (HTTP {status}): {message}")]
    Permanent { status: u16, message: String },
}

impl HttpClientError {
    pub fn is_transient(&self) -> bool {
        matches!(self, HttpClientError::Transient(_))
    }
}

/// Expected empty results from the enrichment API are errors the coordinator
/// can branch on, not exceptions.
#[derive(Debug, Error)]
pub enum EnrichmentError {
    #[error("no organization found")]
    NoOrganization,

    #[error("no contacts found")]
    NoContacts,

    #[error("either a domain or a company name is required")]
    MissingIdentifier,

    #[error("enrichment API call failed: {0}")]
    Http(#[from] HttpClientError),

    #[error("unexpected enrichment response: {0}")]
    BadResponse(String),
}

/// LLM completion failures.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("completion request failed: {0}")]
    Http(#[from] HttpClientError),

    #[error("completion response missing text: {0}")]
    EmptyResponse(String),
}

/// Normalization failures. `InvalidJson` keeps the raw model response for
/// diagnostics; it is never silently coerced into a record.
#[derive(Debug, Error)]
pub enum TransformError {
    #[error("LLM call failed: {0}")]
    Llm(#[from] LlmError),

    #[error("model did not return valid JSON: {message}")]
    InvalidJson { message: String, raw: String },

    #[error("canonical record validation failed: {0}")]
    Validation(String),
}

/// Email sending failures. An unsupported provider is a request-time
/// validation error, not a pipeline error.
#[derive(Debug, Error)]
pub enum SendError {
    #[error("unsupported email provider: {0}")]
    UnsupportedProvider(String),

    #[error("provider not configured: {0}")]
    NotConfigured(String),

    #[error("send failed: {0}")]
    Http(#[from] HttpClientError),

    #[error("provider rejected message: {0}")]
    Rejected(String),
}

/// Email draft generation failures.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("LLM call failed: {0}")]
    Llm(#[from] LlmError),

    #[error("draft response was not valid JSON: {0}")]
    InvalidDraft(String),
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(String),

    #[error("record not found: {0}")]
    NotFound(String),
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        StorageError::Database(err.to_string())
    }
}
