//! Error types for the study task generator

use thiserror::Error;

/// Result type alias for the study task generator
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the study task generator
#[derive(Error, Debug)]
pub enum Error {
    /// PDF file not found
    #[error("PDF not found: {path}")]
    PdfNotFound { path: String },

    /// Uploaded bytes are not a readable PDF document
    #[error("Failed to parse document: {reason}")]
    DocumentParse { reason: String },

    /// Generation options rejected before any model call
    #[error("Invalid generation options: {reason}")]
    Validation { reason: String },

    /// Generation requested before a document was loaded
    #[error("No document loaded")]
    NoDocument,

    /// Export requested before anything was generated
    #[error("Nothing to export: no generated result in this session")]
    ExportPrecondition,

    /// Every generation attempt failed; carries the last failure
    #[error("Generation failed after {attempts} attempt(s): {source}")]
    Generation {
        attempts: u32,
        #[source]
        source: Box<Error>,
    },

    /// Model endpoint answered with a non-success status
    #[error("Model API returned {status}: {body}")]
    ModelApi { status: u16, body: String },

    /// Model response held no text content
    #[error("Model response contained no text")]
    EmptyCompletion,

    /// Source resolution error
    #[error("Failed to resolve source: {reason}")]
    SourceResolution { reason: String },

    /// Base64 decode error
    #[error("Invalid base64 data: {0}")]
    Base64Decode(#[from] base64::DecodeError),

    /// HTTP request error
    #[error("HTTP request failed: {0}")]
    HttpRequest(#[from] reqwest::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Path access denied (outside allowed resource directories)
    #[error("Path access denied: {path}")]
    PathAccessDenied { path: String },

    /// SSRF blocked (URL resolves to private/reserved IP)
    #[error("SSRF blocked: {url}")]
    SsrfBlocked { url: String },

    /// Download too large
    #[error("Download too large: {size} bytes (max: {max_size} bytes)")]
    DownloadTooLarge { size: u64, max_size: u64 },
}

impl From<pdf_extract::OutputError> for Error {
    fn from(err: pdf_extract::OutputError) -> Self {
        Error::DocumentParse {
            reason: err.to_string(),
        }
    }
}

impl Error {
    /// Return a sanitized error message safe to send to clients.
    /// Internal details (paths, library errors, file sizes) are omitted.
    /// Full details should be logged via tracing before calling this.
    pub fn client_message(&self) -> String {
        match self {
            Error::PdfNotFound { .. } => "PDF not found".to_string(),
            Error::DocumentParse { .. } => {
                "The uploaded file could not be read as a PDF document".to_string()
            }
            Error::Validation { reason } => reason.clone(),
            Error::NoDocument => "Upload a PDF with load_pdf before generating tasks".to_string(),
            Error::ExportPrecondition => {
                "Nothing to export yet: generate tasks first".to_string()
            }
            Error::Generation { attempts, .. } => {
                format!("Task generation failed after {} attempt(s)", attempts)
            }
            Error::ModelApi { status, .. } => format!("Model API returned status {}", status),
            Error::EmptyCompletion => "Model returned no text".to_string(),
            Error::SourceResolution { .. } => "Failed to resolve PDF source".to_string(),
            Error::Base64Decode(_) => "Invalid base64 data".to_string(),
            Error::HttpRequest(_) => "HTTP request failed".to_string(),
            Error::Io(_) => "I/O error".to_string(),
            Error::Serialization(_) => "Serialization error".to_string(),
            Error::PathAccessDenied { .. } => "Access denied".to_string(),
            Error::SsrfBlocked { .. } => "URL not allowed".to_string(),
            Error::DownloadTooLarge { max_size, .. } => {
                format!("Download exceeds maximum size of {} bytes", max_size)
            }
        }
    }

    /// Whether this error is a user-correctable warning rather than a failure
    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            Error::Validation { .. } | Error::NoDocument | Error::ExportPrecondition
        )
    }
}
