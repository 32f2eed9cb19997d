//! Study Task Generator Library
//!
//! This crate provides an MCP server that turns a PDF didactic unit into study
//! tasks with a language model:
//! - `load_pdf`: Upload a PDF, extract its text and preview it
//! - `generate_tasks`: Generate questions and activities from the loaded text
//! - `export_tasks`: Offer the generated tasks as a plain-text file
//! - `session_status`: Report where the session is in that cycle

pub mod error;
pub mod llm;
pub mod pdf;
pub mod prompt;
pub mod server;
pub mod session;
pub mod source;

pub use error::{Error, Result};
pub use server::{
    run_server, run_server_with_config, ExportTasksParams, ExportTasksResult, GenerateTasksParams,
    GenerateTasksResult, LoadPdfParams, LoadPdfResult, PdfSource, ServerConfig, TaskServer,
    EXPORT_FILE_NAME, EXPORT_MIME_TYPE, EXPORT_RESOURCE_URI,
};
