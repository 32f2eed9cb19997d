//! MCP Server implementation using rmcp
//!
//! Each tool call is one user action. Actions on a server share one
//! [`SessionState`] and run one at a time: the session lock is held for the
//! whole action, including the model call.

use crate::error::Error;
use crate::llm::{CompletionTransport, GeminiTransport, GenerationClient, GenerationConfig};
use crate::pdf::PdfReader;
use crate::prompt::{build_prompt, GenerationOptions, QuestionType, TaskCount};
use crate::session::{LoadedDocument, SessionPhase, SessionState};
use crate::source::{resolve_base64, resolve_path, resolve_url, DownloadPolicy, ResolvedPdf};
use anyhow::Result;
use rmcp::{
    handler::server::tool::ToolRouter, handler::server::wrapper::Parameters, model::*,
    schemars::JsonSchema, service::RequestContext, tool, tool_handler, tool_router, RoleServer,
    ServerHandler, ServiceExt,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Fixed name of the exported task file
pub const EXPORT_FILE_NAME: &str = "tasques_estudiants.txt";
/// MIME type of the exported task file
pub const EXPORT_MIME_TYPE: &str = "text/plain";
/// Resource URI under which the exported task file is offered
pub const EXPORT_RESOURCE_URI: &str = "session://tasques_estudiants.txt";
/// Characters of extracted text shown after an upload
pub const DEFAULT_PREVIEW_CHARS: usize = 1500;

/// PDF source specification
#[derive(Debug, Clone, Serialize, JsonSchema)]
#[serde(untagged)]
pub enum PdfSource {
    /// File path (absolute or relative)
    Path {
        /// Path to the PDF file
        path: String,
    },
    /// Base64 encoded PDF data
    Base64 {
        /// Base64 encoded PDF content
        base64: String,
    },
    /// URL to download PDF from
    Url {
        /// URL of the PDF file
        url: String,
    },
}

impl<'de> serde::Deserialize<'de> for PdfSource {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;
        let obj = value.as_object().ok_or_else(|| {
            serde::de::Error::custom(
                "Invalid source: expected an object with one of \"path\", \"base64\" or \"url\"",
            )
        })?;

        for key in ["path", "base64", "url"] {
            let Some(v) = obj.get(key) else { continue };
            let s = v
                .as_str()
                .ok_or_else(|| serde::de::Error::custom(format!("\"{}\" must be a string", key)))?
                .to_string();
            return Ok(match key {
                "path" => PdfSource::Path { path: s },
                "base64" => PdfSource::Base64 { base64: s },
                _ => PdfSource::Url { url: s },
            });
        }

        let keys: Vec<&String> = obj.keys().collect();
        Err(serde::de::Error::custom(format!(
            "Invalid source: expected one of \"path\", \"base64\" or \"url\", but got keys: {:?}",
            keys
        )))
    }
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Directories that path uploads and export writes are confined to.
    /// Empty means unrestricted.
    pub resource_dirs: Vec<String>,
    /// Limits for URL uploads
    pub download: DownloadPolicy,
    /// Characters of extracted text returned as preview (default: 1500)
    pub preview_chars: usize,
    /// Model endpoint and credential
    pub generation: GenerationConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            resource_dirs: Vec::new(),
            download: DownloadPolicy::default(),
            preview_chars: DEFAULT_PREVIEW_CHARS,
            generation: GenerationConfig::default(),
        }
    }
}

/// Study task generator MCP server
#[derive(Clone)]
pub struct TaskServer {
    session: Arc<Mutex<SessionState>>,
    generator: GenerationClient,
    tool_router: ToolRouter<Self>,
    config: Arc<ServerConfig>,
}

/// User-facing problem attached to a tool result.
///
/// Warnings are precondition failures the user fixes by changing input;
/// errors are failures of the document or the model call.
#[derive(Debug, Default, Serialize, JsonSchema)]
pub struct Notice {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<&Error> for Notice {
    fn from(e: &Error) -> Self {
        if e.is_warning() {
            Notice {
                warning: Some(e.client_message()),
                error: None,
            }
        } else {
            Notice {
                warning: None,
                error: Some(e.client_message()),
            }
        }
    }
}

// ============================================================================
// Request/Response types for load_pdf
// ============================================================================

#[derive(Debug, Deserialize, JsonSchema)]
pub struct LoadPdfParams {
    /// PDF to upload
    pub source: PdfSource,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct LoadPdfResult {
    pub source: String,
    pub page_count: u32,
    /// Characters of extracted text
    pub char_count: usize,
    /// Leading part of the extracted text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview: Option<String>,
    /// Whether the preview is shorter than the full text
    pub preview_truncated: bool,
    #[serde(flatten)]
    pub notice: Notice,
}

// ============================================================================
// Request/Response types for generate_tasks
// ============================================================================

fn default_task_count() -> u32 {
    TaskCount::default().get()
}

fn default_question_types() -> Vec<QuestionType> {
    vec![QuestionType::Theoretical]
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct GenerateTasksParams {
    /// Number of tasks to generate: 5, 10 or 15 (default: 5)
    #[serde(default = "default_task_count")]
    pub task_count: u32,
    /// Question types to generate (default: ["theoretical"]). At least one is required.
    #[serde(default = "default_question_types")]
    pub question_types: Vec<QuestionType>,
    /// Include answers for each task (default: false)
    #[serde(default)]
    pub include_answers: bool,
}

impl Default for GenerateTasksParams {
    fn default() -> Self {
        Self {
            task_count: default_task_count(),
            question_types: default_question_types(),
            include_answers: false,
        }
    }
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct GenerateTasksResult {
    pub task_count: u32,
    pub question_types: Vec<QuestionType>,
    pub include_answers: bool,
    /// Generated tasks and questions
    pub tasks: String,
    #[serde(flatten)]
    pub notice: Notice,
}

// ============================================================================
// Request/Response types for export_tasks
// ============================================================================

#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct ExportTasksParams {
    /// Directory to also write the task file into
    #[serde(default)]
    pub output_dir: Option<String>,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct ExportTasksResult {
    pub file_name: String,
    pub mime_type: String,
    /// File content; absent when there is nothing to export
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Where the file was written, if output_dir was given
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_path: Option<String>,
    #[serde(flatten)]
    pub notice: Notice,
}

// ============================================================================
// Request/Response types for session_status
// ============================================================================

#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct SessionStatusParams {}

#[derive(Debug, Serialize, JsonSchema)]
pub struct SessionStatusResult {
    pub phase: SessionPhase,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_count: Option<u32>,
    /// Whether export_tasks has something to offer
    pub has_result: bool,
}

fn to_response<T: Serialize>(result: &T) -> String {
    let response = serde_json::json!({ "results": [result] });
    serde_json::to_string_pretty(&response).unwrap_or_default()
}

/// Leading `max_chars` characters of `text`, and whether anything was cut
fn text_preview(text: &str, max_chars: usize) -> (String, bool) {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => (text[..end].to_string(), true),
        None => (text.to_string(), false),
    }
}

// ============================================================================
// Tool implementations
// ============================================================================

#[tool_router]
impl TaskServer {
    /// Create a server talking to Gemini with the given configuration
    pub fn with_config(config: ServerConfig) -> crate::error::Result<Self> {
        let transport = GeminiTransport::new(config.generation.clone())?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Create a server with an explicit model transport
    pub fn with_transport(config: ServerConfig, transport: Arc<dyn CompletionTransport>) -> Self {
        let generator =
            GenerationClient::with_max_attempts(transport, config.generation.max_attempts);
        Self {
            session: Arc::new(Mutex::new(SessionState::new())),
            generator,
            tool_router: Self::tool_router(),
            config: Arc::new(config),
        }
    }

    /// Upload a PDF and preview its text
    #[tool(
        description = "Upload a PDF didactic unit. Extracts its text, keeps it for task generation and returns a preview of the first characters.

A failed upload clears any previously loaded document.

Source format: must be one of {\"path\": \"/absolute/path.pdf\"}, {\"url\": \"https://...\"}, or {\"base64\": \"...\"}"
    )]
    async fn load_pdf(&self, Parameters(params): Parameters<LoadPdfParams>) -> String {
        let result = self
            .process_load_pdf(&params.source)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "load_pdf failed");
                LoadPdfResult {
                    source: Self::source_name(&params.source),
                    page_count: 0,
                    char_count: 0,
                    preview: None,
                    preview_truncated: false,
                    notice: Notice::from(&e),
                }
            });

        to_response(&result)
    }

    /// Generate study tasks from the loaded PDF
    #[tool(
        description = "Generate comprehension questions, activities and tasks for students from the loaded PDF using a language model.

Parameters:
- task_count: 5, 10 or 15 (default 5)
- question_types: any of \"multiple-choice\", \"theoretical\", \"practical\" (default [\"theoretical\"]); at least one is required
- include_answers: include answers for each task (default false)

The previous result is cleared before the model is called. The model call is retried once on failure."
    )]
    async fn generate_tasks(&self, Parameters(params): Parameters<GenerateTasksParams>) -> String {
        let result = self
            .process_generate_tasks(&params)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "generate_tasks failed");
                GenerateTasksResult {
                    task_count: params.task_count,
                    question_types: params.question_types.clone(),
                    include_answers: params.include_answers,
                    tasks: String::new(),
                    notice: Notice::from(&e),
                }
            });

        to_response(&result)
    }

    /// Export the last generated tasks as a text file
    #[tool(
        description = "Export the last generated tasks as the plain-text file tasques_estudiants.txt.

Returns the file content for download. If output_dir is given, the file is also written there. Warns instead when nothing has been generated yet."
    )]
    async fn export_tasks(&self, Parameters(params): Parameters<ExportTasksParams>) -> String {
        let result = self.process_export_tasks(&params).await.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "export_tasks failed");
            ExportTasksResult {
                file_name: EXPORT_FILE_NAME.to_string(),
                mime_type: EXPORT_MIME_TYPE.to_string(),
                content: None,
                output_path: None,
                notice: Notice::from(&e),
            }
        });

        to_response(&result)
    }

    /// Report the session state
    #[tool(
        description = "Report the session state: phase (empty, text_loaded, generating, generated, failed), the loaded document and whether a result is ready to export."
    )]
    async fn session_status(
        &self,
        Parameters(_params): Parameters<SessionStatusParams>,
    ) -> String {
        to_response(&self.session_status_snapshot().await)
    }
}

impl TaskServer {
    fn source_name(source: &PdfSource) -> String {
        match source {
            PdfSource::Path { path } => path.clone(),
            PdfSource::Base64 { .. } => "<base64>".to_string(),
            PdfSource::Url { url } => url.clone(),
        }
    }

    async fn resolve_source(&self, source: &PdfSource) -> crate::error::Result<ResolvedPdf> {
        match source {
            PdfSource::Path { path } => {
                let allowed = self.validate_path_access(path)?;
                resolve_path(allowed)
            }
            PdfSource::Base64 { base64 } => resolve_base64(base64),
            PdfSource::Url { url } => resolve_url(url, &self.config.download).await,
        }
    }

    /// Check that an existing path lies inside a configured resource directory.
    /// With no resource_dirs configured every path is allowed.
    fn validate_path_access(&self, path: &str) -> crate::error::Result<PathBuf> {
        if self.config.resource_dirs.is_empty() {
            return Ok(PathBuf::from(path));
        }

        let canonical = std::fs::canonicalize(path).map_err(|_| Error::PathAccessDenied {
            path: path.to_string(),
        })?;
        self.ensure_within_resource_dirs(canonical, path)
    }

    /// Same check for a file that may not exist yet: its parent is canonicalized instead
    fn validate_output_path_access(&self, path: &Path) -> crate::error::Result<PathBuf> {
        if self.config.resource_dirs.is_empty() {
            return Ok(path.to_path_buf());
        }

        let denied = || Error::PathAccessDenied {
            path: path.display().to_string(),
        };
        let parent = path.parent().unwrap_or(Path::new("."));
        let file_name = path.file_name().ok_or_else(denied)?;
        let canonical = std::fs::canonicalize(parent)
            .map_err(|_| denied())?
            .join(file_name);
        self.ensure_within_resource_dirs(canonical, &path.display().to_string())
    }

    fn ensure_within_resource_dirs(
        &self,
        canonical: PathBuf,
        requested: &str,
    ) -> crate::error::Result<PathBuf> {
        let inside = self.config.resource_dirs.iter().any(|dir| {
            std::fs::canonicalize(dir)
                .map(|d| canonical.starts_with(d))
                .unwrap_or(false)
        });

        if inside {
            Ok(canonical)
        } else {
            Err(Error::PathAccessDenied {
                path: requested.to_string(),
            })
        }
    }

    /// Upload a PDF into the session.
    ///
    /// On any failure the previously loaded document is dropped, so generation
    /// is unavailable until a valid upload.
    pub async fn process_load_pdf(
        &self,
        source: &PdfSource,
    ) -> crate::error::Result<LoadPdfResult> {
        let mut session = self.session.lock().await;

        let document = match self.extract_document(source).await {
            Ok(document) => document,
            Err(e) => {
                session.clear_document();
                return Err(e);
            }
        };

        let (preview, preview_truncated) =
            text_preview(&document.text, self.config.preview_chars);
        let result = LoadPdfResult {
            source: document.source_name.clone(),
            page_count: document.page_count,
            char_count: document.text.chars().count(),
            preview: Some(preview),
            preview_truncated,
            notice: Notice::default(),
        };

        tracing::info!(
            source = %document.source_name,
            pages = document.page_count,
            chars = result.char_count,
            "document loaded"
        );
        session.load_document(document);

        Ok(result)
    }

    async fn extract_document(&self, source: &PdfSource) -> crate::error::Result<LoadedDocument> {
        let resolved = self.resolve_source(source).await?;
        let source_name = resolved.source_name;
        let data = resolved.data;

        // Move CPU-heavy PDF work to blocking thread pool
        let (page_count, text) = tokio::task::spawn_blocking(move || {
            let reader = PdfReader::open_bytes(&data)?;
            Ok::<_, Error>((reader.page_count(), reader.full_text()))
        })
        .await
        .map_err(|e| Error::DocumentParse {
            reason: format!("Extraction task failed: {}", e),
        })??;

        Ok(LoadedDocument {
            source_name,
            page_count,
            text,
        })
    }

    /// Generate tasks for the loaded document and store them in the session.
    ///
    /// Options are validated before anything else; an invalid selection leaves
    /// the session untouched and makes no model call.
    pub async fn process_generate_tasks(
        &self,
        params: &GenerateTasksParams,
    ) -> crate::error::Result<GenerateTasksResult> {
        let options = GenerationOptions::new(
            TaskCount::try_from(params.task_count)?,
            params.question_types.iter().copied(),
            params.include_answers,
        )?;

        let mut session = self.session.lock().await;
        let prompt = match session.document() {
            Some(document) => build_prompt(&document.text, &options),
            None => return Err(Error::NoDocument),
        };

        session.begin_generation();
        tracing::info!(
            task_count = options.task_count().get(),
            include_answers = options.include_answers(),
            "generating tasks"
        );

        let tasks = match self.generator.generate(&prompt).await {
            Ok(tasks) => tasks,
            Err(e) => {
                session.mark_failed();
                return Err(e);
            }
        };
        session.set_result(tasks.clone());

        Ok(GenerateTasksResult {
            task_count: options.task_count().get(),
            question_types: options.question_types().collect(),
            include_answers: options.include_answers(),
            tasks,
            notice: Notice::default(),
        })
    }

    /// Offer the last generated tasks as a file, optionally writing it to `output_dir`
    pub async fn process_export_tasks(
        &self,
        params: &ExportTasksParams,
    ) -> crate::error::Result<ExportTasksResult> {
        let session = self.session.lock().await;
        if !session.has_result() {
            return Err(Error::ExportPrecondition);
        }
        let content = session.result().to_string();

        let output_path = match &params.output_dir {
            Some(dir) => Some(self.write_export(Path::new(dir), &content)?),
            None => None,
        };

        Ok(ExportTasksResult {
            file_name: EXPORT_FILE_NAME.to_string(),
            mime_type: EXPORT_MIME_TYPE.to_string(),
            content: Some(content),
            output_path,
            notice: Notice::default(),
        })
    }

    fn write_export(&self, dir: &Path, content: &str) -> crate::error::Result<String> {
        let path = self.validate_output_path_access(&dir.join(EXPORT_FILE_NAME))?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(&path, content)?;

        tracing::info!(path = %path.display(), "tasks exported");
        Ok(path.display().to_string())
    }

    /// The export file as a resource; empty until something has been generated
    pub async fn export_resources(&self) -> Vec<Resource> {
        let session = self.session.lock().await;
        if !session.has_result() {
            return Vec::new();
        }

        let mut resource =
            RawResource::new(EXPORT_RESOURCE_URI.to_string(), EXPORT_FILE_NAME.to_string());
        resource.mime_type = Some(EXPORT_MIME_TYPE.to_string());
        resource.description = Some("Generated study tasks".to_string());
        resource.size = u32::try_from(session.result().len()).ok();

        vec![Annotated {
            raw: resource,
            annotations: None,
        }]
    }

    /// Contents of the export resource at `uri`
    pub async fn read_export_resource(&self, uri: &str) -> Result<ReadResourceResult, ErrorData> {
        if uri != EXPORT_RESOURCE_URI {
            return Err(ErrorData::invalid_params("Unknown resource", None));
        }

        let session = self.session.lock().await;
        if !session.has_result() {
            return Err(ErrorData::invalid_params(
                Error::ExportPrecondition.client_message(),
                None,
            ));
        }

        Ok(ReadResourceResult {
            contents: vec![ResourceContents::TextResourceContents {
                uri: uri.to_string(),
                mime_type: Some(EXPORT_MIME_TYPE.to_string()),
                text: session.result().to_string(),
                meta: Default::default(),
            }],
        })
    }

    /// Current phase, loaded document and result availability
    pub async fn session_status_snapshot(&self) -> SessionStatusResult {
        let session = self.session.lock().await;
        SessionStatusResult {
            phase: session.phase(),
            source: session.document().map(|d| d.source_name.clone()),
            page_count: session.document().map(|d| d.page_count),
            has_result: session.has_result(),
        }
    }
}

#[tool_handler]
impl ServerHandler for TaskServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_resources()
                .build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(
                "Study task generator. Upload a PDF didactic unit with load_pdf, generate \
                 questions and activities with generate_tasks, then download them with \
                 export_tasks. The exported file is also available as a resource once generated."
                    .into(),
            ),
        }
    }

    /// List the export file once something has been generated
    async fn list_resources(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourcesResult, ErrorData> {
        Ok(ListResourcesResult {
            resources: self.export_resources().await,
            next_cursor: None,
            meta: Default::default(),
        })
    }

    /// Read the export file
    async fn read_resource(
        &self,
        request: ReadResourceRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, ErrorData> {
        self.read_export_resource(&request.uri).await
    }
}

/// Run the MCP server with the model credential taken from the environment
pub async fn run_server() -> Result<()> {
    run_server_with_config(ServerConfig {
        generation: GenerationConfig::from_env(),
        ..ServerConfig::default()
    })
    .await
}

/// Run the MCP server with full configuration
pub async fn run_server_with_config(config: ServerConfig) -> Result<()> {
    let server = TaskServer::with_config(config)?;

    tracing::info!("Study task generator ready, waiting for connections...");

    let service = server.serve(rmcp::transport::io::stdio()).await?;
    service.waiting().await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;

    struct EchoTransport;

    #[async_trait]
    impl CompletionTransport for EchoTransport {
        async fn complete(&self, prompt: &str) -> crate::error::Result<String> {
            Ok(format!("echo:{}", prompt.len()))
        }
    }

    fn server() -> TaskServer {
        TaskServer::with_transport(ServerConfig::default(), Arc::new(EchoTransport))
    }

    #[test]
    fn test_source_name() {
        assert_eq!(
            TaskServer::source_name(&PdfSource::Path {
                path: "/unit.pdf".to_string()
            }),
            "/unit.pdf"
        );
        assert_eq!(
            TaskServer::source_name(&PdfSource::Base64 {
                base64: "...".to_string()
            }),
            "<base64>"
        );
        assert_eq!(
            TaskServer::source_name(&PdfSource::Url {
                url: "https://example.com/unit.pdf".to_string()
            }),
            "https://example.com/unit.pdf"
        );
    }

    #[test]
    fn test_pdf_source_deserialization() {
        let source: PdfSource = serde_json::from_str(r#"{"path": "/unit.pdf"}"#).unwrap();
        assert!(matches!(source, PdfSource::Path { .. }));

        let source: PdfSource = serde_json::from_str(r#"{"base64": "JVBERi0xLjQ="}"#).unwrap();
        assert!(matches!(source, PdfSource::Base64 { .. }));

        let source: PdfSource =
            serde_json::from_str(r#"{"url": "https://example.com/unit.pdf"}"#).unwrap();
        assert!(matches!(source, PdfSource::Url { .. }));
    }

    #[test]
    fn test_pdf_source_rejects_bad_shapes() {
        let err = serde_json::from_str::<PdfSource>(r#"{"path": 3}"#).unwrap_err();
        assert!(err.to_string().contains("\"path\" must be a string"));

        let err = serde_json::from_str::<PdfSource>(r#"{"cache_key": "abc"}"#).unwrap_err();
        assert!(err.to_string().contains("cache_key"));

        assert!(serde_json::from_str::<PdfSource>(r#""/unit.pdf""#).is_err());
    }

    #[test]
    fn test_generate_params_defaults() {
        let params: GenerateTasksParams = serde_json::from_str("{}").unwrap();
        assert_eq!(params.task_count, 5);
        assert_eq!(params.question_types, vec![QuestionType::Theoretical]);
        assert!(!params.include_answers);
    }

    #[test]
    fn test_preview_truncates_on_char_boundary() {
        let (text, truncated) = text_preview("àèìòù", 3);
        assert_eq!(text, "àèì");
        assert!(truncated);

        let (text, truncated) = text_preview("short", 1500);
        assert_eq!(text, "short");
        assert!(!truncated);

        let (text, truncated) = text_preview("exact", 5);
        assert_eq!(text, "exact");
        assert!(!truncated);
    }

    #[test]
    fn test_notice_splits_warnings_from_errors() {
        let notice = Notice::from(&Error::ExportPrecondition);
        assert!(notice.warning.is_some());
        assert!(notice.error.is_none());

        let notice = Notice::from(&Error::EmptyCompletion);
        assert!(notice.warning.is_none());
        assert!(notice.error.is_some());
    }

    #[tokio::test]
    async fn test_generate_without_document() {
        let server = server();
        let result = server
            .process_generate_tasks(&GenerateTasksParams::default())
            .await;
        assert!(matches!(result, Err(Error::NoDocument)));
        assert_eq!(
            server.session_status_snapshot().await.phase,
            SessionPhase::Empty
        );
    }

    #[tokio::test]
    async fn test_invalid_task_count_is_validation_warning() {
        let server = server();
        let params = GenerateTasksParams {
            task_count: 12,
            ..GenerateTasksParams::default()
        };
        let result = server.process_generate_tasks(&params).await;
        assert!(matches!(result, Err(Error::Validation { .. })));
    }

    #[tokio::test]
    async fn test_export_tool_response_without_result() {
        let server = server();
        let response = server
            .export_tasks(Parameters(ExportTasksParams::default()))
            .await;
        let json: serde_json::Value = serde_json::from_str(&response).unwrap();
        let result = &json["results"][0];

        assert_eq!(result["file_name"], EXPORT_FILE_NAME);
        assert!(result.get("content").is_none());
        assert!(result["warning"].as_str().unwrap().contains("generate tasks first"));
    }

    #[tokio::test]
    async fn test_load_missing_path_reports_error() {
        let server = server();
        let response = server
            .load_pdf(Parameters(LoadPdfParams {
                source: PdfSource::Path {
                    path: "/nonexistent/unit.pdf".to_string(),
                },
            }))
            .await;
        let json: serde_json::Value = serde_json::from_str(&response).unwrap();
        let result = &json["results"][0];

        assert_eq!(result["error"], "PDF not found");
        assert!(result.get("preview").is_none());
    }

    #[tokio::test]
    async fn test_path_outside_resource_dirs_denied() {
        let allowed = tempfile::tempdir().unwrap();
        let config = ServerConfig {
            resource_dirs: vec![allowed.path().display().to_string()],
            ..ServerConfig::default()
        };
        let server = TaskServer::with_transport(config, Arc::new(EchoTransport));

        let outside = tempfile::NamedTempFile::new().unwrap();
        let result = server
            .process_load_pdf(&PdfSource::Path {
                path: outside.path().display().to_string(),
            })
            .await;
        assert!(matches!(result, Err(Error::PathAccessDenied { .. })));
    }
}
