//! Per-session state
//!
//! One [`SessionState`] lives for the duration of a client connection. It holds
//! the loaded document text and the last generated result.

use schemars::JsonSchema;
use serde::Serialize;

/// Where the session is in the upload → generate → export cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    /// No document loaded
    Empty,
    /// Document loaded, nothing generated for it yet
    TextLoaded,
    /// Model call in flight
    Generating,
    /// Last generation succeeded
    Generated,
    /// Last generation failed
    Failed,
}

/// Text extracted from one uploaded PDF
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedDocument {
    pub source_name: String,
    pub page_count: u32,
    pub text: String,
}

#[derive(Debug)]
pub struct SessionState {
    document: Option<LoadedDocument>,
    result: String,
    phase: SessionPhase,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            document: None,
            result: String::new(),
            phase: SessionPhase::Empty,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn document(&self) -> Option<&LoadedDocument> {
        self.document.as_ref()
    }

    /// Replace the document. The previous result is kept.
    pub fn load_document(&mut self, document: LoadedDocument) {
        self.document = Some(document);
        self.phase = SessionPhase::TextLoaded;
    }

    /// Drop the document after a failed upload so generation stays disabled
    pub fn clear_document(&mut self) {
        self.document = None;
        self.phase = SessionPhase::Empty;
    }

    /// Current result; empty until a generation succeeds
    pub fn result(&self) -> &str {
        &self.result
    }

    pub fn has_result(&self) -> bool {
        !self.result.is_empty()
    }

    /// Clear the result ahead of a model call
    pub fn begin_generation(&mut self) {
        self.result.clear();
        self.phase = SessionPhase::Generating;
    }

    pub fn set_result(&mut self, value: String) {
        self.result = value;
        self.phase = SessionPhase::Generated;
    }

    pub fn mark_failed(&mut self) {
        self.phase = SessionPhase::Failed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document() -> LoadedDocument {
        LoadedDocument {
            source_name: "unit.pdf".to_string(),
            page_count: 1,
            text: "content".to_string(),
        }
    }

    #[test]
    fn test_starts_empty() {
        let state = SessionState::new();
        assert_eq!(state.phase(), SessionPhase::Empty);
        assert_eq!(state.result(), "");
        assert!(!state.has_result());
        assert!(state.document().is_none());
    }

    #[test]
    fn test_generation_cycle() {
        let mut state = SessionState::new();
        state.load_document(document());
        assert_eq!(state.phase(), SessionPhase::TextLoaded);

        state.begin_generation();
        assert_eq!(state.phase(), SessionPhase::Generating);

        state.set_result("1. Question".to_string());
        assert_eq!(state.phase(), SessionPhase::Generated);
        assert_eq!(state.result(), "1. Question");
    }

    #[test]
    fn test_begin_generation_clears_previous_result() {
        let mut state = SessionState::new();
        state.load_document(document());
        state.set_result("old".to_string());

        state.begin_generation();
        state.mark_failed();
        assert_eq!(state.phase(), SessionPhase::Failed);
        assert!(!state.has_result());
    }

    #[test]
    fn test_new_document_keeps_result() {
        let mut state = SessionState::new();
        state.load_document(document());
        state.set_result("kept".to_string());

        state.load_document(LoadedDocument {
            source_name: "other.pdf".to_string(),
            ..document()
        });
        assert_eq!(state.result(), "kept");
        assert_eq!(state.document().unwrap().source_name, "other.pdf");
    }
}
