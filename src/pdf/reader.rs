//! PDF reader wrapper for pdf-extract

use crate::error::{Error, Result};
use std::any::Any;
use std::panic;

/// PDF reader using pdf-extract.
///
/// All page text is extracted upfront, so the reader holds no borrowed
/// document state after construction. Composite (Type0) fonts are decoded
/// through their ToUnicode CMap.
pub struct PdfReader {
    page_texts: Vec<String>,
}

impl PdfReader {
    /// Open a PDF from bytes
    pub fn open_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < 4 || &data[0..4] != b"%PDF" {
            return Err(Error::DocumentParse {
                reason: "Not a valid PDF file".to_string(),
            });
        }

        let page_texts = Self::extract_all_page_texts(data)?;

        Ok(Self { page_texts })
    }

    /// pdf-extract panics on some malformed font and content streams, so a
    /// panic is reported as a parse failure of the upload.
    fn extract_all_page_texts(data: &[u8]) -> Result<Vec<String>> {
        match panic::catch_unwind(|| pdf_extract::extract_text_from_mem_by_pages(data)) {
            Ok(pages) => Ok(pages?),
            Err(payload) => Err(Error::DocumentParse {
                reason: format!("Failed to extract text: {}", panic_reason(payload.as_ref())),
            }),
        }
    }

    /// Get page count
    pub fn page_count(&self) -> u32 {
        u32::try_from(self.page_texts.len()).unwrap_or(u32::MAX)
    }

    /// Per-page text in page order
    pub fn page_texts(&self) -> &[String] {
        &self.page_texts
    }

    /// Concatenated text of every page, with no separator added between pages
    pub fn full_text(&self) -> String {
        self.page_texts.concat()
    }
}

fn panic_reason(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "extractor panicked"
    }
}

/// Extract the text of a PDF given as raw bytes.
///
/// Returns an empty string for documents with no pages or no extractable text.
pub fn extract_text(data: &[u8]) -> Result<String> {
    Ok(PdfReader::open_bytes(data)?.full_text())
}
