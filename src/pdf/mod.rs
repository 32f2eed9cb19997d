//! PDF processing layer
//!
//! This module provides text extraction using pdf-extract.

mod reader;

pub use reader::{extract_text, PdfReader};
