//! Policy text extraction.
//!
//! PDF uploads go through `pdf-extract`, which emits pages in document order.
//! Plain-text uploads are accepted as-is so policies can be analysed without
//! a PDF round trip.

use std::panic;
use std::path::Path;

use tracing::{debug, instrument};

use crate::error::PolicyError;

const PDF_MAGIC: &[u8] = b"%PDF-";

/// Extract text from PDF bytes, preserving page order and line breaks.
#[instrument(name = "extract_pdf", skip(pdf_bytes), fields(bytes = pdf_bytes.len()))]
pub fn extract_text(pdf_bytes: &[u8]) -> Result<String, PolicyError> {
    if !looks_like_pdf(pdf_bytes) {
        return Err(PolicyError::MalformedInput(
            "file does not start with a PDF header".to_string(),
        ));
    }
    // pdf-extract panics on some malformed object graphs.
    let extracted = panic::catch_unwind(|| pdf_extract::extract_text_from_mem(pdf_bytes))
        .map_err(|_| PolicyError::MalformedInput("PDF structure could not be parsed".to_string()))?;
    let text = extracted.map_err(|err| {
        let message = err.to_string();
        if message.to_lowercase().contains("encrypt") {
            PolicyError::MalformedInput("PDF is password protected".to_string())
        } else {
            PolicyError::MalformedInput(message)
        }
    })?;
    debug!(chars = text.chars().count(), "pdf text extracted");
    Ok(text)
}

/// Load a policy from disk: `.pdf` (or anything with a PDF header) is
/// extracted, anything else must be UTF-8 text.
pub fn load_policy(path: &Path) -> Result<String, PolicyError> {
    let bytes = std::fs::read(path).map_err(|err| {
        PolicyError::MalformedInput(format!("failed to read {}: {err}", path.display()))
    })?;
    let is_pdf_name = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false);
    if is_pdf_name || looks_like_pdf(&bytes) {
        return extract_text(&bytes);
    }
    String::from_utf8(bytes).map_err(|_| {
        PolicyError::MalformedInput(format!("{} is neither a PDF nor UTF-8 text", path.display()))
    })
}

/// Collapse every run of whitespace (including line breaks) into one space
/// and trim the ends.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn looks_like_pdf(bytes: &[u8]) -> bool {
    let trimmed = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .map(|start| &bytes[start..])
        .unwrap_or_default();
    trimmed.starts_with(PDF_MAGIC)
}
