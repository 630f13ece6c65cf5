//! PDF text extraction. The analysis core never looks at file bytes; handlers
//! call a `TextExtractor` and pass the resulting text along.

use std::io::Write;
use std::process::Command;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, warn};

const PDF_MAGIC: &[u8] = b"%PDF-";

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("File is not a PDF")]
    NotPdf,

    #[error("PDF could not be read: {0}")]
    Unreadable(String),

    #[error("PDF contains no extractable text")]
    NoText,

    #[error("pdftotext is unavailable: {0}")]
    ToolUnavailable(String),
}

/// Turns uploaded PDF bytes into plain text. Blocking; call it from
/// `spawn_blocking` in async contexts.
pub trait TextExtractor: Send + Sync {
    fn extract(&self, bytes: &[u8]) -> Result<String, ExtractionError>;
}

/// In-process extraction via the `pdf-extract` crate.
pub struct PdfExtractExtractor;

impl TextExtractor for PdfExtractExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<String, ExtractionError> {
        ensure_pdf(bytes)?;
        let text = pdf_extract::extract_text_from_mem(bytes)
            .map_err(|e| ExtractionError::Unreadable(e.to_string()))?;
        non_blank(text)
    }
}

/// Shells out to poppler's `pdftotext`, which copes better with some
/// scanned or oddly-encoded resumes.
pub struct PdftotextExtractor {
    binary: String,
}

impl Default for PdftotextExtractor {
    fn default() -> Self {
        Self {
            binary: "pdftotext".to_string(),
        }
    }
}

impl TextExtractor for PdftotextExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<String, ExtractionError> {
        ensure_pdf(bytes)?;

        // Removed on drop, including on every error path below.
        let mut file = tempfile::Builder::new()
            .prefix("resume-")
            .suffix(".pdf")
            .tempfile()
            .map_err(|e| ExtractionError::Unreadable(format!("temp file: {e}")))?;
        file.write_all(bytes)
            .map_err(|e| ExtractionError::Unreadable(format!("temp file: {e}")))?;

        debug!("Running {} on {}", self.binary, file.path().display());
        let output = Command::new(&self.binary)
            .arg(file.path())
            .arg("-")
            .output()
            .map_err(|e| ExtractionError::ToolUnavailable(e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!("{} failed: {}", self.binary, stderr.trim());
            return Err(ExtractionError::Unreadable(stderr.trim().to_string()));
        }

        non_blank(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Picks an extractor from the `PDF_EXTRACTOR` setting. Anything other than
/// `pdftotext` gets the built-in one.
pub fn extractor_for(name: &str) -> Arc<dyn TextExtractor> {
    match name.trim().to_ascii_lowercase().as_str() {
        "pdftotext" => Arc::new(PdftotextExtractor::default()),
        _ => Arc::new(PdfExtractExtractor),
    }
}

fn ensure_pdf(bytes: &[u8]) -> Result<(), ExtractionError> {
    if bytes.starts_with(PDF_MAGIC) {
        Ok(())
    } else {
        Err(ExtractionError::NotPdf)
    }
}

fn non_blank(text: String) -> Result<String, ExtractionError> {
    if text.trim().is_empty() {
        Err(ExtractionError::NoText)
    } else {
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_rejects_non_pdf() {
        let err = PdfExtractExtractor.extract(b"hello world").unwrap_err();
        assert!(matches!(err, ExtractionError::NotPdf));
    }

    #[test]
    fn test_pdftotext_rejects_non_pdf_before_spawning() {
        let extractor = PdftotextExtractor {
            binary: "definitely-not-installed-binary".to_string(),
        };
        assert!(matches!(
            extractor.extract(b"PK\x03\x04 zip file"),
            Err(ExtractionError::NotPdf)
        ));
    }

    #[test]
    fn test_pdftotext_missing_binary_is_reported() {
        let extractor = PdftotextExtractor {
            binary: "definitely-not-installed-binary".to_string(),
        };
        assert!(matches!(
            extractor.extract(b"%PDF-1.4\n%%EOF"),
            Err(ExtractionError::ToolUnavailable(_))
        ));
    }

    #[test]
    fn test_non_blank() {
        assert!(matches!(non_blank("  \n".to_string()), Err(ExtractionError::NoText)));
        assert_eq!(non_blank("Jane".to_string()).unwrap(), "Jane");
    }
}
