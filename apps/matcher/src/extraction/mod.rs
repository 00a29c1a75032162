//! Document Text Extractor: uploaded binary in, normalized text out.
//!
//! Supported formats: PDF (via `pdf-extract`), DOCX, legacy DOC, plain text.
//! Extraction is CPU-bound and runs inside `tokio::task::spawn_blocking`.
//! Nothing is ever written to disk.

use std::fmt;
use std::path::Path;

use bytes::Bytes;
use thiserror::Error;
use tracing::debug;

pub mod clean;
pub mod docx;

use clean::{clean_text, non_whitespace_len, MIN_CONTENT_CHARS};

/// A DOCX body may inflate to this multiple of the upload limit.
const DOCX_INFLATION_FACTOR: usize = 20;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("unsupported document format '{0}'")]
    UnsupportedFormat(String),

    #[error("document is empty after cleaning ({non_whitespace} non-whitespace characters)")]
    EmptyDocument { non_whitespace: usize },

    #[error("upload of {size} bytes exceeds the {limit} byte limit")]
    TooLarge { size: usize, limit: usize },

    #[error("malformed {format} document: {reason}")]
    Malformed {
        format: &'static str,
        reason: String,
    },

    #[error("failed to read document: {0}")]
    Io(#[from] std::io::Error),
}

impl ExtractError {
    pub(crate) fn malformed(format: &'static str, reason: impl fmt::Display) -> Self {
        ExtractError::Malformed {
            format,
            reason: reason.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    Pdf,
    Docx,
    Doc,
    Txt,
}

impl DocumentKind {
    pub const ALL: [DocumentKind; 4] = [
        DocumentKind::Pdf,
        DocumentKind::Docx,
        DocumentKind::Doc,
        DocumentKind::Txt,
    ];

    pub fn extension(self) -> &'static str {
        match self {
            DocumentKind::Pdf => "pdf",
            DocumentKind::Docx => "docx",
            DocumentKind::Doc => "doc",
            DocumentKind::Txt => "txt",
        }
    }

    /// Accepts a bare extension (`pdf`, `.docx`), a MIME type or a file name.
    pub fn from_declared(declared: &str) -> Result<Self, ExtractError> {
        let lowered = declared.trim().to_lowercase();
        let mime = lowered.split(';').next().unwrap_or("").trim();

        let kind = match mime {
            "application/pdf" => Some(DocumentKind::Pdf),
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document" => {
                Some(DocumentKind::Docx)
            }
            "application/msword" => Some(DocumentKind::Doc),
            "text/plain" => Some(DocumentKind::Txt),
            _ => None,
        };
        if let Some(kind) = kind {
            return Ok(kind);
        }

        let extension = mime.rsplit('.').next().unwrap_or(mime);
        match extension {
            "pdf" => Ok(DocumentKind::Pdf),
            "docx" => Ok(DocumentKind::Docx),
            "doc" => Ok(DocumentKind::Doc),
            "txt" | "text" => Ok(DocumentKind::Txt),
            _ => Err(ExtractError::UnsupportedFormat(declared.trim().to_string())),
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Turns uploads into cleaned text, enforcing size and format policy.
#[derive(Debug, Clone)]
pub struct TextExtractor {
    max_bytes: usize,
    allowed: Vec<DocumentKind>,
}

impl TextExtractor {
    pub fn new(max_bytes: usize, allowed: Vec<DocumentKind>) -> Self {
        Self { max_bytes, allowed }
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Ceiling for a compressed container's text part once inflated.
    fn max_inflated_bytes(&self) -> usize {
        self.max_bytes.saturating_mul(DOCX_INFLATION_FACTOR)
    }

    /// Resolves the declared type against the allow-list.
    pub fn resolve_kind(&self, declared: &str) -> Result<DocumentKind, ExtractError> {
        let kind = DocumentKind::from_declared(declared)?;
        if !self.allowed.contains(&kind) {
            return Err(ExtractError::UnsupportedFormat(kind.to_string()));
        }
        Ok(kind)
    }

    /// Synchronous extraction. Fails with `EmptyDocument` when fewer than
    /// `MIN_CONTENT_CHARS + 1` non-whitespace characters survive cleaning.
    pub fn extract_bytes(&self, declared: &str, bytes: &[u8]) -> Result<String, ExtractError> {
        if bytes.len() > self.max_bytes {
            return Err(ExtractError::TooLarge {
                size: bytes.len(),
                limit: self.max_bytes,
            });
        }

        let kind = self.resolve_kind(declared)?;
        let raw = match kind {
            DocumentKind::Pdf => pdf_extract::extract_text_from_mem(bytes)
                .map_err(|e| ExtractError::malformed("pdf", e))?,
            DocumentKind::Docx => docx::extract_docx(bytes, self.max_inflated_bytes())?,
            DocumentKind::Doc => docx::extract_doc(bytes)?,
            DocumentKind::Txt => decode_plain_text(bytes),
        };

        let text = clean_text(&raw);
        let non_whitespace = non_whitespace_len(&text);
        if non_whitespace <= MIN_CONTENT_CHARS {
            return Err(ExtractError::EmptyDocument { non_whitespace });
        }

        debug!(
            kind = %kind,
            bytes = bytes.len(),
            chars = text.chars().count(),
            "Extracted document text"
        );
        Ok(text)
    }

    /// Runs extraction on the blocking pool. A panic inside a decoder is
    /// reported as a malformed document.
    pub async fn extract(&self, declared: &str, bytes: Bytes) -> Result<String, ExtractError> {
        let extractor = self.clone();
        let declared = declared.to_string();
        tokio::task::spawn_blocking(move || extractor.extract_bytes(&declared, &bytes))
            .await
            .map_err(|e| ExtractError::malformed("document", format!("decoder aborted: {e}")))?
    }

    /// Reads a file and extracts it. The declared type defaults to the file extension.
    pub async fn extract_path(
        &self,
        path: &Path,
        declared: Option<&str>,
    ) -> Result<String, ExtractError> {
        let declared = match declared {
            Some(d) => d.to_string(),
            None => path
                .extension()
                .and_then(|e| e.to_str())
                .map(str::to_string)
                .ok_or_else(|| ExtractError::UnsupportedFormat(path.display().to_string()))?,
        };
        let bytes = tokio::fs::read(path).await?;
        self.extract(&declared, Bytes::from(bytes)).await
    }
}

/// UTF-8 with BOM stripping; invalid sequences are replaced rather than rejected.
fn decode_plain_text(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(bytes);
    String::from_utf8_lossy(bytes).into_owned()
}
