//! Text extraction for uploaded e-mail files.

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;

use crate::error::ExtractError;
use crate::types::Attachment;

/// Upload types accepted by the form, as passed to the `accept` attribute.
pub const ACCEPTED_EXTENSIONS: &str = ".txt,.pdf";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Text,
    Pdf,
}

impl DocumentKind {
    pub fn from_filename(filename: &str) -> Option<Self> {
        let extension = Path::new(filename)
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or("")
            .to_lowercase();

        match extension.as_str() {
            "txt" => Some(Self::Text),
            "pdf" => Some(Self::Pdf),
            _ => None,
        }
    }
}

/// Splits a PDF into the text of each page, in document order.
///
/// Called on the blocking pool.
pub trait PdfPages: Send + Sync {
    fn pages(&self, bytes: &[u8]) -> Result<Vec<String>>;
}

/// `pdf-extract` backed page reader.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfExtract;

impl PdfPages for PdfExtract {
    fn pages(&self, bytes: &[u8]) -> Result<Vec<String>> {
        pdf_extract::extract_text_from_mem_by_pages(bytes)
            .map_err(|e| anyhow::anyhow!("{e}"))
    }
}

async fn pdf_text(attachment: &Attachment, pdf: Arc<dyn PdfPages>) -> Result<String, ExtractError> {
    let pdf_error = |message: String| ExtractError::Pdf {
        filename: attachment.filename.clone(),
        message,
    };

    let bytes = attachment.bytes.clone();
    let pages = tokio::task::spawn_blocking(move || pdf.pages(&bytes))
        .await
        .map_err(|e| pdf_error(format!("extractor task failed: {e}")))?
        .map_err(|e| pdf_error(format!("{e:#}")))?;

    tracing::debug!(pages = pages.len(), "PDF pages extracted");
    Ok(pages.concat())
}

/// Reads the text of an attachment. Returns `Ok(None)` for file types the
/// form never offers, leaving the body empty.
#[tracing::instrument(skip(attachment, pdf), fields(filename = %attachment.filename, size = attachment.bytes.len()))]
pub async fn extract_text(
    attachment: &Attachment,
    pdf: Arc<dyn PdfPages>,
) -> Result<Option<String>, ExtractError> {
    let Some(kind) = DocumentKind::from_filename(&attachment.filename) else {
        tracing::warn!("Unsupported attachment type, ignoring contents");
        return Ok(None);
    };

    let text = match kind {
        DocumentKind::Text => String::from_utf8(attachment.bytes.to_vec()).map_err(|source| {
            ExtractError::InvalidUtf8 {
                filename: attachment.filename.clone(),
                source,
            }
        })?,
        DocumentKind::Pdf => pdf_text(attachment, pdf).await?,
    };

    tracing::debug!(chars = text.chars().count(), "Attachment text extracted");
    Ok(Some(text))
}
