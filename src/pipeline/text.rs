//! PDF text extraction via pdfium.
//!
//! pdfium is a C++ library with thread-local state and blocking calls, so
//! the work runs on `tokio::task::spawn_blocking`. The library itself is
//! located by `pdfium-auto` (cached download, or `PDFIUM_LIB_PATH`).
//!
//! Extraction sits behind [`TextExtractor`] so the rest of the pipeline can be
//! driven from plain text in tests or by hosts that already have the text.

use crate::error::DemosError;
use crate::pipeline::input::ResolvedInput;
use async_trait::async_trait;
use pdfium_render::prelude::*;
use tracing::{debug, info};

/// Produces the plain text of a PDF document.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract_text(
        &self,
        input: ResolvedInput,
        password: Option<&str>,
    ) -> Result<String, DemosError>;
}

/// Default extractor backed by pdfium.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfiumTextExtractor;

#[async_trait]
impl TextExtractor for PdfiumTextExtractor {
    async fn extract_text(
        &self,
        input: ResolvedInput,
        password: Option<&str>,
    ) -> Result<String, DemosError> {
        let password = password.map(str::to_string);
        let text = tokio::task::spawn_blocking(move || {
            extract_text_blocking(&input.source_name, &input.bytes, password.as_deref())
        })
        .await
        .map_err(|e| DemosError::Internal(format!("Text extraction task panicked: {}", e)))??;

        Ok(text)
    }
}

/// Blocking implementation of text extraction.
///
/// Pages are joined with a single space, each page's text taken as pdfium
/// lays it out.
fn extract_text_blocking(
    source_name: &str,
    bytes: &[u8],
    password: Option<&str>,
) -> Result<String, DemosError> {
    let pdfium = pdfium_auto::bind_pdfium_silent()
        .map_err(|e| DemosError::PdfiumBindingFailed(e.to_string()))?;

    let document = pdfium
        .load_pdf_from_byte_slice(bytes, password)
        .map_err(|e| classify_load_error(source_name, password.is_some(), &e))?;

    let pages = document.pages();
    info!("PDF loaded: {} pages", pages.len());

    let mut page_texts = Vec::with_capacity(pages.len() as usize);
    for (idx, page) in pages.iter().enumerate() {
        let text = page.text().map_err(|e| DemosError::CorruptPdf {
            source_name: source_name.to_string(),
            detail: format!("page {}: {:?}", idx + 1, e),
        })?;
        let content = text.all();
        debug!("Page {}: {} chars", idx + 1, content.len());
        page_texts.push(content);
    }

    let full_text = join_pages(&page_texts);
    if full_text.trim().is_empty() {
        return Err(DemosError::NoText {
            source_name: source_name.to_string(),
        });
    }
    Ok(full_text)
}

fn classify_load_error(source_name: &str, had_password: bool, e: &PdfiumError) -> DemosError {
    let err_str = format!("{:?}", e);
    if err_str.contains("Password") || err_str.contains("password") {
        if had_password {
            DemosError::WrongPassword {
                source_name: source_name.to_string(),
            }
        } else {
            DemosError::PasswordRequired {
                source_name: source_name.to_string(),
            }
        }
    } else {
        DemosError::CorruptPdf {
            source_name: source_name.to_string(),
            detail: err_str,
        }
    }
}

/// Concatenate page texts, each followed by one space.
pub fn join_pages(pages: &[String]) -> String {
    let mut out = String::with_capacity(pages.iter().map(|p| p.len() + 1).sum());
    for page in pages {
        out.push_str(page);
        out.push(' ');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_pages_appends_space_per_page() {
        let pages = vec!["Day 1 Squat".to_string(), "Day 2 Deadlift".to_string()];
        assert_eq!(join_pages(&pages), "Day 1 Squat Day 2 Deadlift ");
        assert_eq!(join_pages(&[]), "");
    }

    #[test]
    fn password_errors_are_classified() {
        let e = PdfiumError::PdfiumLibraryInternalError(PdfiumInternalError::PasswordError);
        assert!(matches!(
            classify_load_error("plan.pdf", false, &e),
            DemosError::PasswordRequired { .. }
        ));
        assert!(matches!(
            classify_load_error("plan.pdf", true, &e),
            DemosError::WrongPassword { .. }
        ));
    }

    #[test]
    fn other_load_errors_are_corrupt() {
        let e = PdfiumError::PdfiumLibraryInternalError(PdfiumInternalError::FormatError);
        assert!(matches!(
            classify_load_error("plan.pdf", false, &e),
            DemosError::CorruptPdf { .. }
        ));
    }
}
