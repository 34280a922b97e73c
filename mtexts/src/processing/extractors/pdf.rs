use crate::error::{MtextsError, Result};

/// Separator placed between consecutive page texts.
pub const PAGE_SEPARATOR: &str = "\n\n";

pub struct PdfExtractor;

impl PdfExtractor {
    pub fn extract(bytes: &[u8]) -> Result<String> {
        let pages = Self::extract_pages(bytes)?;
        Ok(pages.join(PAGE_SEPARATOR))
    }

    /// Page texts in page order, without the page-break newlines the parser
    /// puts around each page. A page without text yields an empty string.
    /// Parser panics on malformed input are reported as processing errors.
    pub fn extract_pages(bytes: &[u8]) -> Result<Vec<String>> {
        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            pdf_extract::extract_text_from_mem_by_pages(bytes)
        }));

        match outcome {
            Ok(Ok(pages)) => {
                tracing::debug!("Extracted {} PDF pages", pages.len());
                Ok(pages
                    .iter()
                    .map(|page| page.trim_matches('\n').to_string())
                    .collect())
            }
            Ok(Err(e)) => Err(MtextsError::Processing(e.to_string())),
            Err(_) => Err(MtextsError::Processing(
                "PDF parser aborted on malformed input".to_string(),
            )),
        }
    }
}
