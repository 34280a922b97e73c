use std::path::PathBuf;

use crate::drive::PayloadFetcher;
use crate::error::{MtextsError, Result};
use crate::models::{
    DocumentType, ExtractionFailure, ExtractionResult, FileDescriptor, CSV_MIME, PDF_MIME,
    PLAIN_TEXT_MIME,
};
use crate::processing::extractors::{
    DocxExtractor, HtmlExtractor, PdfExtractor, PptxExtractor, TextExtractor,
};

/// Optional format support. A disabled format is reported as unsupported
/// without fetching anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub docx: bool,
    pub pptx: bool,
    pub html: bool,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            docx: true,
            pptx: true,
            html: true,
        }
    }
}

impl Capabilities {
    /// Name of the switched-off capability guarding `doc_type`, if any.
    fn disabled(&self, doc_type: DocumentType) -> Option<&'static str> {
        match doc_type {
            DocumentType::Docx if !self.docx => Some("DOCX extraction"),
            DocumentType::Pptx if !self.pptx => Some("PPTX extraction"),
            DocumentType::Html if !self.html => Some("HTML extraction"),
            _ => None,
        }
    }
}

/// Routes a file to the extractor for its type tag and turns every failure
/// into a bracketed marker instead of an error.
pub struct ContentExtractor {
    capabilities: Capabilities,
    scratch_dir: PathBuf,
}

impl ContentExtractor {
    pub fn new(capabilities: Capabilities) -> Self {
        Self {
            capabilities,
            scratch_dir: std::env::temp_dir(),
        }
    }

    /// Directory for the short-lived files DOCX and PPTX parsing needs.
    pub fn with_scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_dir = dir.into();
        self
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    /// Extracted text for `descriptor`, or its failure marker.
    pub async fn dispatch(&self, descriptor: &FileDescriptor, fetcher: &dyn PayloadFetcher) -> String {
        self.extract(descriptor, fetcher).await.into_text()
    }

    pub async fn extract(
        &self,
        descriptor: &FileDescriptor,
        fetcher: &dyn PayloadFetcher,
    ) -> ExtractionResult {
        let type_tag = descriptor.mime_type.as_str();

        let Some(doc_type) = descriptor.document_type() else {
            tracing::warn!(
                "Unsupported file type {} for {}",
                type_tag,
                descriptor.display_name()
            );
            return ExtractionResult::Failed(ExtractionFailure::unsupported(
                "Content extraction",
                type_tag,
            ));
        };

        if let Some(capability) = self.capabilities.disabled(doc_type) {
            tracing::warn!(
                "{} disabled, skipping {}",
                capability,
                descriptor.display_name()
            );
            return ExtractionResult::Failed(ExtractionFailure::unsupported(capability, type_tag));
        }

        tracing::info!("Extracting {} ({})", descriptor.display_name(), doc_type);

        let result = ExtractionResult::from(self.run(doc_type, descriptor, fetcher).await);
        if let ExtractionResult::Failed(failure) = &result {
            tracing::error!("Failed {} for {}", failure.reason(), descriptor.display_name());
        }
        result
    }

    async fn run(
        &self,
        doc_type: DocumentType,
        descriptor: &FileDescriptor,
        fetcher: &dyn PayloadFetcher,
    ) -> std::result::Result<String, ExtractionFailure> {
        let id = descriptor.id.as_str();
        let type_tag = descriptor.mime_type.as_str();
        let fail = |error: MtextsError| {
            ExtractionFailure::failed(format!("extracting {}", doc_type.label()), error.detail(), type_tag)
        };

        match doc_type {
            DocumentType::GoogleDoc => {
                Self::exported_text(fetcher.export(id, PLAIN_TEXT_MIME).await).map_err(fail)
            }
            DocumentType::GoogleSheet => {
                Self::exported_text(fetcher.export(id, CSV_MIME).await).map_err(fail)
            }
            DocumentType::GoogleSlides => Self::slides_text(id, type_tag, fetcher).await,
            DocumentType::Pdf => match fetcher.download(id).await.map_err(fail)? {
                Some(bytes) => PdfExtractor::extract(&bytes).map_err(|e| Self::pdf_failure(e, type_tag)),
                None => Ok(String::new()),
            },
            DocumentType::Docx => match fetcher.download(id).await.map_err(fail)? {
                Some(bytes) => DocxExtractor::extract_in(&bytes, &self.scratch_dir).map_err(fail),
                None => Ok(String::new()),
            },
            DocumentType::Pptx => match fetcher.download(id).await.map_err(fail)? {
                Some(bytes) => PptxExtractor::extract_in(&bytes, &self.scratch_dir).map_err(fail),
                None => Ok(String::new()),
            },
            DocumentType::PlainText | DocumentType::Markdown => Ok(fetcher
                .download(id)
                .await
                .map_err(fail)?
                .map(|bytes| TextExtractor::decode(&bytes))
                .unwrap_or_default()),
            DocumentType::Html => Ok(fetcher
                .download(id)
                .await
                .map_err(fail)?
                .map(|bytes| HtmlExtractor::extract(&bytes))
                .unwrap_or_default()),
        }
    }

    /// Plain-text export first; when it yields nothing usable, export the deck
    /// as PDF and parse that instead.
    async fn slides_text(
        id: &str,
        type_tag: &str,
        fetcher: &dyn PayloadFetcher,
    ) -> std::result::Result<String, ExtractionFailure> {
        let fail = |error: MtextsError| {
            ExtractionFailure::failed("extracting Google Slides", error.detail(), type_tag)
        };

        if let Some(bytes) = fetcher.export(id, PLAIN_TEXT_MIME).await.map_err(fail)? {
            let text = TextExtractor::decode_export(&bytes).map_err(fail)?;
            if !text.trim().is_empty() {
                return Ok(text);
            }
        }

        tracing::debug!("Slides text export for {} was empty, trying PDF export", id);

        match fetcher.export(id, PDF_MIME).await.map_err(fail)? {
            Some(pdf) => PdfExtractor::extract(&pdf).map_err(|e| Self::pdf_failure(e, type_tag)),
            None => Ok(String::new()),
        }
    }

    fn exported_text(export: Result<Option<Vec<u8>>>) -> Result<String> {
        match export? {
            Some(bytes) => TextExtractor::decode_export(&bytes),
            None => Ok(String::new()),
        }
    }

    fn pdf_failure(error: MtextsError, type_tag: &str) -> ExtractionFailure {
        ExtractionFailure::failed("extracting PDF content", error.detail(), type_tag)
    }
}
