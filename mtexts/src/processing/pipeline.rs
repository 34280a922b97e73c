use std::path::Path;
use std::sync::Arc;

use crate::drive::PayloadFetcher;
use crate::error::Result;
use crate::llm::Summarizer;
use crate::models::{DocumentRecord, FileDescriptor};
use crate::report;

use super::ContentExtractor;

/// Sequential list → extract → summarize loop over a document store.
pub struct Pipeline {
    fetcher: Arc<dyn PayloadFetcher>,
    summarizer: Arc<dyn Summarizer>,
    extractor: Arc<ContentExtractor>,
    summary_input_tokens: usize,
}

impl Pipeline {
    pub fn new(
        fetcher: Arc<dyn PayloadFetcher>,
        summarizer: Arc<dyn Summarizer>,
        extractor: ContentExtractor,
        summary_input_tokens: usize,
    ) -> Self {
        Self {
            fetcher,
            summarizer,
            extractor: Arc::new(extractor),
            summary_input_tokens,
        }
    }

    /// Processes every listed file one at a time and returns the kept records
    /// in listing order.
    ///
    /// Files whose text is empty after trimming are skipped. Each file runs
    /// in its own task so that a panic while handling it only costs that file.
    pub async fn run(&self, folder_id: Option<&str>) -> Result<Vec<DocumentRecord>> {
        let files = self.fetcher.list(folder_id).await?;
        let total = files.len();
        tracing::info!("Found {} files to process", total);

        let mut records = Vec::new();
        for (index, descriptor) in files.into_iter().enumerate() {
            let name = descriptor.display_name().to_string();

            let task = tokio::spawn(Self::process_file(
                Arc::clone(&self.fetcher),
                Arc::clone(&self.summarizer),
                Arc::clone(&self.extractor),
                descriptor,
                self.summary_input_tokens,
            ));

            match task.await {
                Ok(Some(record)) => {
                    records.push(record);
                    tracing::info!("Processed: {} ({}/{})", name, index + 1, total);
                }
                Ok(None) => tracing::warn!("No content extracted from: {}", name),
                Err(e) => tracing::error!("Error processing {}: {}", name, e),
            }
        }

        Ok(records)
    }

    /// Runs the pipeline and writes the knowledge base to `output`. Returns the
    /// number of documents written.
    pub async fn run_to_file(&self, folder_id: Option<&str>, output: &Path) -> Result<usize> {
        let records = self.run(folder_id).await?;
        report::write_knowledge_base(&records, output)?;
        Ok(records.len())
    }

    async fn process_file(
        fetcher: Arc<dyn PayloadFetcher>,
        summarizer: Arc<dyn Summarizer>,
        extractor: Arc<ContentExtractor>,
        descriptor: FileDescriptor,
        summary_input_tokens: usize,
    ) -> Option<DocumentRecord> {
        let content = extractor.dispatch(&descriptor, fetcher.as_ref()).await;
        if content.trim().is_empty() {
            return None;
        }

        let summary = summarizer.summarize(&content, summary_input_tokens).await;
        Some(DocumentRecord::new(descriptor, content, summary))
    }
}
