use std::path::Path;

use crate::error::{MtextsError, Result};
use crate::processing::scratch::ScratchFile;

pub struct DocxExtractor;

impl DocxExtractor {
    /// Extracts body text, staging the payload in the system temp directory.
    pub fn extract(bytes: &[u8]) -> Result<String> {
        Self::extract_in(bytes, &std::env::temp_dir())
    }

    pub fn extract_in(bytes: &[u8], scratch_dir: &Path) -> Result<String> {
        let scratch = ScratchFile::create_in(scratch_dir, ".docx", bytes)?;
        Self::extract_file(scratch.path())
    }

    /// One line per top-level body paragraph, in document order. Empty
    /// paragraphs keep their (empty) line; tables are not read.
    pub fn extract_file(path: &Path) -> Result<String> {
        let data = std::fs::read(path)?;
        let docx = docx_rs::read_docx(&data)
            .map_err(|e| MtextsError::Processing(format!("DOCX parse error: {e}")))?;

        let paragraphs: Vec<String> = docx
            .document
            .children
            .iter()
            .filter_map(|child| match child {
                docx_rs::DocumentChild::Paragraph(paragraph) => {
                    Some(Self::paragraph_text(paragraph))
                }
                _ => None,
            })
            .collect();

        Ok(paragraphs.join("\n"))
    }

    fn paragraph_text(paragraph: &docx_rs::Paragraph) -> String {
        let mut content = String::new();
        Self::push_children(&paragraph.children, &mut content);
        content
    }

    fn push_children(children: &[docx_rs::ParagraphChild], out: &mut String) {
        for child in children {
            match child {
                docx_rs::ParagraphChild::Run(run) => Self::push_run(run, out),
                docx_rs::ParagraphChild::Hyperlink(link) => Self::push_children(&link.children, out),
                _ => {}
            }
        }
    }

    fn push_run(run: &docx_rs::Run, out: &mut String) {
        for run_child in &run.children {
            match run_child {
                docx_rs::RunChild::Text(text) => out.push_str(&text.text),
                docx_rs::RunChild::Tab(_) => out.push('\t'),
                docx_rs::RunChild::Break(_) => out.push('\n'),
                _ => {}
            }
        }
    }
}
