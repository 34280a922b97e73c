//! Markdown knowledge base rendering.

use std::fmt::Write as _;
use std::path::Path;

use chrono::{DateTime, Local};

use crate::error::Result;
use crate::models::DocumentRecord;

const UNNAMED_DOCUMENT: &str = "Unnamed Document";
const UNKNOWN: &str = "Unknown";
const UNKNOWN_PATH: &str = "Unknown path";

/// Renders every record into one Markdown document.
pub fn render_knowledge_base(records: &[DocumentRecord], generated_at: DateTime<Local>) -> String {
    let mut out = String::new();

    out.push_str("# Google Drive Knowledge Base\n\n");
    let _ = write!(
        out,
        "*Generated on: {}*\n\n",
        generated_at.format("%Y-%m-%d %H:%M:%S")
    );
    out.push_str(
        "*This file contains text extracted from documents in Google Drive, along with AI-generated summaries.*\n\n",
    );

    out.push_str("## Table of Contents\n\n");
    for (index, record) in records.iter().enumerate() {
        let name = record_name(record);
        let _ = writeln!(out, "{}. [{}](#{})", index + 1, name, create_anchor_link(name));
    }
    out.push_str("\n---\n\n");

    for record in records {
        write_document_section(&mut out, record);
        out.push_str("\n\n---\n\n");
    }

    out
}

/// Renders the knowledge base with the current local time and writes it to `path`.
pub fn write_knowledge_base(records: &[DocumentRecord], path: &Path) -> Result<()> {
    let markdown = render_knowledge_base(records, Local::now());
    std::fs::write(path, markdown).map_err(|e| {
        tracing::error!("Error creating knowledge base file: {}", e);
        e
    })?;
    tracing::info!("Knowledge base written to {}", path.display());
    Ok(())
}

/// Anchor fragment for a heading: lowercased, spaces to hyphens, anything
/// other than word characters and hyphens dropped. A result that does not
/// start with a letter or digit gets a `doc-` prefix.
pub fn create_anchor_link(text: &str) -> String {
    let anchor: String = text
        .to_lowercase()
        .replace(' ', "-")
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || *c == '-')
        .collect();

    match anchor.chars().next() {
        Some(first) if !first.is_alphanumeric() => format!("doc-{anchor}"),
        _ => anchor,
    }
}

/// Fences content that carries Markdown syntax so it cannot disturb the
/// surrounding document. Inner triple backticks are escaped.
pub fn format_content_for_markdown(content: &str) -> String {
    let looks_like_markdown = content.contains("```")
        || content.contains('#')
        || content.contains("**")
        || content.contains('*')
        || (content.contains('[') && content.contains("]("));

    if !looks_like_markdown {
        return content.to_string();
    }

    let escaped = content.replace("```", "\\`\\`\\`");
    format!("```\n{escaped}\n```")
}

fn record_name(record: &DocumentRecord) -> &str {
    if record.descriptor.name.is_empty() {
        UNNAMED_DOCUMENT
    } else {
        &record.descriptor.name
    }
}

fn or_unknown<'a>(value: Option<&'a str>, fallback: &'a str) -> &'a str {
    value.filter(|v| !v.is_empty()).unwrap_or(fallback)
}

fn write_document_section(out: &mut String, record: &DocumentRecord) {
    let descriptor = &record.descriptor;
    let name = record_name(record);

    let _ = write!(out, "## {name}\n\n");

    out.push_str("### Metadata\n\n");
    out.push_str("```yaml\n");
    let _ = writeln!(out, "title: {name}");
    let _ = writeln!(out, "type: {}", or_unknown(Some(descriptor.mime_type.as_str()), UNKNOWN));
    let _ = writeln!(out, "created: {}", or_unknown(descriptor.created_time.as_deref(), UNKNOWN));
    let _ = writeln!(out, "modified: {}", or_unknown(descriptor.modified_time.as_deref(), UNKNOWN));
    let _ = writeln!(out, "path: {}", or_unknown(descriptor.path.as_deref(), UNKNOWN_PATH));
    let _ = writeln!(out, "id: {}", descriptor.id);
    if let Some(url) = descriptor.web_view_link.as_deref().filter(|url| !url.is_empty()) {
        let _ = writeln!(out, "url: {url}");
    }
    out.push_str("```\n\n");

    out.push_str("### Summary & Key Concepts\n\n");
    if record.summary.summary.is_empty() {
        out.push_str("*No summary available*\n\n");
    } else {
        let _ = write!(out, "{}\n\n", record.summary.summary);
    }

    if !record.summary.key_concepts.is_empty() {
        out.push_str("**Key Concepts:**\n\n");
        for concept in &record.summary.key_concepts {
            let _ = writeln!(out, "- {concept}");
        }
        out.push('\n');
    }

    out.push_str("### Full Content\n\n");
    if record.content.trim().is_empty() {
        out.push_str("*No content available*\n");
    } else {
        let _ = writeln!(out, "{}", format_content_for_markdown(&record.content));
    }
}
