use serde::{Deserialize, Serialize};

use super::{DocumentType, SummaryResult};

/// Metadata of one file as returned by the Drive listing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FileDescriptor {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub mime_type: String,
    pub created_time: Option<String>,
    pub modified_time: Option<String>,
    pub web_view_link: Option<String>,
    #[serde(default)]
    pub parents: Vec<String>,
    /// Slash-separated folder path, resolved after listing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl FileDescriptor {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        mime_type: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            mime_type: mime_type.into(),
            created_time: None,
            modified_time: None,
            web_view_link: None,
            parents: Vec::new(),
            path: None,
        }
    }

    pub fn document_type(&self) -> Option<DocumentType> {
        DocumentType::from_type_tag(&self.mime_type)
    }

    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            "Unknown file"
        } else {
            &self.name
        }
    }
}

/// One entry of the knowledge base. Built once per kept file and never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub descriptor: FileDescriptor,
    /// Extracted text, or the bracketed failure string when extraction failed.
    pub content: String,
    pub summary: SummaryResult,
}

impl DocumentRecord {
    pub fn new(descriptor: FileDescriptor, content: String, summary: SummaryResult) -> Self {
        Self {
            descriptor,
            content,
            summary,
        }
    }
}
