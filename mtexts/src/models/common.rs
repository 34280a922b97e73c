use serde::{Deserialize, Serialize};

pub const GOOGLE_DOC_MIME: &str = "application/vnd.google-apps.document";
pub const GOOGLE_SHEET_MIME: &str = "application/vnd.google-apps.spreadsheet";
pub const GOOGLE_SLIDES_MIME: &str = "application/vnd.google-apps.presentation";
pub const PDF_MIME: &str = "application/pdf";
pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const PPTX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presentation";
pub const PLAIN_TEXT_MIME: &str = "text/plain";
pub const MARKDOWN_MIME: &str = "text/markdown";
pub const HTML_MIME: &str = "text/html";
pub const CSV_MIME: &str = "text/csv";

/// Every type tag the dispatcher knows how to handle.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    GoogleDoc,
    GoogleSheet,
    GoogleSlides,
    Pdf,
    Docx,
    Pptx,
    PlainText,
    Markdown,
    Html,
}

impl DocumentType {
    pub const ALL: [DocumentType; 9] = [
        Self::GoogleDoc,
        Self::GoogleSheet,
        Self::GoogleSlides,
        Self::Pdf,
        Self::Docx,
        Self::Pptx,
        Self::PlainText,
        Self::Markdown,
        Self::Html,
    ];

    /// Exact match on the type tag. Parameters such as `; charset=utf-8` are not
    /// stripped, an unknown tag yields `None`.
    pub fn from_type_tag(tag: &str) -> Option<Self> {
        match tag {
            GOOGLE_DOC_MIME => Some(Self::GoogleDoc),
            GOOGLE_SHEET_MIME => Some(Self::GoogleSheet),
            GOOGLE_SLIDES_MIME => Some(Self::GoogleSlides),
            PDF_MIME => Some(Self::Pdf),
            DOCX_MIME => Some(Self::Docx),
            PPTX_MIME => Some(Self::Pptx),
            PLAIN_TEXT_MIME => Some(Self::PlainText),
            MARKDOWN_MIME => Some(Self::Markdown),
            HTML_MIME => Some(Self::Html),
            _ => None,
        }
    }

    pub fn type_tag(&self) -> &'static str {
        match self {
            Self::GoogleDoc => GOOGLE_DOC_MIME,
            Self::GoogleSheet => GOOGLE_SHEET_MIME,
            Self::GoogleSlides => GOOGLE_SLIDES_MIME,
            Self::Pdf => PDF_MIME,
            Self::Docx => DOCX_MIME,
            Self::Pptx => PPTX_MIME,
            Self::PlainText => PLAIN_TEXT_MIME,
            Self::Markdown => MARKDOWN_MIME,
            Self::Html => HTML_MIME,
        }
    }

    /// Human-readable label used in failure markers.
    pub fn label(&self) -> &'static str {
        match self {
            Self::GoogleDoc => "Google Doc",
            Self::GoogleSheet => "Google Sheet",
            Self::GoogleSlides => "Google Slides",
            Self::Pdf => "PDF",
            Self::Docx => "DOCX",
            Self::Pptx => "PPTX",
            Self::PlainText | Self::Markdown => "text file",
            Self::Html => "HTML",
        }
    }
}

impl std::fmt::Display for DocumentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::GoogleDoc => write!(f, "google_doc"),
            Self::GoogleSheet => write!(f, "google_sheet"),
            Self::GoogleSlides => write!(f, "google_slides"),
            Self::Pdf => write!(f, "pdf"),
            Self::Docx => write!(f, "docx"),
            Self::Pptx => write!(f, "pptx"),
            Self::PlainText => write!(f, "text"),
            Self::Markdown => write!(f, "markdown"),
            Self::Html => write!(f, "html"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_tag_round_trips_through_table() {
        for doc_type in DocumentType::ALL {
            assert_eq!(DocumentType::from_type_tag(doc_type.type_tag()), Some(doc_type));
        }
    }

    #[test]
    fn test_unknown_tags_are_rejected() {
        assert_eq!(DocumentType::from_type_tag("image/png"), None);
        assert_eq!(DocumentType::from_type_tag("application/vnd.google-apps.folder"), None);
        assert_eq!(DocumentType::from_type_tag("TEXT/PLAIN"), None);
        assert_eq!(DocumentType::from_type_tag("text/plain; charset=utf-8"), None);
        assert_eq!(DocumentType::from_type_tag(""), None);
    }

    #[test]
    fn test_labels() {
        assert_eq!(DocumentType::Pdf.label(), "PDF");
        assert_eq!(DocumentType::Markdown.label(), "text file");
        assert_eq!(DocumentType::GoogleSlides.to_string(), "google_slides");
    }
}
