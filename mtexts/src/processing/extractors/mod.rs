pub mod docx;
pub mod html;
pub mod pdf;
pub mod pptx;
pub mod text;

pub use docx::DocxExtractor;
pub use html::HtmlExtractor;
pub use pdf::PdfExtractor;
pub use pptx::PptxExtractor;
pub use text::TextExtractor;
