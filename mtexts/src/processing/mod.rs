mod extractor;
mod pipeline;
mod scratch;

pub mod extractors;

pub use extractor::{Capabilities, ContentExtractor};
pub use pipeline::Pipeline;
pub use scratch::ScratchFile;
