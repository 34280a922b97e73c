mod common;
mod document;
mod extraction;
mod summary;

pub use common::*;
pub use document::*;
pub use extraction::*;
pub use summary::*;
