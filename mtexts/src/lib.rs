pub mod config;
pub mod drive;
pub mod error;
pub mod llm;
pub mod models;
pub mod processing;
pub mod report;

pub use error::{MtextsError, Result};
