mod auth;
mod client;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::FileDescriptor;

pub use auth::{load_access_token, AuthorizedUser};
pub use client::DriveClient;

/// Remote document store the pipeline reads from.
///
/// `download` and `export` return `Ok(None)` when the store answered but had
/// no payload to give; `Err` means the call itself failed.
#[async_trait]
pub trait PayloadFetcher: Send + Sync {
    /// Every non-trashed file, optionally restricted to direct children of a folder.
    async fn list(&self, folder_id: Option<&str>) -> Result<Vec<FileDescriptor>>;

    /// Raw bytes of a binary file.
    async fn download(&self, file_id: &str) -> Result<Option<Vec<u8>>>;

    /// A native Google file converted server-side to `mime_type`.
    async fn export(&self, file_id: &str, mime_type: &str) -> Result<Option<Vec<u8>>>;
}
