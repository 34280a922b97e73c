use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use url::Url;

use super::PayloadFetcher;
use crate::config::DriveConfig;
use crate::error::{MtextsError, Result};
use crate::models::FileDescriptor;

const LIST_FIELDS: &str =
    "nextPageToken, files(id, name, mimeType, createdTime, modifiedTime, webViewLink, parents)";

/// Folder lookups stop once a path has this many components.
const MAX_PATH_DEPTH: usize = 100;

pub const UNKNOWN_PATH: &str = "Unknown path";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileListPage {
    #[serde(default)]
    files: Vec<FileDescriptor>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FolderInfo {
    name: String,
    #[serde(default)]
    parents: Vec<String>,
}

/// Drive v3 REST client authenticated with a bearer access token.
pub struct DriveClient {
    http: reqwest::Client,
    api_base: String,
    access_token: String,
    page_size: u32,
}

impl DriveClient {
    pub fn new(config: &DriveConfig, access_token: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| MtextsError::Drive(format!("Failed to create Drive HTTP client: {e}")))?;

        Ok(Self {
            http,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            access_token: access_token.into(),
            page_size: config.page_size,
        })
    }

    fn url(&self, path: &str) -> Result<Url> {
        Ok(Url::parse(&format!("{}/{}", self.api_base, path))?)
    }

    fn list_query(folder_id: Option<&str>) -> String {
        match folder_id {
            Some(folder) => format!(
                "trashed = false and '{}' in parents",
                folder.replace('\'', "\\'")
            ),
            None => "trashed = false".to_string(),
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: Url) -> Result<T> {
        let response = self
            .http
            .get(url)
            .bearer_auth(&self.access_token)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }

    async fn list_page(&self, query: &str, page_token: Option<&str>) -> Result<FileListPage> {
        let mut url = self.url("files")?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs
                .append_pair("q", query)
                .append_pair("spaces", "drive")
                .append_pair("fields", LIST_FIELDS)
                .append_pair("pageSize", &self.page_size.to_string());
            if let Some(token) = page_token {
                pairs.append_pair("pageToken", token);
            }
        }
        self.get_json(url).await
    }

    /// Slash-separated path built by walking first parents up to the root.
    ///
    /// A failed folder lookup marks the path as partial with a leading `...`
    /// and stops the walk; so does exceeding the depth limit.
    pub async fn resolve_path(&self, file: &FileDescriptor) -> Result<String> {
        let Some(first_parent) = file.parents.first() else {
            return Ok(format!("/{}", file.name));
        };

        let mut parts = VecDeque::from([file.name.clone()]);
        let mut current = Some(first_parent.clone());

        while let Some(folder_id) = current.take() {
            let mut url = self.url(&format!("files/{folder_id}"))?;
            url.query_pairs_mut().append_pair("fields", "name,parents");

            match self.get_json::<FolderInfo>(url).await {
                Ok(folder) => {
                    parts.push_front(folder.name);
                    current = folder.parents.into_iter().next();
                    if parts.len() > MAX_PATH_DEPTH {
                        parts.push_front("...".to_string());
                        break;
                    }
                }
                Err(e) => {
                    tracing::warn!("Error getting parent info for {}: {}", folder_id, e);
                    parts.push_front("...".to_string());
                    break;
                }
            }
        }

        Ok(format!("/{}", Vec::from(parts).join("/")))
    }

    async fn fetch_payload(&self, url: Url, file_id: &str, action: &str) -> Option<Vec<u8>> {
        let response = match self
            .http
            .get(url)
            .bearer_auth(&self.access_token)
            .send()
            .await
            .and_then(|response| response.error_for_status())
        {
            Ok(response) => response,
            Err(e) => {
                tracing::error!("Error {} file {}: {}", action, file_id, e);
                return None;
            }
        };

        match response.bytes().await {
            Ok(bytes) => {
                tracing::debug!("Fetched {} bytes for {} ({})", bytes.len(), file_id, action);
                Some(bytes.to_vec())
            }
            Err(e) => {
                tracing::error!("Error reading {} body for {}: {}", action, file_id, e);
                None
            }
        }
    }
}

#[async_trait]
impl PayloadFetcher for DriveClient {
    async fn list(&self, folder_id: Option<&str>) -> Result<Vec<FileDescriptor>> {
        let query = Self::list_query(folder_id);
        let mut files: Vec<FileDescriptor> = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            match self.list_page(&query, page_token.as_deref()).await {
                Ok(page) => {
                    files.extend(page.files);
                    match page.next_page_token {
                        Some(token) if !token.is_empty() => page_token = Some(token),
                        _ => break,
                    }
                }
                Err(e) => {
                    tracing::error!("Error listing files: {}", e);
                    break;
                }
            }
        }

        tracing::info!("Listed {} files", files.len());

        for file in &mut files {
            let path = match self.resolve_path(file).await {
                Ok(path) => path,
                Err(e) => {
                    tracing::warn!("Could not get path for file {}: {}", file.display_name(), e);
                    UNKNOWN_PATH.to_string()
                }
            };
            file.path = Some(path);
        }

        Ok(files)
    }

    async fn download(&self, file_id: &str) -> Result<Option<Vec<u8>>> {
        let mut url = self.url(&format!("files/{file_id}"))?;
        url.query_pairs_mut().append_pair("alt", "media");
        Ok(self.fetch_payload(url, file_id, "downloading").await)
    }

    async fn export(&self, file_id: &str, mime_type: &str) -> Result<Option<Vec<u8>>> {
        let mut url = self.url(&format!("files/{file_id}/export"))?;
        url.query_pairs_mut().append_pair("mimeType", mime_type);
        Ok(self.fetch_payload(url, file_id, "exporting").await)
    }
}
