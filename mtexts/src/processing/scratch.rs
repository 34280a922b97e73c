use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::error::Result;

/// File-backed copy of a payload for parsers that need random access.
///
/// The file is removed when the value is dropped, whichever way the parsing
/// scope is left. A failed removal is logged and otherwise ignored.
pub struct ScratchFile {
    file: Option<NamedTempFile>,
    path: PathBuf,
}

impl ScratchFile {
    pub fn create_in(dir: &Path, suffix: &str, contents: &[u8]) -> Result<Self> {
        let mut file = tempfile::Builder::new()
            .prefix("mtexts-")
            .suffix(suffix)
            .tempfile_in(dir)?;
        file.write_all(contents)?;
        file.flush()?;

        let path = file.path().to_path_buf();
        tracing::debug!(path = %path.display(), bytes = contents.len(), "Created scratch file");

        Ok(Self {
            file: Some(file),
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ScratchFile {
    fn drop(&mut self) {
        if let Some(file) = self.file.take() {
            if let Err(e) = file.close() {
                tracing::warn!("Failed to remove scratch file {}: {}", self.path.display(), e);
            }
        }
    }
}
