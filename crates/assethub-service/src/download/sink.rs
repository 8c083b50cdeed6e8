//! Download destinations.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::fs;
use tokio::time::Instant;
use tracing::debug;

use assethub_core::error::{AppError, ErrorKind};
use assethub_core::result::AppResult;

/// A decoded asset handed to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedFile {
    pub name: String,
    pub mime_type: String,
    pub bytes: Bytes,
}

/// Receives downloaded files.
#[async_trait]
pub trait DownloadSink: Send + Sync + std::fmt::Debug {
    async fn deliver(&self, file: DownloadedFile) -> AppResult<()>;
}

/// Writes each download into a directory under its asset name.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    root: PathBuf,
}

impl DirectorySink {
    pub async fn new(root: impl AsRef<Path>) -> AppResult<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to create download directory: {}", root.display()),
                e,
            )
        })?;
        Ok(Self { root })
    }

    fn target(&self, name: &str) -> AppResult<PathBuf> {
        let file_name = Path::new(name)
            .file_name()
            .filter(|n| !n.is_empty())
            .ok_or_else(|| AppError::validation(format!("Invalid download name: {name:?}")))?;
        Ok(self.root.join(file_name))
    }
}

#[async_trait]
impl DownloadSink for DirectorySink {
    async fn deliver(&self, file: DownloadedFile) -> AppResult<()> {
        let path = self.target(&file.name)?;
        fs::write(&path, &file.bytes).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to write {}", path.display()),
                e,
            )
        })?;
        debug!(path = %path.display(), size = file.bytes.len(), "Download written");
        Ok(())
    }
}

/// Keeps downloads in memory with the instant each arrived.
#[derive(Debug, Default)]
pub struct MemorySink {
    files: Mutex<Vec<(Instant, DownloadedFile)>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn files(&self) -> Vec<DownloadedFile> {
        self.deliveries().into_iter().map(|(_, f)| f).collect()
    }

    /// Every delivery with its arrival time.
    pub fn deliveries(&self) -> Vec<(Instant, DownloadedFile)> {
        self.files.lock().map(|f| f.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl DownloadSink for MemorySink {
    async fn deliver(&self, file: DownloadedFile) -> AppResult<()> {
        self.files
            .lock()
            .map_err(|_| AppError::internal("Download sink poisoned"))?
            .push((Instant::now(), file));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_directory_sink_strips_paths() {
        let dir = tempfile::tempdir().unwrap();
        let sink = DirectorySink::new(dir.path()).await.unwrap();
        sink.deliver(DownloadedFile {
            name: "../escape.png".to_string(),
            mime_type: "image/png".to_string(),
            bytes: Bytes::from_static(b"png"),
        })
        .await
        .unwrap();

        assert_eq!(std::fs::read(dir.path().join("escape.png")).unwrap(), b"png");
    }
}
