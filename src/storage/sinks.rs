//! Download sinks for generated exports

use crate::core::service::DownloadSink;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Writes exports as files into a directory
#[derive(Debug, Clone)]
pub struct FileSystemSink {
    dir: PathBuf,
}

impl FileSystemSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl DownloadSink for FileSystemSink {
    async fn download_file(&self, content: &str, filename: &str, mime_type: &str) -> Result<()> {
        // Only the final path component is honoured
        let name = Path::new(filename)
            .file_name()
            .with_context(|| format!("Invalid export filename: {}", filename))?;
        let path = self.dir.join(name);

        tokio::fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("Failed to create {}", self.dir.display()))?;
        tokio::fs::write(&path, content)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;

        tracing::debug!(path = %path.display(), mime_type = %mime_type, "Export written");
        Ok(())
    }
}

/// A captured download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub content: String,
    pub filename: String,
    pub mime_type: String,
}

/// Keeps downloads in memory
///
/// Useful for testing. Clones share the same captured list.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    downloads: Arc<Mutex<Vec<Download>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn downloads(&self) -> Vec<Download> {
        self.downloads.lock().await.clone()
    }

    pub async fn clear(&self) {
        self.downloads.lock().await.clear();
    }
}

#[async_trait]
impl DownloadSink for MemorySink {
    async fn download_file(&self, content: &str, filename: &str, mime_type: &str) -> Result<()> {
        self.downloads.lock().await.push(Download {
            content: content.to_string(),
            filename: filename.to_string(),
            mime_type: mime_type.to_string(),
        });
        Ok(())
    }
}
