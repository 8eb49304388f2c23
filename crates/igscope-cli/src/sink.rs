//! JSON-lines result sink.

use std::path::{Path, PathBuf};

use igscope_scraper::ProfileMetrics;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;

/// Appends one JSON object per successful profile to a file.
pub(crate) struct JsonlSink {
    path: PathBuf,
    file: File,
    written: usize,
}

impl JsonlSink {
    /// Opens `path` for appending, creating it and any missing parent
    /// directories.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be created.
    pub(crate) async fn open(path: PathBuf) -> anyhow::Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                anyhow::anyhow!("failed to create output directory {}: {e}", parent.display())
            })?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(|e| anyhow::anyhow!("failed to open output file {}: {e}", path.display()))?;

        Ok(Self {
            path,
            file,
            written: 0,
        })
    }

    /// Writes `record` as a single line and flushes it.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be serialized or written.
    pub(crate) async fn append(&mut self, record: &ProfileMetrics) -> anyhow::Result<()> {
        let mut line = serde_json::to_vec(record)?;
        line.push(b'\n');
        self.file.write_all(&line).await.map_err(|e| {
            anyhow::anyhow!("failed to write to {}: {e}", self.path.display())
        })?;
        self.file.flush().await?;
        self.written += 1;
        Ok(())
    }

    pub(crate) fn written(&self) -> usize {
        self.written
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }
}
