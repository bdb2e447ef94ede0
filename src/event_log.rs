//! Append-only text log of newly seen modem events.

use std::path::{Path, PathBuf};

use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;

use crate::error::SinkError;
use crate::modem::event::EventRecord;

/// Writes one `"[<firstTime>] <level> - <text>"` line per event.
#[derive(Debug, Clone)]
pub struct EventLogSink {
    path: PathBuf,
}

impl EventLogSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends a batch and syncs it to disk. An empty batch does not touch
    /// the file.
    pub async fn append(&self, events: &[EventRecord]) -> Result<(), SinkError> {
        if events.is_empty() {
            return Ok(());
        }

        let path = self.path.display().to_string();
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| SinkError::io(&path, e))?;

        let batch: String = events.iter().map(EventRecord::log_line).collect();
        file.write_all(batch.as_bytes())
            .await
            .map_err(|e| SinkError::io(&path, e))?;
        file.flush().await.map_err(|e| SinkError::io(&path, e))?;
        file.sync_all().await.map_err(|e| SinkError::io(&path, e))?;

        tracing::debug!(path = %path, lines = events.len(), "Appended events to log");
        Ok(())
    }
}
