//! Scan log kept as a JSON-lines file shared by the stations of one site.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::{Mutex, broadcast};
use tracing::{debug, warn};

use drm_model::{DepotId, ScanEvent, ScanLogInsert};

use super::{LIVE_CHANNEL_CAPACITY, ScanLog, depot_tail};
use crate::error::{Result, SyncError};

/// Append-only JSON-lines scan log.
///
/// Live notifications reach subscribers in this process only; other
/// processes converge through [`ScanLog::backlog`].
#[derive(Debug, Clone)]
pub struct JsonlScanLog {
    path: Arc<PathBuf>,
    write_lock: Arc<Mutex<()>>,
    sender: broadcast::Sender<ScanEvent>,
}

impl JsonlScanLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let (sender, _) = broadcast::channel(LIVE_CHANNEL_CAPACITY);
        Self {
            path: Arc::new(path.into()),
            write_lock: Arc::new(Mutex::new(())),
            sender,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Every well-formed event in file order. Malformed lines are skipped.
    async fn read_all(&self) -> Result<Vec<ScanEvent>> {
        let text = match fs::read_to_string(self.path()).await {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(SyncError::Io {
                    operation: "read",
                    path: self.path().to_path_buf(),
                    source: e,
                });
            }
        };
        let mut events = Vec::new();
        for (number, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<ScanEvent>(line) {
                Ok(event) => events.push(event),
                Err(error) => warn!(
                    path = %self.path().display(),
                    line = number + 1,
                    error = %error,
                    "skipping malformed scan log line"
                ),
            }
        }
        Ok(events)
    }

    fn io_error(&self, operation: &'static str) -> impl FnOnce(std::io::Error) -> SyncError {
        let path = self.path().to_path_buf();
        move |source| SyncError::Io {
            operation,
            path,
            source,
        }
    }

    async fn ensure_parent(&self) -> Result<()> {
        let Some(parent) = self.path().parent().filter(|p| !p.as_os_str().is_empty()) else {
            return Ok(());
        };
        fs::create_dir_all(parent)
            .await
            .map_err(|e| SyncError::Io {
                operation: "create directory",
                path: parent.to_path_buf(),
                source: e,
            })
    }
}

fn encode_line(event: &ScanEvent) -> Result<String> {
    let mut line = serde_json::to_string(event).map_err(|source| SyncError::Encode {
        what: "scan event",
        source,
    })?;
    line.push('\n');
    Ok(line)
}

impl ScanLog for JsonlScanLog {
    async fn append(&self, insert: ScanLogInsert) -> Result<ScanEvent> {
        let event = ScanEvent::from_insert(insert, Utc::now());
        let line = encode_line(&event)?;
        let _guard = self.write_lock.lock().await;
        self.ensure_parent().await?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.path())
            .await
            .map_err(self.io_error("open"))?;
        file.write_all(line.as_bytes())
            .await
            .map_err(self.io_error("append to"))?;
        file.flush().await.map_err(self.io_error("flush"))?;
        let receivers = self.sender.send(event.clone()).unwrap_or(0);
        debug!(code = %event.code, receivers, "appended scan event");
        Ok(event)
    }

    async fn backlog(&self, depot: &DepotId, limit: usize) -> Result<Vec<ScanEvent>> {
        let events = self.read_all().await?;
        Ok(depot_tail(events.iter(), depot, limit))
    }

    async fn clear(&self, depot: &DepotId) -> Result<usize> {
        let _guard = self.write_lock.lock().await;
        let events = self.read_all().await?;
        let (removed, kept): (Vec<ScanEvent>, Vec<ScanEvent>) = events
            .into_iter()
            .partition(|event| &event.depot_id == depot);
        if removed.is_empty() {
            return Ok(0);
        }
        let mut body = String::new();
        for event in &kept {
            body.push_str(&encode_line(event)?);
        }
        let temp = self.path().with_extension("jsonl.tmp");
        fs::write(&temp, body).await.map_err(|e| SyncError::Io {
            operation: "write",
            path: temp.clone(),
            source: e,
        })?;
        fs::rename(&temp, self.path())
            .await
            .map_err(|e| SyncError::Io {
                operation: "replace",
                path: self.path().to_path_buf(),
                source: e,
            })?;
        Ok(removed.len())
    }

    fn subscribe(&self) -> broadcast::Receiver<ScanEvent> {
        self.sender.subscribe()
    }
}
