// core/src/backup.rs

//! Local durability fallback for orders the primary store refused.
//!
//! Each snapshot is one JSON line appended to the file. Appends go through a
//! single async mutex, so concurrent fallbacks never interleave or clobber
//! each other.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{info, instrument, warn};

use crate::error::DeskResult;
use crate::model::Order;

/// Source tag written when the primary store failed during creation.
pub const SOURCE_DB_ERROR: &str = "backup_due_to_db_error";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupEntry {
  pub source: String,
  pub saved_at: DateTime<Utc>,
  #[serde(flatten)]
  pub order: Order,
}

#[derive(Debug)]
pub struct BackupLog {
  path: PathBuf,
  write_lock: Mutex<()>,
}

impl BackupLog {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self {
      path: path.into(),
      write_lock: Mutex::new(()),
    }
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  #[instrument(name = "BackupLog::append", skip(self, order), fields(order_number = %order.order_number), err(Display))]
  pub async fn append(&self, order: &Order, source: &str) -> DeskResult<()> {
    let entry = BackupEntry {
      source: source.to_string(),
      saved_at: Utc::now(),
      order: order.clone(),
    };
    let mut line = serde_json::to_vec(&entry)?;
    line.push(b'\n');

    let _guard = self.write_lock.lock().await;
    if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
      tokio::fs::create_dir_all(parent).await?;
    }
    let mut file = OpenOptions::new().create(true).append(true).open(&self.path).await?;
    file.write_all(&line).await?;
    file.flush().await?;
    info!(path = %self.path.display(), "Order snapshot appended to backup log.");
    Ok(())
  }

  /// Reads every snapshot back. A missing file is an empty log; unreadable
  /// lines are skipped with a warning.
  pub async fn read_all(&self) -> DeskResult<Vec<BackupEntry>> {
    let raw = match tokio::fs::read_to_string(&self.path).await {
      Ok(raw) => raw,
      Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
      Err(e) => return Err(e.into()),
    };
    let mut entries = Vec::new();
    for (idx, line) in raw.lines().enumerate().filter(|(_, l)| !l.trim().is_empty()) {
      match serde_json::from_str::<BackupEntry>(line) {
        Ok(entry) => entries.push(entry),
        Err(e) => warn!(line = idx + 1, error = %e, "Skipping unreadable backup line."),
      }
    }
    Ok(entries)
  }
}
