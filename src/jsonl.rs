//! # JSON-Lines Backend
//!
//! A durable [`KvBackend`] that keeps each collection directory as a single append-only
//! log, `store.jsonl`.  Every line records one write:
//!
//! ```text
//! {"op":"put","key":"!actors!abcdEFGH12345678","value":{"name":"Bilbo"}}
//! {"op":"del","key":"!actors!abcdEFGH12345678"}
//! ```
//!
//! Opening a handle replays the log into an ordered map; later records win.  Lines that
//! fail to parse are logged and skipped so a torn final write does not lose the rest of
//! the collection, and the next append after a torn tail starts on a fresh line.  Writes
//! append one line and flush before returning.  Closing a handle that wrote rewrites the
//! log with one `put` per live key when dead records outnumber live ones, unless some
//! other handle appended since it opened.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use crate::kv::scan_ordered;
use crate::{KvBackend, KvHandle, StoreError};

/// Name of the log file inside each collection directory.
pub const LOG_FILE_NAME: &str = "store.jsonl";

/// Logs shorter than this are never compacted.
const COMPACTION_FLOOR: usize = 32;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
enum LogRecord {
    Put { key: String, value: Value },
    Del { key: String },
}

/// Opens [`JsonlHandle`]s on collection directories.
///
/// The directory must already exist; collections are provisioned by whoever lays out
/// the world, not by the store.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonlBackend;

impl JsonlBackend {
    /// Creates the backend.
    pub fn new() -> Self {
        JsonlBackend
    }
}

impl KvBackend for JsonlBackend {
    type Handle = JsonlHandle;

    async fn open(&self, location: &Path) -> Result<JsonlHandle, StoreError> {
        let metadata = fs::metadata(location).await?;
        if !metadata.is_dir() {
            return Err(StoreError::InvalidArgument(format!(
                "{} is not a directory",
                location.display()
            )));
        }
        let path = location.join(LOG_FILE_NAME);
        let replayed = replay(&path).await?;
        debug!(
            path = %path.display(),
            records = replayed.records,
            live = replayed.entries.len(),
            torn_tail = replayed.torn_tail,
            "replayed store log"
        );
        Ok(JsonlHandle {
            path,
            entries: replayed.entries,
            records: replayed.records,
            opened_len: replayed.length,
            appended: 0,
            torn_tail: replayed.torn_tail,
        })
    }
}

struct Replayed {
    entries: BTreeMap<String, Value>,
    records: usize,
    length: u64,
    torn_tail: bool,
}

async fn replay(path: &Path) -> Result<Replayed, StoreError> {
    let bytes = match fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Ok(Replayed {
                entries: BTreeMap::new(),
                records: 0,
                length: 0,
                torn_tail: false,
            });
        }
        Err(e) => return Err(e.into()),
    };

    let mut entries = BTreeMap::new();
    let mut records = 0;
    // Unparseable lines still count as records so compaction eventually purges them.
    for (index, line) in String::from_utf8_lossy(&bytes).lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        records += 1;
        match serde_json::from_str::<LogRecord>(line) {
            Ok(LogRecord::Put { key, value }) => {
                entries.insert(key, value);
            }
            Ok(LogRecord::Del { key }) => {
                entries.remove(&key);
            }
            Err(e) => {
                warn!(
                    path = %path.display(),
                    line = index + 1,
                    error = %e,
                    "skipping unparseable store record"
                );
            }
        }
    }
    Ok(Replayed {
        entries,
        records,
        length: bytes.len() as u64,
        torn_tail: bytes.last().is_some_and(|b| *b != b'\n'),
    })
}

fn encode_line(record: &LogRecord) -> Result<String, StoreError> {
    let mut line = serde_json::to_string(record)?;
    line.push('\n');
    Ok(line)
}

/// A replayed collection log open for reads and appends.
#[derive(Debug)]
pub struct JsonlHandle {
    path: PathBuf,
    entries: BTreeMap<String, Value>,
    records: usize,
    /// Log length in bytes when the handle was opened.
    opened_len: u64,
    /// Bytes this handle has appended since.
    appended: u64,
    /// The log ended mid-line; the next append starts a fresh line first.
    torn_tail: bool,
}

impl JsonlHandle {
    /// Path of the backing log file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn append(&mut self, record: &LogRecord) -> Result<(), StoreError> {
        let mut line = encode_line(record)?;
        if self.torn_tail {
            line.insert(0, '\n');
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        self.torn_tail = false;
        self.appended += line.len() as u64;
        self.records += 1;
        Ok(())
    }

    fn needs_compaction(&self) -> bool {
        let live = self.entries.len();
        self.appended > 0
            && self.records >= COMPACTION_FLOOR
            && self.records.saturating_sub(live) > live
    }

    /// Whether the log still holds exactly what this handle saw plus its own appends.
    async fn owns_log(&self) -> Result<bool, StoreError> {
        let current = fs::metadata(&self.path).await?.len();
        Ok(current == self.opened_len + self.appended)
    }

    async fn compact(&self) -> Result<(), StoreError> {
        let mut contents = String::new();
        for (key, value) in &self.entries {
            contents.push_str(&encode_line(&LogRecord::Put {
                key: key.clone(),
                value: value.clone(),
            })?);
        }
        let staging = self.path.with_extension("jsonl.tmp");
        let mut file = fs::File::create(&staging).await?;
        file.write_all(contents.as_bytes()).await?;
        file.sync_all().await?;
        drop(file);
        fs::rename(&staging, &self.path).await?;
        info!(
            path = %self.path.display(),
            before = self.records,
            after = self.entries.len(),
            "compacted store log"
        );
        Ok(())
    }
}

impl KvHandle for JsonlHandle {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    async fn put(&mut self, key: &str, value: &Value) -> Result<(), StoreError> {
        self.append(&LogRecord::Put {
            key: key.to_string(),
            value: value.clone(),
        })
        .await?;
        self.entries.insert(key.to_string(), value.clone());
        debug!(key, "put");
        Ok(())
    }

    async fn del(&mut self, key: &str) -> Result<bool, StoreError> {
        if !self.entries.contains_key(key) {
            return Ok(false);
        }
        self.append(&LogRecord::Del {
            key: key.to_string(),
        })
        .await?;
        self.entries.remove(key);
        debug!(key, "del");
        Ok(true)
    }

    async fn scan_prefix(&self, prefix: &str) -> Result<Vec<(String, Value)>, StoreError> {
        Ok(scan_ordered(&self.entries, prefix))
    }

    async fn close(self) -> Result<(), StoreError> {
        if !self.needs_compaction() {
            return Ok(());
        }
        if !self.owns_log().await? {
            debug!(
                path = %self.path.display(),
                "store log grew under another handle; not compacting"
            );
            return Ok(());
        }
        self.compact().await
    }
}
