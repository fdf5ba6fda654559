//! # Snapshots
//!
//! Before every mutation the whole database file is copied into the backup
//! directory as `sp<N>.db`. The copies form a bounded FIFO ring: once the
//! ring holds more than `limit` entries the oldest file is deleted. Undo walks
//! the ring from the other end, restoring the newest copy over the live file.
//!
//! ```text
//! backups/
//! ├── sp2.db   # oldest, next to be evicted
//! ├── ...
//! └── sp11.db  # newest, next to be restored
//! ```
//!
//! The directory is the source of truth. The in-memory queue is an index into
//! it, rebuilt on [`SnapshotManager::open`] from file modification times.
//!
//! `N` is one past the newest entry's index. Until the first eviction that is
//! simply the queue length; afterwards it keeps names from colliding with
//! files still in the ring.

use chrono::{DateTime, Utc};
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use uuid::Uuid;

use crate::error::{ArchivumError, Result};

pub const DEFAULT_LIMIT: usize = 10;

const PREFIX: &str = "sp";
const EXTENSION: &str = ".db";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotEntry {
    pub index: u64,
    pub name: String,
}

impl SnapshotEntry {
    fn new(index: u64) -> Self {
        Self {
            index,
            name: format!("{}{}{}", PREFIX, index, EXTENSION),
        }
    }

    /// Parses `sp<N>.db`; anything else in the directory is not a snapshot.
    fn parse(file_name: &str) -> Option<Self> {
        let digits = file_name.strip_prefix(PREFIX)?.strip_suffix(EXTENSION)?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        digits.parse().ok().map(Self::new)
    }
}

/// A snapshot as shown to users.
#[derive(Debug, Clone)]
pub struct SnapshotInfo {
    pub name: String,
    pub path: PathBuf,
    pub created_at: DateTime<Utc>,
    pub size: u64,
}

#[derive(Debug)]
pub struct SnapshotManager {
    dir: PathBuf,
    limit: usize,
    queue: VecDeque<SnapshotEntry>,
}

impl SnapshotManager {
    /// Open the ring at `dir`, creating the directory if needed, and rebuild
    /// the queue from what is on disk.
    pub fn open(dir: impl Into<PathBuf>, limit: usize) -> Result<Self> {
        let mut manager = Self {
            dir: dir.into(),
            limit: limit.max(1),
            queue: VecDeque::new(),
        };
        manager.reconcile()?;
        Ok(manager)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Entry names, oldest first.
    pub fn names(&self) -> Vec<String> {
        self.queue.iter().map(|e| e.name.clone()).collect()
    }

    /// Discard the in-memory queue and rebuild it from the backup directory,
    /// oldest modification time first.
    pub fn reconcile(&mut self) -> Result<()> {
        fs::create_dir_all(&self.dir)?;

        let mut found: Vec<(SystemTime, SnapshotEntry)> = Vec::new();
        for dir_entry in fs::read_dir(&self.dir)? {
            let dir_entry = dir_entry?;
            let file_name = dir_entry.file_name();
            let Some(entry) = file_name.to_str().and_then(SnapshotEntry::parse) else {
                continue;
            };
            let metadata = dir_entry.metadata()?;
            if !metadata.is_file() {
                continue;
            }
            let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
            found.push((modified, entry));
        }

        found.sort_by(|(a_time, a), (b_time, b)| a_time.cmp(b_time).then(a.index.cmp(&b.index)));
        self.queue = found.into_iter().map(|(_, entry)| entry).collect();

        tracing::debug!(dir = %self.dir.display(), snapshots = self.queue.len(), "snapshot queue rebuilt");
        Ok(())
    }

    /// Copy `live` into the ring and evict the oldest entries past the limit.
    ///
    /// On failure nothing is added to the queue and the caller must not go on
    /// to mutate.
    pub fn create_save_point(&mut self, live: &Path) -> Result<SnapshotEntry> {
        let entry = self.stage_save_point(live)?;
        self.trim();
        Ok(entry)
    }

    /// Like [`create_save_point`](Self::create_save_point), but nothing is
    /// evicted until [`trim`](Self::trim) runs. The queue may briefly hold
    /// one entry past the limit, so a staged entry can still be
    /// [`discard`](Self::discard)ed without losing older history.
    pub fn stage_save_point(&mut self, live: &Path) -> Result<SnapshotEntry> {
        let entry = SnapshotEntry::new(self.next_index());
        self.copy_into_ring(live, &entry)
            .map_err(ArchivumError::SnapshotFailure)?;
        self.queue.push_back(entry.clone());
        tracing::debug!(snapshot = %entry.name, queued = self.queue.len(), "save point created");
        Ok(entry)
    }

    /// Evict the oldest entries until the queue fits the limit.
    pub fn trim(&mut self) {
        while self.queue.len() > self.limit {
            if let Some(oldest) = self.queue.pop_front() {
                let path = self.dir.join(&oldest.name);
                match fs::remove_file(&path) {
                    Ok(()) => tracing::debug!(snapshot = %oldest.name, "evicted oldest snapshot"),
                    Err(e) => tracing::warn!(
                        snapshot = %oldest.name,
                        error = %e,
                        "could not delete evicted snapshot"
                    ),
                }
            }
        }
    }

    /// Drop `entry` if it is still the newest one, deleting its file. Used
    /// when the mutation it guarded never committed.
    pub fn discard(&mut self, entry: &SnapshotEntry) {
        if self.queue.back() != Some(entry) {
            return;
        }
        self.queue.pop_back();
        if let Err(e) = fs::remove_file(self.dir.join(&entry.name)) {
            tracing::warn!(snapshot = %entry.name, error = %e, "could not delete discarded snapshot");
        } else {
            tracing::debug!(snapshot = %entry.name, "discarded unused save point");
        }
    }

    /// Move the newest snapshot over `live`, consuming it.
    ///
    /// The caller must have closed every connection to `live` first and must
    /// reopen afterwards, whatever the outcome. If the rename fails the entry
    /// stays queued.
    pub fn restore_latest(&mut self, live: &Path) -> Result<SnapshotEntry> {
        let entry = self.queue.pop_back().ok_or(ArchivumError::EmptyHistory)?;
        let backup = self.dir.join(&entry.name);
        if let Err(e) = fs::rename(&backup, live) {
            self.queue.push_back(entry);
            return Err(ArchivumError::SnapshotFailure(e));
        }
        tracing::debug!(snapshot = %entry.name, remaining = self.queue.len(), "snapshot restored");
        Ok(entry)
    }

    /// Queue contents with file details, oldest first.
    pub fn entries(&self) -> Result<Vec<SnapshotInfo>> {
        self.queue
            .iter()
            .map(|entry| -> Result<SnapshotInfo> {
                let path = self.dir.join(&entry.name);
                let metadata = fs::metadata(&path)?;
                let created_at = metadata
                    .modified()
                    .map(DateTime::<Utc>::from)
                    .unwrap_or_else(|_| Utc::now());
                Ok(SnapshotInfo {
                    name: entry.name.clone(),
                    path,
                    created_at,
                    size: metadata.len(),
                })
            })
            .collect()
    }

    fn next_index(&self) -> u64 {
        self.queue
            .iter()
            .map(|e| e.index + 1)
            .max()
            .unwrap_or(0)
    }

    fn copy_into_ring(&self, live: &Path, entry: &SnapshotEntry) -> std::io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        let tmp_file = self.dir.join(format!(".sp-{}.tmp", Uuid::new_v4()));
        let copied = fs::copy(live, &tmp_file)
            .and_then(|_| fs::rename(&tmp_file, self.dir.join(&entry.name)));
        if copied.is_err() {
            let _ = fs::remove_file(&tmp_file);
        }
        copied
    }
}
