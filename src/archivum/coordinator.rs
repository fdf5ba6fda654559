//! # Mutation Coordinator
//!
//! The coordinator owns the only live [`SqliteStore`] and the snapshot queue.
//! Every write goes through the same protocol, inside one critical section:
//!
//! ```text
//! lock ─► save point ─► transaction { body, version bump } ─► manifest ─► unlock
//!            │                 │                                  │
//!            └ failure: abort  └ failure: rolled back,            └ failure: logged only
//!                                 save point dropped, abort
//! ```
//!
//! The ring only evicts its oldest entry once the transaction has committed,
//! so a failed mutation leaves the history exactly as it was.
//!
//! Undo takes the same lock, closes the handle, moves the newest snapshot
//! over the database file and reopens. Because callers only ever reach the
//! store through [`Coordinator::with_store`], nobody can hold on to a
//! connection that points at a replaced file.
//!
//! The stamp bump shares the mutation's transaction, so a commit always
//! carries its new stamp and a failed body never bumps.

use parking_lot::Mutex;
use rusqlite::Transaction;
use std::fs;
use std::path::Path;

use crate::commands::{archive, update, upload};
use crate::config::{ArchivumConfig, ArchivumPaths};
use crate::error::{ArchivumError, Result};
use crate::ids::IdGenerator;
use crate::manifest::ManifestExporter;
use crate::model::{Source, SourceUpdate};
use crate::snapshot::{SnapshotInfo, SnapshotManager};
use crate::store::SqliteStore;
use crate::version;

/// How the manifest fared after a commit or undo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportStatus {
    Written(usize),
    Failed(String),
}

/// A mutation that went through the whole protocol.
#[derive(Debug, Clone)]
pub struct Commit<T> {
    pub value: T,
    /// Save point taken before the mutation.
    pub snapshot: String,
    pub version: i64,
    pub export: ExportStatus,
}

#[derive(Debug, Clone)]
pub enum Mutation<T> {
    Committed(Commit<T>),
    /// Nothing to change: no save point, no write, no bump.
    Skipped,
}

impl<T> Mutation<T> {
    pub fn is_committed(&self) -> bool {
        matches!(self, Mutation::Committed(_))
    }
}

#[derive(Debug, Clone)]
pub struct UndoOutcome {
    pub restored: String,
    /// Stamp read back from the restored database.
    pub version: i64,
    pub remaining: usize,
    pub export: ExportStatus,
}

struct State {
    /// `None` only between closing for an undo and reopening.
    store: Option<SqliteStore>,
    snapshots: SnapshotManager,
    ids: IdGenerator,
}

pub struct Coordinator {
    paths: ArchivumPaths,
    exporter: ManifestExporter,
    state: Mutex<State>,
}

impl Coordinator {
    /// Open everything under `root`, rebuild the snapshot queue from disk and
    /// publish a fresh manifest.
    pub fn open(config: &ArchivumConfig, root: &Path) -> Result<Self> {
        config.validate()?;
        let paths = config.resolve(root);
        fs::create_dir_all(&paths.root)?;
        fs::create_dir_all(&paths.uploads)?;

        let store = SqliteStore::open(&paths.database)?;
        let snapshots = SnapshotManager::open(&paths.backups, config.max_snapshots)?;
        let exporter = ManifestExporter::new(&paths.manifest);

        let export = publish(&exporter, &store);
        tracing::info!(
            root = %paths.root.display(),
            snapshots = snapshots.len(),
            manifest = ?export,
            "archive store opened"
        );

        Ok(Self {
            paths,
            exporter,
            state: Mutex::new(State {
                store: Some(store),
                snapshots,
                ids: IdGenerator::new(config.node_id),
            }),
        })
    }

    pub fn paths(&self) -> &ArchivumPaths {
        &self.paths
    }

    /// Create an archive row and its uploads folder. An existing archive is
    /// left alone.
    pub fn create_archive(&self, raw_name: &str) -> Result<Mutation<String>> {
        let name = archive::normalize_name(raw_name)?;
        let mut guard = self.state.lock();
        let state = &mut *guard;

        if live_store(&mut state.store, &self.paths.database)?.archive_exists(&name)? {
            tracing::debug!(archive = %name, "archive exists, nothing to create");
            return Ok(Mutation::Skipped);
        }

        let folder = self.paths.archive_dir(&name);
        let commit = self.commit(state, "create-archive", |tx, _| {
            archive::run(tx, &name)?;
            fs::create_dir_all(&folder)?;
            Ok(name.clone())
        })?;
        Ok(Mutation::Committed(commit))
    }

    /// Record metadata rows for files already written to the archive folder.
    pub fn upload<S: AsRef<str>>(
        &self,
        raw_archive: &str,
        filenames: &[S],
    ) -> Result<Mutation<upload::UploadSummary>> {
        let archive_name = archive::normalize_name(raw_archive)?;
        let filenames = upload::normalize_filenames(filenames)?;
        if filenames.is_empty() {
            return Ok(Mutation::Skipped);
        }

        let mut guard = self.state.lock();
        let state = &mut *guard;

        let store = live_store(&mut state.store, &self.paths.database)?;
        let archive_known = store.archive_exists(&archive_name)?;
        if archive_known && upload::pending(store.conn(), &archive_name, &filenames)?.is_empty() {
            tracing::debug!(archive = %archive_name, "all files already recorded");
            return Ok(Mutation::Skipped);
        }
        let folder = self.paths.archive_dir(&archive_name);
        let commit = self.commit(state, "upload", |tx, ids| {
            let summary = upload::run(tx, &archive_name, &filenames, ids)?;
            fs::create_dir_all(&folder)?;
            Ok(summary)
        })?;
        Ok(Mutation::Committed(commit))
    }

    /// Apply a sparse metadata edit to one source. An edit with nothing to
    /// write is skipped before any save point is taken.
    pub fn update(
        &self,
        raw_archive: &str,
        filename: &str,
        changes: &SourceUpdate,
    ) -> Result<Mutation<Source>> {
        let archive_name = archive::normalize_name(raw_archive)?;
        let archive = archive_name.as_str();
        let columns = update::plan(changes);
        if columns.is_empty() {
            return Ok(Mutation::Skipped);
        }

        let mut guard = self.state.lock();
        let state = &mut *guard;

        let source = live_store(&mut state.store, &self.paths.database)?
            .find_source(archive, filename)?
            .ok_or_else(|| ArchivumError::NotFound(format!("{}/{}", archive, filename)))?;

        let commit = self.commit(state, "update", |tx, _| {
            update::run(tx, &source, &columns)?;
            crate::store::sqlite::find_source(tx, archive, filename)?
                .ok_or_else(|| ArchivumError::NotFound(source.url()))
        })?;
        Ok(Mutation::Committed(commit))
    }

    /// Restore the newest snapshot over the live database.
    ///
    /// With an empty queue this fails with [`ArchivumError::EmptyHistory`]
    /// and touches nothing.
    pub fn undo(&self) -> Result<UndoOutcome> {
        let mut guard = self.state.lock();
        let state = &mut *guard;

        if state.snapshots.is_empty() {
            return Err(ArchivumError::EmptyHistory);
        }

        if let Some(store) = state.store.take() {
            store.close()?;
        }
        let restored = state.snapshots.restore_latest(&self.paths.database);
        let store = live_store(&mut state.store, &self.paths.database)?;
        let entry = restored?;

        let version = version::read(store.conn())?;
        let export = publish(&self.exporter, store);
        tracing::info!(
            snapshot = %entry.name,
            version,
            remaining = state.snapshots.len(),
            "undo applied"
        );

        Ok(UndoOutcome {
            restored: entry.name,
            version,
            remaining: state.snapshots.len(),
            export,
        })
    }

    /// Current version stamp, for freshness polling.
    pub fn version(&self) -> Result<i64> {
        self.with_store(|store| version::read(store.conn()))
    }

    /// Rewrite the manifest now. Unlike the automatic export after a commit,
    /// a failure here is returned to the caller.
    pub fn regenerate_manifest(&self) -> Result<usize> {
        self.with_store(|store| self.exporter.regenerate(store))
    }

    pub fn snapshot_count(&self) -> usize {
        self.state.lock().snapshots.len()
    }

    pub fn snapshots(&self) -> Result<Vec<SnapshotInfo>> {
        self.state.lock().snapshots.entries()
    }

    /// Read access to the live store for the duration of `f`.
    pub fn with_store<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&SqliteStore) -> Result<T>,
    {
        let mut guard = self.state.lock();
        let store = live_store(&mut guard.store, &self.paths.database)?;
        f(store)
    }

    fn commit<T, F>(&self, state: &mut State, label: &str, body: F) -> Result<Commit<T>>
    where
        F: FnOnce(&Transaction<'_>, &mut IdGenerator) -> Result<T>,
    {
        let store = live_store(&mut state.store, &self.paths.database)?;
        let snapshot = state.snapshots.stage_save_point(&self.paths.database)?;

        let ids = &mut state.ids;
        let outcome = store.transaction(|tx| {
            let value = body(tx, ids)?;
            let version = version::bump(tx)?;
            Ok((value, version))
        });
        let (value, version) = match outcome {
            Ok(committed) => committed,
            Err(e) => {
                tracing::warn!(operation = label, error = %e, "mutation rolled back");
                state.snapshots.discard(&snapshot);
                return Err(e);
            }
        };
        state.snapshots.trim();

        let export = publish(&self.exporter, store);
        tracing::info!(
            operation = label,
            snapshot = %snapshot.name,
            version,
            "mutation committed"
        );

        Ok(Commit {
            value,
            snapshot: snapshot.name,
            version,
            export,
        })
    }
}

/// The live handle, reopened if an earlier undo left it closed.
fn live_store<'a>(slot: &'a mut Option<SqliteStore>, path: &Path) -> Result<&'a mut SqliteStore> {
    let store = match slot.take() {
        Some(store) => store,
        None => {
            tracing::debug!(path = %path.display(), "reopening database");
            SqliteStore::open(path)?
        }
    };
    Ok(slot.insert(store))
}

fn publish(exporter: &ManifestExporter, store: &SqliteStore) -> ExportStatus {
    match exporter.regenerate(store) {
        Ok(rows) => ExportStatus::Written(rows),
        Err(e) => {
            tracing::warn!(path = %exporter.path().display(), error = %e, "manifest export failed");
            ExportStatus::Failed(e.to_string())
        }
    }
}
