//! # API Facade
//!
//! The API layer is a **thin facade** over the coordinator and the command
//! layer. It is the single entry point for every UI: the bundled CLI, or a
//! web front end calling the same methods from its request handlers.
//!
//! ## Role and Responsibilities
//!
//! - **Dispatches** writes to the [`Coordinator`] and reads to `commands::list`
//! - **Translates outcomes** (committed, skipped, export warnings) into
//!   [`CmdResult`] messages
//! - **Returns structured types**, never strings for the terminal
//!
//! Errors stay errors: an undo with nothing to restore comes back as
//! [`ArchivumError::EmptyHistory`](crate::error::ArchivumError::EmptyHistory)
//! and the caller decides where to send its user.

use std::path::Path;

use crate::commands::{self, CmdMessage, CmdResult};
use crate::config::{ArchivumConfig, ArchivumPaths};
use crate::coordinator::{Commit, Coordinator, ExportStatus, Mutation};
use crate::error::Result;
use crate::model::SourceUpdate;

pub struct ArchivumApi {
    coordinator: Coordinator,
}

impl ArchivumApi {
    pub fn open(config: &ArchivumConfig, root: &Path) -> Result<Self> {
        Ok(Self {
            coordinator: Coordinator::open(config, root)?,
        })
    }

    pub fn new(coordinator: Coordinator) -> Self {
        Self { coordinator }
    }

    pub fn coordinator(&self) -> &Coordinator {
        &self.coordinator
    }

    pub fn paths(&self) -> &ArchivumPaths {
        self.coordinator.paths()
    }

    pub fn create_archive(&self, name: &str) -> Result<CmdResult> {
        match self.coordinator.create_archive(name)? {
            Mutation::Committed(commit) => {
                let message = format!("Archive created: {}", commit.value);
                Ok(committed(&commit, message))
            }
            Mutation::Skipped => {
                let mut result = CmdResult::default();
                result.add_message(CmdMessage::info(format!(
                    "Archive already exists: {}",
                    name.trim()
                )));
                Ok(result)
            }
        }
    }

    pub fn upload<S: AsRef<str>>(&self, archive: &str, filenames: &[S]) -> Result<CmdResult> {
        match self.coordinator.upload(archive, filenames)? {
            Mutation::Committed(commit) => {
                let summary = &commit.value;
                let message = format!(
                    "Recorded {} file(s) in {}",
                    summary.added.len(),
                    archive.trim()
                );
                let mut result = committed(&commit, message);
                for name in &summary.existing {
                    result.add_message(CmdMessage::info(format!("Already recorded: {}", name)));
                }
                Ok(result.with_sources(summary.added.clone()))
            }
            Mutation::Skipped => {
                let mut result = CmdResult::default();
                result.add_message(CmdMessage::info("No new files to record."));
                Ok(result)
            }
        }
    }

    pub fn update_source(
        &self,
        archive: &str,
        filename: &str,
        changes: &SourceUpdate,
    ) -> Result<CmdResult> {
        match self.coordinator.update(archive, filename, changes)? {
            Mutation::Committed(commit) => {
                let message = format!("Updated {}", commit.value.url());
                let result = committed(&commit, message);
                Ok(result.with_sources(vec![commit.value]))
            }
            Mutation::Skipped => {
                let mut result = CmdResult::default();
                result.add_message(CmdMessage::info("Nothing to update."));
                Ok(result)
            }
        }
    }

    pub fn undo(&self) -> Result<CmdResult> {
        let outcome = self.coordinator.undo()?;
        let mut result = CmdResult::default().with_version(outcome.version);
        result.add_message(CmdMessage::success(format!(
            "Restored {} ({} snapshot(s) left)",
            outcome.restored, outcome.remaining
        )));
        if let ExportStatus::Failed(reason) = &outcome.export {
            result.add_message(export_warning(reason));
        }
        Ok(result)
    }

    /// Freshness check for polling clients.
    pub fn version(&self) -> Result<CmdResult> {
        let version = self.coordinator.version()?;
        Ok(CmdResult::default().with_version(version))
    }

    pub fn list_archives(&self) -> Result<CmdResult> {
        self.coordinator.with_store(commands::list::archives)
    }

    pub fn list_sources(&self, archive: &str) -> Result<CmdResult> {
        self.coordinator
            .with_store(|store| commands::list::sources(store, archive))
    }

    pub fn snapshots(&self) -> Result<CmdResult> {
        let snapshots = self.coordinator.snapshots()?;
        let mut result = CmdResult::default();
        if snapshots.is_empty() {
            result.add_message(CmdMessage::info("No snapshots."));
        }
        Ok(result.with_snapshots(snapshots))
    }

    /// Regenerate the manifest on demand.
    pub fn export(&self) -> Result<CmdResult> {
        let rows = self.coordinator.regenerate_manifest()?;
        let path = self.paths().manifest.clone();
        let mut result = CmdResult::default();
        result.add_message(CmdMessage::success(format!(
            "Manifest written with {} row(s)",
            rows
        )));
        Ok(result.with_manifest_path(path))
    }
}

fn committed<T>(commit: &Commit<T>, message: String) -> CmdResult {
    let mut result = CmdResult::default().with_version(commit.version);
    result.add_message(CmdMessage::success(message));
    if let ExportStatus::Failed(reason) = &commit.export {
        result.add_message(export_warning(reason));
    }
    result
}

fn export_warning(reason: &str) -> CmdMessage {
    CmdMessage::warning(format!("Manifest not updated: {}", reason))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::MessageLevel;
    use crate::error::ArchivumError;
    use crate::model::Visibility;
    use tempfile::TempDir;

    fn setup() -> (TempDir, ArchivumApi) {
        let dir = TempDir::new().unwrap();
        let api = ArchivumApi::open(&ArchivumConfig::default(), dir.path()).unwrap();
        (dir, api)
    }

    #[test]
    fn create_archive_reports_success_then_info() {
        let (_dir, api) = setup();
        let first = api.create_archive("demo").unwrap();
        assert_eq!(first.messages[0].level, MessageLevel::Success);
        assert!(first.version.is_some());

        let second = api.create_archive("demo").unwrap();
        assert_eq!(second.messages[0].level, MessageLevel::Info);
        assert!(second.version.is_none());
    }

    #[test]
    fn upload_returns_added_sources() {
        let (_dir, api) = setup();
        let result = api.upload("demo", &["a.txt", "b.txt"]).unwrap();
        assert_eq!(result.sources.len(), 2);

        let listed = api.list_sources("demo").unwrap();
        assert_eq!(listed.sources.len(), 2);
        assert_eq!(api.list_archives().unwrap().archives.len(), 1);
    }

    #[test]
    fn update_returns_updated_source() {
        let (_dir, api) = setup();
        api.upload("demo", &["a.txt"]).unwrap();
        let changes = SourceUpdate::new()
            .license("CC0")
            .visibility(Visibility::Hidden);
        let result = api.update_source("demo", "a.txt", &changes).unwrap();
        assert_eq!(result.sources[0].license.as_deref(), Some("CC0"));
        assert_eq!(result.sources[0].hidden, Some(true));
    }

    #[test]
    fn undo_without_history_is_an_error() {
        let (_dir, api) = setup();
        assert!(matches!(api.undo(), Err(ArchivumError::EmptyHistory)));
    }

    #[test]
    fn version_and_snapshots_follow_mutations() {
        let (_dir, api) = setup();
        assert_eq!(api.version().unwrap().version, Some(0));
        assert_eq!(api.snapshots().unwrap().snapshots.len(), 0);

        api.upload("demo", &["a.txt"]).unwrap();
        assert!(api.version().unwrap().version.unwrap() > 0);
        assert_eq!(api.snapshots().unwrap().snapshots.len(), 1);
    }

    #[test]
    fn export_reports_manifest_path() {
        let (dir, api) = setup();
        let result = api.export().unwrap();
        assert_eq!(result.manifest_path, Some(dir.path().join("sources.tsv")));
    }
}
