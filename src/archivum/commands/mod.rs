//! # Command Layer
//!
//! Business logic for each operation, as plain functions over a database
//! connection. Mutation bodies receive the open transaction from the
//! coordinator and never snapshot, bump or export themselves; read commands
//! receive the live store.
//!
//! Results travel back as [`CmdResult`]: data for the caller to display plus
//! leveled messages. Nothing here prints.

use crate::model::{Archive, Source};
use crate::snapshot::SnapshotInfo;
use std::path::PathBuf;

pub mod archive;
pub mod list;
pub mod update;
pub mod upload;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            content: content.into(),
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Error,
            content: content.into(),
        }
    }
}

#[derive(Debug, Default)]
pub struct CmdResult {
    pub archives: Vec<Archive>,
    pub sources: Vec<Source>,
    pub snapshots: Vec<SnapshotInfo>,
    /// Version stamp after the command, when it is relevant to the caller.
    pub version: Option<i64>,
    pub manifest_path: Option<PathBuf>,
    pub messages: Vec<CmdMessage>,
}

impl CmdResult {
    pub fn add_message(&mut self, message: CmdMessage) {
        self.messages.push(message);
    }

    pub fn with_archives(mut self, archives: Vec<Archive>) -> Self {
        self.archives = archives;
        self
    }

    pub fn with_sources(mut self, sources: Vec<Source>) -> Self {
        self.sources = sources;
        self
    }

    pub fn with_snapshots(mut self, snapshots: Vec<SnapshotInfo>) -> Self {
        self.snapshots = snapshots;
        self
    }

    pub fn with_version(mut self, version: i64) -> Self {
        self.version = Some(version);
        self
    }

    pub fn with_manifest_path(mut self, path: PathBuf) -> Self {
        self.manifest_path = Some(path);
        self
    }

    pub fn has_warnings(&self) -> bool {
        self.messages
            .iter()
            .any(|m| m.level == MessageLevel::Warning)
    }
}
