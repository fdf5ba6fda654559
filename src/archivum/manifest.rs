//! # Manifest Export
//!
//! The manifest is a tab-separated listing of every visible source, published
//! for consumers that never talk to the database. It is a derived cache:
//! rebuilt in full after each commit, undo and at startup, and never the
//! source of truth. A failed export does not undo the mutation that
//! triggered it.
//!
//! ```text
//! id  description  tags  folder  filename  archive  url  license
//! ```
//!
//! Hidden sources (`hidden = true`) are left out. Missing descriptions are
//! replaced by the filename, other missing values are empty cells.

use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::error::{ArchivumError, Result};
use crate::model::Source;
use crate::store::SqliteStore;

pub const COLUMNS: [&str; 8] = [
    "id",
    "description",
    "tags",
    "folder",
    "filename",
    "archive",
    "url",
    "license",
];

#[derive(Debug, Clone)]
pub struct ManifestExporter {
    path: PathBuf,
}

impl ManifestExporter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Rewrite the manifest from the current visible state. Returns the
    /// number of data rows written.
    pub fn regenerate(&self, store: &SqliteStore) -> Result<usize> {
        let sources = store.visible_sources()?;
        let content = render(&sources);
        self.write_atomic(&content).map_err(ArchivumError::Export)?;
        tracing::debug!(path = %self.path.display(), rows = sources.len(), "manifest regenerated");
        Ok(sources.len())
    }

    fn write_atomic(&self, content: &str) -> std::io::Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)?;

        let tmp_file = dir.join(format!(".manifest-{}.tmp", Uuid::new_v4()));
        fs::write(&tmp_file, content)?;
        if let Err(e) = fs::rename(&tmp_file, &self.path) {
            let _ = fs::remove_file(&tmp_file);
            return Err(e);
        }
        Ok(())
    }
}

/// Render header plus one row per source, in the order given. Hidden
/// sources are skipped here as well so callers can pass any selection.
pub fn render(sources: &[Source]) -> String {
    let mut out = COLUMNS.join("\t");
    out.push('\n');

    for source in sources.iter().filter(|s| s.is_visible()) {
        let url = source.url();
        let id = source.id.to_string();
        let row = [
            id.as_str(),
            source.display_description(),
            source.tags.as_deref().unwrap_or(""),
            source.archive.as_str(),
            source.filename.as_str(),
            source.archive.as_str(),
            url.as_str(),
            source.license.as_deref().unwrap_or(""),
        ];
        let cells: Vec<String> = row.iter().map(|cell| cell_value(cell)).collect();
        out.push_str(&cells.join("\t"));
        out.push('\n');
    }

    out
}

/// Free-text fields are sanitized on the way in; filenames are not, so a
/// stray tab or line break is flattened here to keep rows intact.
fn cell_value(value: &str) -> String {
    value
        .chars()
        .map(|c| if matches!(c, '\t' | '\n' | '\r') { ' ' } else { c })
        .collect()
}
