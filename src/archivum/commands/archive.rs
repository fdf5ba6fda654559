use rusqlite::Connection;

use crate::error::{ArchivumError, Result};
use crate::sanitize::strip_whitespace;
use crate::store::sqlite::insert_archive;

/// Sanitize an archive name and make sure it is usable as a single folder
/// name under the uploads root.
pub fn normalize_name(raw: &str) -> Result<String> {
    let name = strip_whitespace(raw).trim().to_string();
    if name.is_empty() {
        return Err(ArchivumError::InvalidInput(
            "Archive name cannot be empty".to_string(),
        ));
    }
    if name == "." || name == ".." || name.contains(['/', '\\']) {
        return Err(ArchivumError::InvalidInput(format!(
            "Archive name must be a single folder name: {}",
            name
        )));
    }
    Ok(name)
}

/// Mutation body for archive creation. Returns `true` when a row was added.
pub fn run(conn: &Connection, name: &str) -> Result<bool> {
    insert_archive(conn, name)
}
