use rusqlite::types::Value;
use rusqlite::Connection;

use crate::error::{ArchivumError, Result};
use crate::model::{Source, SourceUpdate};
use crate::sanitize::non_empty;
use crate::store::sqlite::update_source_columns;

/// Columns an update will write, in a stable order.
///
/// Text fields count only when they are still non-empty after sanitizing.
/// The visibility flag is written whenever it is not indeterminate, so
/// un-hiding is an explicit `hidden = 0`.
pub fn plan(update: &SourceUpdate) -> Vec<(&'static str, Value)> {
    let mut columns = Vec::new();

    if let Some(description) = non_empty(update.description.as_deref()) {
        columns.push(("description", Value::Text(description)));
    }
    if let Some(tags) = non_empty(update.tags.as_deref()) {
        columns.push(("tags", Value::Text(tags)));
    }
    if let Some(license) = non_empty(update.license.as_deref()) {
        columns.push(("license", Value::Text(license)));
    }
    if let Some(hidden) = update.visibility.as_flag() {
        columns.push(("hidden", Value::Integer(i64::from(hidden))));
    }

    columns
}

/// Mutation body: apply a planned update to one source.
pub fn run(conn: &Connection, source: &Source, columns: &[(&'static str, Value)]) -> Result<()> {
    let changed = update_source_columns(conn, source.id, columns)?;
    if changed == 0 {
        return Err(ArchivumError::NotFound(source.url()));
    }
    Ok(())
}
