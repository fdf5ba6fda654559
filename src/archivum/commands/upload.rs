use rusqlite::Connection;

use crate::error::{ArchivumError, Result};
use crate::ids::IdGenerator;
use crate::model::Source;
use crate::store::sqlite::{find_source, insert_archive, insert_source, max_source_id};

/// What an upload batch did to the `sources` table.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct UploadSummary {
    pub added: Vec<Source>,
    /// Filenames already recorded in the archive; their rows are untouched.
    pub existing: Vec<String>,
}

/// Reject names that are not a plain file inside the archive folder and drop
/// repeats, keeping first occurrence order.
pub fn normalize_filenames<S: AsRef<str>>(filenames: &[S]) -> Result<Vec<String>> {
    let mut seen: Vec<String> = Vec::with_capacity(filenames.len());
    for raw in filenames {
        let name = raw.as_ref();
        if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
            return Err(ArchivumError::InvalidInput(format!(
                "Not a plain file name: {:?}",
                name
            )));
        }
        if !seen.iter().any(|s| s == name) {
            seen.push(name.to_string());
        }
    }
    Ok(seen)
}

/// Filenames from `filenames` with no row yet in `archive`.
pub fn pending(conn: &Connection, archive: &str, filenames: &[String]) -> Result<Vec<String>> {
    let mut out = Vec::new();
    for filename in filenames {
        if find_source(conn, archive, filename)?.is_none() {
            out.push(filename.clone());
        }
    }
    Ok(out)
}

/// Mutation body: record one source per filename, creating the archive row
/// on first use. Ids resume after the highest one stored for this node.
/// Runs inside the caller's transaction, so an id clash on any row discards
/// the whole batch.
pub fn run(
    conn: &Connection,
    archive: &str,
    filenames: &[String],
    ids: &mut IdGenerator,
) -> Result<UploadSummary> {
    insert_archive(conn, archive)?;

    let (low, high) = ids.node_range();
    if let Some(last) = max_source_id(conn, low, high)? {
        ids.observe(last);
    }

    let mut summary = UploadSummary::default();
    for filename in filenames {
        let source = Source::new(ids.next_id(), archive, filename.as_str());
        if insert_source(conn, &source)? {
            summary.added.push(source);
        } else {
            summary.existing.push(filename.clone());
        }
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SqliteStore;

    #[test]
    fn records_batch_and_creates_archive() {
        let mut store = SqliteStore::in_memory().unwrap();
        let mut ids = IdGenerator::new(1);
        let files = vec!["a.txt".to_string(), "b.txt".to_string()];

        let summary = store
            .transaction(|tx| run(tx, "demo", &files, &mut ids))
            .unwrap();

        assert_eq!(summary.added.len(), 2);
        assert!(store.archive_exists("demo").unwrap());
        let stored = store.list_sources("demo").unwrap();
        assert_eq!(stored.len(), 2);
        assert!(stored.iter().all(|s| s.description.is_none() && s.hidden.is_none()));
    }

    #[test]
    fn existing_files_keep_their_rows() {
        let mut store = SqliteStore::in_memory().unwrap();
        let mut ids = IdGenerator::new(1);
        let first = vec!["a.txt".to_string()];
        store
            .transaction(|tx| run(tx, "demo", &first, &mut ids))
            .unwrap();
        let original_id = store.find_source("demo", "a.txt").unwrap().unwrap().id;

        let second = vec!["a.txt".to_string(), "b.txt".to_string()];
        let summary = store
            .transaction(|tx| run(tx, "demo", &second, &mut ids))
            .unwrap();

        assert_eq!(summary.existing, vec!["a.txt".to_string()]);
        assert_eq!(summary.added.len(), 1);
        assert_eq!(
            store.find_source("demo", "a.txt").unwrap().unwrap().id,
            original_id
        );
    }

    #[test]
    fn fresh_generator_skips_stored_ids() {
        let mut store = SqliteStore::in_memory().unwrap();
        let first = vec!["a.txt".to_string()];
        store
            .transaction(|tx| run(tx, "demo", &first, &mut IdGenerator::new(1)))
            .unwrap();

        let second = vec!["b.txt".to_string(), "c.txt".to_string()];
        let summary = store
            .transaction(|tx| run(tx, "demo", &second, &mut IdGenerator::new(1)))
            .unwrap();

        assert_eq!(summary.added.len(), 2);
        assert_eq!(store.list_sources("demo").unwrap().len(), 3);
    }

    #[test]
    fn pending_lists_only_new_names() {
        let mut store = SqliteStore::in_memory().unwrap();
        let mut ids = IdGenerator::new(1);
        let first = vec!["a.txt".to_string()];
        store
            .transaction(|tx| run(tx, "demo", &first, &mut ids))
            .unwrap();

        let asked = vec!["a.txt".to_string(), "c.txt".to_string()];
        assert_eq!(
            pending(store.conn(), "demo", &asked).unwrap(),
            vec!["c.txt".to_string()]
        );
    }

    #[test]
    fn normalize_rejects_paths_and_dedups() {
        assert_eq!(
            normalize_filenames(&["a.txt", "b.txt", "a.txt"]).unwrap(),
            vec!["a.txt".to_string(), "b.txt".to_string()]
        );
        assert!(normalize_filenames(&["../etc/passwd"]).is_err());
        assert!(normalize_filenames(&[""]).is_err());
    }
}
