use crate::commands::{CmdMessage, CmdResult};
use crate::error::{ArchivumError, Result};
use crate::store::SqliteStore;

pub fn archives(store: &SqliteStore) -> Result<CmdResult> {
    let archives = store.list_archives()?;
    let mut result = CmdResult::default();
    if archives.is_empty() {
        result.add_message(CmdMessage::info("No archives yet."));
    }
    Ok(result.with_archives(archives))
}

/// Every source of one archive, hidden ones included.
pub fn sources(store: &SqliteStore, archive: &str) -> Result<CmdResult> {
    if !store.archive_exists(archive)? {
        return Err(ArchivumError::NotFound(format!("archive {}", archive)));
    }
    let sources = store.list_sources(archive)?;
    let mut result = CmdResult::default();
    if sources.is_empty() {
        result.add_message(CmdMessage::info(format!("Archive {} is empty.", archive)));
    }
    Ok(result.with_sources(sources))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Source;
    use crate::store::sqlite::{insert_archive, insert_source};

    #[test]
    fn lists_archives_alphabetically() {
        let mut store = SqliteStore::in_memory().unwrap();
        store
            .transaction(|tx| {
                insert_archive(tx, "zeta")?;
                insert_archive(tx, "alpha")
            })
            .unwrap();

        let result = archives(&store).unwrap();
        let names: Vec<_> = result.archives.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
        assert!(result.messages.is_empty());
    }

    #[test]
    fn empty_store_reports_info() {
        let store = SqliteStore::in_memory().unwrap();
        let result = archives(&store).unwrap();
        assert!(result.archives.is_empty());
        assert_eq!(result.messages.len(), 1);
    }

    #[test]
    fn sources_include_hidden() {
        let mut store = SqliteStore::in_memory().unwrap();
        let mut hidden = Source::new(1, "demo", "a.txt");
        hidden.hidden = Some(true);
        store
            .transaction(|tx| {
                insert_archive(tx, "demo")?;
                insert_source(tx, &hidden)?;
                insert_source(tx, &Source::new(2, "demo", "b.txt"))
            })
            .unwrap();

        let result = sources(&store, "demo").unwrap();
        assert_eq!(result.sources.len(), 2);
    }

    #[test]
    fn unknown_archive_is_not_found() {
        let store = SqliteStore::in_memory().unwrap();
        assert!(matches!(
            sources(&store, "nope"),
            Err(ArchivumError::NotFound(_))
        ));
    }
}
