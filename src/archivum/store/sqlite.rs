use std::path::{Path, PathBuf};

use rusqlite::{params, Connection, OptionalExtension, Row, Transaction};

use crate::error::{ArchivumError, Result};
use crate::model::{Archive, Source};

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS meta (
        key TEXT PRIMARY KEY,
        value INTEGER NOT NULL
    );

    CREATE TABLE IF NOT EXISTS archives (
        name TEXT PRIMARY KEY
    );

    CREATE TABLE IF NOT EXISTS sources (
        id INTEGER PRIMARY KEY,
        archive TEXT NOT NULL,
        filename TEXT NOT NULL,
        description TEXT,
        tags TEXT,
        license TEXT,
        hidden INTEGER,
        UNIQUE (archive, filename)
    );
";

const SOURCE_COLUMNS: &str = "id, archive, filename, description, tags, license, hidden";

pub struct SqliteStore {
    conn: Connection,
    path: Option<PathBuf>,
}

impl SqliteStore {
    /// Open (or create) the database at `path` and apply the schema.
    ///
    /// On an existing database this writes nothing, so reopening a restored
    /// snapshot leaves its bytes untouched.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        apply_schema(&conn)?;
        Ok(Self {
            conn,
            path: Some(path.to_path_buf()),
        })
    }

    /// In-memory database, for tests.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        apply_schema(&conn)?;
        Ok(Self { conn, path: None })
    }

    /// Backing file, `None` for in-memory stores.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Close the connection, releasing the file before it gets replaced.
    pub fn close(self) -> Result<()> {
        self.conn.close().map_err(|(_, e)| ArchivumError::Sqlite(e))
    }

    /// Run `f` inside one transaction. Either everything `f` wrote is
    /// committed or nothing is; database failures surface as
    /// [`ArchivumError::StorageWrite`].
    pub fn transaction<T, F>(&mut self, f: F) -> Result<T>
    where
        F: FnOnce(&Transaction<'_>) -> Result<T>,
    {
        let tx = self.conn.transaction().map_err(ArchivumError::StorageWrite)?;
        let value = f(&tx).map_err(|e| match e {
            ArchivumError::Sqlite(inner) => ArchivumError::StorageWrite(inner),
            other => other,
        })?;
        tx.commit().map_err(ArchivumError::StorageWrite)?;
        Ok(value)
    }

    pub fn archive_exists(&self, name: &str) -> Result<bool> {
        archive_exists(&self.conn, name)
    }

    pub fn list_archives(&self) -> Result<Vec<Archive>> {
        let mut stmt = self.conn.prepare("SELECT name FROM archives ORDER BY name")?;
        let rows = stmt.query_map([], |row| Ok(Archive::new(row.get::<_, String>(0)?)))?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    pub fn list_sources(&self, archive: &str) -> Result<Vec<Source>> {
        let sql = format!(
            "SELECT {} FROM sources WHERE archive = ?1 ORDER BY filename",
            SOURCE_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![archive], source_from_row)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    /// Every source whose hidden flag is not set, ordered for export.
    pub fn visible_sources(&self) -> Result<Vec<Source>> {
        let sql = format!(
            "SELECT {} FROM sources WHERE hidden IS NULL OR hidden = 0 \
             ORDER BY archive, filename",
            SOURCE_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([], source_from_row)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    pub fn find_source(&self, archive: &str, filename: &str) -> Result<Option<Source>> {
        find_source(&self.conn, archive, filename)
    }

    pub fn get_meta(&self, key: &str) -> Result<Option<i64>> {
        get_meta(&self.conn, key)
    }
}

fn apply_schema(conn: &Connection) -> Result<()> {
    // Reports the resulting mode; in-memory databases answer "memory".
    let _mode: String = conn.query_row("PRAGMA journal_mode=DELETE", [], |row| row.get(0))?;
    conn.execute_batch(SCHEMA)?;
    Ok(())
}

pub fn archive_exists(conn: &Connection, name: &str) -> Result<bool> {
    let exists = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM archives WHERE name = ?1)",
        params![name],
        |row| row.get(0),
    )?;
    Ok(exists)
}

/// Returns `true` when the archive row was created.
pub fn insert_archive(conn: &Connection, name: &str) -> Result<bool> {
    let changed = conn.execute(
        "INSERT INTO archives (name) VALUES (?1) ON CONFLICT (name) DO NOTHING",
        params![name],
    )?;
    Ok(changed > 0)
}

/// Returns `true` when a new row was written, `false` when the archive
/// already holds a file with this name. An id clash is an error.
pub fn insert_source(conn: &Connection, source: &Source) -> Result<bool> {
    let changed = conn.execute(
        "INSERT INTO sources (id, archive, filename, description, tags, license, hidden)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
         ON CONFLICT (archive, filename) DO NOTHING",
        params![
            source.id,
            source.archive,
            source.filename,
            source.description,
            source.tags,
            source.license,
            source.hidden,
        ],
    )?;
    Ok(changed > 0)
}

pub fn find_source(conn: &Connection, archive: &str, filename: &str) -> Result<Option<Source>> {
    let sql = format!(
        "SELECT {} FROM sources WHERE archive = ?1 AND filename = ?2",
        SOURCE_COLUMNS
    );
    let source = conn
        .query_row(&sql, params![archive, filename], source_from_row)
        .optional()?;
    Ok(source)
}

/// Highest source id within `low..=high`, if any.
pub fn max_source_id(conn: &Connection, low: i64, high: i64) -> Result<Option<i64>> {
    let max = conn.query_row(
        "SELECT MAX(id) FROM sources WHERE id BETWEEN ?1 AND ?2",
        params![low, high],
        |row| row.get(0),
    )?;
    Ok(max)
}

/// Sparse column update. Only the `(column, value)` pairs given are written.
pub fn update_source_columns(
    conn: &Connection,
    id: i64,
    columns: &[(&'static str, rusqlite::types::Value)],
) -> Result<usize> {
    if columns.is_empty() {
        return Ok(0);
    }
    let assignments: Vec<String> = columns
        .iter()
        .enumerate()
        .map(|(i, (column, _))| format!("{} = ?{}", column, i + 1))
        .collect();
    let sql = format!(
        "UPDATE sources SET {} WHERE id = ?{}",
        assignments.join(", "),
        columns.len() + 1
    );

    let mut values: Vec<rusqlite::types::Value> =
        columns.iter().map(|(_, value)| value.clone()).collect();
    values.push(rusqlite::types::Value::Integer(id));

    let changed = conn.execute(&sql, rusqlite::params_from_iter(values))?;
    Ok(changed)
}

pub fn get_meta(conn: &Connection, key: &str) -> Result<Option<i64>> {
    let value = conn
        .query_row(
            "SELECT value FROM meta WHERE key = ?1",
            params![key],
            |row| row.get(0),
        )
        .optional()?;
    Ok(value)
}

pub fn set_meta(conn: &Connection, key: &str, value: i64) -> Result<()> {
    conn.execute(
        "INSERT INTO meta (key, value) VALUES (?1, ?2)
         ON CONFLICT (key) DO UPDATE SET value = excluded.value",
        params![key, value],
    )?;
    Ok(())
}

fn source_from_row(row: &Row<'_>) -> rusqlite::Result<Source> {
    Ok(Source {
        id: row.get(0)?,
        archive: row.get(1)?,
        filename: row.get(2)?,
        description: row.get(3)?,
        tags: row.get(4)?,
        license: row.get(5)?,
        hidden: row.get(6)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::types::Value;

    fn store_with(sources: &[Source]) -> SqliteStore {
        let mut store = SqliteStore::in_memory().unwrap();
        store
            .transaction(|tx| {
                for source in sources {
                    insert_archive(tx, &source.archive)?;
                    insert_source(tx, source)?;
                }
                Ok(())
            })
            .unwrap();
        store
    }

    #[test]
    fn inserts_and_lists_sources() {
        let store = store_with(&[Source::new(2, "demo", "b.txt"), Source::new(1, "demo", "a.txt")]);
        let sources = store.list_sources("demo").unwrap();
        let names: Vec<_> = sources.iter().map(|s| s.filename.as_str()).collect();
        assert_eq!(names, vec!["a.txt", "b.txt"]);
        assert_eq!(store.list_archives().unwrap(), vec![Archive::new("demo")]);
    }

    #[test]
    fn duplicate_filename_is_ignored() {
        let mut store = store_with(&[Source::new(1, "demo", "a.txt")]);
        let inserted = store
            .transaction(|tx| insert_source(tx, &Source::new(2, "demo", "a.txt")))
            .unwrap();
        assert!(!inserted);
        assert_eq!(store.list_sources("demo").unwrap()[0].id, 1);
    }

    #[test]
    fn id_clash_fails_the_whole_transaction() {
        let mut store = store_with(&[Source::new(1, "demo", "a.txt")]);
        let result = store.transaction(|tx| {
            insert_source(tx, &Source::new(5, "demo", "b.txt"))?;
            insert_source(tx, &Source::new(1, "demo", "c.txt"))
        });
        assert!(matches!(result, Err(ArchivumError::StorageWrite(_))));
        assert_eq!(store.list_sources("demo").unwrap().len(), 1);
    }

    #[test]
    fn visible_sources_skip_hidden_only() {
        let mut hidden = Source::new(1, "demo", "a.txt");
        hidden.hidden = Some(true);
        let mut shown = Source::new(2, "demo", "b.txt");
        shown.hidden = Some(false);
        let unset = Source::new(3, "demo", "c.txt");
        let store = store_with(&[hidden, shown, unset]);

        let visible: Vec<_> = store
            .visible_sources()
            .unwrap()
            .into_iter()
            .map(|s| s.filename)
            .collect();
        assert_eq!(visible, vec!["b.txt", "c.txt"]);
    }

    #[test]
    fn sparse_update_touches_only_given_columns() {
        let mut source = Source::new(1, "demo", "a.txt");
        source.tags = Some("old".into());
        let mut store = store_with(&[source]);

        store
            .transaction(|tx| {
                update_source_columns(
                    tx,
                    1,
                    &[
                        ("description", Value::Text("Intro".into())),
                        ("hidden", Value::Integer(1)),
                    ],
                )
            })
            .unwrap();

        let updated = store.find_source("demo", "a.txt").unwrap().unwrap();
        assert_eq!(updated.description.as_deref(), Some("Intro"));
        assert_eq!(updated.tags.as_deref(), Some("old"));
        assert_eq!(updated.hidden, Some(true));
    }

    #[test]
    fn meta_slot_upserts() {
        let store = SqliteStore::in_memory().unwrap();
        assert_eq!(store.get_meta("version").unwrap(), None);
        set_meta(store.conn(), "version", 10).unwrap();
        set_meta(store.conn(), "version", 11).unwrap();
        assert_eq!(store.get_meta("version").unwrap(), Some(11));
    }

    #[test]
    fn reopening_keeps_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("data.db");
        let store = SqliteStore::open(&path).unwrap();
        set_meta(store.conn(), "version", 7).unwrap();
        store.close().unwrap();

        let reopened = SqliteStore::open(&path).unwrap();
        assert_eq!(reopened.get_meta("version").unwrap(), Some(7));
        assert_eq!(reopened.path(), Some(path.as_path()));
    }
}
