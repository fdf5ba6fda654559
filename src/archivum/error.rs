use thiserror::Error;

#[derive(Error, Debug)]
pub enum ArchivumError {
    /// Copying the live database into the backup ring failed. The mutation
    /// that requested the save point never ran.
    #[error("Snapshot failed: {0}")]
    SnapshotFailure(#[source] std::io::Error),

    #[error("Nothing to undo")]
    EmptyHistory,

    /// A mutation transaction failed and was rolled back as a whole.
    #[error("Storage write failed: {0}")]
    StorageWrite(#[source] rusqlite::Error),

    #[error("Manifest export failed: {0}")]
    Export(#[source] std::io::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ArchivumError>;
