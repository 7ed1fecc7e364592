use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid storage key: {0:?}")]
    InvalidKey(String),

    #[error("Storage worker is not running")]
    WorkerUnavailable,

    #[error("Storage lock poisoned")]
    Poisoned,

    #[error("Simulated storage failure: {0}")]
    Simulated(String),
}

#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Snapshot is not a list of items")]
    NotAnArray,
}

pub type StorageResult<T> = std::result::Result<T, StorageError>;
