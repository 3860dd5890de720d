use thiserror::Error;

/// Failure reading or writing the durable board record.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("record store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("record (de)serialization failed: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("host rejected the record: {0}")]
    Host(String),
}
