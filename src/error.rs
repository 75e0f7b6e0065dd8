use thiserror::Error;

#[derive(Error, Debug)]
pub enum NotizError {
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error("Remote service unavailable: {0}")]
    RemoteUnavailable(String),

    #[error("Local store value is corrupt: {0}")]
    LocalStoreCorrupt(String),

    #[error("Aborted by user")]
    UserAborted,

    #[error("Import/export is disabled while the server is authoritative")]
    TransferDisabled,

    #[error("Block not found: {0}")]
    RecordNotFound(String),

    #[error("Ambiguous block id '{0}', use more characters")]
    AmbiguousId(String),

    #[error("Local store quota exceeded: {requested} bytes (limit {limit})")]
    QuotaExceeded { limit: usize, requested: usize },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

pub type Result<T> = std::result::Result<T, NotizError>;
