use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing medium failed. The triggering mutation was NOT applied
    /// and must not be reported as such to whoever requested it.
    #[error("store I/O error: {0}")]
    Io(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("corrupt record in {collection} at key {key}: {reason}")]
    Corrupt {
        collection: &'static str,
        key: String,
        reason: String,
    },
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}
