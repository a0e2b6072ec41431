use thiserror::Error;

#[derive(Debug, Error)]
pub enum JsonStoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("malformed collection file {path}: {reason}")]
    Malformed { path: String, reason: String },
}

impl From<JsonStoreError> for agora_store::StoreError {
    fn from(e: JsonStoreError) -> Self {
        match e {
            JsonStoreError::Io { .. } => agora_store::StoreError::Io(e.to_string()),
            JsonStoreError::Malformed { .. } => {
                agora_store::StoreError::Serialization(e.to_string())
            }
        }
    }
}
