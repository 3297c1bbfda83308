use crate::store::Collection;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AuditError>;

#[derive(Debug, Error)]
pub enum AuditError {
    #[error("invalid parameters: {0}")]
    InvalidParams(String),

    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode document: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("malformed document in {collection} at position {position}: {source}")]
    MalformedDocument {
        collection: Collection,
        position: usize,
        #[source]
        source: serde_json::Error,
    },
}
