use thiserror::Error;

#[derive(Error, Debug)]
pub enum AiError {
    /// The embedding function could not produce a vector (remote down, no key, bad payload).
    #[error("Embedding unavailable: {0}")]
    EmbeddingUnavailable(String),

    /// Business-logic storage errors (cannot open, cannot append, corrupt row).
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    /// Any failure at the completion / OCR / ASR boundary.
    #[error("External service error: {0}")]
    ExternalService(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Raw database errors from rusqlite
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Date parse errors from chrono
    #[error("Date parse error: {0}")]
    DateParse(#[from] chrono::ParseError),
}

impl AiError {
    /// Storage failures must propagate to the caller instead of degrading.
    pub fn is_storage_failure(&self) -> bool {
        matches!(self, Self::StorageUnavailable(_) | Self::Database(_))
    }
}

pub type AiResult<T> = Result<T, AiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_classification() {
        assert!(AiError::StorageUnavailable("disk full".into()).is_storage_failure());
        assert!(AiError::Database(rusqlite::Error::InvalidQuery).is_storage_failure());
        assert!(!AiError::EmbeddingUnavailable("offline".into()).is_storage_failure());
        assert!(!AiError::ExternalService("timeout".into()).is_storage_failure());
    }

    #[test]
    fn test_display_is_labeled() {
        let e = AiError::ExternalService("429 Too Many Requests".into());
        assert_eq!(e.to_string(), "External service error: 429 Too Many Requests");
    }
}
