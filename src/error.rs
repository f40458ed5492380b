// Error types for warmcache.
// Covers entity store failures, fetch timeouts, and local file access.

use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum WarmupError {
    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Fetch of {id} timed out after {after:?}")]
    Timeout { id: String, after: Duration },

    #[error("Entity store error: {0}")]
    Store(String),

    #[error("Module preload failed: {0}")]
    Preload(String),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl WarmupError {
    /// Whether this error means the entity simply does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, WarmupError::NotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, WarmupError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = WarmupError::Timeout {
            id: "G1".to_string(),
            after: Duration::from_millis(250),
        };
        assert_eq!(err.to_string(), "Fetch of G1 timed out after 250ms");

        let err = WarmupError::NotFound("form-1".to_string());
        assert_eq!(err.to_string(), "Entity not found: form-1");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_json_error_converts() {
        let parse: std::result::Result<serde_json::Value, _> = serde_json::from_str("{not json");
        let err: WarmupError = parse.unwrap_err().into();
        assert!(matches!(err, WarmupError::Json(_)));
        assert!(!err.is_not_found());
    }
}
