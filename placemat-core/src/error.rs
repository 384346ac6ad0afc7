//! Error types for scene operations.

use thiserror::Error;

/// Result type for scene operations.
pub type SceneResult<T> = Result<T, SceneError>;

/// Errors that can occur while manipulating the scene graph.
#[derive(Debug, Error)]
pub enum SceneError {
    /// A node ID did not resolve to a live node.
    #[error("Node not found: {0}")]
    NodeNotFound(String),

    /// Scene serialization or deserialization failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_describe_themselves() {
        let err = SceneError::NodeNotFound("abc123".to_string());
        assert_eq!(err.to_string(), "Node not found: abc123");
    }

    #[test]
    fn json_errors_convert() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: SceneError = parse_err.into();
        assert!(matches!(err, SceneError::Serialization(_)));
    }
}
