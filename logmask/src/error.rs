//! Error types for configuration, level parsing and metadata serialization.
//!
//! None of these ever escape a log call. `SerializeError` is reported through
//! the sink's error level; the others surface only at construction time.

use thiserror::Error;

/// Failure while flattening a metadata graph into plain data.
#[derive(Debug, Error)]
pub enum SerializeError {
    /// A list or object was mutably borrowed while the logger tried to read it.
    #[error("metadata node at `{path}` is already mutably borrowed")]
    Borrowed {
        /// Dotted path from the root to the node that could not be read.
        path: String,
    },
    /// A `serde::Serialize` value could not be converted into metadata.
    #[error("value cannot be converted into log metadata: {0}")]
    Unserializable(String),
}

impl From<serde_json::Error> for SerializeError {
    fn from(err: serde_json::Error) -> Self {
        Self::Unserializable(err.to_string())
    }
}

/// Invalid [`crate::LoggerOptions`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("maximumDepth must be greater than zero")]
    ZeroDepth,
    #[error("maximumDepth must be at most {max}, got {got}")]
    DepthTooLarge { max: usize, got: usize },
    #[error("maximumBreadth must be greater than zero")]
    ZeroBreadth,
    #[error("maxLogValueLength must be at least {min}, got {got}")]
    ValueLengthTooShort { min: usize, got: usize },
}

/// Unknown level name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown log level `{0}`; expected one of error, warn, info, debug")]
pub struct ParseLevelError(pub String);
