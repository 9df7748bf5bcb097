//! Error types for the extraction engine.

use thiserror::Error;

/// Result type for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractError>;

/// Errors that can occur while building documents or configuration.
///
/// Per-fact and per-context degradations (unrecognized context shapes,
/// missing attributes, non-numeric values) are never errors; they are
/// recorded on the affected row instead. Only a structurally unreadable
/// document or an invalid pattern rule reaches this enum.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// XML parsing error: the instance document cannot be traversed
    #[error("XML parsing error: {0}")]
    Xml(String),

    /// Invalid context pattern rule supplied as configuration
    #[error("invalid context pattern rule '{name}': {source}")]
    Rule {
        /// Name of the offending rule
        name: String,
        /// Underlying regex compilation error
        #[source]
        source: regex::Error,
    },

    /// Invalid extraction configuration
    #[error("invalid extraction configuration: {0}")]
    Config(String),
}
