//! Error types for EDGAR data operations.

use thiserror::Error;

/// Result type for data operations.
pub type Result<T> = std::result::Result<T, DataError>;

/// Errors that can occur while talking to SEC EDGAR.
#[derive(Debug, Error)]
pub enum DataError {
    /// Network error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// SEC EDGAR API error
    #[error("EDGAR API error: {0}")]
    EdgarApi(String),

    /// Page parsing error
    #[error("Page parsing error: {0}")]
    Parse(String),

    /// CIK not found for ticker
    #[error("CIK not found for ticker: {0}")]
    CikNotFound(String),

    /// Filing or instance document not found
    #[error("Filing not found: {0}")]
    FilingNotFound(String),

    /// Invalid symbol or CIK
    #[error("Invalid symbol: {0}")]
    InvalidSymbol(String),
}
