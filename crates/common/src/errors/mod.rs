//! Error types for the MarkScout pipeline
//!
//! Provides:
//! - Distinct error types for terminal and degradable failure modes
//! - User-facing messages for the two terminal keyword-absence conditions
//! - Conversions from transport and serialization errors

use thiserror::Error;

/// Result type alias using AgentError
pub type Result<T> = std::result::Result<T, AgentError>;

/// Application error types
///
/// Only the two keyword-absence variants terminate the pipeline; every
/// other variant is either recorded inline (per-keyword search failures)
/// or triggers a deterministic fallback.
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("No trademark-related keywords found in your question. Please ask about specific brand names, products, or services.")]
    NoKeywordsFound,

    #[error("No valid trademark-related keywords found after validation. Please provide more specific brand names or product names.")]
    NoValidKeywords,

    #[error("Language model unavailable: {message}")]
    ModelUnavailable { message: String },

    #[error("Registry search failed for '{keyword}': {message}")]
    RegistrySearch { keyword: String, message: String },

    #[error("Legal context retrieval failed: {message}")]
    RetrievalUnavailable { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl AgentError {
    /// Whether this error terminates the pipeline rather than degrading
    /// to a deterministic substitute.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            AgentError::NoKeywordsFound | AgentError::NoValidKeywords
        )
    }

    /// Whether this error should be surfaced to the end user verbatim.
    pub fn is_user_facing(&self) -> bool {
        self.is_terminal()
    }
}

impl From<std::io::Error> for AgentError {
    fn from(err: std::io::Error) -> Self {
        AgentError::Internal {
            message: err.to_string(),
        }
    }
}
