//! MarkScout Common Library
//!
//! Shared code for the MarkScout trademark analysis pipeline including:
//! - Error types and handling
//! - Configuration management
//! - Language-model completion client abstraction
//! - Trademark registry search client
//! - Legal knowledge store and static legal text
//! - Metrics and observability

pub mod config;
pub mod errors;
pub mod knowledge;
pub mod llm;
pub mod metrics;
pub mod registry;

// Re-export commonly used types
pub use config::AppConfig;
pub use errors::{AgentError, Result};
pub use knowledge::KnowledgeStore;
pub use llm::CompletionClient;
pub use registry::RegistrySearch;

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default chat model tried first in the fallback chain
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

/// Default cap on registry records forwarded to the language model
pub const DEFAULT_MAX_RESULTS_PER_KEYWORD: usize = 10;
