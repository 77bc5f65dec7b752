//! Configuration management for MarkScout
//!
//! Supports loading configuration from:
//! - Environment variables (prefixed with APP__)
//! - Configuration files (config.toml, config.yaml)
//! - Default values

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    /// Language-model service configuration
    #[serde(default)]
    pub llm: LlmConfig,

    /// Trademark registry configuration
    #[serde(default)]
    pub registry: RegistryConfig,

    /// Legal knowledge retrieval configuration
    #[serde(default)]
    pub retrieval: RetrievalConfig,

    /// Analysis pipeline configuration
    #[serde(default)]
    pub analysis: AnalysisConfig,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LlmConfig {
    /// API key for the completion service
    pub api_key: Option<String>,

    /// API base URL (for custom endpoints)
    #[serde(default = "default_llm_base")]
    pub api_base: String,

    /// Models to try, in order of preference
    #[serde(default = "default_models")]
    pub models: Vec<String>,

    /// Request timeout in seconds
    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,

    /// Token budget for keyword extraction calls
    #[serde(default = "default_keyword_max_tokens")]
    pub keyword_max_tokens: u32,

    /// Token budget for analysis calls
    #[serde(default = "default_analysis_max_tokens")]
    pub analysis_max_tokens: u32,

    /// Temperature for keyword extraction (low for determinism)
    #[serde(default = "default_keyword_temperature")]
    pub keyword_temperature: f32,

    /// Temperature for analysis (low for consistent reasoning)
    #[serde(default = "default_analysis_temperature")]
    pub analysis_temperature: f32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RegistryConfig {
    /// API key for the registry lookup service
    pub api_key: Option<String>,

    /// API host header value
    #[serde(default = "default_registry_host")]
    pub api_host: String,

    /// Base URL for search requests
    #[serde(default = "default_registry_base")]
    pub base_url: String,

    /// Per-lookup timeout in seconds
    #[serde(default = "default_registry_timeout")]
    pub timeout_secs: u64,

    /// Maximum records kept per keyword (context-size safety)
    #[serde(default = "default_max_results")]
    pub max_results_per_keyword: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RetrievalConfig {
    /// Passages requested from the knowledge store per query
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Target chunk size in characters for knowledge-base seeding
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Minimum chunk size (smaller chunks are dropped)
    #[serde(default = "default_min_chunk_size")]
    pub min_chunk_size: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AnalysisConfig {
    /// Maximum keywords that survive refinement
    #[serde(default = "default_max_keywords")]
    pub max_keywords: usize,

    /// Conflicts shown per keyword in the analysis summary
    #[serde(default = "default_max_conflicts_shown")]
    pub max_conflicts_shown: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log level (debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default = "default_json_logging")]
    pub json_logging: bool,

    /// Service name for tracing
    #[serde(default = "default_service_name")]
    pub service_name: String,
}

// Default value functions
fn default_llm_base() -> String {
    "https://api.openai.com/v1".to_string()
}
fn default_models() -> Vec<String> {
    vec![
        "gpt-3.5-turbo".to_string(),
        "gpt-4".to_string(),
        "gpt-4-turbo-preview".to_string(),
    ]
}
fn default_llm_timeout() -> u64 {
    30
}
fn default_keyword_max_tokens() -> u32 {
    100
}
fn default_analysis_max_tokens() -> u32 {
    2500
}
fn default_keyword_temperature() -> f32 {
    0.1
}
fn default_analysis_temperature() -> f32 {
    0.2
}
fn default_registry_host() -> String {
    "uspto-trademark.p.rapidapi.com".to_string()
}
fn default_registry_base() -> String {
    "https://uspto-trademark.p.rapidapi.com".to_string()
}
fn default_registry_timeout() -> u64 {
    30
}
fn default_max_results() -> usize {
    10
}
fn default_top_k() -> usize {
    3
}
fn default_chunk_size() -> usize {
    1000
}
fn default_min_chunk_size() -> usize {
    100
}
fn default_max_keywords() -> usize {
    3
}
fn default_max_conflicts_shown() -> usize {
    5
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_json_logging() -> bool {
    false
}
fn default_service_name() -> String {
    "markscout".to_string()
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: default_llm_base(),
            models: default_models(),
            timeout_secs: default_llm_timeout(),
            keyword_max_tokens: default_keyword_max_tokens(),
            analysis_max_tokens: default_analysis_max_tokens(),
            keyword_temperature: default_keyword_temperature(),
            analysis_temperature: default_analysis_temperature(),
        }
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_host: default_registry_host(),
            base_url: default_registry_base(),
            timeout_secs: default_registry_timeout(),
            max_results_per_keyword: default_max_results(),
        }
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            chunk_size: default_chunk_size(),
            min_chunk_size: default_min_chunk_size(),
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            max_keywords: default_max_keywords(),
            max_conflicts_shown: default_max_conflicts_shown(),
        }
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json_logging: default_json_logging(),
            service_name: default_service_name(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment and files
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        let config = Config::builder()
            // Load base config file
            .add_source(File::with_name("config/default").required(false))
            // Load environment-specific config
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            // Load local overrides
            .add_source(File::with_name("config/local").required(false))
            // Load from environment variables with APP__ prefix
            // e.g., APP__REGISTRY__TIMEOUT_SECS=10
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load from a specific TOML file
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name(path))
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Get registry lookup timeout as Duration
    pub fn registry_timeout(&self) -> Duration {
        Duration::from_secs(self.registry.timeout_secs)
    }

    /// Get language-model timeout as Duration
    pub fn llm_timeout(&self) -> Duration {
        Duration::from_secs(self.llm.timeout_secs)
    }

    /// Whether both external API keys are configured
    pub fn has_live_credentials(&self) -> bool {
        self.llm.api_key.is_some() && self.registry.api_key.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.registry.max_results_per_keyword, 10);
        assert_eq!(config.analysis.max_keywords, 3);
        assert_eq!(config.llm.models[0], "gpt-3.5-turbo");
        assert_eq!(config.retrieval.top_k, 3);
    }

    #[test]
    fn test_timeouts() {
        let config = AppConfig::default();
        assert_eq!(config.registry_timeout(), Duration::from_secs(30));
        assert_eq!(config.llm_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_no_credentials_by_default() {
        let config = AppConfig::default();
        assert!(!config.has_live_credentials());
    }

    #[test]
    fn test_model_fallback_order() {
        let config = AppConfig::default();
        assert_eq!(
            config.llm.models,
            vec!["gpt-3.5-turbo", "gpt-4", "gpt-4-turbo-preview"]
        );
    }
}
