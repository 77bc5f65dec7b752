//! Trademark registry search client
//!
//! Wraps the external registry lookup API behind a trait so the pipeline
//! can be driven by mocks in tests. One lookup per keyword, no retry.

use crate::config::RegistryConfig;
use crate::errors::{AgentError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Registry status filter for a lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFilter {
    /// All records regardless of status
    All,
    /// Live registrations and applications only
    Live,
}

impl StatusFilter {
    /// Path segment used by the search endpoint
    pub fn as_path(&self) -> &'static str {
        match self {
            StatusFilter::All => "all",
            StatusFilter::Live => "active",
        }
    }
}

/// Registered owner of a mark
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Owner {
    pub name: Option<String>,
}

/// One existing registry entry; immutable once fetched
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConflictRecord {
    /// The mark text as registered or applied for
    #[serde(rename = "keyword")]
    pub mark: String,

    /// Registry serial number
    #[serde(default)]
    pub serial_number: Option<String>,

    /// Status label (e.g. "LIVE", "DEAD", "PENDING")
    #[serde(default)]
    pub status_label: Option<String>,

    /// Owners of record
    #[serde(default)]
    pub owners: Vec<Owner>,

    /// Goods/services description
    #[serde(default)]
    pub goods_services: Option<String>,

    /// Filing date as reported by the registry (format not guaranteed)
    #[serde(default)]
    pub filing_date: Option<String>,

    /// Registration date as reported by the registry
    #[serde(default)]
    pub registration_date: Option<String>,
}

impl ConflictRecord {
    /// First owner name, if any
    pub fn owner_name(&self) -> Option<&str> {
        self.owners.first().and_then(|o| o.name.as_deref())
    }
}

/// Wire response from the search endpoint
#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<ConflictRecord>,
}

/// Trait for trademark registry lookup services
#[async_trait]
pub trait RegistrySearch: Send + Sync {
    /// Look up existing records for a keyword. A failed lookup returns
    /// `RegistrySearch` errors; callers record them inline rather than
    /// aborting sibling lookups.
    async fn search(&self, keyword: &str, status: StatusFilter) -> Result<Vec<ConflictRecord>>;
}

/// HTTP registry client (RapidAPI trademark search)
pub struct HttpRegistryClient {
    client: reqwest::Client,
    api_key: String,
    api_host: String,
    base_url: String,
}

impl HttpRegistryClient {
    /// Create a new client from config
    pub fn new(config: &RegistryConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| AgentError::Configuration {
                message: "registry.api_key is required for the HTTP registry client".to_string(),
            })?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AgentError::Internal {
                message: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            api_key,
            api_host: config.api_host.clone(),
            base_url: config.base_url.clone(),
        })
    }
}

#[async_trait]
impl RegistrySearch for HttpRegistryClient {
    async fn search(&self, keyword: &str, status: StatusFilter) -> Result<Vec<ConflictRecord>> {
        let url = format!(
            "{}/v1/trademarkSearch/{}/{}",
            self.base_url,
            keyword,
            status.as_path()
        );

        let response = self
            .client
            .get(&url)
            .header("X-RapidAPI-Key", &self.api_key)
            .header("X-RapidAPI-Host", &self.api_host)
            .send()
            .await
            .map_err(|e| AgentError::RegistrySearch {
                keyword: keyword.to_string(),
                message: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(AgentError::RegistrySearch {
                keyword: keyword.to_string(),
                message: format!("API error: {}", response.status().as_u16()),
            });
        }

        let body: SearchResponse =
            response
                .json()
                .await
                .map_err(|e| AgentError::RegistrySearch {
                    keyword: keyword.to_string(),
                    message: format!("Failed to parse response: {}", e),
                })?;

        Ok(body.items)
    }
}

/// In-memory registry for development and testing
#[derive(Default)]
pub struct MockRegistry {
    records: HashMap<String, Vec<ConflictRecord>>,
    failures: HashMap<String, String>,
}

impl MockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register records returned for a keyword (case-insensitive)
    pub fn with_records(mut self, keyword: &str, records: Vec<ConflictRecord>) -> Self {
        self.records.insert(keyword.to_lowercase(), records);
        self
    }

    /// Register a failure for a keyword (case-insensitive)
    pub fn with_failure(mut self, keyword: &str, message: &str) -> Self {
        self.failures
            .insert(keyword.to_lowercase(), message.to_string());
        self
    }
}

#[async_trait]
impl RegistrySearch for MockRegistry {
    async fn search(&self, keyword: &str, _status: StatusFilter) -> Result<Vec<ConflictRecord>> {
        let key = keyword.to_lowercase();
        if let Some(message) = self.failures.get(&key) {
            return Err(AgentError::RegistrySearch {
                keyword: keyword.to_string(),
                message: message.clone(),
            });
        }
        Ok(self.records.get(&key).cloned().unwrap_or_default())
    }
}

/// Create a registry client based on configuration; falls back to an
/// empty mock registry when no API key is configured.
pub fn create_registry_client(config: &RegistryConfig) -> Result<Arc<dyn RegistrySearch>> {
    match config.api_key {
        Some(_) => Ok(Arc::new(HttpRegistryClient::new(config)?)),
        None => {
            tracing::warn!("No registry API key configured, using mock registry");
            Ok(Arc::new(MockRegistry::new()))
        }
    }
}

/// Convenience constructor for test fixtures
pub fn record(mark: &str, status: &str, owner: &str, goods: &str) -> ConflictRecord {
    ConflictRecord {
        mark: mark.to_string(),
        serial_number: None,
        status_label: Some(status.to_string()),
        owners: vec![Owner {
            name: Some(owner.to_string()),
        }],
        goods_services: Some(goods.to_string()),
        filing_date: None,
        registration_date: None,
    }
}
