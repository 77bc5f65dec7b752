//! Registry search adapter
//!
//! Issues one lookup per refined keyword, sequentially, and normalizes the
//! outcome into a result set with one entry per keyword. A failed lookup is
//! recorded inline as an error marker; it never aborts sibling lookups.

use crate::enrich::{enrich, EnrichedConflict};
use markscout_common::errors::AgentError;
use markscout_common::metrics::{REGISTRY_SEARCHES_TOTAL, REGISTRY_SEARCH_DURATION, Timer};
use markscout_common::registry::{RegistrySearch, StatusFilter};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

/// Search outcome for a single keyword
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordSearchResult {
    /// The refined keyword this entry belongs to
    pub keyword: String,

    /// Enriched conflicts, capped at the configured maximum
    pub conflicts: Vec<EnrichedConflict>,

    /// Whether the raw result list was truncated
    pub limited: bool,

    /// Record count before truncation
    pub original_count: usize,

    /// Error marker when the lookup failed; conflicts are empty then
    pub error: Option<String>,
}

impl KeywordSearchResult {
    fn failed(keyword: &str, message: String) -> Self {
        Self {
            keyword: keyword.to_string(),
            conflicts: Vec::new(),
            limited: false,
            original_count: 0,
            error: Some(message),
        }
    }
}

/// Per-keyword search outcomes in refined-keyword order
///
/// Every refined keyword has exactly one entry, even when its lookup
/// failed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResultSet {
    entries: Vec<KeywordSearchResult>,
}

impl SearchResultSet {
    pub fn new(entries: Vec<KeywordSearchResult>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[KeywordSearchResult] {
        &self.entries
    }

    /// Entry for a keyword, if present
    pub fn get(&self, keyword: &str) -> Option<&KeywordSearchResult> {
        self.entries.iter().find(|e| e.keyword == keyword)
    }

    /// Conflicts across all keywords, after truncation
    pub fn total_conflicts(&self) -> usize {
        self.entries.iter().map(|e| e.conflicts.len()).sum()
    }

    /// Records reported by the registry before truncation, counted only
    /// over truncated entries
    pub fn truncated_original_total(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.limited)
            .map(|e| e.original_count)
            .sum()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Adapter issuing registry lookups for refined keywords
pub struct RegistrySearchAdapter {
    registry: Arc<dyn RegistrySearch>,
    max_results: usize,
}

impl RegistrySearchAdapter {
    pub fn new(registry: Arc<dyn RegistrySearch>, max_results: usize) -> Self {
        Self {
            registry,
            max_results,
        }
    }

    /// Look up every keyword sequentially and build the result set
    pub async fn search_all(&self, keywords: &[String]) -> SearchResultSet {
        let mut entries = Vec::with_capacity(keywords.len());

        for keyword in keywords {
            metrics::counter!(REGISTRY_SEARCHES_TOTAL).increment(1);
            let timer = Timer::start(REGISTRY_SEARCH_DURATION);

            let entry = match self.registry.search(keyword, StatusFilter::All).await {
                Ok(records) => {
                    let original_count = records.len();
                    let limited = original_count > self.max_results;

                    let conflicts: Vec<EnrichedConflict> = records
                        .into_iter()
                        .take(self.max_results)
                        .map(enrich)
                        .collect();

                    if limited {
                        info!(
                            keyword = %keyword,
                            original_count,
                            kept = conflicts.len(),
                            "Truncated registry results for analysis"
                        );
                    }
                    info!(
                        keyword = %keyword,
                        conflicts = conflicts.len(),
                        "Registry lookup complete"
                    );

                    KeywordSearchResult {
                        keyword: keyword.clone(),
                        conflicts,
                        limited,
                        original_count,
                        error: None,
                    }
                }
                Err(AgentError::RegistrySearch { message, .. }) => {
                    warn!(keyword = %keyword, error = %message, "Registry lookup failed");
                    KeywordSearchResult::failed(keyword, message)
                }
                Err(e) => {
                    warn!(keyword = %keyword, error = %e, "Registry lookup failed");
                    KeywordSearchResult::failed(keyword, e.to_string())
                }
            };

            drop(timer);
            entries.push(entry);
        }

        SearchResultSet::new(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use markscout_common::registry::{record, ConflictRecord, MockRegistry};

    fn records(count: usize) -> Vec<ConflictRecord> {
        (0..count)
            .map(|i| record(&format!("MARK{}", i), "LIVE", "Owner", "computer software"))
            .collect()
    }

    #[tokio::test]
    async fn test_one_entry_per_keyword() {
        let registry = MockRegistry::new()
            .with_records("TechFlow", records(2))
            .with_failure("Dino", "API error: 503");
        let adapter = RegistrySearchAdapter::new(Arc::new(registry), 10);

        let keywords = vec!["TechFlow".to_string(), "Dino".to_string()];
        let results = adapter.search_all(&keywords).await;

        assert_eq!(results.len(), 2);
        assert!(results.get("TechFlow").unwrap().error.is_none());
        assert_eq!(
            results.get("Dino").unwrap().error.as_deref(),
            Some("API error: 503")
        );
    }

    #[tokio::test]
    async fn test_failed_lookup_does_not_abort_siblings() {
        let registry = MockRegistry::new()
            .with_failure("First", "connection reset")
            .with_records("Second", records(1));
        let adapter = RegistrySearchAdapter::new(Arc::new(registry), 10);

        let keywords = vec!["First".to_string(), "Second".to_string()];
        let results = adapter.search_all(&keywords).await;

        assert_eq!(results.get("Second").unwrap().conflicts.len(), 1);
        assert_eq!(results.total_conflicts(), 1);
    }

    #[tokio::test]
    async fn test_truncation_bookkeeping() {
        let registry = MockRegistry::new().with_records("TechFlow", records(14));
        let adapter = RegistrySearchAdapter::new(Arc::new(registry), 10);

        let results = adapter.search_all(&["TechFlow".to_string()]).await;
        let entry = results.get("TechFlow").unwrap();

        assert_eq!(entry.conflicts.len(), 10);
        assert!(entry.limited);
        assert_eq!(entry.original_count, 14);
        assert_eq!(results.truncated_original_total(), 14);
    }

    #[tokio::test]
    async fn test_no_truncation_below_cap() {
        let registry = MockRegistry::new().with_records("TechFlow", records(3));
        let adapter = RegistrySearchAdapter::new(Arc::new(registry), 10);

        let results = adapter.search_all(&["TechFlow".to_string()]).await;
        let entry = results.get("TechFlow").unwrap();

        assert_eq!(entry.conflicts.len(), 3);
        assert!(!entry.limited);
        assert_eq!(entry.original_count, 3);
        assert_eq!(results.truncated_original_total(), 0);
    }

    #[tokio::test]
    async fn test_entry_order_matches_keyword_order() {
        let registry = MockRegistry::new();
        let adapter = RegistrySearchAdapter::new(Arc::new(registry), 10);

        let keywords = vec!["Beta".to_string(), "Alpha".to_string()];
        let results = adapter.search_all(&keywords).await;

        let order: Vec<&str> = results.entries().iter().map(|e| e.keyword.as_str()).collect();
        assert_eq!(order, vec!["Beta", "Alpha"]);
    }
}
