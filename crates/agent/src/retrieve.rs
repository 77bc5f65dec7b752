//! Legal context retrieval
//!
//! Builds a retrieval query from the refined keywords and search outcomes,
//! queries the knowledge store, and always produces usable legal context:
//! when retrieval fails or returns nothing, a static legal-principles block
//! stands in.

use crate::search::SearchResultSet;
use markscout_common::knowledge::{KnowledgeStore, Passage, FALLBACK_LEGAL_CONTEXT};
use std::sync::Arc;
use tracing::{debug, warn};

/// Legal context passed to synthesis
#[derive(Debug, Clone)]
pub struct LegalContext {
    pub passages: Vec<Passage>,
    /// True when the static principles block was substituted
    pub fallback: bool,
}

impl LegalContext {
    fn from_fallback() -> Self {
        Self {
            passages: vec![Passage {
                text: FALLBACK_LEGAL_CONTEXT.to_string(),
                source: "builtin_principles".to_string(),
                score: 0.0,
            }],
            fallback: true,
        }
    }

    /// Passages joined for prompt embedding
    pub fn format(&self) -> String {
        self.passages
            .iter()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// Compose the retrieval query from keyword traits and conflict volume
///
/// Every fired rule contributes a phrase and the phrases are space-joined;
/// the generic default fires only when no rule did.
pub fn build_query(keywords: &[String], results: &SearchResultSet) -> String {
    let mut parts: Vec<&str> = Vec::new();

    if keywords.iter().any(|kw| kw.len() <= 4) {
        parts.push("short marks trademark distinctiveness");
    }

    let lowered: Vec<String> = keywords.iter().map(|kw| kw.to_lowercase()).collect();
    if lowered
        .iter()
        .any(|kw| kw.contains("app") || kw.contains("software"))
    {
        parts.push("software technology trademark considerations");
    }
    if lowered
        .iter()
        .any(|kw| kw.contains("tech") || kw.contains("data"))
    {
        parts.push("descriptive marks secondary meaning");
    }

    let total = results.total_conflicts();
    if total > 5 {
        parts.push("high conflict marks likelihood of confusion");
    } else if total > 0 {
        parts.push("moderate conflict marks risk assessment");
    }

    if parts.is_empty() {
        parts.push("trademark distinctiveness likelihood of confusion");
    }

    parts.join(" ")
}

/// Retriever over the knowledge store with static fallback
pub struct LegalContextRetriever {
    store: Arc<dyn KnowledgeStore>,
    top_k: usize,
}

impl LegalContextRetriever {
    pub fn new(store: Arc<dyn KnowledgeStore>, top_k: usize) -> Self {
        Self { store, top_k }
    }

    /// Retrieve legal context for the analysis at hand
    ///
    /// Never fails: retrieval errors and empty results both yield the static
    /// principles block.
    pub async fn retrieve(&self, keywords: &[String], results: &SearchResultSet) -> LegalContext {
        let query = build_query(keywords, results);
        debug!(query = %query, "Retrieving legal context");

        match self.store.query(&query, self.top_k).await {
            Ok(passages) if !passages.is_empty() => LegalContext {
                passages,
                fallback: false,
            },
            Ok(_) => {
                debug!(query = %query, "No passages matched, using static principles");
                LegalContext::from_fallback()
            }
            Err(e) => {
                warn!(error = %e, "Legal context retrieval failed, using static principles");
                LegalContext::from_fallback()
            }
        }
    }
}
