//! Pipeline orchestration
//!
//! Linear state machine over the analysis stages:
//! extract -> refine -> search -> retrieve -> synthesize.
//! Only the two keyword-absence conditions are terminal; every other
//! failure degrades inside its stage, so a question always yields either a
//! terminal error or a complete response.

use crate::extract::KeywordExtractor;
use crate::retrieve::LegalContextRetriever;
use crate::search::{RegistrySearchAdapter, SearchResultSet};
use crate::synthesize::AnalysisSynthesizer;
use chrono::{DateTime, Utc};
use markscout_common::config::AppConfig;
use markscout_common::errors::{AgentError, Result};
use markscout_common::knowledge::KnowledgeStore;
use markscout_common::llm::CompletionClient;
use markscout_common::metrics::{QUESTIONS_TOTAL, TERMINAL_ERRORS_TOTAL};
use markscout_common::registry::RegistrySearch;
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

/// Aggregate counts for a completed analysis
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisSummary {
    pub keywords_found: usize,
    pub searches_performed: usize,
    pub total_conflicts: usize,
    pub analysis_provided: bool,
}

/// Complete response for one question
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResponse {
    pub original_question: String,

    /// Refined keywords, in search order
    pub keywords: Vec<String>,

    pub results: SearchResultSet,

    /// Narrative analysis (model output or template fallback)
    pub analysis: String,

    pub summary: AnalysisSummary,

    pub generated_at: DateTime<Utc>,
}

/// End-to-end trademark availability agent
pub struct TrademarkAgent {
    extractor: KeywordExtractor,
    adapter: RegistrySearchAdapter,
    retriever: LegalContextRetriever,
    synthesizer: AnalysisSynthesizer,
    max_keywords: usize,
}

impl TrademarkAgent {
    pub fn new(
        llm: Arc<dyn CompletionClient>,
        registry: Arc<dyn RegistrySearch>,
        store: Arc<dyn KnowledgeStore>,
        config: &AppConfig,
    ) -> Self {
        Self {
            extractor: KeywordExtractor::new(llm.clone(), config.llm.clone()),
            adapter: RegistrySearchAdapter::new(registry, config.registry.max_results_per_keyword),
            retriever: LegalContextRetriever::new(store, config.retrieval.top_k),
            synthesizer: AnalysisSynthesizer::new(
                llm,
                config.llm.clone(),
                config.analysis.clone(),
            ),
            max_keywords: config.analysis.max_keywords,
        }
    }

    /// Run the full pipeline for a question
    ///
    /// Fails only with `NoKeywordsFound` or `NoValidKeywords`; all other
    /// failures degrade inside their stage.
    pub async fn process_question(&self, question: &str) -> Result<AnalysisResponse> {
        metrics::counter!(QUESTIONS_TOTAL).increment(1);
        info!(question = %question, "Processing question");

        let extracted = self.extractor.extract(question).await;
        if extracted.is_empty() {
            metrics::counter!(TERMINAL_ERRORS_TOTAL).increment(1);
            return Err(AgentError::NoKeywordsFound);
        }

        let keywords = crate::refine::refine_keywords(&extracted, question, self.max_keywords);
        if keywords.is_empty() {
            metrics::counter!(TERMINAL_ERRORS_TOTAL).increment(1);
            return Err(AgentError::NoValidKeywords);
        }
        info!(keywords = ?keywords, "Refined keywords");

        let results = self.adapter.search_all(&keywords).await;
        let context = self.retriever.retrieve(&keywords, &results).await;
        let analysis = self
            .synthesizer
            .synthesize(question, &keywords, &results, &context)
            .await;

        let summary = AnalysisSummary {
            keywords_found: keywords.len(),
            searches_performed: results.len(),
            total_conflicts: results.total_conflicts(),
            analysis_provided: !analysis.is_empty(),
        };
        info!(
            keywords = summary.keywords_found,
            conflicts = summary.total_conflicts,
            "Analysis complete"
        );

        Ok(AnalysisResponse {
            original_question: question.to_string(),
            keywords,
            results,
            analysis,
            summary,
            generated_at: Utc::now(),
        })
    }
}
