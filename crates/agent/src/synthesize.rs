//! Analysis synthesis
//!
//! Summarizes the enriched search data, embeds it with the legal context
//! into a structured prompt, and asks the language model for the final
//! narrative, trying each configured model variant in order. When every
//! variant fails, a deterministic template narrative is generated from the
//! conflict counts so the pipeline always produces an analysis.

use crate::retrieve::LegalContext;
use crate::search::{KeywordSearchResult, SearchResultSet};
use markscout_common::config::{AnalysisConfig, LlmConfig};
use markscout_common::knowledge::FALLBACK_LEGAL_CONTEXT;
use markscout_common::llm::{CompletionClient, CompletionRequest};
use markscout_common::metrics::MODEL_FALLBACKS_TOTAL;
use std::fmt::Write as _;
use std::sync::Arc;
use tracing::{debug, warn};

/// System-role instruction for analysis calls
const ANALYSIS_SYSTEM_PROMPT: &str = "You are a trademark attorney and brand strategy expert \
     with access to USPTO trademark law. Use chain-of-thought reasoning and legal principles \
     to show your analysis step by step.";

/// Synthesizer with model fallback chain
pub struct AnalysisSynthesizer {
    llm: Arc<dyn CompletionClient>,
    llm_config: LlmConfig,
    analysis_config: AnalysisConfig,
}

impl AnalysisSynthesizer {
    pub fn new(
        llm: Arc<dyn CompletionClient>,
        llm_config: LlmConfig,
        analysis_config: AnalysisConfig,
    ) -> Self {
        Self {
            llm,
            llm_config,
            analysis_config,
        }
    }

    /// Produce the analysis narrative
    ///
    /// Never fails: model exhaustion yields the deterministic template
    /// narrative instead.
    pub async fn synthesize(
        &self,
        question: &str,
        keywords: &[String],
        results: &SearchResultSet,
        context: &LegalContext,
    ) -> String {
        let prompt = self.build_prompt(question, keywords, results, context);

        for (i, model) in self.llm_config.models.iter().enumerate() {
            let request = CompletionRequest {
                system_prompt: ANALYSIS_SYSTEM_PROMPT.to_string(),
                user_prompt: prompt.clone(),
                model: model.clone(),
                max_tokens: self.llm_config.analysis_max_tokens,
                temperature: self.llm_config.analysis_temperature,
            };

            match self.llm.complete(&request).await {
                Ok(text) => {
                    debug!(model = %model, "Analysis synthesized");
                    return text.trim().to_string();
                }
                Err(e) => {
                    warn!(model = %model, error = %e, "Analysis model failed");
                    metrics::counter!(MODEL_FALLBACKS_TOTAL).increment(1);
                    if i + 1 == self.llm_config.models.len() {
                        warn!("All models failed, using template analysis");
                    }
                }
            }
        }

        fallback_narrative(results)
    }

    fn build_prompt(
        &self,
        question: &str,
        keywords: &[String],
        results: &SearchResultSet,
        context: &LegalContext,
    ) -> String {
        let summary = build_analysis_summary(results, self.analysis_config.max_conflicts_shown);

        format!(
            "**TRADEMARK ANALYSIS TASK WITH LEGAL FRAMEWORK**\n\n\
             User Question: {question}\n\
             Keywords to Analyze: {keywords}\n\n\
             **AVAILABLE DATA FOR ANALYSIS:**\n\
             {summary}\n\n\
             **LEGAL FRAMEWORK FROM USPTO TRADEMARK LAW:**\n\
             {context}\n\n\
             **CHAIN-OF-THOUGHT ANALYSIS REQUIRED:**\n\n\
             Please follow this exact format for your response, applying legal principles:\n\n\
             **STEP-BY-STEP LEGAL REASONING:**\n\
             [Show your legal analysis process step by step, examining each conflict using \
             trademark law principles]\n\n\
             **DETAILED CONFLICT ANALYSIS WITH LEGAL BASIS:**\n\
             [For each keyword, analyze each conflict with specific legal reasoning using \
             DuPont factors and distinctiveness analysis]\n\n\
             **AVAILABILITY ASSESSMENT:**\n\
             [Provide legal assessment of trademark availability based on USPTO standards]\n\n\
             **FINAL ASSESSMENT WITH LEGAL REASONING:**\n\
             [Provide your final conclusion with clear legal reasoning]\n\n\
             **RISK ANALYSIS USING LEGAL PRINCIPLES:**\n\
             [Detail specific risks with legal explanations using trademark law concepts]\n\n\
             **RECOMMENDATIONS:**\n\
             [Provide actionable advice with legal reasoning]\n\n\
             **ALTERNATIVE SUGGESTIONS:**\n\
             [Suggest modifications with explanation of why they might work legally]\n\n\
             **IMPORTANT**:\n\
             1. Use the enhanced data provided (risk, similarity_score, market_relevance, \
             blocking_potential)\n\
             2. Apply trademark law principles (DuPont factors, distinctiveness)\n\
             3. Show your legal reasoning for each conclusion\n\
             4. Explain WHY each conflict is or isn't a problem using legal standards",
            question = question,
            keywords = keywords.join(", "),
            summary = summary,
            context = context.format(),
        )
    }
}

/// Structured summary of the enriched search data for prompt embedding
pub fn build_analysis_summary(results: &SearchResultSet, max_conflicts_shown: usize) -> String {
    let mut out = String::new();

    for entry in results.entries() {
        if let Some(error) = &entry.error {
            let _ = writeln!(out, "{}: search failed - {}", entry.keyword, error);
            continue;
        }

        if entry.conflicts.is_empty() {
            let _ = writeln!(out, "{}: No conflicts found", entry.keyword);
            continue;
        }

        let _ = writeln!(out, "\n{} ANALYSIS:", entry.keyword.to_uppercase());
        let _ = writeln!(out, "   Total conflicts found: {}", entry.conflicts.len());
        if entry.limited {
            let _ = writeln!(
                out,
                "   Note: Limited to top {} of {} total results",
                entry.conflicts.len(),
                entry.original_count
            );
        }

        for (i, conflict) in entry.conflicts.iter().take(max_conflicts_shown).enumerate() {
            let goods = conflict.record.goods_services.as_deref().unwrap_or("N/A");
            let goods_short: String = goods.chars().take(100).collect();
            let ellipsis = if goods.chars().count() > 100 { "..." } else { "" };

            let _ = writeln!(out, "\n   {}. {}", i + 1, conflict.record.mark);
            let _ = writeln!(
                out,
                "      Status: {}",
                conflict.record.status_label.as_deref().unwrap_or("Unknown")
            );
            let _ = writeln!(
                out,
                "      Owner: {}",
                conflict.record.owner_name().unwrap_or("Unknown")
            );
            let _ = writeln!(out, "      Goods/Services: {}{}", goods_short, ellipsis);
            let _ = writeln!(out, "      Risk Level: {}", conflict.risk.overall_risk.as_str());
            let _ = writeln!(out, "      Similarity Score: {:.2}", conflict.similarity_score);
            let _ = writeln!(out, "      Market Relevance: {}", conflict.market_relevance.as_str());
            let _ = writeln!(
                out,
                "      Blocking Potential: {}",
                conflict.blocking_potential.as_str()
            );
        }
    }

    out.trim_end().to_string()
}

fn keyword_detail(out: &mut String, entry: &KeywordSearchResult) {
    if let Some(error) = &entry.error {
        let _ = writeln!(out, "\n**{}**: Search failed - {}", entry.keyword, error);
        return;
    }

    if entry.conflicts.is_empty() {
        let _ = writeln!(
            out,
            "\n**{}**: No conflicts found. This appears to be available for trademark \
             registration.",
            entry.keyword
        );
        return;
    }

    let limit_note = if entry.limited {
        format!(
            " (limited to top {} of {} total)",
            entry.conflicts.len(),
            entry.original_count
        )
    } else {
        String::new()
    };

    let _ = writeln!(
        out,
        "\n**{}**: {} potential conflict(s) found{}:",
        entry.keyword,
        entry.conflicts.len(),
        limit_note
    );

    for conflict in entry.conflicts.iter().take(3) {
        let _ = writeln!(
            out,
            "   {} - {} - {}",
            conflict.record.mark,
            conflict.record.status_label.as_deref().unwrap_or("Unknown"),
            conflict.record.owner_name().unwrap_or("Unknown")
        );
        let _ = writeln!(
            out,
            "      Risk: {} | Similarity: {:.2} | Market: {} | Blocking: {}",
            conflict.risk.overall_risk.as_str(),
            conflict.similarity_score,
            conflict.market_relevance.as_str(),
            conflict.blocking_potential.as_str()
        );
    }
}

/// Deterministic template narrative used when every model variant fails
///
/// The risk tier follows the total conflict count: 0 is clear/low, 1-2 is
/// medium, 3 or more is high. Each tier carries fixed recommendation
/// bullets, and the static legal-principles block closes the report.
pub fn fallback_narrative(results: &SearchResultSet) -> String {
    let total_conflicts = results.total_conflicts();
    let total_original = results.truncated_original_total();

    let mut out = String::new();

    let (assessment, risk_level) = if total_conflicts == 0 {
        (
            "**Trademark Availability Assessment**: All keywords appear to be available for \
             registration.",
            "**Risk Level**: LOW - Clear, no significant conflicts detected.",
        )
    } else if total_conflicts <= 2 {
        (
            "**Trademark Availability Assessment**: Some keywords have potential conflicts \
             that need review.",
            "**Risk Level**: MEDIUM - Some conflicts detected, careful analysis recommended.",
        )
    } else {
        (
            "**Trademark Availability Assessment**: Multiple conflicts detected across \
             keywords.",
            "**Risk Level**: HIGH - Significant conflicts detected, professional legal review \
             recommended.",
        )
    };

    let _ = writeln!(out, "{}", assessment);
    let _ = writeln!(out, "{}", risk_level);

    if total_original > 0 {
        let _ = writeln!(
            out,
            "\n**Note**: Results were limited for analysis. Total available: {} conflicts.",
            total_original
        );
    }

    let _ = writeln!(out, "\n**Detailed Analysis by Keyword:**");
    for entry in results.entries() {
        keyword_detail(&mut out, entry);
    }

    let _ = writeln!(out, "\n**Recommendations:**");
    let recommendations: &[&str] = if total_conflicts == 0 {
        &[
            "- Proceed with trademark registration for all keywords",
            "- Consider filing applications soon to secure rights",
            "- Conduct additional searches in international databases if planning global expansion",
        ]
    } else if total_conflicts <= 2 {
        &[
            "- Review conflicts carefully to assess similarity and risk",
            "- Consider modifying conflicting keywords or seeking legal advice",
            "- Proceed with non-conflicting keywords",
        ]
    } else {
        &[
            "- Consult with a trademark attorney for comprehensive analysis",
            "- Consider alternative brand names to avoid conflicts",
            "- Conduct broader trademark searches before proceeding",
        ]
    };
    for line in recommendations {
        let _ = writeln!(out, "{}", line);
    }

    let _ = writeln!(
        out,
        "\n**Note**: This is a fallback analysis due to LLM unavailability. For more detailed \
         insights, please try again later."
    );

    let _ = writeln!(out, "\n**REASONING SUMMARY:**");
    let reasoning: &[&str] = if total_conflicts == 0 {
        &[
            "- No conflicts found in USPTO database",
            "- Keywords appear to be available for trademark registration",
        ]
    } else if total_conflicts <= 2 {
        &[
            "- Limited conflicts detected - moderate risk",
            "- Conflicts may be in different markets or industries",
        ]
    } else {
        &[
            "- Multiple conflicts detected - high risk",
            "- Professional legal review recommended",
            "- Consider alternative brand names",
        ]
    };
    for line in reasoning {
        let _ = writeln!(out, "{}", line);
    }

    let _ = write!(out, "\n{}", FALLBACK_LEGAL_CONTEXT);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrich::enrich;
    use crate::retrieve::LegalContext;
    use markscout_common::config::{AnalysisConfig, LlmConfig};
    use markscout_common::knowledge::Passage;
    use markscout_common::llm::MockCompletionClient;
    use markscout_common::registry::record;

    fn entry(keyword: &str, conflict_count: usize) -> KeywordSearchResult {
        let conflicts = (0..conflict_count)
            .map(|i| enrich(record(&format!("MARK{}", i), "LIVE", "Acme", "computer software")))
            .collect();
        KeywordSearchResult {
            keyword: keyword.to_string(),
            conflicts,
            limited: false,
            original_count: conflict_count,
            error: None,
        }
    }

    fn context() -> LegalContext {
        LegalContext {
            passages: vec![Passage {
                text: "Likelihood of confusion is the primary test.".to_string(),
                source: "test".to_string(),
                score: 1.0,
            }],
            fallback: false,
        }
    }

    fn synthesizer(client: MockCompletionClient) -> AnalysisSynthesizer {
        AnalysisSynthesizer::new(
            Arc::new(client),
            LlmConfig::default(),
            AnalysisConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_model_output_returned_verbatim() {
        let synth = synthesizer(MockCompletionClient::scripted("Model analysis here."));
        let results = SearchResultSet::new(vec![entry("TechFlow", 1)]);

        let analysis = synth
            .synthesize("Is TechFlow ok?", &["TechFlow".to_string()], &results, &context())
            .await;
        assert_eq!(analysis, "Model analysis here.");
    }

    #[tokio::test]
    async fn test_model_exhaustion_yields_template() {
        let synth = synthesizer(MockCompletionClient::unavailable());
        let results = SearchResultSet::new(vec![entry("TechFlow", 2)]);

        let analysis = synth
            .synthesize("Is TechFlow ok?", &["TechFlow".to_string()], &results, &context())
            .await;
        assert!(analysis.contains("Risk Level**: MEDIUM"));
        assert!(analysis.contains("fallback analysis"));
    }

    #[test]
    fn test_summary_includes_derived_scores() {
        let results = SearchResultSet::new(vec![entry("TechFlow", 1)]);
        let summary = build_analysis_summary(&results, 5);

        assert!(summary.contains("TECHFLOW ANALYSIS:"));
        assert!(summary.contains("Risk Level: high"));
        assert!(summary.contains("Similarity Score:"));
        assert!(summary.contains("Market Relevance: high"));
        assert!(summary.contains("Blocking Potential: high"));
    }

    #[test]
    fn test_summary_marks_clear_and_failed_keywords() {
        let failed = KeywordSearchResult {
            keyword: "Dino".to_string(),
            conflicts: vec![],
            limited: false,
            original_count: 0,
            error: Some("API error: 503".to_string()),
        };
        let results = SearchResultSet::new(vec![entry("FreshStart", 0), failed]);
        let summary = build_analysis_summary(&results, 5);

        assert!(summary.contains("FreshStart: No conflicts found"));
        assert!(summary.contains("Dino: search failed - API error: 503"));
    }

    #[test]
    fn test_summary_truncation_note() {
        let mut limited = entry("TechFlow", 10);
        limited.limited = true;
        limited.original_count = 23;
        let results = SearchResultSet::new(vec![limited]);
        let summary = build_analysis_summary(&results, 5);

        assert!(summary.contains("Limited to top 10 of 23 total results"));
        // Only the configured number of conflicts is expanded
        assert!(summary.contains("5. MARK4"));
        assert!(!summary.contains("6. MARK5"));
    }

    #[test]
    fn test_narrative_clear_tier() {
        let results = SearchResultSet::new(vec![entry("FreshStart", 0)]);
        let narrative = fallback_narrative(&results);

        assert!(narrative.contains("LOW"));
        assert!(narrative.contains("Clear"));
        assert!(narrative.contains(
            "**FreshStart**: No conflicts found. This appears to be available for trademark \
             registration."
        ));
        assert!(narrative.contains("- Proceed with trademark registration for all keywords"));
    }

    #[test]
    fn test_narrative_medium_tier() {
        let results = SearchResultSet::new(vec![entry("TechFlow", 2)]);
        let narrative = fallback_narrative(&results);

        assert!(narrative.contains("MEDIUM"));
        assert!(narrative.contains("- Review conflicts carefully to assess similarity and risk"));
        assert!(narrative
            .contains("- Consider modifying conflicting keywords or seeking legal advice"));
    }

    #[test]
    fn test_narrative_high_tier() {
        let results = SearchResultSet::new(vec![entry("TechFlow", 2), entry("DataSync", 1)]);
        let narrative = fallback_narrative(&results);

        assert!(narrative.contains("HIGH"));
        assert!(narrative.contains("- Consult with a trademark attorney for comprehensive analysis"));
    }

    #[test]
    fn test_narrative_shows_first_three_conflicts() {
        let results = SearchResultSet::new(vec![entry("TechFlow", 5)]);
        let narrative = fallback_narrative(&results);

        assert!(narrative.contains("MARK2"));
        assert!(!narrative.contains("MARK3 -"));
    }

    #[test]
    fn test_narrative_closes_with_legal_principles() {
        let results = SearchResultSet::default();
        let narrative = fallback_narrative(&results);
        assert!(narrative.ends_with(FALLBACK_LEGAL_CONTEXT));
    }

    #[test]
    fn test_narrative_truncation_note() {
        let mut limited = entry("TechFlow", 10);
        limited.limited = true;
        limited.original_count = 23;
        let results = SearchResultSet::new(vec![limited]);
        let narrative = fallback_narrative(&results);

        assert!(narrative.contains("Total available: 23 conflicts."));
        assert!(narrative.contains("(limited to top 10 of 23 total)"));
    }
}
