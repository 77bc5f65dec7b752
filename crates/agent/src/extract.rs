//! Keyword extraction
//!
//! Primary path asks the language model for a comma-separated keyword list,
//! trying each configured model variant in order. When every variant fails,
//! a deterministic pattern extractor takes over so the pipeline never
//! depends on model availability.

use markscout_common::config::LlmConfig;
use markscout_common::llm::{CompletionClient, CompletionRequest};
use markscout_common::metrics::MODEL_FALLBACKS_TOTAL;
use regex_lite::Regex;
use std::sync::Arc;
use tracing::{debug, warn};

/// Sentinel the model returns when the question names no brand terms
const NO_KEYWORDS_SENTINEL: &str = "NO_KEYWORDS";

/// System-role instruction for extraction calls
const EXTRACTION_SYSTEM_PROMPT: &str =
    "You are a trademark expert. Extract only relevant keywords.";

/// Capitalized sentence-starters and fillers excluded from brand detection
const STARTER_STOPLIST: &[&str] = &[
    "I", "The", "Can", "What", "How", "Compare", "For", "With", "About", "From", "Is", "My",
    "App", "Company", "Business",
];

/// Industry buzzwords that may be part of a brand identity
const INDUSTRY_TERMS: &[&str] = &[
    "tech", "data", "cloud", "digital", "smart", "pro", "plus", "max", "ultra", "premium",
];

/// Generic terms stripped from the final candidate list
const GENERIC_FILTER: &[&str] = &[
    "app", "software", "company", "business", "service", "product", "brand", "name",
];

/// Instruction template for the extraction call
fn build_extraction_prompt(question: &str) -> String {
    format!(
        "You are a senior trademark attorney and brand strategy expert. Analyze the user's \
         question and extract the most relevant trademark-related keywords for registry \
         searching.\n\n\
         Guidelines:\n\
         - Primary keywords: the main brand, product, or service name the user wants to protect\n\
         - Secondary keywords: related terms that might be part of the brand identity\n\
         - Exclude generic words like \"the\", \"and\", \"for\", \"my\", \"app\", \"company\", \
         \"business\" unless they are part of a distinctive phrase\n\n\
         Examples:\n\
         - \"Can I name my app Dino?\" -> Dino\n\
         - \"Is 'TechFlow Solutions' available for a software company?\" -> TechFlow, TechFlow Solutions\n\
         - \"Can I trademark 'CloudSync Pro' for cloud storage?\" -> CloudSync, CloudSync Pro\n\n\
         User question: {}\n\n\
         Return only the relevant keywords separated by commas. If no trademark-related \
         keywords are found, return \"{}\".",
        question, NO_KEYWORDS_SENTINEL
    )
}

/// Keyword extractor with model fallback chain
pub struct KeywordExtractor {
    llm: Arc<dyn CompletionClient>,
    config: LlmConfig,
}

impl KeywordExtractor {
    pub fn new(llm: Arc<dyn CompletionClient>, config: LlmConfig) -> Self {
        Self { llm, config }
    }

    /// Extract candidate keywords from a question
    ///
    /// An empty result means the model answered with the no-keywords
    /// sentinel; callers treat that as the terminal no-keywords outcome.
    pub async fn extract(&self, question: &str) -> Vec<String> {
        let prompt = build_extraction_prompt(question);

        for (i, model) in self.config.models.iter().enumerate() {
            let request = CompletionRequest {
                system_prompt: EXTRACTION_SYSTEM_PROMPT.to_string(),
                user_prompt: prompt.clone(),
                model: model.clone(),
                max_tokens: self.config.keyword_max_tokens,
                temperature: self.config.keyword_temperature,
            };

            match self.llm.complete(&request).await {
                Ok(text) => {
                    if text.trim() == NO_KEYWORDS_SENTINEL {
                        debug!(model = %model, "Model reported no keywords");
                        return Vec::new();
                    }
                    let keywords = parse_keyword_list(&text);
                    debug!(model = %model, keywords = ?keywords, "Extracted keywords");
                    return keywords;
                }
                Err(e) => {
                    warn!(model = %model, error = %e, "Keyword extraction model failed");
                    metrics::counter!(MODEL_FALLBACKS_TOTAL).increment(1);
                    if i + 1 == self.config.models.len() {
                        warn!("All models failed, using fallback keyword extraction");
                        return fallback_extract(question);
                    }
                }
            }
        }

        fallback_extract(question)
    }
}

/// Parse a comma-separated keyword list from model output
fn parse_keyword_list(text: &str) -> Vec<String> {
    text.split(',')
        .map(|kw| kw.trim())
        .map(|kw| kw.strip_prefix("Keywords:").unwrap_or(kw).trim())
        .filter(|kw| !kw.is_empty())
        .map(|kw| kw.to_string())
        .collect()
}

/// Strip surrounding punctuation from a whitespace token
fn clean_token(token: &str) -> &str {
    token.trim_matches(|c: char| !c.is_alphanumeric())
}

fn push_unique(candidates: &mut Vec<String>, keyword: String) {
    if !keyword.is_empty() && !candidates.contains(&keyword) {
        candidates.push(keyword);
    }
}

/// Deterministic keyword extraction used when every model variant fails
///
/// Stages append to a single candidate list in priority order; duplicates
/// are removed and discovery order is preserved for downstream priority.
pub fn fallback_extract(question: &str) -> Vec<String> {
    let mut candidates: Vec<String> = Vec::new();

    // 1. Quoted names, e.g. 'TechFlow' or "DataFlow"
    let quoted = Regex::new(r#"['"]([^'"]+)['"]"#).expect("valid quote pattern");
    for cap in quoted.captures_iter(question) {
        if let Some(m) = cap.get(1) {
            push_unique(&mut candidates, m.as_str().trim().to_string());
        }
    }

    // 2. Capitalized compounds with brand-style casing, e.g. TechFlow
    let compound = Regex::new(r"\b[A-Z][a-z]+[A-Z][a-z]*\b").expect("valid compound pattern");
    for m in compound.find_iter(question) {
        push_unique(&mut candidates, m.as_str().to_string());
    }

    let tokens: Vec<&str> = question.split_whitespace().map(clean_token).collect();

    // 3. Standalone capitalized words that are not sentence furniture
    for token in &tokens {
        if token.len() > 2
            && token.chars().next().is_some_and(|c| c.is_uppercase())
            && !STARTER_STOPLIST.contains(token)
        {
            push_unique(&mut candidates, token.to_string());
        }
    }

    // 4. Adjacent capitalized pairs as two-word phrases, e.g. "Tech Flow"
    for pair in tokens.windows(2) {
        let (first, second) = (pair[0], pair[1]);
        if first.len() > 2
            && second.len() > 2
            && first.chars().next().is_some_and(|c| c.is_uppercase())
            && second.chars().next().is_some_and(|c| c.is_uppercase())
        {
            push_unique(&mut candidates, format!("{} {}", first, second));
        }
    }

    // 5. Industry buzzwords that may be part of a brand
    for token in &tokens {
        if token.len() > 2 && INDUSTRY_TERMS.contains(&token.to_lowercase().as_str()) {
            push_unique(&mut candidates, token.to_string());
        }
    }

    // 6. Last resort: a couple of longer lowercase words
    if candidates.is_empty() {
        for token in &tokens {
            if token.len() > 3
                && token.chars().all(|c| c.is_alphabetic())
                && token.chars().all(|c| c.is_lowercase())
            {
                push_unique(&mut candidates, token.to_string());
                if candidates.len() == 2 {
                    break;
                }
            }
        }
    }

    candidates.retain(|kw| !GENERIC_FILTER.contains(&kw.to_lowercase().as_str()));
    candidates
}
