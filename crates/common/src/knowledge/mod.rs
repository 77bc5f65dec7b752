//! Legal knowledge store
//!
//! Nearest-neighbor text search over a legal corpus, behind a trait so the
//! backing engine is swappable. The bundled implementation is an in-process
//! store seeded once at startup from a built-in legal-principles corpus and
//! ranked by lexical term overlap. Query operations never mutate the store.

use crate::config::RetrievalConfig;
use crate::errors::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A retrieved text passage with its relevance rank
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Passage {
    /// Passage text
    pub text: String,

    /// Source label
    pub source: String,

    /// Relevance score (0.0 - 1.0), descending across a result list
    pub score: f32,
}

/// Knowledge store status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeStatus {
    pub active: bool,
    pub chunk_count: usize,
}

/// Trait for nearest-neighbor text search over legal knowledge
#[async_trait]
pub trait KnowledgeStore: Send + Sync {
    /// Return up to `top_k` passages most relevant to `query`; may return
    /// an empty list.
    async fn query(&self, query: &str, top_k: usize) -> Result<Vec<Passage>>;

    /// Store status for diagnostics
    fn status(&self) -> KnowledgeStatus;
}

/// In-process knowledge store over pre-chunked passages
pub struct InMemoryKnowledgeStore {
    chunks: Vec<String>,
    source: String,
}

impl InMemoryKnowledgeStore {
    /// Build a store from already-chunked passages
    pub fn new(chunks: Vec<String>, source: impl Into<String>) -> Self {
        Self {
            chunks,
            source: source.into(),
        }
    }

    /// Seed from the built-in legal-principles corpus
    pub fn seed_default(config: &RetrievalConfig) -> Self {
        let chunks = chunk_text(LEGAL_CORPUS, config.chunk_size, config.min_chunk_size);
        tracing::info!(chunk_count = chunks.len(), "Seeded legal knowledge base");
        Self::new(chunks, "trademark_law")
    }

    /// Jaccard overlap of significant terms between query and passage
    fn overlap(query_terms: &HashSet<String>, passage: &str) -> f32 {
        let passage_terms: HashSet<String> = significant_terms(passage);
        if query_terms.is_empty() || passage_terms.is_empty() {
            return 0.0;
        }

        let intersection = query_terms.intersection(&passage_terms).count();
        let union = query_terms.union(&passage_terms).count();

        intersection as f32 / union as f32
    }
}

#[async_trait]
impl KnowledgeStore for InMemoryKnowledgeStore {
    async fn query(&self, query: &str, top_k: usize) -> Result<Vec<Passage>> {
        let query_terms = significant_terms(query);

        let mut scored: Vec<(f32, &String)> = self
            .chunks
            .iter()
            .map(|chunk| (Self::overlap(&query_terms, chunk), chunk))
            .filter(|(score, _)| *score > 0.0)
            .collect();

        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(top_k);

        Ok(scored
            .into_iter()
            .map(|(score, text)| Passage {
                text: text.clone(),
                source: self.source.clone(),
                score,
            })
            .collect())
    }

    fn status(&self) -> KnowledgeStatus {
        KnowledgeStatus {
            active: !self.chunks.is_empty(),
            chunk_count: self.chunks.len(),
        }
    }
}

/// Lowercased terms longer than 3 characters
fn significant_terms(text: &str) -> HashSet<String> {
    text.split_whitespace()
        .map(|w| {
            w.chars()
                .filter(|c| c.is_alphanumeric())
                .collect::<String>()
                .to_lowercase()
        })
        .filter(|w| w.len() > 3)
        .collect()
}

/// Split text into paragraph-bounded chunks
///
/// Paragraphs are accumulated up to `chunk_size` characters; chunks below
/// `min_chunk_size` are dropped.
pub fn chunk_text(text: &str, chunk_size: usize, min_chunk_size: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();

    for paragraph in text.split("\n\n") {
        let paragraph = paragraph.trim();
        if paragraph.is_empty() {
            continue;
        }

        if !current.is_empty() && current.len() + paragraph.len() + 2 > chunk_size {
            chunks.push(std::mem::take(&mut current));
        }

        if !current.is_empty() {
            current.push_str("\n\n");
        }
        current.push_str(paragraph);
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks.retain(|c| c.len() >= min_chunk_size);
    chunks
}

/// Static legal-principles text used when retrieval fails and as the
/// closing reminder block of the deterministic narrative.
pub const FALLBACK_LEGAL_CONTEXT: &str = "\
**BASIC TRADEMARK LAW PRINCIPLES:**

**Trademark Distinctiveness**: Marks must be distinctive to be protectable. Fanciful and arbitrary marks receive the strongest protection.

**Likelihood of Confusion**: The primary test for trademark conflicts considers similarity of marks, goods/services, and trade channels.

**DuPont Factors**: Framework for analyzing trademark conflicts including mark similarity, goods similarity, and market overlap.

**Trademark Strength**: Varies from generic (no protection) to fanciful (strongest protection).

**Registration Requirements**: Must be distinctive, not primarily descriptive, and not conflict with existing marks.";

/// Built-in legal corpus the in-process store is seeded from
pub const LEGAL_CORPUS: &str = "\
Trademark distinctiveness determines how protectable a mark is. Fanciful and arbitrary marks, which have no meaning related to the goods or services, receive the strongest trademark protection and are the easiest to register and enforce. Suggestive marks require imagination to connect the mark to the goods and still receive strong protection.

Descriptive marks directly describe the goods or services and receive weak protection. A descriptive mark can only be registered after it acquires secondary meaning, that is, consumer recognition of the term as a source identifier. Generic terms can never function as trademarks and belong to the public domain.

Short marks raise particular distinctiveness questions. A short mark of only a few letters is more likely to collide with existing registrations, and its scope of protection depends heavily on how arbitrary the letter combination is for the relevant goods.

Likelihood of confusion is the primary test for trademark conflicts. The analysis considers the similarity of the marks in appearance, sound, and meaning, the similarity and relatedness of the goods or services, and the trade channels through which they reach purchasers.

The DuPont factors provide the conventional framework for analyzing likelihood of confusion. The primary factors are similarity of the marks, similarity of the goods or services, trade channels, and purchaser sophistication. Secondary factors include the strength of the prior mark, the number of similar marks in use, evidence of actual confusion, and intent.

Software and technology trademarks face crowded registers. Terms such as tech, data, cloud, web, and mobile appear in many registrations for computer software and online services, so marks built from these elements are weaker and conflicts in overlapping classes require careful risk assessment.

Trademark strength varies along a spectrum from generic terms, which receive no protection, through descriptive and suggestive marks, to arbitrary and fanciful marks, which receive the strongest protection. Stronger marks receive a broader scope of protection against similar marks.

Registration requires that a mark be distinctive, not primarily descriptive of the goods or services, and not confusingly similar to an existing registration or pending application. An application conflicting with a live prior mark in a related class faces refusal, and a high number of close conflicts indicates elevated risk of refusal or opposition.";

/// Fixed educational text on trademark law topics
///
/// `topic` of None returns the general overview.
pub fn legal_education(topic: Option<&str>) -> String {
    match topic.map(|t| t.to_lowercase()) {
        Some(t) if t.contains("distinctiveness") => "\
**TRADEMARK DISTINCTIVENESS - Legal Framework:**

**Fanciful/Arbitrary Marks (Strongest Protection):**
- These marks have no meaning related to the goods/services
- Receive the strongest trademark protection
- Easier to register and enforce

**Suggestive Marks (Strong Protection):**
- Require imagination to connect mark to goods/services
- Strong protection but may require more evidence of distinctiveness

**Descriptive Marks (Weak Protection):**
- Directly describe the goods/services
- Require secondary meaning (consumer recognition) for protection
- Higher risk of conflicts and challenges

**Generic Terms (No Protection):**
- Cannot be trademarked under any circumstances
- These terms belong to the public domain"
            .to_string(),
        Some(t) if t.contains("confusion") => "\
**LIKELIHOOD OF CONFUSION - DuPont Factors:**

**Primary Factors:**
1. **Similarity of Marks**: Appearance, sound, meaning
2. **Similarity of Goods/Services**: Relatedness and overlap
3. **Trade Channels**: How and where goods/services are sold
4. **Purchaser Sophistication**: Level of care in purchasing decisions

**Secondary Factors:**
5. **Strength of Prior Mark**: How distinctive and well-known
6. **Number of Similar Marks**: Market saturation
7. **Actual Confusion Evidence**: Real-world confusion examples
8. **Intent to Deceive**: Bad faith considerations

**Legal Standard**: Likelihood of confusion means more than mere possibility"
            .to_string(),
        Some(t) => format!(
            "Legal education on '{}' not available. Available topics: distinctiveness, confusion",
            t
        ),
        None => "\
**TRADEMARK LAW OVERVIEW:**

**Key Legal Concepts:**
- **Trademark Distinctiveness**: Marks must be distinctive to be protectable
- **Likelihood of Confusion**: Primary test for trademark conflicts
- **DuPont Factors**: Framework for analyzing trademark conflicts
- **Trademark Strength**: Varies from generic (no protection) to fanciful (strongest)

**Registration Requirements:**
- Must be distinctive
- Cannot be primarily descriptive
- Cannot be generic for the goods/services
- Must not conflict with existing marks

For specific legal advice, consult with a qualified trademark attorney."
            .to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RetrievalConfig;

    #[test]
    fn test_chunking_respects_sizes() {
        let chunks = chunk_text(LEGAL_CORPUS, 1000, 100);
        assert!(!chunks.is_empty());
        for chunk in &chunks {
            assert!(chunk.len() >= 100);
            // A single paragraph can exceed the target, but accumulated
            // chunks stay near it.
            assert!(chunk.len() <= 1500);
        }
    }

    #[test]
    fn test_small_chunks_dropped() {
        let chunks = chunk_text("tiny\n\nalso tiny", 1000, 100);
        assert!(chunks.is_empty());
    }

    #[tokio::test]
    async fn test_query_ranks_relevant_passages() {
        let store = InMemoryKnowledgeStore::seed_default(&RetrievalConfig::default());

        let passages = store
            .query("descriptive marks secondary meaning", 3)
            .await
            .unwrap();
        assert!(!passages.is_empty());
        assert!(passages.len() <= 3);
        assert!(passages[0].text.to_lowercase().contains("secondary meaning"));

        // Scores are descending
        for pair in passages.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }

    #[tokio::test]
    async fn test_query_with_no_overlap_is_empty() {
        let store = InMemoryKnowledgeStore::new(vec!["trademark law basics".repeat(10)], "test");
        let passages = store.query("zzzz qqqq", 3).await.unwrap();
        assert!(passages.is_empty());
    }

    #[test]
    fn test_status() {
        let store = InMemoryKnowledgeStore::seed_default(&RetrievalConfig::default());
        let status = store.status();
        assert!(status.active);
        assert!(status.chunk_count > 0);
    }

    #[test]
    fn test_legal_education_topics() {
        assert!(legal_education(Some("distinctiveness")).contains("Fanciful"));
        assert!(legal_education(Some("confusion")).contains("DuPont"));
        assert!(legal_education(Some("infringement")).contains("not available"));
        assert!(legal_education(None).contains("TRADEMARK LAW OVERVIEW"));
    }
}
