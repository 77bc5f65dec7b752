//! Conflict enrichment
//!
//! Attaches heuristic risk, similarity, relevance, and blocking scores to
//! raw registry records. All scoring is deterministic string matching over
//! an immutable record; scores are recomputed each run, never cached.
//!
//! The length-based similarity convention follows the registry analysis
//! heuristic as shipped: longer marks are weighted as higher "similarity
//! risk". It is a scoring convention, not a legal similarity metric, and
//! should not be extended as one.

use markscout_common::registry::ConflictRecord;
use serde::{Deserialize, Serialize};

/// Risk level for a single factor or the rolled-up assessment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }
}

/// Relevance of the conflicting registration to the user's market
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketRelevance {
    Low,
    Medium,
    High,
    Unknown,
}

impl MarketRelevance {
    pub fn as_str(&self) -> &'static str {
        match self {
            MarketRelevance::Low => "low",
            MarketRelevance::Medium => "medium",
            MarketRelevance::High => "high",
            MarketRelevance::Unknown => "unknown",
        }
    }
}

/// Whether the conflicting registration could block a new application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockingPotential {
    None,
    Medium,
    High,
    Unknown,
}

impl BlockingPotential {
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockingPotential::None => "none",
            BlockingPotential::Medium => "medium",
            BlockingPotential::High => "high",
            BlockingPotential::Unknown => "unknown",
        }
    }
}

/// Per-factor risk breakdown with the rolled-up overall level
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub name_similarity: RiskLevel,
    pub goods_similarity: RiskLevel,
    pub market_overlap: RiskLevel,
    pub overall_risk: RiskLevel,
}

/// A registry record with derived analysis fields
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichedConflict {
    #[serde(flatten)]
    pub record: ConflictRecord,

    pub risk: RiskAssessment,

    /// Similarity score in [0.0, 1.0]
    pub similarity_score: f32,

    pub market_relevance: MarketRelevance,

    pub blocking_potential: BlockingPotential,
}

/// Goods/services terms treated as technology indicators
const TECH_TERMS: &[&str] = &[
    "software", "app", "computer", "digital", "online", "web", "mobile",
];

/// Broader tech indicators for market relevance (includes "technology")
const TECH_INDICATORS: &[&str] = &[
    "software",
    "app",
    "computer",
    "digital",
    "online",
    "web",
    "mobile",
    "technology",
];

/// General business indicators for market relevance
const BUSINESS_INDICATORS: &[&str] = &["business", "service", "consulting", "management"];

/// Descriptive elements that lower the similarity score
const DESCRIPTIVE_TERMS: &[&str] = &["tech", "app", "soft", "data", "cloud", "web", "mobile"];

/// Assess per-factor and overall risk for a record
pub fn assess_risk(record: &ConflictRecord) -> RiskAssessment {
    let mut name_similarity = RiskLevel::Low;
    let mut goods_similarity = RiskLevel::Low;
    let mut market_overlap = RiskLevel::Low;

    let mark = record.mark.trim();
    if !mark.is_empty() {
        name_similarity = if mark.len() <= 5 {
            RiskLevel::Medium
        } else {
            RiskLevel::High
        };
    }

    if let Some(goods) = record.goods_services.as_deref() {
        let goods = goods.to_lowercase();
        if TECH_TERMS.iter().any(|term| goods.contains(term)) {
            goods_similarity = RiskLevel::High;
            market_overlap = RiskLevel::High;
        }
    }

    let high_count = [name_similarity, goods_similarity, market_overlap]
        .iter()
        .filter(|level| **level == RiskLevel::High)
        .count();

    let overall_risk = if high_count >= 2 {
        RiskLevel::High
    } else if high_count >= 1 {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    };

    RiskAssessment {
        name_similarity,
        goods_similarity,
        market_overlap,
        overall_risk,
    }
}

/// Similarity score in [0.0, 1.0] for a record's mark
pub fn similarity_score(record: &ConflictRecord) -> f32 {
    let mark = record.mark.trim();
    if mark.is_empty() {
        return 0.0;
    }

    let mut score: f32 = 0.5;

    // Shorter marks are treated as more distinctive
    if mark.len() <= 3 {
        score += 0.3;
    } else if mark.len() <= 5 {
        score += 0.2;
    } else if mark.len() <= 7 {
        score += 0.1;
    }

    let mark_lower = mark.to_lowercase();
    if DESCRIPTIVE_TERMS
        .iter()
        .any(|term| mark_lower.contains(term))
    {
        score -= 0.2;
    }

    score.clamp(0.0, 1.0)
}

/// Market relevance of the conflicting registration
pub fn market_relevance(record: &ConflictRecord) -> MarketRelevance {
    let goods = match record.goods_services.as_deref() {
        Some(g) if !g.trim().is_empty() => g.to_lowercase(),
        _ => return MarketRelevance::Unknown,
    };

    if TECH_INDICATORS.iter().any(|term| goods.contains(term)) {
        return MarketRelevance::High;
    }

    if BUSINESS_INDICATORS.iter().any(|term| goods.contains(term)) {
        return MarketRelevance::Medium;
    }

    MarketRelevance::Low
}

/// Blocking potential based on the record's status label
pub fn blocking_potential(record: &ConflictRecord) -> BlockingPotential {
    let status = match record.status_label.as_deref() {
        Some(s) if !s.trim().is_empty() => s.to_lowercase(),
        _ => return BlockingPotential::Unknown,
    };

    if status.contains("dead") || status.contains("abandoned") || status.contains("cancelled") {
        return BlockingPotential::None;
    }

    if status.contains("live") || status.contains("registered") {
        return BlockingPotential::High;
    }

    if status.contains("pending") || status.contains("published") {
        return BlockingPotential::Medium;
    }

    BlockingPotential::Unknown
}

/// Derive all analysis fields for a record
pub fn enrich(record: ConflictRecord) -> EnrichedConflict {
    let risk = assess_risk(&record);
    let similarity_score = similarity_score(&record);
    let market_relevance = market_relevance(&record);
    let blocking_potential = blocking_potential(&record);

    EnrichedConflict {
        record,
        risk,
        similarity_score,
        market_relevance,
        blocking_potential,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use markscout_common::registry::record;

    #[test]
    fn test_short_mark_name_similarity_medium() {
        let rec = record("ZIP", "LIVE", "Owner", "clothing");
        let risk = assess_risk(&rec);
        assert_eq!(risk.name_similarity, RiskLevel::Medium);
    }

    #[test]
    fn test_long_mark_name_similarity_high() {
        let rec = record("TECHFLOW", "LIVE", "Owner", "clothing");
        let risk = assess_risk(&rec);
        assert_eq!(risk.name_similarity, RiskLevel::High);
    }

    #[test]
    fn test_tech_goods_raise_goods_and_market() {
        let rec = record("TECHFLOW", "LIVE", "Owner", "Downloadable computer software");
        let risk = assess_risk(&rec);
        assert_eq!(risk.goods_similarity, RiskLevel::High);
        assert_eq!(risk.market_overlap, RiskLevel::High);
        // Three high factors roll up to high overall
        assert_eq!(risk.overall_risk, RiskLevel::High);
    }

    #[test]
    fn test_single_high_factor_is_medium_overall() {
        let rec = record("TECHFLOW", "LIVE", "Owner", "restaurant services in the food trade");
        let risk = assess_risk(&rec);
        assert_eq!(risk.goods_similarity, RiskLevel::Low);
        assert_eq!(risk.overall_risk, RiskLevel::Medium);
    }

    #[test]
    fn test_no_high_factors_is_low_overall() {
        let rec = record("ZIP", "LIVE", "Owner", "clothing");
        let risk = assess_risk(&rec);
        assert_eq!(risk.overall_risk, RiskLevel::Low);
    }

    #[test]
    fn test_similarity_score_bands() {
        let score = |mark: &str| similarity_score(&record(mark, "", "", ""));
        assert!((score("ZIP") - 0.8).abs() < 1e-6);
        assert!((score("FLOWS") - 0.7).abs() < 1e-6);
        assert!((score("FLOWING") - 0.6).abs() < 1e-6);
        assert!((score("FLOWINGLY") - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_descriptive_mark_penalty() {
        // "TECHFLOW" is 8 chars (no length bonus) and contains "tech"
        let score = similarity_score(&record("TECHFLOW", "", "", ""));
        assert!((score - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_similarity_score_clamped() {
        for mark in ["A", "AB", "app", "WEBDATACLOUDTECH", "", "   "] {
            let rec = ConflictRecord {
                mark: mark.to_string(),
                serial_number: None,
                status_label: None,
                owners: vec![],
                goods_services: None,
                filing_date: None,
                registration_date: None,
            };
            let score = similarity_score(&rec);
            assert!((0.0..=1.0).contains(&score), "score {} for {:?}", score, mark);
        }
    }

    #[test]
    fn test_market_relevance_tiers() {
        assert_eq!(
            market_relevance(&record("X", "", "", "mobile application software")),
            MarketRelevance::High
        );
        assert_eq!(
            market_relevance(&record("X", "", "", "management consulting")),
            MarketRelevance::Medium
        );
        assert_eq!(
            market_relevance(&record("X", "", "", "fresh produce")),
            MarketRelevance::Low
        );

        let no_goods = ConflictRecord {
            goods_services: None,
            ..record("X", "", "", "")
        };
        assert_eq!(market_relevance(&no_goods), MarketRelevance::Unknown);
    }

    #[test]
    fn test_blocking_potential_statuses() {
        assert_eq!(
            blocking_potential(&record("X", "DEAD/CANCELLED", "", "")),
            BlockingPotential::None
        );
        assert_eq!(
            blocking_potential(&record("X", "LIVE/REGISTERED", "", "")),
            BlockingPotential::High
        );
        assert_eq!(
            blocking_potential(&record("X", "Pending application", "", "")),
            BlockingPotential::Medium
        );
        assert_eq!(
            blocking_potential(&record("X", "SUSPENDED", "", "")),
            BlockingPotential::Unknown
        );

        let no_status = ConflictRecord {
            status_label: None,
            ..record("X", "", "", "")
        };
        assert_eq!(blocking_potential(&no_status), BlockingPotential::Unknown);
    }

    #[test]
    fn test_enrichment_is_deterministic() {
        let rec = record("TECHFLOW", "LIVE", "Acme Corp", "computer software");
        let first = enrich(rec.clone());
        let second = enrich(rec);

        assert_eq!(first.risk.overall_risk, second.risk.overall_risk);
        assert_eq!(first.similarity_score, second.similarity_score);
        assert_eq!(first.market_relevance, second.market_relevance);
        assert_eq!(first.blocking_potential, second.blocking_potential);
    }
}
