//! MarkScout Analysis Pipeline
//!
//! Multi-stage trademark availability analysis:
//! - Keyword extraction with deterministic fallback
//! - Keyword refinement
//! - Sequential registry search with truncation bookkeeping
//! - Heuristic conflict enrichment
//! - Legal context retrieval with static fallback
//! - LLM synthesis with deterministic narrative fallback

pub mod enrich;
pub mod extract;
pub mod pipeline;
pub mod refine;
pub mod retrieve;
pub mod search;
pub mod synthesize;

pub use enrich::{enrich, EnrichedConflict, RiskLevel};
pub use pipeline::{AnalysisResponse, TrademarkAgent};
pub use search::{KeywordSearchResult, SearchResultSet};
