//! DocShield Analysis Engine
//!
//! Aggregates the detection passes into a scored, explainable result:
//! - Deterministic risk scoring over legal-category counts
//! - Pluggable recommendation strategy with a rule-based default
//! - Type-aware masking transform over the original text
//! - Per-statute legal summary
//! - The `Analyzer` facade and the cancellable file/batch pipeline

pub mod analyzer;
pub mod masker;
pub mod pipeline;
pub mod recommend;
pub mod scorer;
pub mod summary;

pub use analyzer::{
    Analyzer, DocumentAnalysis, RULE_BASED_MODEL, RemoteAnalysis, RemoteAnalyzer,
    RemoteFinding,
};
pub use masker::Masker;
pub use pipeline::{FileReport, Pipeline};
pub use recommend::{
    MIN_RECOMMENDATIONS, RecommendationEngine, RuleBasedRecommendations,
};
pub use scorer::RiskScorer;
pub use summary::{CategorySummary, legal_summary};
