//! # Analysis Module
//!
//! Deterministic, non-ML matching and scoring for the Bunsho concierge.
//! Answers chat queries from the knowledge base and scores uploaded essays.
//!
//! ## Components
//! - `language`: script-based language detection and essay type detection
//! - `similarity`: positional string similarity
//! - `cache`: hit-counted response cache
//! - `matcher`: knowledge base matching (the `MatchEngine`)
//! - `evaluator`: rule-weighted essay scoring
//! - `report`: evaluation output structure and rendering

pub mod cache;
pub mod evaluator;
pub mod language;
pub mod matcher;
pub mod report;
pub mod similarity;

pub use cache::{ResponseCache, DEFAULT_CLEAR_THRESHOLD};
pub use evaluator::DocumentEvaluator;
pub use language::{DocumentType, DocumentTypeDetector, Language, LanguageDetector};
pub use matcher::{MatchEngine, MatchResult};
pub use report::{EvaluationReport, Verdict};
pub use similarity::SimilarityScorer;
