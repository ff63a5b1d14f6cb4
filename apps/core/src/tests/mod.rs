//! Test Module
//!
//! Cross-module test suite for the Bunsho core.
//!
//! ## Test Categories
//! - `engine_tests`: query matching, boosts, cache lifecycle
//! - `evaluator_tests`: rule scoring, structure penalty, example sampling, rendering
//! - `knowledge_tests`: bundled knowledge file, rule compilation, loaders
//! - `concierge_tests`: fallback responses, segmentation, upload flow


/// Knowledge file shipped with the binary
pub(crate) const BUNDLED_KNOWLEDGE: &str = include_str!("../../data/knowledge.json");
