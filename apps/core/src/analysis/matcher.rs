//! Knowledge base matching.
//!
//! Every entry is scored against the normalized query keyword by keyword,
//! then adjusted by priority and language before ranking. Results are
//! memoized per (text, language) in a [`ResponseCache`].

use std::sync::Arc;
use tracing::{debug, info};

use super::cache::{ResponseCache, DEFAULT_CLEAR_THRESHOLD};
use super::language::{Language, LanguageDetector};
use super::similarity::SimilarityScorer;
use crate::knowledge::{KnowledgeBase, KnowledgeEntry};

const EXACT_SCORE: f64 = 50.0;
const CONTAINS_SCORE: f64 = 30.0;
const PARTIAL_SCORE: f64 = 15.0;
/// Minimum query length (in characters) for the keyword-contains-query bonus
const PARTIAL_MIN_LEN: usize = 2;
const SIMILARITY_THRESHOLD: f64 = 0.5;
const SIMILARITY_SCALE: f64 = 20.0;

/// Priority from which the protected boost applies
pub const PROTECTED_PRIORITY: i32 = 2800;
const PROTECTED_BOOST: f64 = 1.2;
const LANGUAGE_BOOST: f64 = 1.15;

/// Winning entry of a lookup
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult {
    pub entry: Arc<KnowledgeEntry>,
    pub score: f64,
    /// Human-readable scoring annotations, diagnostic only
    pub trace: Vec<String>,
}

/// Scores knowledge entries against user queries
#[derive(Debug)]
pub struct MatchEngine {
    knowledge: Arc<KnowledgeBase>,
    cache: ResponseCache,
    language_detector: LanguageDetector,
    similarity: SimilarityScorer,
}

impl MatchEngine {
    pub fn new(knowledge: Arc<KnowledgeBase>) -> Self {
        Self::with_clear_threshold(knowledge, DEFAULT_CLEAR_THRESHOLD)
    }

    /// Create an engine whose cache clears after `clear_threshold` hits
    pub fn with_clear_threshold(knowledge: Arc<KnowledgeBase>, clear_threshold: usize) -> Self {
        Self {
            knowledge,
            cache: ResponseCache::new(clear_threshold),
            language_detector: LanguageDetector::new(),
            similarity: SimilarityScorer::new(),
        }
    }

    pub fn knowledge(&self) -> &Arc<KnowledgeBase> {
        &self.knowledge
    }

    /// Swap in a new snapshot. Cached results belong to the old one and are dropped.
    pub fn replace_knowledge(&mut self, knowledge: Arc<KnowledgeBase>) {
        self.knowledge = knowledge;
        self.cache.clear();
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    /// Find the best entry for `user_input`, or `None` when nothing scores.
    pub fn find_best_match(&mut self, user_input: &str) -> Option<MatchResult> {
        let text = user_input.trim().to_lowercase();
        if text.is_empty() {
            return None;
        }

        let language = self.language_detector.detect(&text);
        let key = (text, language);

        if let Some(cached) = self.cache.get(&key) {
            debug!("Cache hit for '{}' ({})", key.0, language);
            return cached;
        }

        let result = self.rank(&key.0, language);
        match &result {
            Some(m) => info!(
                "Best match for '{}' ({}): {} score={:.2}",
                key.0, language, m.entry.id, m.score
            ),
            None => info!("No match for '{}' ({})", key.0, language),
        }

        self.cache.insert(key, result.clone());
        result
    }

    fn rank(&self, text: &str, language: Language) -> Option<MatchResult> {
        let mut matches: Vec<MatchResult> = self
            .knowledge
            .entries()
            .iter()
            .filter_map(|entry| self.score_entry(entry, text, language))
            .collect();

        // stable: equal scores keep knowledge base order
        matches.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        matches.into_iter().next()
    }

    /// Score one entry; `None` when no keyword contributed anything.
    pub fn score_entry(
        &self,
        entry: &Arc<KnowledgeEntry>,
        text: &str,
        language: Language,
    ) -> Option<MatchResult> {
        let text_len = text.chars().count();
        let mut score = 0.0;
        let mut trace = Vec::new();

        for keyword in &entry.keywords {
            let key = keyword.to_lowercase();
            if key.is_empty() {
                continue;
            }

            if text == key {
                score += EXACT_SCORE;
                trace.push(format!("exact:{}(+50)", keyword));
            } else if text.contains(key.as_str()) {
                score += CONTAINS_SCORE;
                trace.push(format!("contains:{}(+30)", keyword));
            } else if key.contains(text) && text_len >= PARTIAL_MIN_LEN {
                score += PARTIAL_SCORE;
                trace.push(format!("partial:{}(+15)", keyword));
            } else {
                let similarity = self.similarity.similarity(text, &key);
                if similarity > SIMILARITY_THRESHOLD {
                    let bonus = (similarity * SIMILARITY_SCALE).floor();
                    score += bonus;
                    trace.push(format!(
                        "similar:{}({:.0}%,+{})",
                        keyword,
                        similarity * 100.0,
                        bonus
                    ));
                }
            }
        }

        if score <= 0.0 {
            return None;
        }

        score += f64::from(entry.priority) / 100.0;

        if entry.priority >= PROTECTED_PRIORITY {
            score *= PROTECTED_BOOST;
            trace.push("protected_priority(x1.2)".to_string());
        }

        if language
            .id_suffix()
            .is_some_and(|suffix| entry.language_suffix().eq_ignore_ascii_case(suffix))
        {
            score *= LANGUAGE_BOOST;
            trace.push(format!("language:{}(x1.15)", language));
        }

        Some(MatchResult {
            entry: Arc::clone(entry),
            score,
            trace,
        })
    }
}
