//! Rule-weighted essay evaluation.
//!
//! Scores extracted essay text with the knowledge base rule group, applies a
//! structure penalty, picks example responses and renders the report.

use chrono::Utc;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{RngCore, SeedableRng};
use std::time::Instant;
use tracing::{debug, info};

use super::language::DocumentTypeDetector;
use super::report::{EvaluationReport, Verdict, MAX_SCORE};
use crate::knowledge::{KnowledgeBase, RuleKind};

/// Documents with fewer non-blank lines are penalized
const MIN_PARAGRAPHS: usize = 8;
const STRUCTURE_PENALTY: i32 = 10;
/// Suggestion added along with the structure penalty
pub const STRUCTURE_SUGGESTION: &str = "段落可细分";
const MAX_EXAMPLES: usize = 3;

fn length_description(char_count: usize) -> &'static str {
    if char_count < 400 {
        "精炼"
    } else if char_count < 800 {
        "适中"
    } else {
        "饱满"
    }
}

/// Essay evaluator
pub struct DocumentEvaluator {
    type_detector: DocumentTypeDetector,
    rng: Box<dyn RngCore + Send>,
}

impl Default for DocumentEvaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentEvaluator {
    /// Create an evaluator sampling examples from OS entropy
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Create an evaluator with reproducible example sampling
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    pub fn with_rng<R: RngCore + Send + 'static>(rng: R) -> Self {
        Self {
            type_detector: DocumentTypeDetector::new(),
            rng: Box::new(rng),
        }
    }

    /// Evaluate extracted essay text against the knowledge base rules
    pub fn evaluate(&mut self, text: &str, knowledge: &KnowledgeBase) -> EvaluationReport {
        let start = Instant::now();

        // 1. Document type
        let document_type = self.type_detector.detect(text);

        // 2. Surface metrics
        let char_count = text.chars().count();
        let paragraph_count = text.lines().filter(|l| !l.trim().is_empty()).count();

        let mut praises = Vec::new();
        let mut suggestions = Vec::new();
        let mut reasoning_steps = vec![
            format!("步骤1: 文书类型识别 → {}模式", document_type.label()),
            format!(
                "步骤2: 长度分析 → {}（{}字 / {}段）",
                length_description(char_count),
                char_count,
                paragraph_count
            ),
        ];

        // 3. Rule group
        let mut score = 0;
        let mut hits = 0;
        for rule in knowledge.scoring_rules() {
            if !rule.is_match(text) {
                continue;
            }
            hits += 1;
            score += rule.weight;
            debug!("Rule '{}' matched ({:+})", rule.pattern.as_str(), rule.weight);

            if rule.kind.is_praise() {
                praises.push(rule.description.clone());
            } else if rule.kind == RuleKind::Negative {
                suggestions.push(rule.description.clone());
            }
        }
        reasoning_steps.push(format!("步骤3: 规则评分 → 命中{}条规则，累计{}分", hits, score));

        // 4. Structure
        if paragraph_count < MIN_PARAGRAPHS {
            score -= STRUCTURE_PENALTY;
            suggestions.push(STRUCTURE_SUGGESTION.to_string());
            reasoning_steps.push(format!("步骤4: 结构检查 → 段落偏少(-{})", STRUCTURE_PENALTY));
        } else {
            reasoning_steps.push("步骤4: 结构检查 → 段落充分".to_string());
        }
        reasoning_steps.push("步骤5: 自纠错 → 对比范文案例，避免泛叙事".to_string());

        // 5. Examples
        let lowered = text.to_lowercase();
        let mut candidates: Vec<String> = knowledge
            .examples()
            .filter(|entry| {
                entry.keywords.iter().any(|k| {
                    !k.is_empty() && lowered.contains(&k.to_lowercase())
                })
            })
            .map(|entry| entry.response.clone())
            .collect();
        let (picked, _) = candidates.partial_shuffle(self.rng.as_mut(), MAX_EXAMPLES);
        let examples = picked.to_vec();

        // 6. Verdict
        let verdict = Verdict::from_score(score);

        let mut report = EvaluationReport {
            document_type,
            char_count,
            paragraph_count,
            reasoning_steps,
            praises,
            suggestions,
            score,
            max_score: MAX_SCORE,
            verdict,
            examples,
            html: String::new(),
            processing_time_ms: 0,
            timestamp: Utc::now(),
        };

        // 7. Render
        report.html = report.render();
        report.processing_time_ms = start.elapsed().as_millis() as u64;

        info!("Document evaluated: {}", report.summary());
        report
    }
}
