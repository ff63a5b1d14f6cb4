//! Evaluation Report - Output structure of the document evaluator.
//!
//! Holds the scoring outcome of one uploaded essay and renders it into the
//! markup shown in the chat bubble.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::language::DocumentType;

/// Ceiling shown next to the tally in the report
pub const MAX_SCORE: i32 = 50;

/// Shown when no example entry matches the essay
pub const FALLBACK_EXAMPLE: &str = "原句：\"私が総合政策に興味を持ったきっかけは...\"<br>建议：\"絵を描く中で自然の美しさを感じ、初音ミクのコミュニティで繋がる力に感動しました。これらを支える政策を学び、地域活性化に貢献したいです。\"";

/// Closing call-to-action appended to every report
pub const CLOSING_CALL_TO_ACTION: &str =
    "<br><br><b>【深度审计】</b>网页端初步扫描。要逐段重构，请发送完整文档预约人工精修。";

/// Overall tone of the evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    High,
    Medium,
    Low,
}

impl Verdict {
    /// Thresholds: above 30 is high, above 15 is medium
    pub fn from_score(score: i32) -> Self {
        if score > 30 {
            Verdict::High
        } else if score > 15 {
            Verdict::Medium
        } else {
            Verdict::Low
        }
    }

    pub fn narrative(&self) -> &'static str {
        match self {
            Verdict::High => "水准较高，已具竞争力",
            Verdict::Medium => "基础扎实，还有空间",
            Verdict::Low => "动机真挚，可再打磨",
        }
    }
}

/// Complete evaluation of one document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationReport {
    /// Detected essay type
    pub document_type: DocumentType,

    /// Length in characters
    pub char_count: usize,

    /// Non-blank lines
    pub paragraph_count: usize,

    /// Narration of the scoring pipeline
    pub reasoning_steps: Vec<String>,

    pub praises: Vec<String>,

    pub suggestions: Vec<String>,

    /// Rule tally after penalties
    pub score: i32,

    pub max_score: i32,

    pub verdict: Verdict,

    /// Sampled example responses
    pub examples: Vec<String>,

    /// Rendered report
    pub html: String,

    /// Processing time in milliseconds
    pub processing_time_ms: u64,

    /// Timestamp of evaluation
    pub timestamp: DateTime<Utc>,
}

impl EvaluationReport {
    /// Render the report markup from the other fields
    pub fn render(&self) -> String {
        let mut out = format!(
            "<b>【文书审计 - {}模式】</b><br>",
            self.document_type.label()
        );

        for step in &self.reasoning_steps {
            out.push_str(step);
            out.push_str("<br>");
        }

        for praise in &self.praises {
            out.push_str(&format!("● {}<br>", praise));
        }

        out.push_str(&format!(
            "<br><b>整体评价：</b> {}（{}/{}）",
            self.verdict.narrative(),
            self.score,
            self.max_score
        ));

        if self.suggestions.is_empty() {
            out.push_str("<br><br>整体优秀！结构完整、动机真挚。");
        } else {
            out.push_str("<br><br><b>可优化建议</b><br>");
            for (i, suggestion) in self.suggestions.iter().enumerate() {
                out.push_str(&format!("{}. {}<br>", i + 1, suggestion));
            }
        }

        out.push_str("<br><b>实战范文示例</b><br>");
        if self.examples.is_empty() {
            out.push_str(FALLBACK_EXAMPLE);
        } else {
            let examples: Vec<String> = self
                .examples
                .iter()
                .map(|e| e.replace("[BREAK]", "<br>"))
                .collect();
            out.push_str(&examples.join("<br><br>"));
        }

        out.push_str(CLOSING_CALL_TO_ACTION);
        out
    }

    /// Get a summary for logging
    pub fn summary(&self) -> String {
        format!(
            "Type: {:?}, Chars: {}, Paragraphs: {}, Score: {}/{}, Verdict: {:?}, Examples: {}",
            self.document_type,
            self.char_count,
            self.paragraph_count,
            self.score,
            self.max_score,
            self.verdict,
            self.examples.len()
        )
    }
}
