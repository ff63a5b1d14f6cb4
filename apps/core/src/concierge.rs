//! Concierge - the chat-facing layer around the engine.
//!
//! Turns engine results into bot messages: fallback responses, segment
//! splitting, and the document upload flow from file checks to the
//! rendered evaluation report.

use std::sync::Arc;
use tracing::{info, warn};

use crate::analysis::{DocumentEvaluator, EvaluationReport, MatchEngine};
use crate::config::AppConfig;
use crate::error::AppError;
use crate::knowledge::{KnowledgeBase, WELCOME_ENTRY_ID};
use crate::text_extract::{extract_text_from_file, is_supported_file};

/// Token separating sequentially displayed chunks of a response
pub const SEGMENT_DELIMITER: &str = "[BREAK]";

/// Shown when neither a match nor the welcome entry is available
pub const SYSTEM_ERROR_MESSAGE: &str = "系统错误，请刷新页面";

/// Extracted texts shorter than this are treated as failed extractions
const MIN_EXTRACTED_CHARS: usize = 50;
/// Above this length the extraction notice reports a preview
const PREVIEW_CHARS: usize = 3000;

const UNSUPPORTED_FILE_ALERT: &str = "<b>【警报】</b>仅支持 TXT/PDF/DOCX/DOC";
pub const SCANNING_NOTICE: &str = "<b>【扫描中】</b>提取文本...";
const EMPTY_EXTRACTION_NOTICE: &str = "<b>【提取失败】</b>内容为空，请直接发送原文件给顾问";
const EXTRACTION_FAILED_NOTICE: &str = "<b>【提取失败】</b>无法读取文件内容<br>请直接发送原文件给顾问";

/// Split a response on [`SEGMENT_DELIMITER`], dropping blank segments
pub fn split_segments(response: &str) -> Vec<String> {
    response
        .split(SEGMENT_DELIMITER)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// User-side echo of an accepted upload
pub fn upload_receipt(file_name: &str, size_bytes: usize) -> String {
    format!(
        "📄 已上传：{} ({:.1} KB)",
        file_name,
        size_bytes as f64 / 1024.0
    )
}

fn extraction_length_description(char_count: usize) -> &'static str {
    if char_count < 400 {
        "篇幅精炼"
    } else if char_count < 800 {
        "长度适中"
    } else if char_count < 1500 {
        "篇幅饱满"
    } else {
        "内容详实"
    }
}

/// Chat host owning the match engine and the document evaluator
pub struct Concierge {
    engine: MatchEngine,
    evaluator: DocumentEvaluator,
    max_upload_bytes: usize,
}

impl Concierge {
    /// Create a concierge with default limits
    pub fn new(knowledge: Arc<KnowledgeBase>) -> Self {
        Self::from_config(knowledge, &AppConfig::default())
    }

    pub fn from_config(knowledge: Arc<KnowledgeBase>, config: &AppConfig) -> Self {
        Self {
            engine: MatchEngine::with_clear_threshold(knowledge, config.cache_clear_threshold),
            evaluator: DocumentEvaluator::new(),
            max_upload_bytes: config.max_upload_bytes(),
        }
    }

    /// Replace the evaluator, e.g. with one using a deterministic random source
    pub fn with_evaluator(mut self, evaluator: DocumentEvaluator) -> Self {
        self.evaluator = evaluator;
        self
    }

    pub fn engine(&self) -> &MatchEngine {
        &self.engine
    }

    pub fn knowledge(&self) -> &Arc<KnowledgeBase> {
        self.engine.knowledge()
    }

    pub fn replace_knowledge(&mut self, knowledge: Arc<KnowledgeBase>) {
        self.engine.replace_knowledge(knowledge);
    }

    /// Forget cached lookups
    pub fn clear(&mut self) {
        self.engine.clear_cache();
        info!("Concierge state cleared");
    }

    /// Response text for a user query, falling back to the welcome entry
    /// and then to a generic error string.
    pub fn lookup_response(&mut self, user_text: &str) -> String {
        if let Some(m) = self.engine.find_best_match(user_text) {
            return m.entry.response.clone();
        }

        match self.engine.knowledge().get(WELCOME_ENTRY_ID) {
            Some(welcome) => welcome.response.clone(),
            None => {
                warn!("No match and no {} entry in the knowledge base", WELCOME_ENTRY_ID);
                SYSTEM_ERROR_MESSAGE.to_string()
            }
        }
    }

    /// Bot messages answering `user_text`, in display order
    pub fn reply(&mut self, user_text: &str) -> Vec<String> {
        split_segments(&self.lookup_response(user_text))
    }

    /// Evaluate already extracted essay text
    pub fn evaluate_document(&mut self, text: &str) -> EvaluationReport {
        let knowledge = Arc::clone(self.engine.knowledge());
        self.evaluator.evaluate(text, &knowledge)
    }

    /// Check name and size of an upload before extraction.
    /// The error is the alert message to show.
    pub fn check_upload(&self, file_name: &str, size_bytes: usize) -> Result<(), String> {
        if !is_supported_file(file_name) {
            return Err(UNSUPPORTED_FILE_ALERT.to_string());
        }
        if size_bytes > self.max_upload_bytes {
            return Err(format!(
                "<b>【警报】</b>文件超过{}MB，请直接发送原文件给顾问",
                self.max_upload_bytes / (1024 * 1024)
            ));
        }
        Ok(())
    }

    /// Bot messages following an extraction attempt
    pub fn handle_extracted(&mut self, extracted: Result<String, AppError>) -> Vec<String> {
        let text = match extracted {
            Ok(text) => text,
            Err(e) => {
                // parser messages stay in the log, never in the markup
                warn!("Upload extraction failed: {}", e);
                return vec![EXTRACTION_FAILED_NOTICE.to_string()];
            }
        };

        if text.trim().chars().count() < MIN_EXTRACTED_CHARS {
            return vec![EMPTY_EXTRACTION_NOTICE.to_string()];
        }

        let char_count = text.chars().count();
        let status = if char_count > PREVIEW_CHARS {
            "前3000字预览"
        } else {
            "完整提取"
        };

        let report = self.evaluate_document(&text);
        vec![
            format!(
                "<b>【提取完成】</b><br>● {}<br>● 状态：{}",
                extraction_length_description(char_count),
                status
            ),
            report.html,
        ]
    }

    /// Full upload flow: checks, extraction, evaluation
    pub fn handle_upload(&mut self, file_name: &str, file_data: &[u8]) -> Vec<String> {
        if let Err(alert) = self.check_upload(file_name, file_data.len()) {
            return vec![alert];
        }

        let mut messages = vec![SCANNING_NOTICE.to_string()];
        messages.extend(self.handle_extracted(extract_text_from_file(file_name, file_data)));
        messages
    }
}
