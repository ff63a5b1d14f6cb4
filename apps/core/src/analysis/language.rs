//! Script-based language detection and essay type classification.
//!
//! Both detectors are pure functions of their input: no model, no state.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;
use tracing::debug;

/// Coarse language tag derived from the dominant script of a text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Chinese,
    Japanese,
    Korean,
    English,
    Unknown,
}

impl Language {
    /// Returns the short language code
    pub fn code(&self) -> &'static str {
        match self {
            Language::Chinese => "cn",
            Language::Japanese => "jp",
            Language::Korean => "kr",
            Language::English => "en",
            Language::Unknown => "unknown",
        }
    }

    /// Returns the knowledge entry id suffix for this language, if any
    pub fn id_suffix(&self) -> Option<&'static str> {
        match self {
            Language::Chinese => Some("CN"),
            Language::Japanese => Some("JP"),
            Language::Korean => Some("KR"),
            Language::English => Some("EN"),
            Language::Unknown => None,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Detects the dominant script of a text by counting codepoints per range.
#[derive(Debug, Default, Clone, Copy)]
pub struct LanguageDetector;

impl LanguageDetector {
    pub fn new() -> Self {
        Self
    }

    /// Classify `text`. Ties go to the earliest of cn, jp, kr, en.
    pub fn detect(&self, text: &str) -> Language {
        let mut counts = [
            (Language::Chinese, 0usize),
            (Language::Japanese, 0),
            (Language::Korean, 0),
            (Language::English, 0),
        ];

        for c in text.chars() {
            let slot = match c {
                '\u{4e00}'..='\u{9fa5}' => 0,
                '\u{3040}'..='\u{309f}' | '\u{30a0}'..='\u{30ff}' => 1,
                '\u{ac00}'..='\u{d7af}' => 2,
                'a'..='z' | 'A'..='Z' => 3,
                _ => continue,
            };
            counts[slot].1 += 1;
        }

        let mut best = (Language::Unknown, 0usize);
        for (language, count) in counts {
            if count > best.1 {
                best = (language, count);
            }
        }
        best.0
    }
}

/// Kind of application essay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentType {
    Graduate,
    Undergraduate,
}

impl DocumentType {
    /// Mode label used in report headers
    pub fn label(&self) -> &'static str {
        match self {
            DocumentType::Graduate => "大学院",
            DocumentType::Undergraduate => "学部",
        }
    }
}

// NOTE: expect() is acceptable here: the patterns are literals checked by the tests below.
static GRADUATE_MARKERS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)先行研究|先行文献|Gap|仮説|実証|研究方法|methodology")
        .expect("Invalid regex: graduate markers")
});

static UNDERGRADUATE_MARKERS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)志望理由書|学部|総合政策|興味を持ったきっかけ")
        .expect("Invalid regex: undergraduate markers")
});

/// Separates research proposals from motivation statements.
#[derive(Debug, Default, Clone, Copy)]
pub struct DocumentTypeDetector;

impl DocumentTypeDetector {
    pub fn new() -> Self {
        Self
    }

    /// Graduate markers win over undergraduate ones; no marker at all
    /// falls back to undergraduate.
    pub fn detect(&self, text: &str) -> DocumentType {
        if GRADUATE_MARKERS.is_match(text) {
            return DocumentType::Graduate;
        }
        if !UNDERGRADUATE_MARKERS.is_match(text) {
            debug!("No document type marker found, defaulting to undergraduate");
        }
        DocumentType::Undergraduate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_detection() {
        let detector = LanguageDetector::new();

        assert_eq!(detector.detect("申请文书怎么写"), Language::Chinese);
        assert_eq!(detector.detect("ありがとうございます"), Language::Japanese);
        assert_eq!(detector.detect("안녕하세요"), Language::Korean);
        assert_eq!(detector.detect("How much does it cost?"), Language::English);
    }

    #[test]
    fn test_unknown_without_letters() {
        let detector = LanguageDetector::new();

        assert_eq!(detector.detect(""), Language::Unknown);
        assert_eq!(detector.detect("   "), Language::Unknown);
        assert_eq!(detector.detect("12345 !?。、"), Language::Unknown);
        assert_eq!(detector.detect("éàü"), Language::Unknown);
    }

    #[test]
    fn test_tie_prefers_enumeration_order() {
        let detector = LanguageDetector::new();

        // one ideograph, one ASCII letter
        assert_eq!(detector.detect("文a"), Language::Chinese);
        // one kana, one hangul
        assert_eq!(detector.detect("한あ"), Language::Japanese);
        // one hangul, one ASCII letter
        assert_eq!(detector.detect("a한"), Language::Korean);
    }

    #[test]
    fn test_mixed_script_majority() {
        let detector = LanguageDetector::new();

        // kana outnumber the two kanji
        assert_eq!(detector.detect("志望のりゆうしょ"), Language::Japanese);
        assert_eq!(detector.detect("SFC 志望"), Language::English);
    }

    #[test]
    fn test_language_codes() {
        assert_eq!(Language::Chinese.code(), "cn");
        assert_eq!(Language::Japanese.code(), "jp");
        assert_eq!(Language::Korean.code(), "kr");
        assert_eq!(Language::English.code(), "en");
        assert_eq!(Language::Unknown.code(), "unknown");
        assert_eq!(Language::Unknown.id_suffix(), None);
        assert_eq!(Language::Korean.id_suffix(), Some("KR"));
    }

    #[test]
    fn test_document_type_detection() {
        let detector = DocumentTypeDetector::new();

        assert_eq!(
            detector.detect("本研究の先行研究を整理し、仮説を立てる"),
            DocumentType::Graduate
        );
        assert_eq!(
            detector.detect("The METHODOLOGY section follows"),
            DocumentType::Graduate
        );
        assert_eq!(
            detector.detect("総合政策学部を志望する理由"),
            DocumentType::Undergraduate
        );
    }

    #[test]
    fn test_document_type_graduate_checked_first() {
        let detector = DocumentTypeDetector::new();

        assert_eq!(
            detector.detect("志望理由書ですが、研究方法にも触れます"),
            DocumentType::Graduate
        );
    }

    #[test]
    fn test_document_type_defaults_to_undergraduate() {
        let detector = DocumentTypeDetector::new();

        assert_eq!(detector.detect(""), DocumentType::Undergraduate);
        assert_eq!(detector.detect("絵を描くのが好きです"), DocumentType::Undergraduate);
    }
}
