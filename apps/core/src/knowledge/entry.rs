//! Knowledge base data model.
//!
//! Raw JSON records are deserialized leniently (missing or `null` collections
//! become empty), validated, then compiled into immutable entries whose rule
//! patterns are ready-to-use regexes.

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, warn};
use validator::Validate;

use crate::error::AppError;

/// Id of the entry used when a query matches nothing
pub const WELCOME_ENTRY_ID: &str = "WELCOME_BUNSHO";

/// Id of the entry holding the essay scoring rules
pub const RULE_GROUP_ID: &str = "EVAL_RULES";

/// Id prefix of entries holding example responses for essay reports
pub const EXAMPLE_ID_PREFIX: &str = "EXAMPLE_";

/// How a matching rule is reported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleKind {
    Positive,
    Core,
    Specific,
    Negative,
    #[serde(other)]
    Neutral,
}

impl RuleKind {
    /// Whether a match of this rule is praised in the report
    pub fn is_praise(&self) -> bool {
        matches!(self, RuleKind::Positive | RuleKind::Core | RuleKind::Specific)
    }
}

/// Scoring rule as it appears in the knowledge JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleRecord {
    #[serde(default)]
    pub keyword: String,
    #[serde(default)]
    pub weight: i32,
    #[serde(rename = "type", default = "default_rule_kind")]
    pub kind: RuleKind,
    #[serde(rename = "desc", default)]
    pub description: String,
}

fn default_rule_kind() -> RuleKind {
    RuleKind::Neutral
}

/// Knowledge entry as it appears in the knowledge JSON
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct KnowledgeRecord {
    #[validate(length(min = 1))]
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub keywords: Option<Vec<String>>,
    #[serde(default)]
    pub priority: i32,
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub rules: Option<Vec<RuleRecord>>,
}

fn build_pattern(pattern: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(pattern).case_insensitive(true).build()
}

/// Compiled scoring rule
#[derive(Debug, Clone)]
pub struct ScoringRule {
    pub pattern: Regex,
    pub weight: i32,
    pub kind: RuleKind,
    pub description: String,
}

impl ScoringRule {
    /// Compile a rule record. A pattern that is not a valid regex is matched
    /// as a literal instead; a rule that cannot be compiled either way is dropped.
    fn compile(record: RuleRecord) -> Option<Self> {
        if record.keyword.is_empty() {
            warn!("Dropping rule without keyword ('{}')", record.description);
            return None;
        }

        let pattern = build_pattern(&record.keyword).or_else(|e| {
            warn!(
                "Rule pattern '{}' is not a valid regex ({}), matching it literally",
                record.keyword, e
            );
            build_pattern(&regex::escape(&record.keyword))
        });

        match pattern {
            Ok(pattern) => Some(Self {
                pattern,
                weight: record.weight,
                kind: record.kind,
                description: record.description,
            }),
            Err(e) => {
                warn!("Dropping rule '{}': {}", record.keyword, e);
                None
            }
        }
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }
}

/// A knowledge base entry
#[derive(Debug, Clone)]
pub struct KnowledgeEntry {
    pub id: String,
    pub keywords: Vec<String>,
    pub priority: i32,
    pub response: String,
    pub rules: Vec<ScoringRule>,
}

impl KnowledgeEntry {
    /// Trailing `_`-separated token of the id, e.g. `CN` for `FEE_CN`
    pub fn language_suffix(&self) -> &str {
        self.id.rsplit('_').next().unwrap_or(&self.id)
    }

    pub fn is_example(&self) -> bool {
        self.id.starts_with(EXAMPLE_ID_PREFIX)
    }
}

impl From<KnowledgeRecord> for KnowledgeEntry {
    fn from(record: KnowledgeRecord) -> Self {
        Self {
            id: record.id,
            keywords: record.keywords.unwrap_or_default(),
            priority: record.priority,
            response: record.response.unwrap_or_default(),
            rules: record
                .rules
                .unwrap_or_default()
                .into_iter()
                .filter_map(ScoringRule::compile)
                .collect(),
        }
    }
}

// Compiled patterns compare by their source text.
impl PartialEq for KnowledgeEntry {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.keywords == other.keywords
            && self.priority == other.priority
            && self.response == other.response
            && self.rules.len() == other.rules.len()
            && self.rules.iter().zip(&other.rules).all(|(a, b)| {
                a.pattern.as_str() == b.pattern.as_str()
                    && a.weight == b.weight
                    && a.kind == b.kind
                    && a.description == b.description
            })
    }
}

/// Immutable snapshot of the knowledge base, in source order
#[derive(Debug, Clone, Default)]
pub struct KnowledgeBase {
    entries: Vec<Arc<KnowledgeEntry>>,
}

impl KnowledgeBase {
    /// Build a snapshot from records. Records failing validation and
    /// duplicate ids after the first occurrence are skipped.
    pub fn from_records(records: Vec<KnowledgeRecord>) -> Self {
        let mut seen = HashSet::new();
        let mut entries = Vec::with_capacity(records.len());

        for record in records {
            if let Err(e) = record.validate() {
                warn!("Skipping invalid knowledge entry '{}': {}", record.id, e);
                continue;
            }
            if !seen.insert(record.id.clone()) {
                warn!("Duplicate knowledge entry id '{}', keeping the first", record.id);
                continue;
            }
            entries.push(Arc::new(KnowledgeEntry::from(record)));
        }

        info!("Knowledge base ready: {} entries", entries.len());
        Self { entries }
    }

    /// Parse the knowledge JSON document (an array of records).
    ///
    /// Only a document that is not a JSON array fails; a malformed record
    /// is logged and skipped.
    pub fn from_json(json: &str) -> Result<Self, AppError> {
        let values: Vec<serde_json::Value> = serde_json::from_str(json)?;
        let records = values
            .into_iter()
            .enumerate()
            .filter_map(|(i, value)| match serde_json::from_value(value) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!("Skipping malformed knowledge record #{}: {}", i, e);
                    None
                }
            })
            .collect();
        Ok(Self::from_records(records))
    }

    pub fn entries(&self) -> &[Arc<KnowledgeEntry>] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Arc<KnowledgeEntry>> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Rules of the scoring rule group, empty if the group is absent
    pub fn scoring_rules(&self) -> &[ScoringRule] {
        self.get(RULE_GROUP_ID)
            .map(|e| e.rules.as_slice())
            .unwrap_or_default()
    }

    /// Example response entries, in source order
    pub fn examples(&self) -> impl Iterator<Item = &Arc<KnowledgeEntry>> {
        self.entries.iter().filter(|e| e.is_example())
    }
}
