//! # Knowledge Module
//!
//! Static catalog of dialogue entries and essay scoring rules.
//!
//! ## Components
//! - `entry`: JSON records, compiled entries and the `KnowledgeBase` snapshot
//! - `loader`: file and HTTP loaders producing snapshots

pub mod entry;
pub mod loader;

pub use entry::{
    KnowledgeBase, KnowledgeEntry, KnowledgeRecord, RuleKind, RuleRecord, ScoringRule,
    EXAMPLE_ID_PREFIX, RULE_GROUP_ID, WELCOME_ENTRY_ID,
};
pub use loader::{FileKnowledgeLoader, HttpKnowledgeLoader, KnowledgeLoader};
