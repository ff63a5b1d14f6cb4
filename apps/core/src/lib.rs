// Bunsho Core
// Knowledge-base chat matching and essay scoring for the consulting widget

pub mod analysis;
pub mod concierge;
pub mod config;
pub mod error;
pub mod knowledge;
pub mod text_extract;

pub use concierge::Concierge;
pub use config::{AppConfig, KnowledgeSource};
pub use error::AppError;

#[cfg(test)]
mod tests;
