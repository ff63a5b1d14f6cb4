//! Environment-driven configuration.
//!
//! Values are read from the process environment after `.env` has been
//! loaded. Every variable is optional; defaults match the hosted widget.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use url::Url;
use validator::Validate;

use crate::analysis::DEFAULT_CLEAR_THRESHOLD;
use crate::error::AppError;

const DEFAULT_KNOWLEDGE_PATH: &str = "data/knowledge.json";
const DEFAULT_RESPONSE_DELAY_MS: u64 = 600;
const DEFAULT_MAX_UPLOAD_MB: usize = 10;

/// Where the knowledge base snapshot comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KnowledgeSource {
    File(PathBuf),
    Http(Url),
}

#[derive(Debug, Clone, Validate)]
pub struct AppConfig {
    pub knowledge_source: KnowledgeSource,
    /// Pause between rendered response segments
    #[validate(range(max = 60000))]
    pub response_delay_ms: u64,
    /// Upload size ceiling in mebibytes
    #[validate(range(min = 1, max = 100))]
    pub max_upload_mb: usize,
    /// Cache hits after which the response cache is cleared
    #[validate(range(min = 1))]
    pub cache_clear_threshold: usize,
    /// Emit logs as JSON lines instead of human-readable text
    pub log_json: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            knowledge_source: KnowledgeSource::File(PathBuf::from(DEFAULT_KNOWLEDGE_PATH)),
            response_delay_ms: DEFAULT_RESPONSE_DELAY_MS,
            max_upload_mb: DEFAULT_MAX_UPLOAD_MB,
            cache_clear_threshold: DEFAULT_CLEAR_THRESHOLD,
            log_json: false,
        }
    }
}

fn parse_var<T: FromStr>(name: &str) -> Result<Option<T>, AppError>
where
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| AppError::Config(format!("{} is invalid: {}", name, e))),
        _ => Ok(None),
    }
}

impl AppConfig {
    /// Build the configuration from `BUNSHO_*` environment variables.
    ///
    /// `BUNSHO_KNOWLEDGE_URL` wins over `BUNSHO_KNOWLEDGE_PATH` when both are set.
    pub fn from_env() -> Result<Self, AppError> {
        let defaults = Self::default();

        let knowledge_source = match parse_var::<String>("BUNSHO_KNOWLEDGE_URL")? {
            Some(url) => KnowledgeSource::Http(Url::parse(&url)?),
            None => match parse_var::<PathBuf>("BUNSHO_KNOWLEDGE_PATH")? {
                Some(path) => KnowledgeSource::File(path),
                None => defaults.knowledge_source,
            },
        };

        let config = Self {
            knowledge_source,
            response_delay_ms: parse_var("BUNSHO_RESPONSE_DELAY_MS")?
                .unwrap_or(defaults.response_delay_ms),
            max_upload_mb: parse_var("BUNSHO_MAX_UPLOAD_MB")?.unwrap_or(defaults.max_upload_mb),
            cache_clear_threshold: parse_var("BUNSHO_CACHE_CLEAR_THRESHOLD")?
                .unwrap_or(defaults.cache_clear_threshold),
            log_json: parse_var("BUNSHO_LOG_JSON")?.unwrap_or(defaults.log_json),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn response_delay(&self) -> Duration {
        Duration::from_millis(self.response_delay_ms)
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb * 1024 * 1024
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VARS: [&str; 6] = [
        "BUNSHO_KNOWLEDGE_URL",
        "BUNSHO_KNOWLEDGE_PATH",
        "BUNSHO_RESPONSE_DELAY_MS",
        "BUNSHO_MAX_UPLOAD_MB",
        "BUNSHO_CACHE_CLEAR_THRESHOLD",
        "BUNSHO_LOG_JSON",
    ];

    /// Every variable, unset unless overridden
    fn env_with(
        overrides: &[(&'static str, &'static str)],
    ) -> Vec<(&'static str, Option<&'static str>)> {
        VARS.iter()
            .map(|var| {
                let value = overrides.iter().find(|(k, _)| k == var).map(|(_, v)| *v);
                (*var, value)
            })
            .collect()
    }

    #[test]
    fn test_defaults() {
        temp_env::with_vars(env_with(&[]), || {
            let config = AppConfig::from_env().unwrap();
            assert_eq!(
                config.knowledge_source,
                KnowledgeSource::File(PathBuf::from("data/knowledge.json"))
            );
            assert_eq!(config.response_delay(), Duration::from_millis(600));
            assert_eq!(config.max_upload_bytes(), 10 * 1024 * 1024);
            assert_eq!(config.cache_clear_threshold, 500);
            assert!(!config.log_json);
        });
    }

    #[test]
    fn test_url_wins_over_path() {
        let vars = env_with(&[
            ("BUNSHO_KNOWLEDGE_URL", "https://example.com/knowledge.json"),
            ("BUNSHO_KNOWLEDGE_PATH", "/tmp/kb.json"),
        ]);

        temp_env::with_vars(vars, || {
            let config = AppConfig::from_env().unwrap();
            assert!(matches!(config.knowledge_source, KnowledgeSource::Http(_)));
        });
    }

    #[test]
    fn test_overrides() {
        let vars = env_with(&[
            ("BUNSHO_KNOWLEDGE_PATH", "/tmp/kb.json"),
            ("BUNSHO_RESPONSE_DELAY_MS", "0"),
            ("BUNSHO_CACHE_CLEAR_THRESHOLD", "25"),
            ("BUNSHO_LOG_JSON", "true"),
        ]);

        temp_env::with_vars(vars, || {
            let config = AppConfig::from_env().unwrap();
            assert_eq!(
                config.knowledge_source,
                KnowledgeSource::File(PathBuf::from("/tmp/kb.json"))
            );
            assert_eq!(config.response_delay_ms, 0);
            assert_eq!(config.cache_clear_threshold, 25);
            assert!(config.log_json);
        });
    }

    #[test]
    fn test_unparseable_number() {
        let vars = env_with(&[("BUNSHO_RESPONSE_DELAY_MS", "soon")]);

        temp_env::with_vars(vars, || {
            let result = AppConfig::from_env();
            assert!(matches!(result, Err(AppError::Config(ref msg)) if msg.contains("BUNSHO_RESPONSE_DELAY_MS")));
        });
    }

    #[test]
    fn test_out_of_range_rejected() {
        let vars = env_with(&[("BUNSHO_CACHE_CLEAR_THRESHOLD", "0")]);

        temp_env::with_vars(vars, || {
            assert!(matches!(AppConfig::from_env(), Err(AppError::Validation(_))));
        });
    }

    #[test]
    fn test_bad_url_rejected() {
        let vars = env_with(&[("BUNSHO_KNOWLEDGE_URL", "not a url")]);

        temp_env::with_vars(vars, || {
            assert!(matches!(AppConfig::from_env(), Err(AppError::Config(_))));
        });
    }
}
