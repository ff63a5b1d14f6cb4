use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use std::path::PathBuf;
use tracing::{info, warn};
use url::Url;

use super::entry::KnowledgeBase;
use crate::error::AppError;

/// Source of knowledge base snapshots.
///
/// The engine only ever sees the resulting [`KnowledgeBase`]; where the JSON
/// comes from is up to the implementation.
#[async_trait]
pub trait KnowledgeLoader: Send + Sync {
    /// Loads and compiles a fresh snapshot.
    async fn load(&self) -> Result<KnowledgeBase, AppError>;
}

/// Reads the knowledge JSON from a local file.
pub struct FileKnowledgeLoader {
    path: PathBuf,
}

impl FileKnowledgeLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl KnowledgeLoader for FileKnowledgeLoader {
    async fn load(&self) -> Result<KnowledgeBase, AppError> {
        info!("Loading knowledge base from {:?}", self.path);
        let json = tokio::fs::read_to_string(&self.path).await?;
        KnowledgeBase::from_json(&json)
    }
}

/// Fetches the knowledge JSON over HTTP.
///
/// Every request carries a `v=<millis>` query parameter so intermediate
/// caches never serve a stale snapshot.
pub struct HttpKnowledgeLoader {
    url: Url,
    client: Client,
}

impl HttpKnowledgeLoader {
    pub fn new(url: Url) -> Self {
        Self {
            url,
            client: Client::new(),
        }
    }

    /// Parses `url` and builds a loader for it.
    pub fn parse(url: &str) -> Result<Self, AppError> {
        Ok(Self::new(Url::parse(url)?))
    }

    fn cache_busted_url(&self) -> Url {
        let mut url = self.url.clone();
        url.query_pairs_mut()
            .append_pair("v", &Utc::now().timestamp_millis().to_string());
        url
    }
}

#[async_trait]
impl KnowledgeLoader for HttpKnowledgeLoader {
    async fn load(&self) -> Result<KnowledgeBase, AppError> {
        let url = self.cache_busted_url();
        info!("Fetching knowledge base from {}", url);

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Knowledge base fetch failed with status {}", status);
            return Err(AppError::Network(format!(
                "Knowledge base request failed with status {}: {}",
                status, body
            )));
        }

        let json = response.text().await?;
        KnowledgeBase::from_json(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const KB_JSON: &str = r#"[
        {"id": "WELCOME_BUNSHO", "keywords": ["hello"], "priority": 100, "response": "Welcome"},
        {"id": "FEE_CN", "keywords": ["学费"], "priority": 500, "response": "费用说明"}
    ]"#;

    #[tokio::test]
    async fn test_file_loader_reads_snapshot() {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(KB_JSON.as_bytes()).unwrap();

        let kb = FileKnowledgeLoader::new(file.path()).load().await.unwrap();

        assert_eq!(kb.len(), 2);
        assert_eq!(kb.get("FEE_CN").unwrap().response, "费用说明");
    }

    #[tokio::test]
    async fn test_file_loader_missing_file() {
        let result = FileKnowledgeLoader::new("/nonexistent/knowledge.json")
            .load()
            .await;
        assert!(matches!(result, Err(AppError::Io(_))));
    }

    #[tokio::test]
    async fn test_file_loader_malformed_json() {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(b"{ not an array").unwrap();

        let result = FileKnowledgeLoader::new(file.path()).load().await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_http_loader_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/knowledge.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string(KB_JSON))
            .mount(&mock_server)
            .await;

        let loader =
            HttpKnowledgeLoader::parse(&format!("{}/knowledge.json", mock_server.uri())).unwrap();
        let kb = loader.load().await.unwrap();

        assert_eq!(kb.len(), 2);
        assert!(kb.get("WELCOME_BUNSHO").is_some());
    }

    #[tokio::test]
    async fn test_http_loader_adds_cache_buster() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/knowledge.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string("[]"))
            .mount(&mock_server)
            .await;

        let loader =
            HttpKnowledgeLoader::parse(&format!("{}/knowledge.json", mock_server.uri())).unwrap();
        loader.load().await.unwrap();

        let requests = mock_server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].url.query_pairs().any(|(k, _)| k == "v"));
    }

    #[tokio::test]
    async fn test_http_loader_server_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/knowledge.json"))
            .respond_with(ResponseTemplate::new(503).set_body_string("Service Unavailable"))
            .mount(&mock_server)
            .await;

        let loader =
            HttpKnowledgeLoader::parse(&format!("{}/knowledge.json", mock_server.uri())).unwrap();
        let result = loader.load().await;

        if let Err(AppError::Network(msg)) = result {
            assert!(msg.contains("503"));
            assert!(msg.contains("Service Unavailable"));
        } else {
            panic!("Expected AppError::Network, got something else.");
        }
    }

    #[test]
    fn test_http_loader_rejects_bad_url() {
        assert!(matches!(
            HttpKnowledgeLoader::parse("not a url"),
            Err(AppError::Config(_))
        ));
    }
}
