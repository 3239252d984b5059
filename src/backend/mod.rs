//! HTTP client for the research backend.
//!
//! Every call goes through a single configured base address. Responses are decoded and then
//! validated before they reach the workflow layer, so callers only ever see well-formed
//! entities or a typed [`BackendError`].

mod validate;

use crate::model::{
    AnalysisRequest, AnalysisResult, ClientConfig, NewDocument, SearchRequest, SearchResponse,
    SearchResult, VaultDocument,
};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;

const SEARCH_PATH: &str = "/api/search/unified";
const SYNTHESIZE_PATH: &str = "/api/analysis/synthesize";
const DOCUMENTS_PATH: &str = "/api/vault/documents";

/// Failure outcome of a single backend call.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("backend unreachable: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("backend returned {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("malformed response: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("response violates contract: {0}")]
    Contract(String),
}

pub type BackendResult<T> = Result<T, BackendError>;

#[derive(Debug, Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(cfg: &ClientConfig) -> anyhow::Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent(cfg.user_agent.clone());
        if let Some(timeout) = cfg.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;
        Ok(Self {
            http,
            base_url: cfg.api_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn document_url(&self, id: i64) -> String {
        format!("{}{}/{}", self.base_url, DOCUMENTS_PATH, id)
    }

    pub async fn search(&self, request: &SearchRequest) -> BackendResult<Vec<SearchResult>> {
        let resp: SearchResponse = self.post_json(SEARCH_PATH, request).await?;
        validate::search_results(&resp.results)?;
        Ok(resp.results)
    }

    pub async fn synthesize(&self, request: &AnalysisRequest) -> BackendResult<AnalysisResult> {
        let analysis: AnalysisResult = self.post_json(SYNTHESIZE_PATH, request).await?;
        validate::analysis(&analysis)?;
        Ok(analysis)
    }

    pub async fn list_documents(&self) -> BackendResult<Vec<VaultDocument>> {
        let resp = self
            .http
            .get(self.url(DOCUMENTS_PATH))
            .send()
            .await
            .map_err(BackendError::Transport)?;
        let docs: Vec<VaultDocument> = decode(resp).await?;
        for doc in &docs {
            validate::document(doc)?;
        }
        Ok(docs)
    }

    pub async fn create_document(&self, document: &NewDocument) -> BackendResult<VaultDocument> {
        let doc: VaultDocument = self.post_json(DOCUMENTS_PATH, document).await?;
        validate::document(&doc)?;
        Ok(doc)
    }

    pub async fn delete_document(&self, id: i64) -> BackendResult<()> {
        let resp = self
            .http
            .delete(self.document_url(id))
            .send()
            .await
            .map_err(BackendError::Transport)?;
        check_status(resp).await.map(|_| ())
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> BackendResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let resp = self
            .http
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(BackendError::Transport)?;
        decode(resp).await
    }
}

async fn check_status(resp: reqwest::Response) -> BackendResult<reqwest::Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(BackendError::Status {
        status,
        body: crate::display::ellipsize(body.trim(), 200),
    })
}

async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> BackendResult<T> {
    let resp = check_status(resp).await?;
    // Read the body as bytes first so decode failures are reported separately from transport.
    let bytes = resp.bytes().await.map_err(BackendError::Transport)?;
    serde_json::from_slice(&bytes).map_err(BackendError::Decode)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> BackendClient {
        BackendClient::new(&ClientConfig {
            api_url: format!("{}/", server.uri()),
            search_limit: 10,
            timeout: None,
            user_agent: "omnimind-cli/test".into(),
        })
        .unwrap()
    }

    fn result_json(title: &str, score: f64) -> serde_json::Value {
        json!({
            "title": title,
            "url": format!("https://example.org/{title}"),
            "source": "arxiv",
            "snippet": "snippet",
            "relevance_score": score,
        })
    }

    #[tokio::test]
    async fn search_posts_query_and_limit() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(SEARCH_PATH))
            .and(body_json(json!({"query": "AI in healthcare", "limit": 10})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [result_json("a", 0.92), result_json("b", 0.81), result_json("c", 0.77)]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let results = client_for(&server)
            .search(&SearchRequest {
                query: "AI in healthcare".into(),
                limit: 10,
            })
            .await
            .unwrap();
        let percents: Vec<i64> = results.iter().map(|r| r.relevance_percent()).collect();
        assert_eq!(percents, vec![92, 81, 77]);
    }

    #[tokio::test]
    async fn search_without_results_key_is_empty() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(SEARCH_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;

        let results = client_for(&server)
            .search(&SearchRequest {
                query: "q".into(),
                limit: 10,
            })
            .await
            .unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn non_json_body_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(SYNTHESIZE_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .synthesize(&AnalysisRequest {
                query: "q".into(),
                search_results: Vec::new(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, BackendError::Decode(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn out_of_range_score_is_contract_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(SEARCH_PATH))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "results": [result_json("a", 1.7)] })),
            )
            .mount(&server)
            .await;

        let err = client_for(&server)
            .search(&SearchRequest {
                query: "q".into(),
                limit: 10,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, BackendError::Contract(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn error_status_carries_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(DOCUMENTS_PATH))
            .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
            .mount(&server)
            .await;

        let err = client_for(&server).list_documents().await.unwrap_err();
        match err {
            BackendError::Status { status, body } => {
                assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
                assert_eq!(body, "maintenance");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn create_document_sends_tag_array() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(DOCUMENTS_PATH))
            .and(body_json(json!({"title": "T", "content": "C", "tags": ["a", "b"]})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "id": 42,
                "title": "T",
                "content": "C",
                "encrypted": true,
                "created_at": "2026-10-19T10:00:00Z",
                "tags": ["a", "b"],
            })))
            .expect(1)
            .mount(&server)
            .await;

        let doc = client_for(&server)
            .create_document(&NewDocument {
                title: "T".into(),
                content: "C".into(),
                tags: ["a".to_string(), "b".to_string()].into_iter().collect(),
            })
            .await
            .unwrap();
        assert_eq!(doc.id, 42);
        assert!(doc.encrypted);
    }

    #[tokio::test]
    async fn delete_hits_document_path() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/vault/documents/9"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        client_for(&server).delete_document(9).await.unwrap();
    }

    #[tokio::test]
    async fn unreachable_backend_is_transport_error() {
        let client = BackendClient::new(&ClientConfig {
            api_url: "http://127.0.0.1:9".into(),
            search_limit: 10,
            timeout: Some(std::time::Duration::from_secs(2)),
            user_agent: "omnimind-cli/test".into(),
        })
        .unwrap();
        let err = client.list_documents().await.unwrap_err();
        assert!(matches!(err, BackendError::Transport(_)), "got {err:?}");
    }
}
