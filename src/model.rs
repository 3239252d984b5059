use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_url: String,
    pub search_limit: u32,
    pub timeout: Option<Duration>,
    pub user_agent: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    pub source: String,
    #[serde(default)]
    pub snippet: String,
    pub relevance_score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub citations: Option<u64>,
}

impl SearchResult {
    /// Relevance as a whole percentage, `round(score * 100)`.
    pub fn relevance_percent(&self) -> i64 {
        (self.relevance_score * 100.0).round() as i64
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub summary: String,
    #[serde(default)]
    pub key_insights: Vec<String>,
    #[serde(default)]
    pub potential_gaps: Vec<String>,
    #[serde(default)]
    pub next_research_directions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bias_analysis: Option<String>,
    #[serde(default)]
    pub sources_cited: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VaultDocument {
    pub id: i64,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub encrypted: bool,
    pub created_at: String,
    #[serde(default)]
    pub tags: BTreeSet<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchRequest {
    pub query: String,
    pub limit: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisRequest {
    pub query: String,
    pub search_results: Vec<SearchResult>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewDocument {
    pub title: String,
    pub content: String,
    pub tags: BTreeSet<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchResponse {
    #[serde(default)]
    pub results: Vec<SearchResult>,
}

/// Client-side source selection. Not transmitted to the backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SourceFilter {
    #[default]
    All,
    Academic,
    News,
    Web,
}

impl SourceFilter {
    pub const ALL: [SourceFilter; 4] = [
        SourceFilter::All,
        SourceFilter::Academic,
        SourceFilter::News,
        SourceFilter::Web,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SourceFilter::All => "All",
            SourceFilter::Academic => "Academic",
            SourceFilter::News => "News",
            SourceFilter::Web => "Web",
        }
    }

    pub fn next(self) -> Self {
        match self {
            SourceFilter::All => SourceFilter::Academic,
            SourceFilter::Academic => SourceFilter::News,
            SourceFilter::News => SourceFilter::Web,
            SourceFilter::Web => SourceFilter::All,
        }
    }
}

/// Monotonic request token used to discard out-of-date responses.
pub type RequestSeq = u64;

/// Calls the UI asks the controller to perform.
#[derive(Debug, Clone)]
pub enum BackendCommand {
    Search {
        seq: RequestSeq,
        request: SearchRequest,
    },
    Analyze {
        seq: RequestSeq,
        request: AnalysisRequest,
    },
    LoadDocuments {
        seq: RequestSeq,
    },
    CreateDocument {
        seq: RequestSeq,
        document: NewDocument,
    },
    DeleteDocument {
        id: i64,
    },
}

/// Completed calls reported back to the UI.
#[derive(Debug)]
pub enum BackendEvent {
    SearchCompleted {
        seq: RequestSeq,
        outcome: Result<Vec<SearchResult>, crate::backend::BackendError>,
    },
    AnalysisCompleted {
        seq: RequestSeq,
        outcome: Result<AnalysisResult, crate::backend::BackendError>,
    },
    DocumentsLoaded {
        seq: RequestSeq,
        outcome: Result<Vec<VaultDocument>, crate::backend::BackendError>,
    },
    DocumentCreated {
        seq: RequestSeq,
        // Box to keep BackendEvent small; documents can carry large content.
        outcome: Result<Box<VaultDocument>, crate::backend::BackendError>,
    },
    DocumentDeleted {
        id: i64,
        outcome: Result<(), crate::backend::BackendError>,
    },
}
