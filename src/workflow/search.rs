//! Search orchestration: query submission, request tokens and analysis requests.
//!
//! The orchestrator never performs I/O. `execute_*` returns the request to send together with
//! a sequence token, and `complete_*` consumes the matching response. Responses whose token is
//! older than the latest request of the same kind are dropped, so the newest request always
//! wins regardless of arrival order.
//!
//! The result set itself is handed upward on success and owned by the dashboard; this type keeps
//! only what it needs to drive the workflow (query, size, cursor, generation).

use crate::backend::BackendError;
use crate::model::{
    AnalysisRequest, AnalysisResult, RequestSeq, SearchRequest, SearchResult, SourceFilter,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SearchPhase {
    #[default]
    Idle,
    Searching,
    ResultsReady,
    SearchFailed,
    Analyzing,
}

#[derive(Debug)]
pub enum SearchOutcome {
    /// Superseded by a newer search; nothing changed.
    Stale,
    Ready(Vec<SearchResult>),
    Failed(BackendError),
}

#[derive(Debug)]
pub enum AnalysisOutcome {
    Stale,
    /// `outdated` is set when a newer result set arrived while the analysis was in flight.
    Ready {
        query: String,
        result: AnalysisResult,
        outdated: bool,
    },
    Failed(BackendError),
}

#[derive(Debug)]
struct PendingAnalysis {
    seq: RequestSeq,
    query: String,
    generation: u64,
}

#[derive(Debug, Default)]
pub struct SearchOrchestrator {
    phase: SearchPhase,
    source_filter: SourceFilter,
    /// Query that produced the current result set.
    results_query: Option<String>,
    result_count: usize,
    /// Bumped on every successful search.
    generation: u64,
    selected: usize,
    searched: bool,
    last_search_failed: bool,
    next_seq: RequestSeq,
    latest_search: Option<(RequestSeq, String)>,
    latest_analysis: Option<PendingAnalysis>,
}

impl SearchOrchestrator {
    pub fn phase(&self) -> SearchPhase {
        self.phase
    }

    pub fn results_query(&self) -> Option<&str> {
        self.results_query.as_deref()
    }

    pub fn source_filter(&self) -> SourceFilter {
        self.source_filter
    }

    pub fn cycle_source_filter(&mut self) -> SourceFilter {
        self.source_filter = self.source_filter.next();
        self.source_filter
    }

    /// Whether any search has been submitted in this session.
    pub fn has_searched(&self) -> bool {
        self.searched
    }

    /// True when the most recent completed search failed. Survives an analysis finishing.
    pub fn last_search_failed(&self) -> bool {
        self.last_search_failed
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.result_count {
            self.selected += 1;
        }
    }

    pub fn select_previous(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    fn issue_seq(&mut self) -> RequestSeq {
        self.next_seq += 1;
        self.next_seq
    }

    fn settled_phase(&self) -> SearchPhase {
        if self.last_search_failed {
            SearchPhase::SearchFailed
        } else if self.results_query.is_some() {
            SearchPhase::ResultsReady
        } else {
            SearchPhase::Idle
        }
    }

    /// Start a search. Returns `None` (and issues nothing) for an empty or blank query.
    pub fn execute_search(
        &mut self,
        query: &str,
        source_filter: SourceFilter,
        limit: u32,
    ) -> Option<(RequestSeq, SearchRequest)> {
        if query.trim().is_empty() {
            return None;
        }
        self.source_filter = source_filter;
        self.searched = true;
        let seq = self.issue_seq();
        self.latest_search = Some((seq, query.to_string()));
        self.phase = SearchPhase::Searching;
        tracing::debug!(seq, filter = source_filter.label(), "search issued");
        Some((
            seq,
            SearchRequest {
                query: query.to_string(),
                limit,
            },
        ))
    }

    pub fn complete_search(
        &mut self,
        seq: RequestSeq,
        outcome: Result<Vec<SearchResult>, BackendError>,
    ) -> SearchOutcome {
        let query = match self.latest_search.take() {
            Some((latest, query)) if latest == seq => query,
            other => {
                self.latest_search = other;
                tracing::debug!(seq, "discarding superseded search response");
                return SearchOutcome::Stale;
            }
        };

        match outcome {
            Ok(results) => {
                self.results_query = Some(query);
                self.result_count = results.len();
                self.generation += 1;
                self.selected = 0;
                self.last_search_failed = false;
                self.phase = if self.latest_analysis.is_some() {
                    SearchPhase::Analyzing
                } else {
                    SearchPhase::ResultsReady
                };
                SearchOutcome::Ready(results)
            }
            Err(e) => {
                tracing::warn!(seq, error = %e, "search failed");
                self.last_search_failed = true;
                self.phase = if self.latest_analysis.is_some() {
                    SearchPhase::Analyzing
                } else {
                    SearchPhase::SearchFailed
                };
                SearchOutcome::Failed(e)
            }
        }
    }

    /// Request a synthesis over `results`. No-op when there is nothing to analyze.
    pub fn execute_analysis(
        &mut self,
        query: &str,
        results: &[SearchResult],
    ) -> Option<(RequestSeq, AnalysisRequest)> {
        if results.is_empty() {
            return None;
        }
        let seq = self.issue_seq();
        self.latest_analysis = Some(PendingAnalysis {
            seq,
            query: query.to_string(),
            generation: self.generation,
        });
        if self.latest_search.is_none() {
            self.phase = SearchPhase::Analyzing;
        }
        tracing::debug!(seq, results = results.len(), "analysis issued");
        Some((
            seq,
            AnalysisRequest {
                query: query.to_string(),
                search_results: results.to_vec(),
            },
        ))
    }

    /// Analyze `results` (the last completed result set) with the query that produced it.
    pub fn analyze_current(
        &mut self,
        results: &[SearchResult],
    ) -> Option<(RequestSeq, AnalysisRequest)> {
        let query = self.results_query.clone().unwrap_or_default();
        self.execute_analysis(&query, results)
    }

    pub fn complete_analysis(
        &mut self,
        seq: RequestSeq,
        outcome: Result<AnalysisResult, BackendError>,
    ) -> AnalysisOutcome {
        let pending = match self.latest_analysis.take() {
            Some(p) if p.seq == seq => p,
            other => {
                self.latest_analysis = other;
                tracing::debug!(seq, "discarding superseded analysis response");
                return AnalysisOutcome::Stale;
            }
        };

        if self.phase == SearchPhase::Analyzing {
            self.phase = self.settled_phase();
        }

        match outcome {
            Ok(result) => {
                let outdated = pending.generation != self.generation;
                if outdated {
                    tracing::debug!(seq, "analysis describes an older result set");
                }
                AnalysisOutcome::Ready {
                    query: pending.query,
                    result,
                    outdated,
                }
            }
            Err(e) => {
                tracing::warn!(seq, error = %e, "analysis failed");
                AnalysisOutcome::Failed(e)
            }
        }
    }
}
