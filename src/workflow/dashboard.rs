//! Top-level coordinator: the active view, the shared "last results" / "last analysis" values
//! and the notice queue that every operation reports failures into.

use crate::model::{AnalysisResult, SearchResult};
use std::collections::VecDeque;

const MAX_NOTICES: usize = 8;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum View {
    #[default]
    Search,
    Analysis,
    Vault,
}

impl View {
    pub const ALL: [View; 3] = [View::Search, View::Analysis, View::Vault];

    pub fn title(self) -> &'static str {
        match self {
            View::Search => "Search",
            View::Analysis => "Analysis",
            View::Vault => "Vault",
        }
    }

    pub fn index(self) -> usize {
        match self {
            View::Search => 0,
            View::Analysis => 1,
            View::Vault => 2,
        }
    }

    pub fn next(self) -> Self {
        match self {
            View::Search => View::Analysis,
            View::Analysis => View::Vault,
            View::Vault => View::Search,
        }
    }

    pub fn previous(self) -> Self {
        match self {
            View::Search => View::Vault,
            View::Analysis => View::Search,
            View::Vault => View::Analysis,
        }
    }

    pub fn from_digit(c: char) -> Option<Self> {
        match c {
            '1' => Some(View::Search),
            '2' => Some(View::Analysis),
            '3' => Some(View::Vault),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            text: text.into(),
        }
    }
}

/// The last completed analysis together with the query it answered.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisSlot {
    pub query: String,
    pub result: AnalysisResult,
    /// Set once a newer search has completed; the analysis no longer describes the results.
    pub stale: bool,
}

/// What the caller must do after a view change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    None,
    LoadVault,
}

#[derive(Debug, Default)]
pub struct DashboardController {
    active_view: View,
    last_results: Vec<SearchResult>,
    last_analysis: Option<AnalysisSlot>,
    notices: VecDeque<Notice>,
}

impl DashboardController {
    pub fn active_view(&self) -> View {
        self.active_view
    }

    pub fn last_results(&self) -> &[SearchResult] {
        &self.last_results
    }

    pub fn last_analysis(&self) -> Option<&AnalysisSlot> {
        self.last_analysis.as_ref()
    }

    /// Switch views. Activating the vault asks the caller to (re)load documents.
    pub fn select_view(&mut self, view: View) -> Activation {
        self.active_view = view;
        if view == View::Vault {
            Activation::LoadVault
        } else {
            Activation::None
        }
    }

    pub fn on_search_completed(&mut self, results: Vec<SearchResult>) {
        self.last_results = results;
        if let Some(slot) = self.last_analysis.as_mut() {
            slot.stale = true;
        }
    }

    /// Store a completed analysis. `outdated` marks one that was overtaken in flight by a newer
    /// result set; it is kept but never presented as current.
    pub fn on_analysis_completed(
        &mut self,
        query: String,
        result: AnalysisResult,
        outdated: bool,
    ) {
        self.last_analysis = Some(AnalysisSlot {
            query,
            result,
            stale: outdated,
        });
    }

    pub fn push_notice(&mut self, notice: Notice) {
        self.notices.push_back(notice);
        while self.notices.len() > MAX_NOTICES {
            self.notices.pop_front();
        }
    }

    pub fn latest_notice(&self) -> Option<&Notice> {
        self.notices.back()
    }

    pub fn dismiss_notice(&mut self) -> Option<Notice> {
        self.notices.pop_back()
    }
}
