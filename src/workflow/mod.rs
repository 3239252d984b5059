//! Workflow state machines for the search → analysis → vault flow.
//!
//! Everything here is synchronous and owned by a single thread. Components return the requests
//! they want issued and are told about completions; the orchestrator performs the I/O.

pub mod analysis;
pub mod dashboard;
pub mod search;
pub mod vault;

pub use dashboard::{Activation, DashboardController, Notice, NoticeLevel, View};
pub use search::{AnalysisOutcome, SearchOrchestrator, SearchOutcome, SearchPhase};
pub use vault::{CreateOrigin, FormField, VaultManager, VaultOutcome};
