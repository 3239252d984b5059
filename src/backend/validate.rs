//! Shape checks applied after decoding. A response that decodes but breaks these rules is
//! reported as [`BackendError::Contract`] instead of reaching the UI as a malformed entity.

use super::{BackendError, BackendResult};
use crate::model::{AnalysisResult, SearchResult, VaultDocument};

pub(super) fn search_results(results: &[SearchResult]) -> BackendResult<()> {
    for (idx, r) in results.iter().enumerate() {
        if r.title.trim().is_empty() {
            return Err(contract(format!("search result #{} has no title", idx + 1)));
        }
        if r.url.trim().is_empty() {
            return Err(contract(format!("search result #{} has no url", idx + 1)));
        }
        let score = r.relevance_score;
        if !score.is_finite() || !(0.0..=1.0).contains(&score) {
            return Err(contract(format!(
                "search result #{} has relevance_score {} outside [0, 1]",
                idx + 1,
                score
            )));
        }
    }
    Ok(())
}

pub(super) fn analysis(analysis: &AnalysisResult) -> BackendResult<()> {
    if analysis.summary.trim().is_empty() {
        return Err(contract("analysis has an empty summary".into()));
    }
    Ok(())
}

pub(super) fn document(doc: &VaultDocument) -> BackendResult<()> {
    if doc.title.trim().is_empty() {
        return Err(contract(format!("vault document {} has no title", doc.id)));
    }
    Ok(())
}

fn contract(msg: String) -> BackendError {
    BackendError::Contract(msg)
}
