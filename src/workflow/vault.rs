//! Vault document lifecycle: load, create and two-phase delete.

use crate::backend::BackendError;
use crate::model::{NewDocument, RequestSeq, VaultDocument};
use std::collections::{BTreeSet, HashMap};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CreateError {
    #[error("Please fill in title and content")]
    MissingFields,
}

/// Where a create request came from; only form submissions clear the form on success.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateOrigin {
    Form,
    Direct,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FormField {
    #[default]
    Title,
    Content,
    Tags,
}

impl FormField {
    pub fn next(self) -> Self {
        match self {
            FormField::Title => FormField::Content,
            FormField::Content => FormField::Tags,
            FormField::Tags => FormField::Title,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DocumentForm {
    pub visible: bool,
    pub focus: FormField,
    pub title: String,
    pub content: String,
    pub tags: String,
}

impl DocumentForm {
    pub fn field_mut(&mut self, field: FormField) -> &mut String {
        match field {
            FormField::Title => &mut self.title,
            FormField::Content => &mut self.content,
            FormField::Tags => &mut self.tags,
        }
    }

    fn clear(&mut self) {
        self.title.clear();
        self.content.clear();
        self.tags.clear();
        self.focus = FormField::Title;
    }
}

#[derive(Debug)]
pub enum VaultOutcome {
    Stale,
    Loaded(usize),
    Created(String),
    Deleted(i64),
    Failed(BackendError),
}

/// Split comma-separated tags, trimming each and dropping empty entries.
pub fn parse_tags(raw: &str) -> BTreeSet<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Default)]
pub struct VaultManager {
    documents: Vec<VaultDocument>,
    pending_removal: BTreeSet<i64>,
    pending_creates: HashMap<RequestSeq, CreateOrigin>,
    latest_load: Option<RequestSeq>,
    loaded: bool,
    next_seq: RequestSeq,
    selected: usize,
    pub expanded: bool,
    pub form: DocumentForm,
}

impl VaultManager {
    pub fn documents(&self) -> &[VaultDocument] {
        &self.documents
    }

    pub fn is_pending_removal(&self, id: i64) -> bool {
        self.pending_removal.contains(&id)
    }

    pub fn is_loading(&self) -> bool {
        self.latest_load.is_some()
    }

    pub fn is_saving(&self) -> bool {
        !self.pending_creates.is_empty()
    }

    /// True once at least one load has succeeded.
    pub fn has_loaded(&self) -> bool {
        self.loaded
    }

    pub fn selected(&self) -> Option<&VaultDocument> {
        self.documents.get(self.selected)
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.documents.len() {
            self.selected += 1;
        }
    }

    pub fn select_previous(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    fn clamp_selection(&mut self) {
        if self.selected >= self.documents.len() {
            self.selected = self.documents.len().saturating_sub(1);
        }
    }

    fn issue_seq(&mut self) -> RequestSeq {
        self.next_seq += 1;
        self.next_seq
    }

    pub fn load_documents(&mut self) -> RequestSeq {
        let seq = self.issue_seq();
        self.latest_load = Some(seq);
        seq
    }

    pub fn complete_load(
        &mut self,
        seq: RequestSeq,
        outcome: Result<Vec<VaultDocument>, BackendError>,
    ) -> VaultOutcome {
        if self.latest_load != Some(seq) {
            tracing::debug!(seq, "discarding superseded vault load");
            return VaultOutcome::Stale;
        }
        self.latest_load = None;
        match outcome {
            Ok(documents) => {
                self.documents = documents;
                self.loaded = true;
                let ids: BTreeSet<i64> = self.documents.iter().map(|d| d.id).collect();
                self.pending_removal.retain(|id| ids.contains(id));
                self.clamp_selection();
                VaultOutcome::Loaded(self.documents.len())
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to load vault documents");
                VaultOutcome::Failed(e)
            }
        }
    }

    /// Validate locally and build the creation request. Nothing is issued on error.
    pub fn create_document(
        &mut self,
        title: &str,
        content: &str,
        tags: &str,
        origin: CreateOrigin,
    ) -> Result<(RequestSeq, NewDocument), CreateError> {
        if title.trim().is_empty() || content.trim().is_empty() {
            return Err(CreateError::MissingFields);
        }
        let seq = self.issue_seq();
        self.pending_creates.insert(seq, origin);
        Ok((
            seq,
            NewDocument {
                title: title.to_string(),
                content: content.to_string(),
                tags: parse_tags(tags),
            },
        ))
    }

    pub fn submit_form(&mut self) -> Result<(RequestSeq, NewDocument), CreateError> {
        let DocumentForm {
            title,
            content,
            tags,
            ..
        } = self.form.clone();
        self.create_document(&title, &content, &tags, CreateOrigin::Form)
    }

    pub fn complete_create(
        &mut self,
        seq: RequestSeq,
        outcome: Result<VaultDocument, BackendError>,
    ) -> VaultOutcome {
        let Some(origin) = self.pending_creates.remove(&seq) else {
            return VaultOutcome::Stale;
        };
        match outcome {
            Ok(doc) => {
                let title = doc.title.clone();
                // A reload that finished first may already list it.
                match self.documents.iter().position(|d| d.id == doc.id) {
                    Some(idx) => self.selected = idx,
                    None => {
                        self.documents.insert(0, doc);
                        self.selected = 0;
                    }
                }
                if origin == CreateOrigin::Form {
                    self.form.clear();
                    self.form.visible = false;
                }
                VaultOutcome::Created(title)
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to save vault document");
                VaultOutcome::Failed(e)
            }
        }
    }

    /// Mark a document for removal and return the id to delete. The document stays listed
    /// until the backend confirms.
    pub fn delete_document(&mut self, id: i64) -> Option<i64> {
        if !self.documents.iter().any(|d| d.id == id) || self.pending_removal.contains(&id) {
            return None;
        }
        self.pending_removal.insert(id);
        Some(id)
    }

    pub fn complete_delete(&mut self, id: i64, outcome: Result<(), BackendError>) -> VaultOutcome {
        if !self.pending_removal.remove(&id) {
            return VaultOutcome::Stale;
        }
        match outcome {
            Ok(()) => {
                self.documents.retain(|d| d.id != id);
                self.clamp_selection();
                VaultOutcome::Deleted(id)
            }
            Err(e) => {
                tracing::warn!(id, error = %e, "failed to delete vault document");
                VaultOutcome::Failed(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn doc(id: i64, title: &str) -> VaultDocument {
        VaultDocument {
            id,
            title: title.into(),
            content: "content".into(),
            encrypted: true,
            created_at: "2026-10-19T10:00:00Z".into(),
            tags: BTreeSet::new(),
        }
    }

    fn failure() -> BackendError {
        BackendError::Contract("simulated".into())
    }

    fn ids(v: &VaultManager) -> Vec<i64> {
        v.documents().iter().map(|d| d.id).collect()
    }

    #[test]
    fn tags_are_trimmed_and_empties_dropped() {
        let tags = parse_tags("a, b ,");
        assert_eq!(tags.into_iter().collect::<Vec<_>>(), vec!["a", "b"]);
        assert!(parse_tags("").is_empty());
        assert!(parse_tags(" , ,").is_empty());
    }

    #[test]
    fn blank_title_or_content_fails_locally() {
        let mut v = VaultManager::default();
        assert_eq!(
            v.create_document("", "x", "", CreateOrigin::Direct),
            Err(CreateError::MissingFields)
        );
        assert_eq!(
            v.create_document("x", "  ", "", CreateOrigin::Direct),
            Err(CreateError::MissingFields)
        );
        assert!(!v.is_saving());
    }

    #[test]
    fn created_document_is_prepended_and_form_cleared() {
        let mut v = VaultManager::default();
        let seq = v.load_documents();
        v.complete_load(seq, Ok(vec![doc(1, "old")]));

        v.form.visible = true;
        v.form.title = "T".into();
        v.form.content = "C".into();
        v.form.tags = "a, b ,".into();
        let (seq, new_doc) = v.submit_form().unwrap();
        assert_eq!(new_doc.tags.iter().map(String::as_str).collect::<Vec<_>>(), vec!["a", "b"]);

        let mut created = doc(2, "T");
        created.tags = new_doc.tags.clone();
        assert!(matches!(v.complete_create(seq, Ok(created)), VaultOutcome::Created(_)));
        assert_eq!(ids(&v), vec![2, 1]);
        assert!(v.form.title.is_empty() && v.form.content.is_empty() && v.form.tags.is_empty());
        assert!(!v.form.visible);
    }

    #[test]
    fn reload_during_create_does_not_duplicate() {
        let mut v = VaultManager::default();
        let (create_seq, _) = v
            .create_document("Solar", "notes", "", CreateOrigin::Direct)
            .unwrap();
        let load_seq = v.load_documents();
        v.complete_load(load_seq, Ok(vec![doc(7, "other"), doc(10, "Solar")]));

        assert!(matches!(
            v.complete_create(create_seq, Ok(doc(10, "Solar"))),
            VaultOutcome::Created(_)
        ));
        assert_eq!(ids(&v), vec![7, 10]);
        assert_eq!(v.selected().map(|d| d.id), Some(10));
    }

    #[test]
    fn failed_create_keeps_form_for_retry() {
        let mut v = VaultManager::default();
        v.form.title = "T".into();
        v.form.content = "C".into();
        let (seq, _) = v.submit_form().unwrap();
        assert!(matches!(v.complete_create(seq, Err(failure())), VaultOutcome::Failed(_)));
        assert_eq!(v.form.title, "T");
        assert_eq!(v.form.content, "C");
        assert!(v.documents().is_empty());
    }

    #[test]
    fn direct_create_leaves_form_alone() {
        let mut v = VaultManager::default();
        v.form.title = "draft".into();
        let (seq, _) = v
            .create_document("Analysis: q", "body", "analysis", CreateOrigin::Direct)
            .unwrap();
        v.complete_create(seq, Ok(doc(5, "Analysis: q")));
        assert_eq!(v.form.title, "draft");
    }

    #[test]
    fn reload_replaces_optimistic_state_wholesale() {
        let mut v = VaultManager::default();
        let (seq, _) = v
            .create_document("T", "C", "", CreateOrigin::Direct)
            .unwrap();
        v.complete_create(seq, Ok(doc(10, "T")));
        assert_eq!(ids(&v), vec![10]);

        let seq = v.load_documents();
        v.complete_load(seq, Ok(vec![doc(11, "other"), doc(10, "T"), doc(3, "x")]));
        assert_eq!(ids(&v), vec![11, 10, 3]);
    }

    #[test]
    fn empty_vault_loads_empty() {
        let mut v = VaultManager::default();
        let seq = v.load_documents();
        assert!(v.is_loading());
        assert!(matches!(v.complete_load(seq, Ok(Vec::new())), VaultOutcome::Loaded(0)));
        assert!(v.documents().is_empty());
        assert!(v.has_loaded());
    }

    #[test]
    fn failed_load_keeps_existing_list() {
        let mut v = VaultManager::default();
        let seq = v.load_documents();
        v.complete_load(seq, Ok(vec![doc(1, "a")]));
        let seq = v.load_documents();
        assert!(matches!(v.complete_load(seq, Err(failure())), VaultOutcome::Failed(_)));
        assert_eq!(ids(&v), vec![1]);
    }

    #[test]
    fn superseded_load_is_discarded() {
        let mut v = VaultManager::default();
        let first = v.load_documents();
        let second = v.load_documents();
        v.complete_load(second, Ok(vec![doc(2, "new")]));
        assert!(matches!(
            v.complete_load(first, Ok(vec![doc(1, "old")])),
            VaultOutcome::Stale
        ));
        assert_eq!(ids(&v), vec![2]);
    }

    #[test]
    fn confirmed_delete_removes_document() {
        let mut v = VaultManager::default();
        let seq = v.load_documents();
        v.complete_load(seq, Ok(vec![doc(1, "a"), doc(2, "b")]));

        assert_eq!(v.delete_document(1), Some(1));
        assert!(v.is_pending_removal(1));
        assert_eq!(ids(&v), vec![1, 2]);
        assert_eq!(v.delete_document(1), None);

        assert!(matches!(v.complete_delete(1, Ok(())), VaultOutcome::Deleted(1)));
        assert_eq!(ids(&v), vec![2]);
        assert!(!v.is_pending_removal(1));
    }

    #[test]
    fn failed_delete_restores_document() {
        let mut v = VaultManager::default();
        let seq = v.load_documents();
        v.complete_load(seq, Ok(vec![doc(1, "a")]));
        v.delete_document(1);
        assert!(matches!(v.complete_delete(1, Err(failure())), VaultOutcome::Failed(_)));
        assert_eq!(ids(&v), vec![1]);
        assert!(!v.is_pending_removal(1));
    }

    #[test]
    fn delete_of_unknown_id_issues_nothing() {
        let mut v = VaultManager::default();
        assert_eq!(v.delete_document(99), None);
    }

    #[test]
    fn selection_clamps_after_delete() {
        let mut v = VaultManager::default();
        let seq = v.load_documents();
        v.complete_load(seq, Ok(vec![doc(1, "a"), doc(2, "b")]));
        v.select_next();
        assert_eq!(v.selected_index(), 1);
        v.delete_document(2);
        v.complete_delete(2, Ok(()));
        assert_eq!(v.selected().map(|d| d.id), Some(1));
    }
}
