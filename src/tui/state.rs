use crate::model::{BackendCommand, BackendEvent};
use crate::workflow::analysis::to_plain_text;
use crate::workflow::{
    Activation, AnalysisOutcome, CreateOrigin, DashboardController, FormField, Notice,
    SearchOrchestrator, SearchOutcome, VaultManager, VaultOutcome, View,
};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InputMode {
    #[default]
    Normal,
    EditingQuery,
}

/// Side effects that touch the desktop rather than the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Copy { text: String, what: &'static str },
    OpenUrl(String),
    ExportAnalysis,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    Continue,
    Quit,
}

/// Everything the UI thread owns. Nothing here is shared with the controller.
#[derive(Debug, Default)]
pub struct UiState {
    pub api_url: String,
    pub search_limit: u32,
    pub dashboard: DashboardController,
    pub search: SearchOrchestrator,
    pub vault: VaultManager,
    pub query: String,
    pub mode: InputMode,
    pub show_help: bool,
    pub direction_selected: usize,
    pub last_exported_path: Option<String>,
    outbox: Vec<BackendCommand>,
    effects: Vec<Effect>,
}

impl UiState {
    pub fn new(api_url: String, search_limit: u32) -> Self {
        Self {
            api_url,
            search_limit,
            ..Default::default()
        }
    }

    /// Backend calls queued since the last drain.
    pub fn take_commands(&mut self) -> Vec<BackendCommand> {
        std::mem::take(&mut self.outbox)
    }

    pub fn take_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }

    pub fn notify(&mut self, notice: Notice) {
        self.dashboard.push_notice(notice);
    }

    pub fn select_view(&mut self, view: View) {
        if self.dashboard.select_view(view) == Activation::LoadVault {
            self.reload_vault();
        }
    }

    fn reload_vault(&mut self) {
        let seq = self.vault.load_documents();
        self.outbox.push(BackendCommand::LoadDocuments { seq });
    }

    fn submit_query(&mut self) {
        let filter = self.search.source_filter();
        match self
            .search
            .execute_search(&self.query, filter, self.search_limit)
        {
            Some((seq, request)) => self.outbox.push(BackendCommand::Search { seq, request }),
            None => self.notify(Notice::info("Type a research question first")),
        }
    }

    fn analyze(&mut self) {
        match self.search.analyze_current(self.dashboard.last_results()) {
            Some((seq, request)) => self.outbox.push(BackendCommand::Analyze { seq, request }),
            None => self.notify(Notice::info("Nothing to analyze. Run a search first.")),
        }
    }

    fn directions_len(&self) -> usize {
        self.dashboard
            .last_analysis()
            .map(|a| a.result.next_research_directions.len())
            .unwrap_or(0)
    }

    fn use_selected_direction(&mut self) {
        let Some(direction) = self
            .dashboard
            .last_analysis()
            .and_then(|a| a.result.next_research_directions.get(self.direction_selected))
            .cloned()
        else {
            return;
        };
        self.query = direction;
        self.select_view(View::Search);
        self.mode = InputMode::EditingQuery;
    }

    fn save_analysis(&mut self) {
        let Some(slot) = self.dashboard.last_analysis() else {
            self.notify(Notice::info("No analysis to save yet"));
            return;
        };
        let title = format!("Analysis: {}", slot.query);
        let content = to_plain_text(&slot.result);
        match self
            .vault
            .create_document(&title, &content, "analysis", CreateOrigin::Direct)
        {
            Ok((seq, document)) => {
                self.outbox
                    .push(BackendCommand::CreateDocument { seq, document });
                self.notify(Notice::info("Saving analysis to vault…"));
            }
            Err(e) => self.notify(Notice::error(e.to_string())),
        }
    }

    fn pin_selected_result(&mut self) {
        let Some(r) = self
            .dashboard
            .last_results()
            .get(self.search.selected_index())
            .cloned()
        else {
            return;
        };
        let content = format!("{}\n\n{}", r.url, r.snippet.trim());
        match self
            .vault
            .create_document(&r.title, content.trim_end(), &r.source, CreateOrigin::Direct)
        {
            Ok((seq, document)) => {
                self.outbox
                    .push(BackendCommand::CreateDocument { seq, document });
                self.notify(Notice::info(format!("Saving \"{}\" to vault…", r.title)));
            }
            Err(e) => self.notify(Notice::error(e.to_string())),
        }
    }

    fn submit_form(&mut self) {
        match self.vault.submit_form() {
            Ok((seq, document)) => self
                .outbox
                .push(BackendCommand::CreateDocument { seq, document }),
            Err(e) => self.notify(Notice::error(e.to_string())),
        }
    }

    fn delete_selected(&mut self) {
        let Some(id) = self.vault.selected().map(|d| d.id) else {
            return;
        };
        if let Some(id) = self.vault.delete_document(id) {
            self.outbox.push(BackendCommand::DeleteDocument { id });
        }
    }

    pub fn handle_key(&mut self, k: KeyEvent) -> KeyOutcome {
        if k.modifiers.contains(KeyModifiers::CONTROL) && k.code == KeyCode::Char('c') {
            return KeyOutcome::Quit;
        }

        if self.show_help {
            match k.code {
                KeyCode::Char('q') => return KeyOutcome::Quit,
                KeyCode::Esc | KeyCode::Char('?') => self.show_help = false,
                _ => {}
            }
            return KeyOutcome::Continue;
        }

        if self.mode == InputMode::EditingQuery {
            self.handle_query_key(k);
            return KeyOutcome::Continue;
        }

        if self.dashboard.active_view() == View::Vault && self.vault.form.visible {
            self.handle_form_key(k);
            return KeyOutcome::Continue;
        }

        match k.code {
            KeyCode::Char('q') => return KeyOutcome::Quit,
            KeyCode::Char('?') => self.show_help = true,
            KeyCode::Esc => {
                self.dashboard.dismiss_notice();
            }
            KeyCode::Tab => self.select_view(self.dashboard.active_view().next()),
            KeyCode::BackTab => self.select_view(self.dashboard.active_view().previous()),
            KeyCode::Char(c @ '1'..='3') => {
                if let Some(view) = View::from_digit(c) {
                    self.select_view(view);
                }
            }
            _ => match self.dashboard.active_view() {
                View::Search => self.handle_search_key(k),
                View::Analysis => self.handle_analysis_key(k),
                View::Vault => self.handle_vault_key(k),
            },
        }
        KeyOutcome::Continue
    }

    fn handle_query_key(&mut self, k: KeyEvent) {
        match k.code {
            KeyCode::Enter => {
                self.mode = InputMode::Normal;
                self.submit_query();
            }
            KeyCode::Esc => self.mode = InputMode::Normal,
            KeyCode::Backspace => {
                self.query.pop();
            }
            KeyCode::Char(c) => self.query.push(c),
            _ => {}
        }
    }

    fn handle_form_key(&mut self, k: KeyEvent) {
        if k.modifiers.contains(KeyModifiers::CONTROL) && k.code == KeyCode::Char('s') {
            self.submit_form();
            return;
        }
        let form = &mut self.vault.form;
        let focus = form.focus;
        match k.code {
            KeyCode::Esc => form.visible = false,
            KeyCode::Tab => form.focus = form.focus.next(),
            KeyCode::Enter => {
                if focus == FormField::Content {
                    form.content.push('\n');
                } else {
                    form.focus = form.focus.next();
                }
            }
            KeyCode::Backspace => {
                form.field_mut(focus).pop();
            }
            KeyCode::Char(c) => form.field_mut(focus).push(c),
            _ => {}
        }
    }

    fn handle_search_key(&mut self, k: KeyEvent) {
        match k.code {
            KeyCode::Char('/') | KeyCode::Char('i') => self.mode = InputMode::EditingQuery,
            KeyCode::Enter => self.submit_query(),
            KeyCode::Char('f') => {
                let filter = self.search.cycle_source_filter();
                self.notify(Notice::info(format!("Source filter: {}", filter.label())));
            }
            KeyCode::Char('a') => self.analyze(),
            KeyCode::Down | KeyCode::Char('j') => self.search.select_next(),
            KeyCode::Up | KeyCode::Char('k') => self.search.select_previous(),
            KeyCode::Char('p') => self.pin_selected_result(),
            KeyCode::Char('o') => {
                if let Some(r) = self.dashboard.last_results().get(self.search.selected_index()) {
                    self.effects.push(Effect::OpenUrl(r.url.clone()));
                }
            }
            KeyCode::Char('y') => {
                if let Some(r) = self.dashboard.last_results().get(self.search.selected_index()) {
                    self.effects.push(Effect::Copy {
                        text: r.url.clone(),
                        what: "URL",
                    });
                }
            }
            _ => {}
        }
    }

    fn handle_analysis_key(&mut self, k: KeyEvent) {
        match k.code {
            KeyCode::Down | KeyCode::Char('j') => {
                if self.direction_selected + 1 < self.directions_len() {
                    self.direction_selected += 1;
                }
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.direction_selected = self.direction_selected.saturating_sub(1);
            }
            KeyCode::Enter => self.use_selected_direction(),
            KeyCode::Char('s') => self.save_analysis(),
            KeyCode::Char('e') => {
                if self.dashboard.last_analysis().is_some() {
                    self.effects.push(Effect::ExportAnalysis);
                } else {
                    self.notify(Notice::info("No analysis to export yet"));
                }
            }
            KeyCode::Char('y') => match self.last_exported_path.clone() {
                Some(path) => self.effects.push(Effect::Copy {
                    text: path,
                    what: "path",
                }),
                None => self.notify(Notice::info(
                    "No exported file path to copy. Export the analysis first (e)",
                )),
            },
            _ => {}
        }
    }

    fn handle_vault_key(&mut self, k: KeyEvent) {
        match k.code {
            KeyCode::Char('n') => {
                self.vault.form.visible = true;
            }
            KeyCode::Char('d') => self.delete_selected(),
            KeyCode::Char('r') => self.reload_vault(),
            KeyCode::Enter => self.vault.expanded = !self.vault.expanded,
            KeyCode::Down | KeyCode::Char('j') => self.vault.select_next(),
            KeyCode::Up | KeyCode::Char('k') => self.vault.select_previous(),
            KeyCode::Char('y') => {
                if let Some(d) = self.vault.selected() {
                    self.effects.push(Effect::Copy {
                        text: d.content.clone(),
                        what: "document content",
                    });
                }
            }
            _ => {}
        }
    }

    /// Fold a completed backend call into the workflow state.
    pub fn apply_event(&mut self, ev: BackendEvent) {
        match ev {
            BackendEvent::SearchCompleted { seq, outcome } => {
                match self.search.complete_search(seq, outcome) {
                    SearchOutcome::Ready(results) => {
                        self.dashboard.on_search_completed(results);
                    }
                    SearchOutcome::Failed(e) => {
                        let text = format!(
                            "Search failed: {e}. Make sure the backend is running on {}",
                            self.api_url
                        );
                        self.notify(Notice::error(text));
                    }
                    SearchOutcome::Stale => {}
                }
            }
            BackendEvent::AnalysisCompleted { seq, outcome } => {
                match self.search.complete_analysis(seq, outcome) {
                    AnalysisOutcome::Ready {
                        query,
                        result,
                        outdated,
                    } => {
                        self.dashboard.on_analysis_completed(query, result, outdated);
                        self.direction_selected = 0;
                        if outdated {
                            self.notify(Notice::info("Analysis finished for a previous search"));
                        } else if self.dashboard.active_view() != View::Analysis {
                            self.notify(Notice::info("Analysis ready (press 2 to view)"));
                        }
                    }
                    AnalysisOutcome::Failed(e) => {
                        self.notify(Notice::error(format!("Analysis failed: {e}")));
                    }
                    AnalysisOutcome::Stale => {}
                }
            }
            BackendEvent::DocumentsLoaded { seq, outcome } => {
                match self.vault.complete_load(seq, outcome) {
                    VaultOutcome::Loaded(n) => tracing::debug!(documents = n, "vault loaded"),
                    VaultOutcome::Failed(e) => {
                        self.notify(Notice::error(format!("Failed to load vault: {e}")));
                    }
                    _ => {}
                }
            }
            BackendEvent::DocumentCreated { seq, outcome } => {
                match self.vault.complete_create(seq, outcome.map(|d| *d)) {
                    VaultOutcome::Created(title) => {
                        self.notify(Notice::info(format!("Saved \"{title}\" to vault")));
                    }
                    VaultOutcome::Failed(e) => {
                        self.notify(Notice::error(format!("Failed to save document: {e}")));
                    }
                    _ => {}
                }
            }
            BackendEvent::DocumentDeleted { id, outcome } => {
                match self.vault.complete_delete(id, outcome) {
                    VaultOutcome::Deleted(id) => {
                        self.notify(Notice::info(format!("Document {id} deleted")));
                    }
                    VaultOutcome::Failed(e) => {
                        self.notify(Notice::error(format!("Failed to delete document: {e}")));
                    }
                    _ => {}
                }
            }
        }
    }
}
