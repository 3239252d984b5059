use super::help::draw_help;
use super::state::{InputMode, UiState};
use crate::display::{ellipsize, format_date};
use crate::model::SourceFilter;
use crate::workflow::analysis::{present, SectionKind};
use crate::workflow::{FormField, NoticeLevel, SearchPhase, View};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Tabs, Wrap},
    Frame,
};

const QUERY_PLACEHOLDER: &str = "Ask anything... research, predictions, trends, analysis";
const EXAMPLE_QUERIES: [(&str, &str); 4] = [
    ("Research", "AI capabilities in healthcare"),
    ("Trends", "Emerging tech in 2026"),
    ("Compare", "Climate policies EU vs US"),
    ("Predict", "Stock market trends"),
];

fn key_style() -> Style {
    Style::default().fg(Color::Magenta)
}

fn dim() -> Style {
    Style::default().fg(Color::DarkGray)
}

fn heading_style() -> Style {
    Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD)
}

/// Scroll offset that keeps `target_line` inside a viewport of `height` lines.
fn scroll_to(target_line: usize, height: u16) -> u16 {
    let visible = height.saturating_sub(2).max(1) as usize;
    target_line.saturating_sub(visible.saturating_sub(1)) as u16
}

pub fn draw(area: Rect, f: &mut Frame, state: &UiState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    let titles: Vec<Line> = View::ALL
        .iter()
        .map(|v| Line::from(format!("{} {}", v.index() + 1, v.title())))
        .collect();
    let tabs = Tabs::new(titles)
        .select(state.dashboard.active_view().index())
        .block(Block::default().borders(Borders::ALL).title("omnimind"))
        .highlight_style(Style::default().fg(Color::Yellow));
    f.render_widget(tabs, chunks[0]);

    match state.dashboard.active_view() {
        View::Search => draw_search(chunks[1], f, state),
        View::Analysis => draw_analysis(chunks[1], f, state),
        View::Vault => draw_vault(chunks[1], f, state),
    }

    draw_status(chunks[2], f, state);

    if state.show_help {
        let w = area.width.min(64);
        let h = area.height.min(30);
        let overlay = Rect {
            x: area.x + (area.width - w) / 2,
            y: area.y + (area.height - h) / 2,
            width: w,
            height: h,
        };
        f.render_widget(Clear, overlay);
        draw_help(overlay, f);
    }
}

fn draw_status(area: Rect, f: &mut Frame, state: &UiState) {
    let mut spans = vec![Span::styled(state.api_url.clone(), dim()), Span::raw("  ")];
    match state.dashboard.latest_notice() {
        Some(n) => {
            let color = match n.level {
                NoticeLevel::Info => Color::Green,
                NoticeLevel::Error => Color::Red,
            };
            spans.push(Span::styled(n.text.clone(), Style::default().fg(color)));
            spans.push(Span::styled("  (Esc to dismiss)", dim()));
        }
        None => {
            spans.push(Span::styled("?", key_style()));
            spans.push(Span::styled(" help  ", dim()));
            spans.push(Span::styled("q", key_style()));
            spans.push(Span::styled(" quit", dim()));
        }
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_search(area: Rect, f: &mut Frame, state: &UiState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(area);

    let editing = state.mode == InputMode::EditingQuery;
    let input_line = if state.query.is_empty() && !editing {
        Line::from(Span::styled(QUERY_PLACEHOLDER, dim()))
    } else if editing {
        Line::from(vec![Span::raw(state.query.clone()), Span::raw("▏")])
    } else {
        Line::from(state.query.clone())
    };
    let input_block = Block::default()
        .borders(Borders::ALL)
        .title(if editing {
            "Query (Enter to search, Esc to cancel)"
        } else {
            "Query (/ to edit)"
        })
        .border_style(if editing {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        });
    f.render_widget(Paragraph::new(input_line).block(input_block), chunks[0]);

    let mut filter_spans = vec![Span::styled(" Sources: ", dim())];
    for filter in SourceFilter::ALL {
        let style = if filter == state.search.source_filter() {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        } else {
            dim()
        };
        filter_spans.push(Span::styled(format!("[{}]", filter.label()), style));
        filter_spans.push(Span::raw(" "));
    }
    match state.search.phase() {
        SearchPhase::Searching => {
            filter_spans.push(Span::styled(" Searching…", Style::default().fg(Color::Cyan)))
        }
        SearchPhase::Analyzing => {
            filter_spans.push(Span::styled(" Analyzing…", Style::default().fg(Color::Cyan)))
        }
        _ => {}
    }
    f.render_widget(Paragraph::new(Line::from(filter_spans)), chunks[1]);

    let results = state.dashboard.last_results();
    let block = Block::default().borders(Borders::ALL).title(match state.search.results_query() {
        Some(q) if !results.is_empty() => format!("Results for \"{}\" ({})", q, results.len()),
        _ => "Results".to_string(),
    });

    if results.is_empty() {
        let lines = if state.search.phase() == SearchPhase::Searching {
            vec![Line::from(Span::styled("Searching…", dim()))]
        } else if state.search.last_search_failed() {
            vec![Line::from(Span::styled(
                "Search failed. Check that the backend is running and try again.",
                Style::default().fg(Color::Red),
            ))]
        } else if state.search.has_searched() {
            vec![Line::from("No results found. Try a different query.")]
        } else {
            let mut lines = vec![Line::from("Start by asking a research question"), Line::from("")];
            for (label, example) in EXAMPLE_QUERIES {
                lines.push(Line::from(vec![
                    Span::styled(format!("  {label:<9}"), heading_style()),
                    Span::styled(example, dim()),
                ]));
            }
            lines
        };
        f.render_widget(Paragraph::new(lines).block(block), chunks[2]);
        return;
    }

    let width = chunks[2].width.saturating_sub(6) as usize;
    let mut lines: Vec<Line> = Vec::new();
    let mut selected_line = 0;
    for (idx, r) in results.iter().enumerate() {
        let selected = idx == state.search.selected_index();
        if selected {
            selected_line = lines.len();
        }
        let marker = if selected { "> " } else { "  " };
        let title_style = if selected {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().add_modifier(Modifier::BOLD)
        };
        lines.push(Line::from(vec![
            Span::styled(marker, key_style()),
            Span::styled(ellipsize(&r.title, width), title_style),
        ]));
        lines.push(Line::from(vec![
            Span::raw("    "),
            Span::styled(format!("[{}]", r.source), Style::default().fg(Color::Cyan)),
            Span::raw(format!(" Relevance: {}%", r.relevance_percent())),
        ]));
        if !r.snippet.trim().is_empty() {
            lines.push(Line::from(vec![
                Span::raw("    "),
                Span::raw(ellipsize(r.snippet.trim(), width)),
            ]));
        }
        let mut meta = Vec::new();
        if let Some(a) = r.author.as_deref() {
            meta.push(a.to_string());
        }
        if let Some(d) = r.published_date.as_deref() {
            meta.push(format_date(d));
        }
        if let Some(c) = r.citations {
            meta.push(format!("{c} citations"));
        }
        meta.push(r.url.clone());
        lines.push(Line::from(vec![
            Span::raw("    "),
            Span::styled(ellipsize(&meta.join(" · "), width), dim()),
        ]));
    }
    let p = Paragraph::new(lines)
        .block(block)
        .scroll((scroll_to(selected_line + 3, chunks[2].height), 0));
    f.render_widget(p, chunks[2]);
}

fn draw_analysis(area: Rect, f: &mut Frame, state: &UiState) {
    let Some(slot) = state.dashboard.last_analysis() else {
        let p = Paragraph::new(vec![
            Line::from(""),
            Line::from("Perform a search first and press 'a' to analyze the results"),
        ])
        .block(Block::default().borders(Borders::ALL).title("Analysis"));
        f.render_widget(p, area);
        return;
    };

    let mut lines: Vec<Line> = Vec::new();
    if slot.stale {
        lines.push(Line::from(Span::styled(
            format!(
                "From a previous search (\"{}\"). Press 'a' on the Search view to refresh.",
                slot.query
            ),
            Style::default().fg(Color::Black).bg(Color::Yellow),
        )));
        lines.push(Line::from(""));
    }

    let mut selected_line = 0;
    for section in present(&slot.result) {
        lines.push(Line::from(Span::styled(section.heading.clone(), heading_style())));
        if let Some(p) = section.paragraph {
            for l in p.lines() {
                lines.push(Line::from(format!("  {l}")));
            }
        }
        for (idx, item) in section.items.iter().enumerate() {
            let label_style = match section.kind {
                SectionKind::Gaps => Style::default().fg(Color::Red),
                SectionKind::Sources => dim(),
                _ => key_style(),
            };
            let selected = section.is_actionable() && idx == state.direction_selected;
            if selected {
                selected_line = lines.len();
            }
            let text_style = if selected {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            lines.push(Line::from(vec![
                Span::raw(if selected { "> " } else { "  " }),
                Span::styled(item.label.clone(), label_style),
                Span::raw(" "),
                Span::styled(item.text.to_string(), text_style),
            ]));
        }
        lines.push(Line::from(""));
    }

    let title = format!("Analysis: {}", slot.query);
    let p = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(title))
        .wrap(Wrap { trim: false })
        .scroll((scroll_to(selected_line, area.height), 0));
    f.render_widget(p, area);
}

fn draw_vault(area: Rect, f: &mut Frame, state: &UiState) {
    let vault = &state.vault;
    let list_area = if vault.form.visible {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(11), Constraint::Min(0)])
            .split(area);
        draw_form(chunks[0], f, state);
        chunks[1]
    } else {
        area
    };

    let mut title = format!("Vault ({} documents)", vault.documents().len());
    if vault.is_loading() {
        title.push_str(" loading…");
    }
    if vault.is_saving() {
        title.push_str(" saving…");
    }
    let block = Block::default().borders(Borders::ALL).title(title);

    if vault.documents().is_empty() {
        let lines = if vault.has_loaded() {
            vec![
                Line::from("Your vault is empty"),
                Line::from(vec![
                    Span::styled("n", key_style()),
                    Span::styled(" add a document", dim()),
                ]),
            ]
        } else if vault.is_loading() {
            vec![Line::from(Span::styled("Loading vault…", dim()))]
        } else {
            vec![Line::from(vec![
                Span::raw("Vault not loaded. Press "),
                Span::styled("r", key_style()),
                Span::raw(" to retry."),
            ])]
        };
        f.render_widget(Paragraph::new(lines).block(block), list_area);
        return;
    }

    let width = list_area.width.saturating_sub(6) as usize;
    let mut lines: Vec<Line> = Vec::new();
    let mut selected_line = 0;
    for (idx, d) in vault.documents().iter().enumerate() {
        let selected = idx == vault.selected_index();
        let pending = vault.is_pending_removal(d.id);
        if selected {
            selected_line = lines.len();
        }
        let title_style = if pending {
            dim().add_modifier(Modifier::CROSSED_OUT)
        } else if selected {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().add_modifier(Modifier::BOLD)
        };
        let mut spans = vec![
            Span::styled(if selected { "> " } else { "  " }, key_style()),
            Span::styled(ellipsize(&d.title, width), title_style),
        ];
        if pending {
            spans.push(Span::styled(" (deleting…)", dim()));
        }
        lines.push(Line::from(spans));

        let mut meta = vec![
            Span::raw("    "),
            Span::styled(format_date(&d.created_at), dim()),
        ];
        if d.encrypted {
            meta.push(Span::styled(" · encrypted", Style::default().fg(Color::Green)));
        }
        for tag in &d.tags {
            meta.push(Span::styled(format!(" #{tag}"), Style::default().fg(Color::Cyan)));
        }
        lines.push(Line::from(meta));

        if selected && vault.expanded {
            for l in d.content.lines() {
                lines.push(Line::from(format!("      {l}")));
            }
        }
    }
    let p = Paragraph::new(lines)
        .block(block)
        .scroll((scroll_to(selected_line + 1, list_area.height), 0));
    f.render_widget(p, list_area);
}

fn draw_form(area: Rect, f: &mut Frame, state: &UiState) {
    let form = &state.vault.form;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(4),
            Constraint::Length(3),
            Constraint::Length(1),
        ])
        .split(area);

    let fields = [
        (FormField::Title, "Title", form.title.as_str(), "Document title"),
        (
            FormField::Content,
            "Content",
            form.content.as_str(),
            "Document content (the backend reports whether it is encrypted)",
        ),
        (FormField::Tags, "Tags", form.tags.as_str(), "Tags (comma-separated)"),
    ];
    for (i, (field, label, value, placeholder)) in fields.into_iter().enumerate() {
        let focused = form.focus == field;
        let text: Vec<Line> = if value.is_empty() {
            vec![Line::from(Span::styled(placeholder, dim()))]
        } else {
            value.lines().map(|l| Line::from(l.to_string())).collect()
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .title(label)
            .border_style(if focused {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default()
            });
        f.render_widget(Paragraph::new(text).block(block), chunks[i]);
    }

    let hints = Line::from(vec![
        Span::styled(" Tab", key_style()),
        Span::styled(" next field  ", dim()),
        Span::styled("Ctrl-S", key_style()),
        Span::styled(" save  ", dim()),
        Span::styled("Esc", key_style()),
        Span::styled(" hide", dim()),
    ]);
    f.render_widget(Paragraph::new(hints), chunks[3]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::BackendError;
    use crate::model::{AnalysisResult, BackendCommand, BackendEvent, SearchResult, VaultDocument};
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;
    use std::collections::BTreeSet;

    fn render(state: &UiState, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|f| draw(f.area(), f, state)).unwrap();
        let buffer = terminal.backend().buffer();
        let mut out = String::new();
        for row in buffer.content().chunks(buffer.area.width as usize) {
            for cell in row {
                out.push_str(cell.symbol());
            }
            out.push('\n');
        }
        out
    }

    fn result(title: &str, score: f64) -> SearchResult {
        SearchResult {
            title: title.into(),
            url: format!("https://example.org/{title}"),
            source: "arxiv".into(),
            snippet: "snippet".into(),
            relevance_score: score,
            published_date: None,
            author: None,
            citations: None,
        }
    }

    fn analysis() -> AnalysisResult {
        AnalysisResult {
            summary: "Overall picture".into(),
            key_insights: vec!["first".into()],
            potential_gaps: vec!["gap".into()],
            next_research_directions: vec!["go further".into()],
            bias_analysis: None,
            sources_cited: vec!["Nature".into()],
        }
    }

    fn with_results(results: Vec<SearchResult>) -> UiState {
        let mut s = UiState::new("http://localhost:8000".into(), 10);
        s.query = "AI in healthcare".into();
        let (seq, _) = s
            .search
            .execute_search("AI in healthcare", SourceFilter::All, 10)
            .unwrap();
        s.apply_event(BackendEvent::SearchCompleted {
            seq,
            outcome: Ok(results),
        });
        s
    }

    #[test]
    fn results_show_rounded_percentages_in_order() {
        let s = with_results(vec![
            result("alpha", 0.92),
            result("beta", 0.81),
            result("gamma", 0.77),
        ]);
        let screen = render(&s, 100, 30);
        let p92 = screen.find("Relevance: 92%").unwrap();
        let p81 = screen.find("Relevance: 81%").unwrap();
        let p77 = screen.find("Relevance: 77%").unwrap();
        assert!(p92 < p81 && p81 < p77, "{screen}");
    }

    #[test]
    fn start_prompt_then_no_results_message() {
        let fresh = UiState::new(String::new(), 10);
        let screen = render(&fresh, 100, 24);
        assert!(screen.contains("Start by asking a research question"), "{screen}");

        let empty = with_results(Vec::new());
        let screen = render(&empty, 100, 24);
        assert!(screen.contains("No results found. Try a different query."), "{screen}");
    }

    #[test]
    fn failed_search_is_not_shown_as_empty_results() {
        let mut s = UiState::new("http://localhost:8000".into(), 10);
        let (seq, _) = s
            .search
            .execute_search("solar", SourceFilter::All, 10)
            .unwrap();
        s.apply_event(BackendEvent::SearchCompleted {
            seq,
            outcome: Err(BackendError::Contract("relevance score out of range".into())),
        });
        let screen = render(&s, 100, 24);
        assert!(screen.contains("Search failed."), "{screen}");
        assert!(!screen.contains("No results found"), "{screen}");
    }

    #[test]
    fn analysis_placeholder_only_without_analysis() {
        let mut s = UiState::new(String::new(), 10);
        s.select_view(View::Analysis);
        assert!(render(&s, 100, 24).contains("Perform a search first"));

        s.dashboard
            .on_analysis_completed("solar".into(), analysis(), false);
        let screen = render(&s, 100, 30);
        assert!(!screen.contains("Perform a search first"), "{screen}");
        assert!(screen.contains("AI Analysis Summary"));
        assert!(screen.contains("[1] Nature"));
        assert!(!screen.contains("Bias Analysis"));
    }

    #[test]
    fn stale_analysis_carries_banner() {
        let mut s = UiState::new(String::new(), 10);
        s.dashboard
            .on_analysis_completed("solar".into(), analysis(), false);
        s.dashboard.on_search_completed(Vec::new());
        s.select_view(View::Analysis);
        assert!(render(&s, 100, 30).contains("From a previous search"));
    }

    #[test]
    fn empty_vault_shows_empty_state() {
        let mut s = UiState::new(String::new(), 10);
        s.select_view(View::Vault);
        let Some(BackendCommand::LoadDocuments { seq }) = s.take_commands().pop() else {
            panic!("expected a load command");
        };
        s.apply_event(BackendEvent::DocumentsLoaded {
            seq,
            outcome: Ok(Vec::new()),
        });
        assert!(render(&s, 100, 24).contains("Your vault is empty"));
    }

    #[test]
    fn pending_removal_is_marked() {
        let mut s = UiState::new(String::new(), 10);
        s.select_view(View::Vault);
        let Some(BackendCommand::LoadDocuments { seq }) = s.take_commands().pop() else {
            panic!("expected a load command");
        };
        s.apply_event(BackendEvent::DocumentsLoaded {
            seq,
            outcome: Ok(vec![VaultDocument {
                id: 4,
                title: "Notes".into(),
                content: "body".into(),
                encrypted: true,
                created_at: "2026-10-19T10:00:00Z".into(),
                tags: BTreeSet::from(["ml".to_string()]),
            }]),
        });
        s.vault.delete_document(4);
        let screen = render(&s, 100, 24);
        assert!(screen.contains("Notes (deleting…)"), "{screen}");
        assert!(screen.contains("2026-10-19 · encrypted #ml"), "{screen}");
    }
}
