use ratatui::{
    layout::Rect,
    style::Color,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

const KEYS_GLOBAL: &[(&str, &str)] = &[
    ("q / Ctrl-C", "Quit"),
    ("Tab / S-Tab", "Next / previous view"),
    ("1 2 3", "Search / Analysis / Vault"),
    ("Esc", "Dismiss notice"),
    ("?", "Toggle this help"),
];

const KEYS_SEARCH: &[(&str, &str)] = &[
    ("/ or i", "Edit query (Enter searches)"),
    ("f", "Cycle source filter"),
    ("a", "Analyze current results"),
    ("j/k", "Select result"),
    ("o", "Open URL in browser"),
    ("y", "Copy URL"),
    ("p", "Pin result to vault"),
];

const KEYS_ANALYSIS: &[(&str, &str)] = &[
    ("j/k", "Select next direction"),
    ("Enter", "Use direction as next query"),
    ("s", "Save analysis to vault"),
    ("e", "Export analysis as JSON"),
    ("y", "Copy exported path"),
];

const KEYS_VAULT: &[(&str, &str)] = &[
    ("n", "New document (Tab, Ctrl-S, Esc)"),
    ("Enter", "Expand / collapse content"),
    ("d", "Delete selected"),
    ("r", "Reload"),
    ("y", "Copy content"),
];

fn section(
    out: &mut Vec<Line<'static>>,
    heading: &'static str,
    keys: &[(&'static str, &'static str)],
) {
    out.push(Line::from(heading));
    for (key, action) in keys {
        out.push(Line::from(vec![
            Span::raw("  "),
            Span::styled(format!("{key:<12}"), Style::default().fg(Color::Magenta)),
            Span::raw(*action),
        ]));
    }
}

pub fn draw_help(area: Rect, f: &mut Frame) {
    let mut lines = Vec::new();
    section(&mut lines, "Keybinds:", KEYS_GLOBAL);
    lines.push(Line::from(""));
    section(&mut lines, "Search:", KEYS_SEARCH);
    lines.push(Line::from(""));
    section(&mut lines, "Analysis:", KEYS_ANALYSIS);
    lines.push(Line::from(""));
    section(&mut lines, "Vault:", KEYS_VAULT);

    let p = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Help"));
    f.render_widget(p, area);
}
