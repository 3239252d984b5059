//! Renderer-neutral presentation of a synthesis result.

use crate::model::AnalysisResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    Summary,
    KeyInsights,
    Gaps,
    Directions,
    Bias,
    Sources,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item<'a> {
    pub label: String,
    pub text: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section<'a> {
    pub kind: SectionKind,
    pub heading: String,
    pub paragraph: Option<&'a str>,
    pub items: Vec<Item<'a>>,
}

impl Section<'_> {
    /// Directions are individually actionable in interactive surfaces.
    pub fn is_actionable(&self) -> bool {
        self.kind == SectionKind::Directions
    }
}

fn items<'a>(entries: &'a [String], label: impl Fn(usize) -> String) -> Vec<Item<'a>> {
    entries
        .iter()
        .enumerate()
        .map(|(idx, text)| Item {
            label: label(idx),
            text: text.as_str(),
        })
        .collect()
}

/// Lay out every field of `result`. The bias section is present only when the backend sent one.
pub fn present(result: &AnalysisResult) -> Vec<Section<'_>> {
    let mut sections = vec![
        Section {
            kind: SectionKind::Summary,
            heading: "AI Analysis Summary".into(),
            paragraph: Some(result.summary.as_str()),
            items: Vec::new(),
        },
        Section {
            kind: SectionKind::KeyInsights,
            heading: "Key Insights".into(),
            paragraph: None,
            items: items(&result.key_insights, |i| format!("{}.", i + 1)),
        },
        Section {
            kind: SectionKind::Gaps,
            heading: "Research Gaps Identified".into(),
            paragraph: None,
            items: items(&result.potential_gaps, |_| "!".into()),
        },
        Section {
            kind: SectionKind::Directions,
            heading: "Suggested Next Directions".into(),
            paragraph: None,
            items: items(&result.next_research_directions, |_| "→".into()),
        },
    ];
    if let Some(bias) = result.bias_analysis.as_deref() {
        sections.push(Section {
            kind: SectionKind::Bias,
            heading: "Bias Analysis".into(),
            paragraph: Some(bias),
            items: Vec::new(),
        });
    }
    sections.push(Section {
        kind: SectionKind::Sources,
        heading: format!("Sources Cited ({})", result.sources_cited.len()),
        paragraph: None,
        items: items(&result.sources_cited, |i| format!("[{}]", i + 1)),
    });
    sections
}

/// Plain-text rendering used for text output and for saving an analysis to the vault.
pub fn to_plain_text(result: &AnalysisResult) -> String {
    let mut out = String::new();
    for section in present(result) {
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str(&section.heading);
        out.push('\n');
        if let Some(p) = section.paragraph {
            out.push_str(p.trim_end());
            out.push('\n');
        }
        for item in &section.items {
            out.push_str(&format!("  {} {}\n", item.label, item.text));
        }
    }
    out
}
