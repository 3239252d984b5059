//! Text rendering for the one-shot CLI modes.

use crate::display::format_date;
use crate::model::{SearchResult, VaultDocument};

/// Format a result set in backend order, one block per result.
pub(crate) fn search_lines(query: &str, results: &[SearchResult]) -> Vec<String> {
    let mut lines = Vec::new();
    if results.is_empty() {
        lines.push("No results found. Try a different query.".to_string());
        return lines;
    }

    lines.push(format!("Search results for \"{}\" ({})", query, results.len()));
    for (idx, r) in results.iter().enumerate() {
        lines.push(format!(
            "{:>2}. {} [{}] Relevance: {}%",
            idx + 1,
            r.title,
            r.source,
            r.relevance_percent()
        ));
        lines.push(format!("    {}", r.url));
        if !r.snippet.trim().is_empty() {
            lines.push(format!("    {}", r.snippet.trim()));
        }
        let mut meta = Vec::new();
        if let Some(author) = r.author.as_deref() {
            meta.push(author.to_string());
        }
        if let Some(date) = r.published_date.as_deref() {
            meta.push(format_date(date));
        }
        if let Some(c) = r.citations {
            meta.push(format!("{c} citations"));
        }
        if !meta.is_empty() {
            lines.push(format!("    {}", meta.join(" · ")));
        }
    }
    lines
}

pub(crate) fn vault_lines(docs: &[VaultDocument]) -> Vec<String> {
    if docs.is_empty() {
        return vec!["Your vault is empty".to_string()];
    }
    let mut lines = vec![format!("Vault documents ({})", docs.len())];
    for d in docs {
        let tags = if d.tags.is_empty() {
            String::new()
        } else {
            format!(
                " #{}",
                d.tags.iter().cloned().collect::<Vec<_>>().join(" #")
            )
        };
        lines.push(format!(
            "{:>6}  {}  {}{}{}",
            d.id,
            format_date(&d.created_at),
            d.title,
            if d.encrypted { " [encrypted]" } else { "" },
            tags
        ));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeSet;

    fn result(title: &str, score: f64) -> SearchResult {
        SearchResult {
            title: title.into(),
            url: format!("https://example.org/{title}"),
            source: "pubmed".into(),
            snippet: "snippet".into(),
            relevance_score: score,
            published_date: Some("2025-11-02T00:00:00Z".into()),
            author: Some("Doe".into()),
            citations: Some(12),
        }
    }

    #[test]
    fn results_keep_order_and_show_percent() {
        let lines = search_lines(
            "AI in healthcare",
            &[result("a", 0.92), result("b", 0.81), result("c", 0.77)],
        );
        let headers: Vec<&String> = lines.iter().filter(|l| l.contains("Relevance")).collect();
        assert_eq!(headers.len(), 3);
        assert!(headers[0].starts_with(" 1. a") && headers[0].ends_with("92%"));
        assert!(headers[1].starts_with(" 2. b") && headers[1].ends_with("81%"));
        assert!(headers[2].starts_with(" 3. c") && headers[2].ends_with("77%"));
        assert!(lines.iter().any(|l| l.trim() == "Doe · 2025-11-02 · 12 citations"));
    }

    #[test]
    fn empty_states() {
        assert_eq!(
            search_lines("q", &[]),
            vec!["No results found. Try a different query."]
        );
        assert_eq!(vault_lines(&[]), vec!["Your vault is empty"]);
    }

    #[test]
    fn vault_line_shows_tags_and_encryption_flag() {
        let doc = VaultDocument {
            id: 3,
            title: "Notes".into(),
            content: "c".into(),
            encrypted: true,
            created_at: "2026-10-19T10:00:00Z".into(),
            tags: BTreeSet::from(["ml".to_string(), "bio".to_string()]),
        };
        let lines = vault_lines(&[doc]);
        assert_eq!(lines[1], "     3  2026-10-19  Notes [encrypted] #bio #ml");
    }
}
