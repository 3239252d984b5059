use crate::workflow::dashboard::AnalysisSlot;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::mpsc as std_mpsc;
use std::sync::OnceLock;
use std::time::Duration;

// Global clipboard manager channel - initialized once on first use
static CLIPBOARD_SENDER: OnceLock<std_mpsc::Sender<String>> = OnceLock::new();

/// File name for an exported analysis: the query reduced to a safe slug.
fn export_file_name(query: &str) -> String {
    let slug: String = query
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect();
    let slug = slug
        .split('-')
        .filter(|s| !s.is_empty())
        .take(8)
        .collect::<Vec<_>>()
        .join("-");
    if slug.is_empty() {
        "omnimind-analysis.json".to_string()
    } else {
        format!("omnimind-analysis-{slug}.json")
    }
}

pub fn export_analysis_json_to(dir: &Path, slot: &AnalysisSlot) -> Result<PathBuf> {
    let path = dir.join(export_file_name(&slot.query));
    let doc = serde_json::json!({
        "query": slot.query,
        "analysis": slot.result,
    });
    let body = serde_json::to_string_pretty(&doc).context("serialize analysis")?;
    std::fs::write(&path, body).with_context(|| format!("write {}", path.display()))?;
    Ok(path)
}

/// Export the analysis as pretty JSON into the current directory.
/// Returns the absolute path of the exported file.
pub fn export_analysis_json(slot: &AnalysisSlot) -> Result<PathBuf> {
    let current_dir = std::env::current_dir().context("get current directory")?;
    export_analysis_json_to(&current_dir, slot)
}

pub fn open_url(url: &str) -> Result<()> {
    open::that_detached(url).with_context(|| format!("open {url}"))
}

/// Start the clipboard thread on first use. Each copy keeps its clipboard instance alive
/// for a while so that clipboard managers on Linux can read it.
fn init_clipboard_manager() -> Result<&'static std_mpsc::Sender<String>> {
    CLIPBOARD_SENDER.get_or_init(|| {
        let (tx, rx) = std_mpsc::channel::<String>();

        std::thread::spawn(move || {
            use arboard::Clipboard;

            for text in rx {
                match Clipboard::new() {
                    Ok(mut clipboard) => {
                        if let Err(e) = clipboard.set_text(&text) {
                            tracing::warn!(error = %e, "clipboard write failed");
                            continue;
                        }
                        std::thread::sleep(Duration::from_secs(2));
                    }
                    Err(e) => tracing::warn!(error = %e, "clipboard unavailable"),
                }
            }
        });

        tx
    });

    CLIPBOARD_SENDER
        .get()
        .ok_or_else(|| anyhow::anyhow!("Failed to initialize clipboard manager"))
}

/// Queue `text` for the clipboard thread and return without waiting.
pub fn copy_to_clipboard(text: &str) -> Result<()> {
    let sender = init_clipboard_manager()?;
    sender
        .send(text.to_string())
        .map_err(|_| anyhow::anyhow!("Clipboard manager channel closed"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AnalysisResult;
    use pretty_assertions::assert_eq;

    #[test]
    fn file_name_is_a_slug_of_the_query() {
        assert_eq!(
            export_file_name("AI in Healthcare: 2026?"),
            "omnimind-analysis-ai-in-healthcare-2026.json"
        );
        assert_eq!(export_file_name("???"), "omnimind-analysis.json");
    }

    #[test]
    fn export_writes_query_and_analysis() {
        let dir = std::env::temp_dir().join(format!("omnimind-export-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let slot = AnalysisSlot {
            query: "solar".into(),
            result: AnalysisResult {
                summary: "s".into(),
                key_insights: vec!["k".into()],
                potential_gaps: Vec::new(),
                next_research_directions: Vec::new(),
                bias_analysis: None,
                sources_cited: Vec::new(),
            },
            stale: false,
        };
        let path = export_analysis_json_to(&dir, &slot).unwrap();
        let back: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(back["query"], "solar");
        assert_eq!(back["analysis"]["key_insights"][0], "k");
        std::fs::remove_dir_all(&dir).ok();
    }
}
