use crate::backend::BackendClient;
use crate::model::{ClientConfig, SourceFilter, VaultDocument};
use crate::workflow::{AnalysisOutcome, SearchOrchestrator, SearchOutcome};
use anyhow::{Context, Result};
use clap::Parser;
use std::io::Write;
use std::time::Duration;
use tokio::sync::mpsc;

const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Output line routing for stdout/stderr writer.
enum OutputLine {
    Stdout(String),
    Stderr(String),
}

/// Spawn a blocking writer for stdout/stderr to avoid blocking async tasks.
fn spawn_output_writer() -> (
    mpsc::UnboundedSender<OutputLine>,
    tokio::task::JoinHandle<()>,
) {
    let (tx, mut rx) = mpsc::unbounded_channel::<OutputLine>();
    let handle = tokio::task::spawn_blocking(move || {
        let stdout = std::io::stdout();
        let stderr = std::io::stderr();
        let mut out = std::io::LineWriter::new(stdout.lock());
        let mut err = std::io::LineWriter::new(stderr.lock());

        while let Some(line) = rx.blocking_recv() {
            match line {
                OutputLine::Stdout(msg) => {
                    let _ = writeln!(out, "{}", msg);
                }
                OutputLine::Stderr(msg) => {
                    let _ = writeln!(err, "{}", msg);
                }
            }
        }

        let _ = out.flush();
        let _ = err.flush();
    });
    (tx, handle)
}

#[derive(Debug, Parser, Clone)]
#[command(
    name = "omnimind-cli",
    version,
    about = "Research workflow client: multi-source search, AI synthesis and a personal vault"
)]
pub struct Cli {
    /// Base URL of the research backend
    #[arg(long, env = "OMNIMIND_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Maximum number of search results to request
    #[arg(long, default_value_t = 10)]
    pub limit: u32,

    /// Per-request timeout (e.g. 30s); no timeout when omitted
    #[arg(long)]
    pub timeout: Option<humantime::Duration>,

    /// Run a single search and print the results (no TUI)
    #[arg(long)]
    pub query: Option<String>,

    /// With --query: also request an AI synthesis of the results
    #[arg(long, requires = "query")]
    pub analyze: bool,

    /// Print the vault document list and exit (no TUI)
    #[arg(long, conflicts_with = "query")]
    pub list_vault: bool,

    /// Print JSON output (one-shot modes)
    #[arg(long, conflicts_with = "text")]
    pub json: bool,

    /// Print text output (one-shot modes; the default)
    #[arg(long)]
    pub text: bool,

    /// Log file used while the TUI owns the terminal
    #[arg(long)]
    pub log_file: Option<std::path::PathBuf>,
}

impl Cli {
    pub fn is_one_shot(&self) -> bool {
        self.query.is_some() || self.list_vault
    }
}

pub async fn run(args: Cli) -> Result<()> {
    if (args.json || args.text) && !args.is_one_shot() {
        return Err(anyhow::anyhow!(
            "--json/--text need a one-shot action. Use them with --query or --list-vault."
        ));
    }

    if args.list_vault {
        return run_list_vault(args).await;
    }
    if args.query.is_some() {
        return run_query(args).await;
    }

    #[cfg(feature = "tui")]
    {
        crate::tui::run(args).await
    }
    #[cfg(not(feature = "tui"))]
    {
        Err(anyhow::anyhow!(
            "built without TUI support; use --query or --list-vault"
        ))
    }
}

/// Build a `ClientConfig` from CLI arguments.
pub fn build_config(args: &Cli) -> ClientConfig {
    ClientConfig {
        api_url: args.api_url.clone(),
        search_limit: args.limit,
        timeout: args.timeout.map(Duration::from),
        user_agent: format!("omnimind-cli/{}", env!("CARGO_PKG_VERSION")),
    }
}

/// One-shot search (and optional synthesis), driven through the same orchestrator as the TUI.
async fn run_query(args: Cli) -> Result<()> {
    let cfg = build_config(&args);
    let client = BackendClient::new(&cfg).context("failed to build HTTP client")?;
    let query = args.query.clone().unwrap_or_default();

    let mut search = SearchOrchestrator::default();
    let (seq, request) = search
        .execute_search(&query, SourceFilter::All, cfg.search_limit)
        .context("query is empty; nothing to search for")?;

    tracing::info!(query = %request.query, api = %client.base_url(), "searching");
    let outcome = client.search(&request).await;
    let results = match search.complete_search(seq, outcome) {
        SearchOutcome::Ready(results) => results,
        SearchOutcome::Failed(e) => {
            return Err(e).with_context(|| {
                format!("search failed; make sure the backend is running on {}", cfg.api_url)
            })
        }
        SearchOutcome::Stale => return Err(anyhow::anyhow!("search response was superseded")),
    };

    let analysis = if args.analyze {
        match search.analyze_current(&results) {
            Some((seq, request)) => {
                tracing::info!(results = request.search_results.len(), "requesting synthesis");
                let outcome = client.synthesize(&request).await;
                match search.complete_analysis(seq, outcome) {
                    AnalysisOutcome::Ready { result, .. } => Some(result),
                    AnalysisOutcome::Failed(e) => {
                        return Err(e).context("analysis failed");
                    }
                    AnalysisOutcome::Stale => None,
                }
            }
            None => {
                tracing::info!("no results to analyze");
                None
            }
        }
    } else {
        None
    };

    let (out_tx, out_handle) = spawn_output_writer();
    if args.json {
        let mut doc = serde_json::json!({ "query": query, "results": results });
        if let Some(a) = analysis.as_ref() {
            doc["analysis"] = serde_json::to_value(a)?;
        }
        let _ = out_tx.send(OutputLine::Stdout(serde_json::to_string_pretty(&doc)?));
    } else {
        for line in crate::text_summary::search_lines(&query, &results) {
            let _ = out_tx.send(OutputLine::Stdout(line));
        }
        if let Some(a) = analysis.as_ref() {
            let _ = out_tx.send(OutputLine::Stdout(String::new()));
            for line in crate::workflow::analysis::to_plain_text(a).lines() {
                let _ = out_tx.send(OutputLine::Stdout(line.to_string()));
            }
        } else if args.analyze && results.is_empty() {
            let _ = out_tx.send(OutputLine::Stderr("Nothing to analyze.".into()));
        }
    }
    drop(out_tx);
    let _ = out_handle.await;
    Ok(())
}

async fn run_list_vault(args: Cli) -> Result<()> {
    let cfg = build_config(&args);
    let client = BackendClient::new(&cfg).context("failed to build HTTP client")?;
    let docs: Vec<VaultDocument> = client
        .list_documents()
        .await
        .with_context(|| format!("failed to load vault documents from {}", cfg.api_url))?;

    let (out_tx, out_handle) = spawn_output_writer();
    if args.json {
        let _ = out_tx.send(OutputLine::Stdout(serde_json::to_string_pretty(&docs)?));
    } else {
        for line in crate::text_summary::vault_lines(&docs) {
            let _ = out_tx.send(OutputLine::Stdout(line));
        }
    }
    drop(out_tx);
    let _ = out_handle.await;
    Ok(())
}
