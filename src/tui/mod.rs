mod export;
mod help;
mod state;
mod views;

use crate::backend::BackendClient;
use crate::cli::{build_config, Cli};
use crate::model::{BackendCommand, BackendEvent};
use crate::orchestrator;
use crate::workflow::Notice;
use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use state::{Effect, KeyOutcome, UiState};
use std::{io, time::Duration, time::Instant};
use tokio::sync::mpsc;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

pub async fn run(args: Cli) -> Result<()> {
    let _log_guard = crate::logging::init_file(args.log_file.as_deref())?;

    let cfg = build_config(&args);
    let client = BackendClient::new(&cfg).context("failed to build HTTP client")?;
    tracing::info!(api = %client.base_url(), limit = cfg.search_limit, "starting TUI");

    let (event_tx, event_rx) = mpsc::unbounded_channel::<BackendEvent>();
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel::<BackendCommand>();

    // The TUI runs in a dedicated thread to keep blocking terminal I/O off the runtime.
    let ui_state = UiState::new(cfg.api_url.clone(), cfg.search_limit);
    let ui_handle = std::thread::spawn(move || run_threaded(ui_state, event_rx, cmd_tx));

    let res = orchestrator::run_controller(client, event_tx, cmd_rx).await;

    let join_res = tokio::task::spawn_blocking(move || ui_handle.join()).await;
    if let Ok(joined) = join_res {
        match joined {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(e),
            Err(_) => return Err(anyhow::anyhow!("TUI thread panicked")),
        }
    }

    res
}

/// Run the TUI loop on a dedicated thread. Returning drops `cmd_tx`, which stops the controller.
fn run_threaded(
    mut state: UiState,
    mut event_rx: UnboundedReceiver<BackendEvent>,
    cmd_tx: UnboundedSender<BackendCommand>,
) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).ok();

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;
    terminal.clear().ok();

    let tick_rate = Duration::from_millis(100);
    let mut last_tick = Instant::now();
    let mut dirty = true;

    let res = loop {
        while let Ok(ev) = event_rx.try_recv() {
            state.apply_event(ev);
            dirty = true;
        }

        for cmd in state.take_commands() {
            if cmd_tx.send(cmd).is_err() {
                tracing::error!("backend controller stopped");
                state.notify(Notice::error("Backend controller stopped; restart the app"));
            }
        }
        for effect in state.take_effects() {
            run_effect(&mut state, effect);
        }

        if dirty || last_tick.elapsed() >= tick_rate {
            terminal.draw(|f| views::draw(f.area(), f, &state)).ok();
            last_tick = Instant::now();
            dirty = false;
        }

        // Short poll keeps event draining responsive without a busy loop.
        if event::poll(Duration::from_millis(10)).unwrap_or(false) {
            if let Ok(Event::Key(k)) = event::read() {
                if k.kind != KeyEventKind::Press {
                    continue;
                }
                dirty = true;
                if state.handle_key(k) == KeyOutcome::Quit {
                    break Ok(());
                }
            } else {
                dirty = true;
            }
        }
    };

    disable_raw_mode().ok();
    let mut stdout = io::stdout();
    execute!(stdout, LeaveAlternateScreen).ok();
    res
}

fn run_effect(state: &mut UiState, effect: Effect) {
    match effect {
        Effect::Copy { text, what } => match export::copy_to_clipboard(&text) {
            Ok(()) => state.notify(Notice::info(format!("Copied {what} to clipboard"))),
            Err(e) => state.notify(Notice::error(format!("Clipboard copy failed: {e:#}"))),
        },
        Effect::OpenUrl(url) => {
            if let Err(e) = export::open_url(&url) {
                tracing::warn!(url = %url, error = %format!("{e:#}"), "failed to open URL");
                state.notify(Notice::error(format!("Could not open browser: {e:#}")));
            }
        }
        Effect::ExportAnalysis => {
            let Some(slot) = state.dashboard.last_analysis() else {
                return;
            };
            match export::export_analysis_json(slot) {
                Ok(p) => {
                    state.last_exported_path = Some(p.to_string_lossy().to_string());
                    state.notify(Notice::info(format!(
                        "Exported JSON: {} (press 'y' to copy path)",
                        p.display()
                    )));
                }
                Err(e) => state.notify(Notice::error(format!("JSON export failed: {e:#}"))),
            }
        }
    }
}
