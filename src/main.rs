mod backend;
mod cli;
mod display;
mod logging;
mod model;
mod orchestrator;
mod text_summary;
#[cfg(feature = "tui")]
mod tui;
mod workflow;

use anyhow::Result;
use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();
    let one_shot = args.is_one_shot();

    // The TUI owns the terminal, so it logs to a file instead (see tui::run).
    if one_shot || cfg!(not(feature = "tui")) {
        logging::init_stderr();
    }

    match cli::run(args).await {
        Ok(()) => {
            // Exit explicitly so lingering runtime tasks cannot hold a scripted run open.
            if one_shot {
                std::process::exit(0);
            }
            Ok(())
        }
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "exiting with error");
            Err(e)
        }
    }
}
