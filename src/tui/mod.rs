// TUI module - Terminal User Interface
//
// This module manages the terminal UI using ratatui. It handles:
// - Terminal initialization and cleanup
// - Event loop (keyboard input, paste, resize, timer ticks)
// - Running extraction and export off the UI thread
//
// Both background jobs are blocking (HTTP, rasterization, clipboard), so they
// run on spawn_blocking and report back over an mpsc channel.

pub mod app;
pub mod components;
pub mod layout;
pub mod theme;
pub mod ui;

use crate::config::Config;
use crate::export::{self, Exporter};
use crate::extract::{GeminiExtractor, InsightExtractor};
use crate::logging::LogBuffer;
use crate::render::{render, RenderContext};
use anyhow::{Context, Result};
use app::{App, Command, JobResult};
use crossterm::{
    event::{self, DisableBracketedPaste, EnableBracketedPaste, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Run the TUI until the user quits
///
/// The blocking HTTP client inside the extractor must be created and dropped
/// outside the async runtime, so App lives here and the runtime only borrows it.
pub fn run(config: Config, log_buffer: LogBuffer) -> Result<()> {
    let extractor = GeminiExtractor::new(&config.extraction)
        .map(|e| Arc::new(e) as Arc<dyn InsightExtractor>);
    if let Err(e) = &extractor {
        tracing::warn!(error = %e, "Extractor unavailable; generate will fail until configured");
    }
    let probe = export::probe_for(&config.export, None).context("Invalid platform pattern")?;
    let exporter = Arc::new(Exporter::from_config(&config));

    let mut app = App::new(extractor, probe, log_buffer);
    tracing::info!(platform = %app.platform, "Insight card generator ready");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;
    let result = runtime.block_on(run_terminal(&mut app, exporter));

    // Don't wait on a request still in flight
    runtime.shutdown_timeout(Duration::from_millis(250));
    result
}

/// Set up the terminal, run the event loop, and restore the terminal
/// whether or not the loop failed.
async fn run_terminal(app: &mut App, exporter: Arc<Exporter>) -> Result<()> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)
        .context("Failed to setup terminal")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;

    let result = run_event_loop(&mut terminal, app, exporter).await;

    // Restore terminal
    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableBracketedPaste
    )
    .context("Failed to restore terminal")?;
    terminal.show_cursor().context("Failed to show cursor")?;

    result
}

/// Main event loop
///
/// Waits on three sources:
/// 1. Terminal events (keys, paste, resize)
/// 2. Timer ticks (spinner, toast expiry)
/// 3. Background job results
async fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    exporter: Arc<Exporter>,
) -> Result<()> {
    let mut tick_interval = tokio::time::interval(Duration::from_millis(100));
    let (job_tx, mut job_rx) = mpsc::channel::<JobResult>(8);

    loop {
        terminal
            .draw(|f| ui::draw(f, app))
            .context("Failed to draw terminal")?;

        tokio::select! {
            // Keyboard, paste or resize
            maybe_event = async {
                if event::poll(Duration::from_millis(10)).unwrap_or(false) {
                    Some(event::read())
                } else {
                    None
                }
            } => {
                match maybe_event {
                    Some(Ok(Event::Key(key))) => {
                        if let Some(command) = app.handle_key(key) {
                            spawn_job(command, exporter.clone(), job_tx.clone());
                        }
                    }
                    Some(Ok(Event::Paste(text))) => app.handle_paste(&text),
                    Some(Ok(Event::Resize(_, _))) => app.refresh_platform(),
                    Some(Ok(_)) | None => {}
                    Some(Err(e)) => return Err(e).context("Failed to read terminal event"),
                }
            }

            _ = tick_interval.tick() => app.tick(),

            Some(job) = job_rx.recv() => app.apply(job),
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

/// Run a command on the blocking pool and send its result back
fn spawn_job(command: Command, exporter: Arc<Exporter>, tx: mpsc::Sender<JobResult>) {
    tokio::task::spawn_blocking(move || {
        let job = match command {
            Command::Extract { extractor, ticket } => {
                tracing::debug!(extractor = extractor.name(), "Calling extractor");
                let result = extractor.extract(ticket.input());
                JobResult::Extracted { ticket, result }
            }
            Command::Export { card, platform } => {
                let layout = render(&card, &RenderContext::today());
                JobResult::Exported(exporter.export(&layout, platform))
            }
        };
        // Receiver only goes away when the UI is shutting down
        let _ = tx.blocking_send(job);
    });
}
