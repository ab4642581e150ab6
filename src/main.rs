// Insight Card - knowledge insight card generator
//
// Turns an article into a single shareable image: a generative model
// extracts the card content, a deterministic layout renders it, and the
// result goes to the clipboard (desktop) or a save page (touch platforms).
//
// Architecture:
// - Extract: Gemini request with a declared response schema, validated client-side
// - Card: the validated card contract
// - Session: single-flight generate/export state machine
// - Render: card -> positioned layout -> SVG
// - Export: resvg rasterization, clipboard / PNG / save page delivery
// - TUI (ratatui) for interactive use, CLI subcommands for headless use

mod card;
mod cli;
mod config;
mod export;
mod extract;
mod logging;
mod render;
mod session;
mod tui;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use config::Config;
use logging::{LogBuffer, LogSink};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Config management doesn't need logging or a runtime
    if let Some(Commands::Config {
        show,
        reset,
        edit,
        path,
    }) = &cli.command
    {
        return cli::handle_config(*show, *reset, *edit, *path);
    }

    // Generate default config file on first run (for discoverability)
    Config::ensure_config_exists();

    // Load configuration (env > file > defaults)
    let config = Config::from_env();

    match &cli.command {
        None => {
            let log_buffer = LogBuffer::new();
            let _guard = logging::init(&config.logging, LogSink::Tui(log_buffer.clone()));
            tui::run(config, log_buffer)
        }
        Some(Commands::Generate(args)) => {
            let _guard = logging::init(&config.logging, LogSink::Stderr);
            cli::run_generate(&config, args)
        }
        Some(Commands::Render(args)) => {
            let _guard = logging::init(&config.logging, LogSink::Stderr);
            cli::run_render(&config, args)
        }
        Some(Commands::Config { .. }) => Ok(()),
    }
}
