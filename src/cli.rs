// CLI module - command-line argument parsing and handlers
//
// With no subcommand the TUI starts. Subcommands:
// - generate: headless run, article text in, card JSON out, image exported
// - render: re-render and export a saved card JSON
// - config --show/--path/--reset/--edit: configuration management

use crate::card::InsightCardData;
use crate::config::{Config, VERSION};
use crate::export::{self, Exporter};
use crate::extract::{GeminiExtractor, InsightExtractor};
use crate::render::{render, RenderContext};
use crate::session::{BeginOutcome, Session, SessionState, SharedCard};
use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Knowledge insight card generator
#[derive(Parser)]
#[command(name = "insight-card")]
#[command(version = VERSION)]
#[command(
    about = "Turn an article into a shareable knowledge insight card",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate a card from article text without the TUI
    Generate(GenerateArgs),

    /// Render and export a previously saved card
    Render(RenderArgs),

    /// Manage configuration
    Config {
        /// Show effective configuration
        #[arg(long)]
        show: bool,

        /// Reset config file to defaults
        #[arg(long)]
        reset: bool,

        /// Open config file in $EDITOR
        #[arg(long)]
        edit: bool,

        /// Show config file path
        #[arg(long)]
        path: bool,
    },
}

/// Output options shared by `generate` and `render`
#[derive(Args, Debug, Default)]
pub struct OutputArgs {
    /// Also write the card as SVG
    #[arg(long, value_name = "FILE")]
    pub svg: Option<PathBuf>,

    /// Skip image export (clipboard / save page / PNG)
    #[arg(long)]
    pub no_export: bool,

    /// User-agent signature used to pick the export path
    #[arg(long, value_name = "UA")]
    pub user_agent: Option<String>,
}

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Article text file ("-" or omitted reads stdin)
    #[arg(short, long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Save the card JSON for `insight-card render`
    #[arg(long, value_name = "FILE")]
    pub save_json: Option<PathBuf>,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Card JSON written by `generate --save-json`
    #[arg(value_name = "CARD.json")]
    pub card: PathBuf,

    #[command(flatten)]
    pub output: OutputArgs,
}

// ─────────────────────────────────────────────────────────────────────────────
// generate / render
// ─────────────────────────────────────────────────────────────────────────────

/// Headless generate: one extraction, then the same delivery as `render`
pub fn run_generate(config: &Config, args: &GenerateArgs) -> Result<()> {
    let text = read_input(args.input.as_deref())?;
    let card = generate_card(config, &text)?;

    let json = card.to_json_pretty().context("Failed to serialize card")?;
    if let Some(path) = &args.save_json {
        std::fs::write(path, &json)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        eprintln!("Card saved: {}", path.display());
    }
    println!("{}", json);

    deliver(config, &card, &args.output)
}

/// Run one generate request through a fresh session
///
/// Blank input is rejected before the extractor is built, so it reports the
/// same message as the TUI whether or not a key is configured.
fn generate_card(config: &Config, text: &str) -> Result<SharedCard> {
    let mut session = Session::new();
    let BeginOutcome::Started(ticket) = session.begin(text) else {
        bail!("{}", session.error_message().unwrap_or_default());
    };

    let result = GeminiExtractor::new(&config.extraction).and_then(|extractor| {
        tracing::debug!(extractor = extractor.name(), "Calling extractor");
        extractor.extract(ticket.input())
    });
    session.finish(ticket, result);

    match session.state() {
        SessionState::Ready(card) => Ok(card.clone()),
        SessionState::Failed { error, .. } => bail!("{}", error),
        other => bail!("unexpected session state: {}", other.name()),
    }
}

/// Re-render a saved card
pub fn run_render(config: &Config, args: &RenderArgs) -> Result<()> {
    let text = std::fs::read_to_string(&args.card)
        .with_context(|| format!("Failed to read {}", args.card.display()))?;
    let card = InsightCardData::from_json(&text)
        .with_context(|| format!("{} is not a valid card", args.card.display()))?;

    deliver(config, &card, &args.output)
}

fn deliver(config: &Config, card: &InsightCardData, output: &OutputArgs) -> Result<()> {
    let layout = render(card, &RenderContext::today());

    if let Some(path) = &output.svg {
        let svg = layout.to_svg().context("Failed to serialize SVG")?;
        std::fs::write(path, svg).with_context(|| format!("Failed to write {}", path.display()))?;
        eprintln!("SVG written: {}", path.display());
    }

    if output.no_export {
        return Ok(());
    }

    let probe = export::probe_for(&config.export, output.user_agent.as_deref())?;
    let exporter = Exporter::from_config(config);
    match exporter.export(&layout, probe.class()) {
        Ok(outcome) => {
            eprintln!("{}", outcome.message());
            Ok(())
        }
        Err(e) => bail!("{} ({})", e.user_message(), e),
    }
}

fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        _ => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read stdin")?;
            Ok(text)
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// config
// ─────────────────────────────────────────────────────────────────────────────

/// Handle `config` flags; with none, print the usage
pub fn handle_config(show: bool, reset: bool, edit: bool, path: bool) -> Result<()> {
    if !(show || reset || edit || path) {
        println!("Usage: insight-card config [--show|--reset|--edit|--path]");
        println!();
        println!("  --show    Print the effective configuration (API key masked)");
        println!("  --reset   Overwrite the config file with defaults");
        println!("  --edit    Open the config file in $VISUAL / $EDITOR");
        println!("  --path    Print the config file location");
        return Ok(());
    }

    let file = Config::config_path().context("Could not determine config path")?;
    if path {
        println!("{}", file.display());
        Ok(())
    } else if show {
        show_config(&file);
        Ok(())
    } else if reset {
        reset_config(&file)
    } else {
        edit_config(&file)
    }
}

fn show_config(file: &Path) {
    let mut config = Config::from_env();
    let key = match config.extraction.api_key.take() {
        Some(_) => "configured",
        None => "NOT SET (GEMINI_API_KEY or [extraction] api_key)",
    };
    let source = if file.exists() {
        file.display().to_string()
    } else {
        "built-in defaults".to_string()
    };

    println!("# Effective configuration from {}", source);
    println!("# API key: {}", key);
    println!();
    print!("{}", config.to_toml());
}

fn reset_config(file: &Path) -> Result<()> {
    if file.exists() && !confirm(&format!("Overwrite {} with defaults?", file.display()))? {
        println!("Aborted.");
        return Ok(());
    }
    Config::default()
        .save()
        .with_context(|| format!("Failed to write {}", file.display()))?;
    println!("Config reset to defaults: {}", file.display());
    Ok(())
}

fn edit_config(file: &Path) -> Result<()> {
    if !file.exists() {
        Config::default()
            .save()
            .with_context(|| format!("Failed to create {}", file.display()))?;
        println!("Created {}", file.display());
    }

    let editor = editor_command(|name| std::env::var(name).ok());
    let status = Command::new(&editor)
        .arg(file)
        .status()
        .with_context(|| format!("Failed to launch '{}' (set $EDITOR)", editor))?;
    if !status.success() {
        bail!("{} exited with {}", editor, status);
    }
    Ok(())
}

/// `$VISUAL`, then `$EDITOR`, then the platform's stock editor
fn editor_command(var: impl Fn(&str) -> Option<String>) -> String {
    ["VISUAL", "EDITOR"]
        .into_iter()
        .filter_map(var)
        .find(|editor| !editor.trim().is_empty())
        .unwrap_or_else(|| if cfg!(windows) { "notepad" } else { "vi" }.to_string())
}

/// y/N question on stderr; anything but "y" is no
fn confirm(question: &str) -> Result<bool> {
    eprint!("{} [y/N] ", question);
    std::io::stderr().flush()?;
    let mut answer = String::new();
    std::io::stdin()
        .read_line(&mut answer)
        .context("Failed to read answer")?;
    Ok(answer.trim().eq_ignore_ascii_case("y"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_subcommand_means_tui() {
        let cli = Cli::try_parse_from(["insight-card"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_generate_flags() {
        let cli = Cli::try_parse_from([
            "insight-card",
            "generate",
            "-i",
            "article.txt",
            "--save-json",
            "card.json",
            "--svg",
            "card.svg",
            "--no-export",
            "--user-agent",
            "iPhone",
        ])
        .unwrap();

        let Some(Commands::Generate(args)) = cli.command else {
            panic!("expected generate");
        };
        assert_eq!(args.input, Some(PathBuf::from("article.txt")));
        assert_eq!(args.save_json, Some(PathBuf::from("card.json")));
        assert_eq!(args.output.svg, Some(PathBuf::from("card.svg")));
        assert!(args.output.no_export);
        assert_eq!(args.output.user_agent.as_deref(), Some("iPhone"));
    }

    #[test]
    fn test_render_requires_card() {
        assert!(Cli::try_parse_from(["insight-card", "render"]).is_err());
        let cli = Cli::try_parse_from(["insight-card", "render", "card.json"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Render(_))));
    }

    #[test]
    fn test_generate_rejects_blank_input_before_needing_a_key() {
        let mut config = Config::default();
        config.extraction.api_key = None;

        let err = generate_card(&config, "  \n\t").unwrap_err();
        assert_eq!(err.to_string(), "请输入文章内容");
    }

    #[test]
    fn test_generate_without_key_reports_generate_failure() {
        let mut config = Config::default();
        config.extraction.api_key = None;

        let err = generate_card(&config, "一篇关于深度工作的文章").unwrap_err();
        assert!(err.to_string().starts_with("生成失败: "));
    }

    #[test]
    fn test_editor_command_prefers_visual_then_editor() {
        let both = |name: &str| match name {
            "VISUAL" => Some("code --wait".to_string()),
            "EDITOR" => Some("vim".to_string()),
            _ => None,
        };
        assert_eq!(editor_command(both), "code --wait");

        let blank_visual = |name: &str| match name {
            "VISUAL" => Some("  ".to_string()),
            "EDITOR" => Some("vim".to_string()),
            _ => None,
        };
        assert_eq!(editor_command(blank_visual), "vim");

        let fallback = editor_command(|_| None);
        assert!(fallback == "vi" || fallback == "notepad");
    }

    #[test]
    fn test_render_rejects_invalid_card_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("card.json");
        std::fs::write(&path, r#"{"title": "only a title"}"#).unwrap();

        let args = RenderArgs {
            card: path,
            output: OutputArgs {
                no_export: true,
                ..Default::default()
            },
        };
        let err = run_render(&Config::default(), &args).unwrap_err();
        assert!(format!("{:#}", err).contains("missing required field"));
    }

    #[test]
    fn test_render_writes_svg_for_saved_card() {
        let dir = tempfile::tempdir().unwrap();
        let card_path = dir.path().join("card.json");
        let svg_path = dir.path().join("card.svg");
        let json = crate::card::fixtures::card(3).to_json_pretty().unwrap();
        std::fs::write(&card_path, json).unwrap();

        let args = RenderArgs {
            card: card_path,
            output: OutputArgs {
                svg: Some(svg_path.clone()),
                no_export: true,
                user_agent: None,
            },
        };
        run_render(&Config::default(), &args).unwrap();

        let svg = std::fs::read_to_string(svg_path).unwrap();
        assert!(svg.contains("深度工作的力量"));
    }
}
