// TUI application state
//
// App owns the article buffer, the session and the transient UI state. Key
// handling is synchronous and returns a Command when background work is
// needed; the event loop in mod.rs runs it and feeds the JobResult back.
// That keeps every state transition testable without a terminal.

use super::components::toast::Toast;
use crate::card::InsightCardData;
use crate::export::{ExportError, ExportOutcome, PlatformClass, PlatformProbe};
use crate::extract::{ExtractionError, InsightExtractor};
use crate::logging::LogBuffer;
use crate::session::{BeginOutcome, Session, SharedCard, Ticket};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::sync::Arc;

/// Spinner frames for the loading indicator
const SPINNER: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

/// Background work requested by a key press
pub enum Command {
    /// Run the extractor for this ticket
    Extract {
        extractor: Arc<dyn InsightExtractor>,
        ticket: Ticket,
    },
    /// Render and export this card
    Export {
        card: SharedCard,
        platform: PlatformClass,
    },
}

/// Outcome of background work, delivered back to the loop
pub enum JobResult {
    Extracted {
        ticket: Ticket,
        result: Result<InsightCardData, ExtractionError>,
    },
    Exported(Result<ExportOutcome, ExportError>),
}

/// Main application state for the TUI
pub struct App {
    /// Article text being edited
    pub input: String,

    pub session: Session,

    /// Extractor built from config, or why it couldn't be
    extractor: Result<Arc<dyn InsightExtractor>, ExtractionError>,

    probe: Box<dyn PlatformProbe>,

    /// Platform class as of the last probe (startup or resize)
    pub platform: PlatformClass,

    /// Log buffer for the log strip
    pub log_buffer: LogBuffer,

    pub toast: Option<Toast>,

    /// Preview scroll offset in lines
    pub preview_scroll: u16,

    pub should_quit: bool,

    animation_frame: usize,
}

impl App {
    pub fn new(
        extractor: Result<Arc<dyn InsightExtractor>, ExtractionError>,
        probe: Box<dyn PlatformProbe>,
        log_buffer: LogBuffer,
    ) -> Self {
        let platform = probe.class();
        Self {
            input: String::new(),
            session: Session::new(),
            extractor,
            probe,
            platform,
            log_buffer,
            toast: None,
            preview_scroll: 0,
            should_quit: false,
            animation_frame: 0,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Input
    // ─────────────────────────────────────────────────────────────────────────

    /// Handle a key press; returns work for the event loop, if any
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<Command> {
        if key.kind != KeyEventKind::Press {
            return None;
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('c') if ctrl => self.should_quit = true,
            KeyCode::Char('g') if ctrl => return self.request_generate(),
            KeyCode::F(5) => return self.request_generate(),
            KeyCode::Char('e') if ctrl => return self.request_export(),
            KeyCode::Char('l') if ctrl => self.input.clear(),
            KeyCode::PageUp => self.preview_scroll = self.preview_scroll.saturating_sub(5),
            KeyCode::PageDown => self.preview_scroll = self.preview_scroll.saturating_add(5),
            KeyCode::Enter => self.input.push('\n'),
            KeyCode::Tab => self.input.push('\t'),
            KeyCode::Backspace => {
                self.input.pop();
            }
            KeyCode::Char(c) if !ctrl => self.input.push(c),
            _ => {}
        }
        None
    }

    /// Bracketed paste lands in the article buffer as-is
    pub fn handle_paste(&mut self, text: &str) {
        // Terminals send CR line breaks inside pastes
        self.input.push_str(&text.replace("\r\n", "\n").replace('\r', "\n"));
    }

    /// Re-run the platform probe (terminal resized)
    pub fn refresh_platform(&mut self) {
        let platform = self.probe.class();
        if platform != self.platform {
            tracing::debug!(from = %self.platform, to = %platform, "Platform class changed");
            self.platform = platform;
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Generate / export
    // ─────────────────────────────────────────────────────────────────────────

    pub fn request_generate(&mut self) -> Option<Command> {
        let BeginOutcome::Started(ticket) = self.session.begin(&self.input) else {
            return None;
        };
        self.preview_scroll = 0;

        match &self.extractor {
            Ok(extractor) => Some(Command::Extract {
                extractor: extractor.clone(),
                ticket,
            }),
            Err(e) => {
                // Not configured: fail the request the same way a service error would
                let err = e.clone();
                self.session.finish(ticket, Err(err));
                None
            }
        }
    }

    pub fn request_export(&mut self) -> Option<Command> {
        if self.session.is_loading() {
            return None;
        }
        let card = self.session.begin_export()?;
        Some(Command::Export {
            card,
            platform: self.platform,
        })
    }

    /// Apply the result of background work
    pub fn apply(&mut self, job: JobResult) {
        match job {
            JobResult::Extracted { ticket, result } => {
                self.session.finish(ticket, result);
            }
            JobResult::Exported(result) => {
                self.session.finish_export();
                self.toast = Some(match result {
                    Ok(outcome) => Toast::info(outcome.message()),
                    Err(e) => {
                        tracing::error!(error = %e, "Export failed");
                        Toast::error(e.user_message())
                    }
                });
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Display helpers
    // ─────────────────────────────────────────────────────────────────────────

    /// Whether a generate or export job is running
    pub fn is_busy(&self) -> bool {
        self.session.is_loading() || self.session.is_exporting()
    }

    /// Advance spinner and expire the toast
    pub fn tick(&mut self) {
        self.animation_frame = self.animation_frame.wrapping_add(1);
        if self.toast.as_ref().is_some_and(Toast::is_expired) {
            self.toast = None;
        }
    }

    pub fn spinner_char(&self) -> char {
        SPINNER[self.animation_frame % SPINNER.len()]
    }

    /// Label for the export action on this platform
    pub fn export_label(&self) -> &'static str {
        match self.platform {
            PlatformClass::Touch => "保存洞见卡",
            PlatformClass::Desktop => "复制到剪贴板",
        }
    }
}
