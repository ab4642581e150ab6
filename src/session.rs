//! Session controller: one generate request at a time
//!
//! ```text
//!   Idle ──begin──▶ Loading ──finish(Ok)──▶ Ready(card)
//!                      │                      │
//!                      └──finish(Err)──▶ Failed{error}
//!   Ready/Failed ──begin──▶ Loading   (previous card dropped)
//! ```
//!
//! Single-flight is enforced here rather than with locks: `begin` hands out a
//! [`Ticket`] only when nothing is in flight, and `finish` only accepts the
//! ticket it handed out. Exports follow the same rule through
//! `begin_export`/`finish_export`, and work on whatever card is on screen.
//!
//! Empty input never reaches the extractor. It fails with a validation
//! message and leaves any card already on screen in place.

use crate::card::InsightCardData;
use crate::extract::ExtractionError;
use std::fmt;
use std::sync::Arc;

/// Shown when generate is pressed with no article text
pub const EMPTY_INPUT_MESSAGE: &str = "请输入文章内容";

/// Prefix for extraction failures
pub const GENERATE_FAILED_PREFIX: &str = "生成失败: ";

/// A card as held by the session and shared with background jobs
pub type SharedCard = Arc<InsightCardData>;

/// Why the session is in the error state
#[derive(Debug, Clone)]
pub enum SessionError {
    /// Input was empty or whitespace
    Validation,
    /// The extractor failed
    Extraction(ExtractionError),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation => f.write_str(EMPTY_INPUT_MESSAGE),
            Self::Extraction(e) => {
                let cause = e.to_string();
                let cause = if cause.trim().is_empty() {
                    "未知错误".to_string()
                } else {
                    cause
                };
                write!(f, "{}{}", GENERATE_FAILED_PREFIX, cause)
            }
        }
    }
}

impl std::error::Error for SessionError {}

/// Observable session state
#[derive(Debug, Clone)]
pub enum SessionState {
    Idle,
    Loading,
    Ready(SharedCard),
    /// `card` is the card still on screen, if the failure didn't discard it
    Failed {
        error: SessionError,
        card: Option<SharedCard>,
    },
}

impl SessionState {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Ready(_) => "data-ready",
            Self::Failed { .. } => "error",
        }
    }
}

/// Proof that a request is in flight; redeemed exactly once by `finish`
#[derive(Debug)]
pub struct Ticket {
    id: u64,
    input: String,
}

impl Ticket {
    /// The article text to extract from
    pub fn input(&self) -> &str {
        &self.input
    }
}

/// Result of asking to start a request
#[derive(Debug)]
pub enum BeginOutcome {
    /// Something is already in flight; nothing changed
    Busy,
    /// Input rejected; the session is now `Failed { Validation }`
    Rejected,
    /// Now loading; run the extractor on the ticket's input
    Started(Ticket),
}

/// The generate/export state machine
#[derive(Debug)]
pub struct Session {
    state: SessionState,
    next_ticket: u64,
    in_flight: Option<u64>,
    exporting: bool,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            state: SessionState::Idle,
            next_ticket: 0,
            in_flight: None,
            exporting: false,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, SessionState::Loading)
    }

    pub fn is_exporting(&self) -> bool {
        self.exporting
    }

    /// Card currently on screen
    pub fn card(&self) -> Option<&SharedCard> {
        match &self.state {
            SessionState::Ready(card) => Some(card),
            SessionState::Failed { card, .. } => card.as_ref(),
            _ => None,
        }
    }

    /// User-facing error text, if in the error state
    pub fn error_message(&self) -> Option<String> {
        match &self.state {
            SessionState::Failed { error, .. } => Some(error.to_string()),
            _ => None,
        }
    }

    /// Ask to start a generate request
    pub fn begin(&mut self, input: &str) -> BeginOutcome {
        if self.in_flight.is_some() || self.exporting {
            tracing::debug!("Generate ignored: request already in flight");
            return BeginOutcome::Busy;
        }

        if input.trim().is_empty() {
            let card = self.card().cloned();
            self.state = SessionState::Failed {
                error: SessionError::Validation,
                card,
            };
            return BeginOutcome::Rejected;
        }

        let id = self.next_ticket;
        self.next_ticket += 1;
        self.in_flight = Some(id);
        self.state = SessionState::Loading;
        tracing::info!(chars = input.chars().count(), "Generating insight card");

        BeginOutcome::Started(Ticket {
            id,
            input: input.to_string(),
        })
    }

    /// Complete the in-flight request; returns false for a stale ticket
    pub fn finish(
        &mut self,
        ticket: Ticket,
        result: Result<InsightCardData, ExtractionError>,
    ) -> bool {
        if self.in_flight != Some(ticket.id) {
            tracing::warn!(ticket = ticket.id, "Ignoring result for stale ticket");
            return false;
        }
        self.in_flight = None;

        self.state = match result {
            Ok(card) => {
                tracing::info!(
                    title = card.title(),
                    stages = card.stages().len(),
                    "Insight card ready"
                );
                SessionState::Ready(Arc::new(card))
            }
            Err(e) => {
                tracing::error!(error = %e, "Extraction failed");
                SessionState::Failed {
                    error: SessionError::Extraction(e),
                    card: None,
                }
            }
        };
        true
    }

    /// begin + extract + finish on the calling thread
    #[cfg(test)]
    pub fn generate(
        &mut self,
        extractor: &dyn crate::extract::InsightExtractor,
        input: &str,
    ) -> &SessionState {
        if let BeginOutcome::Started(ticket) = self.begin(input) {
            tracing::debug!(extractor = extractor.name(), "Calling extractor");
            let result = extractor.extract(ticket.input());
            self.finish(ticket, result);
        }
        &self.state
    }

    /// Whether a card is on screen and nothing is running
    ///
    /// A validation error leaves the previous card on screen, and it stays
    /// exportable.
    pub fn can_export(&self) -> bool {
        !self.exporting && self.in_flight.is_none() && self.card().is_some()
    }

    /// Claim the export slot for the card on screen
    pub fn begin_export(&mut self) -> Option<SharedCard> {
        if !self.can_export() {
            return None;
        }
        let card = self.card().cloned();
        self.exporting = card.is_some();
        card
    }

    pub fn finish_export(&mut self) {
        self.exporting = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::fixtures::card;
    use crate::extract::fake::ScriptedExtractor;
    use crate::render::{render, RenderContext};

    #[test]
    fn test_empty_input_never_reaches_extractor() {
        let extractor = ScriptedExtractor::returning(Ok(card(3)));
        let mut session = Session::new();

        for input in ["", "   \n\t"] {
            let state = session.generate(&extractor, input);
            assert_eq!(state.name(), "error");
            assert_eq!(session.error_message().as_deref(), Some("请输入文章内容"));
        }
        assert_eq!(extractor.calls(), 0);
    }

    #[test]
    fn test_valid_input_yields_card_with_stages_in_order() {
        let extractor = ScriptedExtractor::returning(Ok(card(4)));
        let mut session = Session::new();

        session.generate(&extractor, "一篇关于深度工作的文章");
        assert_eq!(session.state().name(), "data-ready");
        assert_eq!(extractor.calls(), 1);
        assert_eq!(extractor.last_input().as_deref(), Some("一篇关于深度工作的文章"));

        let card = session.card().unwrap();
        let layout = render(card, &RenderContext::today());
        let rows: Vec<&str> = layout
            .texts()
            .filter(|t| t.content.starts_with("阶段"))
            .map(|t| t.content.as_str())
            .collect();
        assert_eq!(rows, vec!["阶段1", "阶段2", "阶段3", "阶段4"]);
    }

    #[test]
    fn test_extraction_error_is_prefixed() {
        let extractor = ScriptedExtractor::returning(Err(ExtractionError::QuotaExceeded(
            "quota exceeded".into(),
        )));
        let mut session = Session::new();

        session.generate(&extractor, "some article");
        assert_eq!(session.state().name(), "error");
        assert_eq!(
            session.error_message().as_deref(),
            Some("生成失败: quota exceeded")
        );
        assert!(session.card().is_none());
    }

    #[test]
    fn test_blank_cause_reads_unknown_error() {
        let err = SessionError::Extraction(ExtractionError::Network(String::new()));
        assert!(err.to_string().starts_with("生成失败: "));

        let err = SessionError::Extraction(ExtractionError::QuotaExceeded(" ".into()));
        assert_eq!(err.to_string(), "生成失败: 未知错误");
    }

    #[test]
    fn test_second_begin_while_loading_is_ignored() {
        let mut session = Session::new();
        let BeginOutcome::Started(ticket) = session.begin("first") else {
            panic!("first request should start");
        };

        assert!(matches!(session.begin("second"), BeginOutcome::Busy));
        assert!(matches!(session.begin(""), BeginOutcome::Busy));
        assert!(session.is_loading());

        assert!(session.finish(ticket, Ok(card(3))));
        assert_eq!(session.state().name(), "data-ready");
    }

    #[test]
    fn test_stale_ticket_rejected() {
        let mut session = Session::new();
        let BeginOutcome::Started(first) = session.begin("first") else {
            panic!();
        };
        assert!(session.finish(first, Ok(card(3))));

        let BeginOutcome::Started(second) = session.begin("second") else {
            panic!();
        };
        let forged = Ticket {
            id: 0,
            input: "first".into(),
        };
        assert!(!session.finish(forged, Ok(card(5))));
        assert!(session.is_loading());
        assert!(session.finish(second, Ok(card(4))));
        assert_eq!(session.card().unwrap().stages().len(), 4);
    }

    #[test]
    fn test_validation_error_keeps_previous_card() {
        let extractor = ScriptedExtractor::returning(Ok(card(3)));
        let mut session = Session::new();
        session.generate(&extractor, "article");

        session.generate(&extractor, "  ");
        assert_eq!(session.state().name(), "error");
        assert_eq!(session.card().unwrap().stages().len(), 3);
    }

    #[test]
    fn test_new_request_discards_previous_card() {
        let extractor = ScriptedExtractor::returning(Ok(card(3)));
        let mut session = Session::new();
        session.generate(&extractor, "article");

        assert!(matches!(session.begin("another"), BeginOutcome::Started(_)));
        assert!(session.card().is_none());
    }

    #[test]
    fn test_export_single_flight() {
        let mut session = Session::new();
        assert!(session.begin_export().is_none(), "nothing to export yet");

        let extractor = ScriptedExtractor::returning(Ok(card(3)));
        session.generate(&extractor, "article");

        let card = session.begin_export().expect("ready card exports");
        assert_eq!(card.stages().len(), 3);
        assert!(session.begin_export().is_none());
        assert!(matches!(session.begin("next"), BeginOutcome::Busy));

        session.finish_export();
        assert!(session.begin_export().is_some());
    }

    #[test]
    fn test_card_kept_after_validation_error_stays_exportable() {
        let extractor = ScriptedExtractor::returning(Ok(card(3)));
        let mut session = Session::new();
        session.generate(&extractor, "article");
        session.generate(&extractor, "  ");

        assert_eq!(session.state().name(), "error");
        assert!(session.can_export());
        let exported = session.begin_export().expect("visible card exports");
        assert_eq!(exported.stages().len(), 3);
        assert!(!session.can_export());
    }

    #[test]
    fn test_extraction_failure_leaves_nothing_to_export() {
        let extractor = ScriptedExtractor::returning(Err(ExtractionError::Network("reset".into())));
        let mut session = Session::new();
        session.generate(&extractor, "article");

        assert!(!session.can_export());
        assert!(session.begin_export().is_none());
    }
}
