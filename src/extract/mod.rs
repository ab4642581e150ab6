//! Insight extraction: source text in, validated card out
//!
//! The generative service is the only non-trivial collaborator in the system,
//! so it sits behind the narrow [`InsightExtractor`] trait. The session
//! controller only ever sees `extract(text) -> Result<InsightCardData, ExtractionError>`,
//! which lets tests swap in a scripted fake.
//!
//! # Contract
//!
//! - Exactly one request per call, no retry.
//! - The request declares a response schema mirroring the card contract
//!   (see [`schema::response_schema`]).
//! - The response is validated client-side regardless of what the service
//!   promises; a non-conforming payload is an error, never coerced.

pub mod gemini;
pub mod prompt;
pub mod schema;

pub use gemini::GeminiExtractor;

use crate::card::{CardError, ContractError, InsightCardData};
use std::fmt;

/// Errors that can occur during extraction
///
/// `Display` yields the human-readable cause only; the session controller adds
/// the user-facing prefix.
#[derive(Debug, Clone)]
pub enum ExtractionError {
    /// No API credential configured
    MissingApiKey,
    /// Transport failure (DNS, TLS, timeout, connection reset)
    Network(String),
    /// Credential rejected (401/403)
    Unauthorized(String),
    /// Quota or rate limit exhausted (429)
    QuotaExceeded(String),
    /// Any other non-success status from the service
    Service { status: u16, message: String },
    /// The service answered but produced no candidate text
    EmptyResponse(String),
    /// Candidate text isn't JSON of the expected shape
    Malformed(String),
    /// JSON parsed but breaks the card contract
    Contract(ContractError),
}

impl fmt::Display for ExtractionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingApiKey => {
                write!(f, "API key not configured (set GEMINI_API_KEY)")
            }
            Self::Network(msg) => write!(f, "network error: {}", msg),
            Self::Unauthorized(msg) => write!(f, "{}", msg),
            Self::QuotaExceeded(msg) => write!(f, "{}", msg),
            Self::Service { status, message } => write!(f, "{} (HTTP {})", message, status),
            Self::EmptyResponse(reason) => write!(f, "Failed to generate insight data: {}", reason),
            Self::Malformed(msg) => write!(f, "unexpected response format: {}", msg),
            Self::Contract(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for ExtractionError {}

impl From<CardError> for ExtractionError {
    fn from(err: CardError) -> Self {
        match err {
            CardError::Malformed(e) => Self::Malformed(e.to_string()),
            CardError::Contract(e) => Self::Contract(e),
        }
    }
}

/// Trait for insight extraction backends
///
/// # Sync Design
///
/// `extract` blocks for the duration of one request. Callers on the async
/// runtime run it on `spawn_blocking`.
///
/// # Thread Safety
///
/// Extractors must be `Send + Sync` so one instance can be shared with
/// background jobs.
pub trait InsightExtractor: Send + Sync {
    /// Human-readable name for logging
    fn name(&self) -> &'static str;

    /// Derive a card from non-empty source text
    fn extract(&self, source_text: &str) -> Result<InsightCardData, ExtractionError>;
}
