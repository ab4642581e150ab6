//! Platform classification for export
//!
//! Touch platforms can't receive images on the clipboard reliably, so they get
//! a save page instead. The decision sits behind [`PlatformProbe`]; the
//! default probe matches a user-agent signature against the usual mobile
//! tokens. The signature is either configured explicitly or synthesized from
//! the host.

use crate::config::{ExportConfig, PlatformMode};
use regex::Regex;
use std::fmt;

/// Tokens that mark a touch (mobile) user agent, matched case-insensitively
pub const TOUCH_UA_PATTERN: &str = r"(?i)Android|webOS|iPhone|iPad|iPod|BlackBerry|IEMobile|Opera Mini";

/// Which export path applies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformClass {
    /// Render to a save page the user long-presses
    Touch,
    /// Copy to clipboard, falling back to a PNG file
    Desktop,
}

impl fmt::Display for PlatformClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Touch => write!(f, "touch"),
            Self::Desktop => write!(f, "desktop"),
        }
    }
}

/// Decides whether the current environment should use the touch export path
///
/// Implementations must be cheap: the TUI re-asks on every terminal resize.
pub trait PlatformProbe: Send + Sync {
    fn is_touch_export_platform(&self) -> bool;

    fn class(&self) -> PlatformClass {
        if self.is_touch_export_platform() {
            PlatformClass::Touch
        } else {
            PlatformClass::Desktop
        }
    }
}

/// Probe that sniffs a user-agent signature
pub struct UserAgentProbe {
    signature: String,
    pattern: Regex,
}

impl UserAgentProbe {
    pub fn new(signature: impl Into<String>) -> Result<Self, regex::Error> {
        Ok(Self {
            signature: signature.into(),
            pattern: Regex::new(TOUCH_UA_PATTERN)?,
        })
    }
}

impl PlatformProbe for UserAgentProbe {
    fn is_touch_export_platform(&self) -> bool {
        self.pattern.is_match(&self.signature)
    }
}

/// Probe pinned to one class by configuration
pub struct FixedProbe(pub PlatformClass);

impl PlatformProbe for FixedProbe {
    fn is_touch_export_platform(&self) -> bool {
        self.0 == PlatformClass::Touch
    }
}

/// Build the probe the configuration asks for
///
/// `user_agent` (e.g. from `--user-agent`) wins over `export.user_agent`,
/// which wins over the host signature. A forced `export.platform` ignores
/// signatures entirely.
pub fn probe_for(
    config: &ExportConfig,
    user_agent: Option<&str>,
) -> Result<Box<dyn PlatformProbe>, regex::Error> {
    match config.platform {
        PlatformMode::Touch => Ok(Box::new(FixedProbe(PlatformClass::Touch))),
        PlatformMode::Desktop => Ok(Box::new(FixedProbe(PlatformClass::Desktop))),
        PlatformMode::Auto => {
            let signature = user_agent
                .map(str::to_string)
                .or_else(|| config.user_agent.clone())
                .unwrap_or_else(host_signature);
            tracing::debug!(signature = %signature, "Platform probe signature");
            Ok(Box::new(UserAgentProbe::new(signature)?))
        }
    }
}

/// User-agent style signature for the machine we run on
pub fn host_signature() -> String {
    signature_for(std::env::consts::OS, is_termux())
}

fn is_termux() -> bool {
    std::env::var_os("TERMUX_VERSION").is_some()
        || std::env::var("PREFIX")
            .map(|p| p.contains("com.termux"))
            .unwrap_or(false)
}

fn signature_for(os: &str, termux: bool) -> String {
    let platform = match os {
        _ if termux => "Linux; Android",
        "android" => "Linux; Android",
        "ios" => "iPhone; CPU iPhone OS like Mac OS X",
        "macos" => "Macintosh; Intel Mac OS X",
        "windows" => "Windows NT 10.0; Win64; x64",
        "linux" => "X11; Linux x86_64",
        other => other,
    };
    format!(
        "Mozilla/5.0 ({}) insight-card/{}",
        platform,
        crate::config::VERSION
    )
}
