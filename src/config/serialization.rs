//! Config serialization to TOML
//!
//! Single source of truth for config file format.

use super::Config;

/// Quote a value as a TOML basic string
fn quoted(value: &str) -> String {
    toml::Value::String(value.to_string()).to_string()
}

impl Config {
    /// Serialize font_dirs as a TOML array (commented example when empty)
    pub(super) fn font_dirs_to_toml(&self) -> String {
        if self.render.font_dirs.is_empty() {
            return "# font_dirs = [\"~/.local/share/fonts/noto-cjk\"]\n".to_string();
        }

        let dirs: Vec<String> = self
            .render
            .font_dirs
            .iter()
            .map(|d| quoted(&d.to_string_lossy()))
            .collect();
        format!("font_dirs = [{}]\n", dirs.join(", "))
    }

    /// Serialize config to TOML string (single source of truth for format)
    pub fn to_toml(&self) -> String {
        let api_key = match &self.extraction.api_key {
            Some(key) => format!("api_key = {}\n", quoted(key)),
            None => "# api_key = \"...\"  # Prefer GEMINI_API_KEY (or API_KEY) env var\n"
                .to_string(),
        };

        let user_agent = match &self.export.user_agent {
            Some(ua) => format!("user_agent = {}\n", quoted(ua)),
            None => "# user_agent = \"Mozilla/5.0 (iPhone; ...)\"  # Override the sniffed signature\n"
                .to_string(),
        };

        format!(
            r#"# insight-card configuration

# ─────────────────────────────────────────────────────────────────────────────
# EXTRACTION
# ─────────────────────────────────────────────────────────────────────────────
# Generative service used to turn an article into a card.
# The credential is read from GEMINI_API_KEY, then API_KEY, then this file.
[extraction]
api_base = {api_base}
model = {model}
timeout_secs = {timeout}
{api_key}
# ─────────────────────────────────────────────────────────────────────────────
# EXPORT
# ─────────────────────────────────────────────────────────────────────────────
# platform: auto (sniff user agent), touch (open save page), desktop (clipboard)
[export]
output_dir = {output_dir}
scale = {scale:?}
platform = "{platform}"
{user_agent}
# Extra font directories for rasterizing (system fonts are always loaded).
# CJK text needs a CJK-capable font such as Noto Sans CJK.
[render]
{font_dirs}
# Level for this app's events: trace, debug, info, warn, error.
# RUST_LOG replaces the whole filter when set.
[logging]
level = {log_level}
# JSON log files, one per rotation period (hourly, daily, never)
file_enabled = {log_file_enabled}
file_dir = {log_file_dir}
file_rotation = "{log_file_rotation}"
"#,
            api_base = quoted(&self.extraction.api_base),
            model = quoted(&self.extraction.model),
            timeout = self.extraction.timeout_secs,
            api_key = api_key,
            output_dir = quoted(&self.export.output_dir.to_string_lossy()),
            scale = self.export.scale,
            platform = self.export.platform.as_str(),
            user_agent = user_agent,
            font_dirs = self.font_dirs_to_toml(),
            log_level = quoted(&self.logging.level),
            log_file_enabled = self.logging.file_enabled,
            log_file_dir = quoted(&self.logging.file_dir.to_string_lossy()),
            log_file_rotation = self.logging.file_rotation.as_str(),
        )
    }
}
