//! Extraction configuration: generative service endpoint, model, credential

use serde::Deserialize;

/// Default Gemini REST base
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default model
pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";

/// Environment variables checked for the credential, in order
pub const API_KEY_ENV_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

/// Generative service settings
#[derive(Debug, Clone)]
pub struct ExtractionConfig {
    /// REST base URL (no trailing slash needed)
    pub api_base: String,
    /// Model identifier
    pub model: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// API key (env var takes precedence over the file)
    pub api_key: Option<String>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout_secs: 60,
            api_key: None,
        }
    }
}

/// Extraction settings as loaded from config file
#[derive(Debug, Deserialize, Default)]
pub struct FileExtraction {
    pub api_base: Option<String>,
    pub model: Option<String>,
    pub timeout_secs: Option<u64>,
    pub api_key: Option<String>,
}

impl ExtractionConfig {
    /// Create from file config with defaults; `env_api_key` wins over the file
    pub fn from_file(file: Option<FileExtraction>, env_api_key: Option<String>) -> Self {
        let file = file.unwrap_or_default();
        let defaults = Self::default();

        Self {
            api_base: file.api_base.unwrap_or(defaults.api_base),
            model: file.model.unwrap_or(defaults.model),
            timeout_secs: file.timeout_secs.unwrap_or(defaults.timeout_secs),
            api_key: env_api_key.or(file.api_key),
        }
    }

    /// First non-empty credential from the environment
    pub fn api_key_from_env() -> Option<String> {
        API_KEY_ENV_VARS
            .iter()
            .filter_map(|name| std::env::var(name).ok())
            .find(|v| !v.trim().is_empty())
    }
}
