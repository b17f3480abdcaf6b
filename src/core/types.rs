// Shared value types for the translation workflow

use serde::{Deserialize, Serialize};

/// Sentinel language code meaning "source unknown, detect it".
///
/// When detection itself is inconclusive the sentinel is kept and passed
/// verbatim to the providers, which may reject it; that pass-through is a
/// deliberate choice, not a silent failure.
pub const AUTO_LANG: &str = "auto";

/// Incoming translation request body
#[derive(Debug, Clone, Deserialize)]
pub struct TranslationRequest {
    #[serde(default)]
    pub text: String,
    #[serde(default = "default_source_lang")]
    pub source_lang: String,
    #[serde(default = "default_target_lang")]
    pub target_lang: String,
}

fn default_source_lang() -> String {
    AUTO_LANG.to_string()
}

fn default_target_lang() -> String {
    "hi".to_string()
}

/// Outcome of a resolved translation, as produced by the core
#[derive(Debug, Clone)]
pub struct ResolvedTranslation {
    pub translated_text: String,
    /// Source language actually used for the provider call; either the
    /// caller-supplied code, a detected code, or the `"auto"` sentinel
    pub resolved_source_lang: String,
    /// Whether the result was served from the cache
    pub cached: bool,
}

/// Response body for a successful translation.
///
/// `translation` and `translated_text` carry the same string; both names are
/// kept for compatibility with existing frontend clients.
#[derive(Debug, Clone, Serialize)]
pub struct TranslationResponse {
    pub translation: String,
    pub translated_text: String,
    pub source_lang: String,
    pub target_lang: String,
    pub detected_source_lang: Option<String>,
    pub cached: bool,
}

/// Response body for a failed request
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}
