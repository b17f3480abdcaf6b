// Custom error types for better error handling and debugging
//
// Using thiserror for ergonomic error definitions with:
// - Context preservation
// - Type-safe error matching
// - Source error chaining

use thiserror::Error;

/// Translation provider errors.
///
/// These are caught at the point of invocation inside the dispatcher and
/// never escape the core unwrapped: a local provider failure triggers the
/// remote fallback, a remote failure is wrapped into [`TranslationError`].
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("local model unavailable: {0}")]
    Unavailable(String),

    #[error("inference failed: {0}")]
    Inference(String),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected response format: {0}")]
    InvalidResponse(String),

    #[error("provider returned an empty translation")]
    EmptyOutput,
}

/// The only error kind visible past the core boundary.
///
/// Produced when the fallback chain is exhausted; the request handler maps
/// it to a transport-level error response.
#[derive(Debug, Error)]
pub enum TranslationError {
    #[error("translation failed: {0}")]
    RemoteFailed(#[source] ProviderError),
}

/// Configuration errors, fatal at startup
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("max_input_chars must be > 0, got {0}")]
    InvalidInputLimit(usize),

    #[error("max_cache_size must be > 0, got {0}")]
    InvalidCacheSize(usize),

    #[error("max_output_tokens must be in [1, 4096], got {0}")]
    InvalidOutputTokens(usize),

    #[error("server host must not be empty")]
    EmptyHost,
}

// Convenience type aliases for Results
pub type ProviderResult<T> = Result<T, ProviderError>;
pub type TranslationResult<T> = Result<T, TranslationError>;
pub type ConfigResult<T> = Result<T, ConfigError>;
