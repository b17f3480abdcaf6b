pub mod config;
pub mod errors;
pub mod types;

// Re-export commonly used items for convenience
pub use config::Config;
pub use errors::{ConfigError, ProviderError, TranslationError};
pub use types::{
    ErrorResponse, ResolvedTranslation, TranslationRequest, TranslationResponse, AUTO_LANG,
};
