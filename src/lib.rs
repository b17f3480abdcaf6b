// Library exports for the translation service

pub mod core;
pub mod services;
pub mod utils;

// Re-export commonly used types and functions
pub use core::{
    config::Config,
    errors::{ConfigError, ProviderError, TranslationError},
    types::{ResolvedTranslation, TranslationRequest, TranslationResponse, AUTO_LANG},
};

pub use services::{
    FallbackDispatcher, LanguageDetector, LocalTranslator, RemoteTranslator, TranslationCache,
    TranslationProvider, TranslationService,
};

pub use utils::Metrics;
