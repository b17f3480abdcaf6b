pub mod detection;
pub mod translation;

// Re-export commonly used types
pub use detection::LanguageDetector;
pub use translation::{
    FallbackDispatcher, LocalTranslator, RemoteTranslator, TranslationCache, TranslationProvider,
    TranslationService,
};
