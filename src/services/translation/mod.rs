pub mod cache;
pub mod dispatcher;
pub mod local;
pub mod remote;
pub mod service;

pub use cache::{CacheKey, TranslationCache};
pub use dispatcher::{FallbackDispatcher, TranslationProvider};
pub use local::LocalTranslator;
pub use remote::RemoteTranslator;
pub use service::TranslationService;
