// Request orchestration: detection, cache lookup, dispatch, cache fill

use std::num::NonZeroUsize;
use tracing::debug;

use crate::core::errors::TranslationResult;
use crate::core::types::{ResolvedTranslation, AUTO_LANG};
use crate::services::detection::LanguageDetector;
use crate::services::translation::cache::{CacheKey, TranslationCache};
use crate::services::translation::dispatcher::FallbackDispatcher;
use crate::utils::Metrics;

/// The core entry point consumed by the request handlers.
///
/// Owns the detector, the cache, and the dispatcher; safe to share across
/// handler tasks behind an `Arc`.
pub struct TranslationService {
    detector: LanguageDetector,
    cache: TranslationCache,
    dispatcher: FallbackDispatcher,
    metrics: Option<Metrics>,
}

impl TranslationService {
    pub fn new(
        cache_capacity: NonZeroUsize,
        dispatcher: FallbackDispatcher,
        metrics: Option<Metrics>,
    ) -> Self {
        Self {
            detector: LanguageDetector::new(),
            cache: TranslationCache::new(cache_capacity),
            dispatcher,
            metrics,
        }
    }

    /// Resolve a translation request end to end.
    ///
    /// An `"auto"` source runs the detector first; if detection is
    /// inconclusive the `"auto"` literal itself is passed on to the
    /// providers. Successful translations populate the cache; failures
    /// propagate unchanged and leave the cache untouched, so an identical
    /// retry re-attempts translation.
    pub async fn resolve(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> TranslationResult<ResolvedTranslation> {
        let source_lang = source_lang.to_lowercase();
        let target_lang = target_lang.to_lowercase();

        let resolved_source = if source_lang == AUTO_LANG {
            self.detector.detect(text)
        } else {
            source_lang
        };

        let key = CacheKey::new(text, &resolved_source, &target_lang);

        if let Some(translated) = self.cache.get(&key) {
            debug!(source = %resolved_source, target = %target_lang, "cache hit");
            if let Some(ref m) = self.metrics {
                m.record_cache_hit();
            }
            return Ok(ResolvedTranslation {
                translated_text: translated,
                resolved_source_lang: resolved_source,
                cached: true,
            });
        }

        if let Some(ref m) = self.metrics {
            m.record_cache_miss();
        }

        let translated = self
            .dispatcher
            .translate(text, &resolved_source, &target_lang)
            .await?;

        self.cache.put(key, translated.clone());
        if let Some(ref m) = self.metrics {
            m.update_cache_size(self.cache.len());
        }

        Ok(ResolvedTranslation {
            translated_text: translated,
            resolved_source_lang: resolved_source,
            cached: false,
        })
    }

    /// Current number of cached translations
    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::errors::ProviderError;
    use crate::services::translation::dispatcher::TranslationProvider;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Remote stand-in that records how it was called
    struct RecordingRemote {
        response: Result<&'static str, &'static str>,
        calls: AtomicUsize,
        last_pair: Mutex<Option<(String, String)>>,
    }

    impl RecordingRemote {
        fn new(response: Result<&'static str, &'static str>) -> Arc<Self> {
            Arc::new(Self {
                response,
                calls: AtomicUsize::new(0),
                last_pair: Mutex::new(None),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TranslationProvider for RecordingRemote {
        fn name(&self) -> &'static str {
            "remote"
        }

        fn supports(&self, _source_lang: &str, _target_lang: &str) -> bool {
            true
        }

        async fn translate(
            &self,
            _text: &str,
            source_lang: &str,
            target_lang: &str,
        ) -> Result<String, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_pair.lock() = Some((source_lang.to_string(), target_lang.to_string()));
            match self.response {
                Ok(s) => Ok(s.to_string()),
                Err(reason) => Err(ProviderError::Inference(reason.to_string())),
            }
        }
    }

    /// Local stand-in that always fails for its supported pair
    struct BrokenLocal;

    #[async_trait]
    impl TranslationProvider for BrokenLocal {
        fn name(&self) -> &'static str {
            "local"
        }

        fn supports(&self, source_lang: &str, target_lang: &str) -> bool {
            source_lang == "en" && target_lang == "hi"
        }

        async fn translate(
            &self,
            _text: &str,
            _source_lang: &str,
            _target_lang: &str,
        ) -> Result<String, ProviderError> {
            Err(ProviderError::Unavailable("no model".to_string()))
        }
    }

    fn service_with(remote: Arc<RecordingRemote>) -> TranslationService {
        let dispatcher = FallbackDispatcher::new(Arc::new(BrokenLocal), remote, None);
        TranslationService::new(NonZeroUsize::new(8).unwrap(), dispatcher, None)
    }

    #[tokio::test]
    async fn test_miss_then_hit() {
        let remote = RecordingRemote::new(Ok("नमस्ते"));
        let service = service_with(remote.clone());

        let first = service.resolve("Hello", "en", "hi").await.unwrap();
        assert_eq!(first.translated_text, "नमस्ते");
        assert!(!first.cached);

        let second = service.resolve("Hello", "en", "hi").await.unwrap();
        assert_eq!(second.translated_text, "नमस्ते");
        assert!(second.cached);
        assert_eq!(remote.calls(), 1);
    }

    #[tokio::test]
    async fn test_code_case_shares_cache_entry() {
        let remote = RecordingRemote::new(Ok("नमस्ते"));
        let service = service_with(remote.clone());

        service.resolve("Hello", "EN", "HI").await.unwrap();
        let second = service.resolve("Hello", "en", "hi").await.unwrap();

        assert!(second.cached);
        assert_eq!(remote.calls(), 1);
        assert_eq!(service.cache_len(), 1);
    }

    #[tokio::test]
    async fn test_failed_translation_is_not_cached() {
        let remote = RecordingRemote::new(Err("upstream down"));
        let service = service_with(remote.clone());

        assert!(service.resolve("Hello", "en", "hi").await.is_err());
        assert_eq!(service.cache_len(), 0);

        // An identical retry re-attempts translation rather than serving a
        // cached failure
        assert!(service.resolve("Hello", "en", "hi").await.is_err());
        assert_eq!(remote.calls(), 2);
    }

    #[tokio::test]
    async fn test_auto_source_is_detected() {
        let remote = RecordingRemote::new(Ok("नमस्ते"));
        let service = service_with(remote.clone());

        let resolved = service
            .resolve(
                "The quick brown fox jumps over the lazy dog near the river bank.",
                "auto",
                "hi",
            )
            .await
            .unwrap();

        assert_eq!(resolved.resolved_source_lang, "en");
    }

    #[tokio::test]
    async fn test_inconclusive_detection_passes_auto_through() {
        let remote = RecordingRemote::new(Ok("??"));
        let service = service_with(remote.clone());

        // Digits cannot be language-identified; the sentinel is used
        // verbatim as the provider-facing source language (documented
        // pass-through behavior)
        let resolved = service.resolve("1234567890", "auto", "hi").await.unwrap();
        assert_eq!(resolved.resolved_source_lang, "auto");

        let pair = remote.last_pair.lock().clone().unwrap();
        assert_eq!(pair.0, "auto");
        assert_eq!(pair.1, "hi");
    }
}
