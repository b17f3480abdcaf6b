// Provider selection and fallback policy
//
// Policy: best-effort local, always-available remote. The local model is
// cheaper and faster but covers a single language pair and may be absent
// entirely (missing model files); its failures are discarded and the remote
// provider is attempted instead. Only an exhausted chain surfaces an error.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::core::errors::{ProviderError, TranslationError};
use crate::utils::Metrics;

/// A capability that translates text for some set of language pairs
#[async_trait]
pub trait TranslationProvider: Send + Sync {
    /// Short provider name for logs and metrics
    fn name(&self) -> &'static str;

    /// Whether this provider covers the `(source, target)` pair
    fn supports(&self, source_lang: &str, target_lang: &str) -> bool;

    async fn translate(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<String, ProviderError>;
}

/// Two-provider fallback chain: local first when the pair is covered, then
/// the remote provider.
pub struct FallbackDispatcher {
    local: Arc<dyn TranslationProvider>,
    remote: Arc<dyn TranslationProvider>,
    metrics: Option<Metrics>,
}

impl FallbackDispatcher {
    pub fn new(
        local: Arc<dyn TranslationProvider>,
        remote: Arc<dyn TranslationProvider>,
        metrics: Option<Metrics>,
    ) -> Self {
        Self {
            local,
            remote,
            metrics,
        }
    }

    /// Translate through the fallback chain.
    ///
    /// Fails only when every attempted provider fails; a local failure for a
    /// supported pair is logged and swallowed so the request can still be
    /// served by the remote path.
    pub async fn translate(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<String, TranslationError> {
        if self.local.supports(source_lang, target_lang) {
            match self.attempt(self.local.as_ref(), text, source_lang, target_lang).await {
                Ok(translated) => return Ok(translated),
                Err(err) => {
                    // Intentionally non-fatal: keep the endpoint available
                    // as long as the remote provider is reachable.
                    warn!(
                        provider = self.local.name(),
                        error = %err,
                        "local provider failed, falling back to remote"
                    );
                }
            }
        } else {
            debug!(
                source = source_lang,
                target = target_lang,
                "pair not covered by local provider, dispatching to remote"
            );
        }

        self.attempt(self.remote.as_ref(), text, source_lang, target_lang)
            .await
            .map_err(TranslationError::RemoteFailed)
    }

    async fn attempt(
        &self,
        provider: &dyn TranslationProvider,
        text: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<String, ProviderError> {
        let result = provider.translate(text, source_lang, target_lang).await;

        // A blank output is never a successful translation
        let result = result.and_then(|translated| {
            if translated.trim().is_empty() {
                Err(ProviderError::EmptyOutput)
            } else {
                Ok(translated)
            }
        });

        if let Some(ref m) = self.metrics {
            m.record_provider_call(provider.name(), result.is_ok());
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Scriptable provider for dispatch tests
    struct StubProvider {
        name: &'static str,
        pair: Option<(&'static str, &'static str)>,
        response: Result<&'static str, &'static str>,
        calls: AtomicUsize,
    }

    impl StubProvider {
        fn new(
            name: &'static str,
            pair: Option<(&'static str, &'static str)>,
            response: Result<&'static str, &'static str>,
        ) -> Arc<Self> {
            Arc::new(Self {
                name,
                pair,
                response,
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TranslationProvider for StubProvider {
        fn name(&self) -> &'static str {
            self.name
        }

        fn supports(&self, source_lang: &str, target_lang: &str) -> bool {
            match self.pair {
                Some((s, t)) => source_lang == s && target_lang == t,
                None => true,
            }
        }

        async fn translate(
            &self,
            _text: &str,
            _source_lang: &str,
            _target_lang: &str,
        ) -> Result<String, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.response {
                Ok(s) => Ok(s.to_string()),
                Err(reason) => Err(ProviderError::Inference(reason.to_string())),
            }
        }
    }

    #[tokio::test]
    async fn test_local_success_short_circuits() {
        let local = StubProvider::new("local", Some(("en", "hi")), Ok("नमस्ते"));
        let remote = StubProvider::new("remote", None, Ok("remote output"));
        let dispatcher = FallbackDispatcher::new(local.clone(), remote.clone(), None);

        let out = dispatcher.translate("Hello", "en", "hi").await.unwrap();
        assert_eq!(out, "नमस्ते");
        assert_eq!(local.calls(), 1);
        assert_eq!(remote.calls(), 0);
    }

    #[tokio::test]
    async fn test_local_failure_falls_back_to_remote() {
        let local = StubProvider::new("local", Some(("en", "hi")), Err("model crashed"));
        let remote = StubProvider::new("remote", None, Ok("नमस्ते"));
        let dispatcher = FallbackDispatcher::new(local.clone(), remote.clone(), None);

        let out = dispatcher.translate("Hello", "en", "hi").await.unwrap();
        assert_eq!(out, "नमस्ते");
        assert_eq!(local.calls(), 1);
        assert_eq!(remote.calls(), 1);
    }

    #[tokio::test]
    async fn test_unsupported_pair_never_invokes_local() {
        let local = StubProvider::new("local", Some(("en", "hi")), Ok("should not be used"));
        let remote = StubProvider::new("remote", None, Ok("bonjour"));
        let dispatcher = FallbackDispatcher::new(local.clone(), remote.clone(), None);

        let out = dispatcher.translate("Hello", "fr", "de").await.unwrap();
        assert_eq!(out, "bonjour");
        assert_eq!(local.calls(), 0);
        assert_eq!(remote.calls(), 1);
    }

    #[tokio::test]
    async fn test_exhausted_chain_surfaces_remote_error() {
        let local = StubProvider::new("local", Some(("en", "hi")), Err("down"));
        let remote = StubProvider::new("remote", None, Err("network unreachable"));
        let dispatcher = FallbackDispatcher::new(local.clone(), remote.clone(), None);

        let err = dispatcher.translate("Hello", "en", "hi").await.unwrap_err();
        assert!(err.to_string().contains("network unreachable"));
        assert_eq!(local.calls(), 1);
        assert_eq!(remote.calls(), 1);
    }

    #[tokio::test]
    async fn test_empty_local_output_triggers_fallback() {
        let local = StubProvider::new("local", Some(("en", "hi")), Ok("   "));
        let remote = StubProvider::new("remote", None, Ok("नमस्ते"));
        let dispatcher = FallbackDispatcher::new(local.clone(), remote.clone(), None);

        let out = dispatcher.translate("Hello", "en", "hi").await.unwrap();
        assert_eq!(out, "नमस्ते");
        assert_eq!(remote.calls(), 1);
    }

    #[tokio::test]
    async fn test_empty_remote_output_is_an_error() {
        let local = StubProvider::new("local", Some(("en", "hi")), Err("down"));
        let remote = StubProvider::new("remote", None, Ok(""));
        let dispatcher = FallbackDispatcher::new(local, remote, None);

        let err = dispatcher.translate("Hello", "en", "hi").await.unwrap_err();
        assert!(matches!(
            err,
            TranslationError::RemoteFailed(ProviderError::EmptyOutput)
        ));
    }
}
