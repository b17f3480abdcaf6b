// Remote translation client
//
// Talks to the public Google translate web endpoint, which covers a broad
// set of language pairs and accepts "auto" as a source language. One attempt
// per dispatch; failures are reported once, never retried here.

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use crate::core::errors::ProviderError;
use crate::services::translation::dispatcher::TranslationProvider;

const TRANSLATE_URL: &str = "https://translate.googleapis.com/translate_a/single";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP client for the remote translation endpoint
pub struct RemoteTranslator {
    http_client: reqwest::Client,
}

impl RemoteTranslator {
    pub fn new() -> Result<Self, ProviderError> {
        let http_client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .connect_timeout(CONNECT_TIMEOUT)
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .build()?;

        Ok(Self { http_client })
    }
}

#[async_trait]
impl TranslationProvider for RemoteTranslator {
    fn name(&self) -> &'static str {
        "remote"
    }

    fn supports(&self, _source_lang: &str, _target_lang: &str) -> bool {
        true
    }

    async fn translate(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<String, ProviderError> {
        let response = self
            .http_client
            .get(TRANSLATE_URL)
            .query(&[
                ("client", "gtx"),
                ("dt", "t"),
                ("sl", source_lang),
                ("tl", target_lang),
                ("q", text),
            ])
            .send()
            .await?
            .error_for_status()?;

        let body: Value = response.json().await?;
        let translated = parse_response(&body)?;

        debug!(
            source = source_lang,
            target = target_lang,
            chars = translated.chars().count(),
            "remote translation complete"
        );
        Ok(translated)
    }
}

/// Extract the translated text from the endpoint's nested-array payload:
/// `[[["chunk", "original", ...], ...], ...]`, one chunk per sentence.
fn parse_response(body: &Value) -> Result<String, ProviderError> {
    let segments = body
        .get(0)
        .and_then(Value::as_array)
        .ok_or_else(|| ProviderError::InvalidResponse("missing translation segments".into()))?;

    let mut translated = String::new();
    for segment in segments {
        if let Some(chunk) = segment.get(0).and_then(Value::as_str) {
            translated.push_str(chunk);
        }
    }

    if translated.is_empty() {
        return Err(ProviderError::EmptyOutput);
    }
    Ok(translated)
}
