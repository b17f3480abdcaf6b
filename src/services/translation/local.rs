// Local translation model - CPU-only ONNX inference
//
// Wraps an exported Marian-style seq2seq model (Helsinki-NLP/opus-mt-en-hi)
// covering exactly one language pair. The model is expensive to load and may
// be absent entirely, so construction is deferred to first use and guarded
// by a once cell; a failed load reports Unavailable and the dispatcher falls
// back to the remote provider.

use async_trait::async_trait;
use once_cell::sync::OnceCell;
use ort::{session::Session, value::Value};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

use crate::core::errors::ProviderError;
use crate::services::translation::dispatcher::TranslationProvider;

const MODEL_FILE: &str = "model.onnx";
const VOCAB_FILE: &str = "vocab.txt";

/// Special tokens of the exported vocabulary
const PAD_TOKEN: &str = "<pad>";
const EOS_TOKEN: &str = "</s>";
const UNK_TOKEN: &str = "<unk>";

/// SentencePiece word-boundary marker used by the exported vocabulary
const WORD_PREFIX: char = '\u{2581}';

/// The single pair the local model covers
const SUPPORTED_SOURCE: &str = "en";
const SUPPORTED_TARGET: &str = "hi";

/// Lazily-initialized local provider for English -> Hindi
pub struct LocalTranslator {
    model_dir: PathBuf,
    max_output_tokens: usize,
    session: OnceCell<Arc<ModelSession>>,
}

impl LocalTranslator {
    pub fn new(model_dir: impl Into<PathBuf>, max_output_tokens: usize) -> Self {
        Self {
            model_dir: model_dir.into(),
            max_output_tokens,
            session: OnceCell::new(),
        }
    }

    /// Whether the model files are present on disk. Used only for startup
    /// logging; absence at translate time is an ordinary provider failure.
    pub fn is_available(&self) -> bool {
        self.model_dir.join(MODEL_FILE).exists() && self.model_dir.join(VOCAB_FILE).exists()
    }

    /// Get or build the model session. At-most-once construction: concurrent
    /// first calls are serialized by the once cell, and a failed load leaves
    /// the cell empty so a later call can retry.
    fn model(&self) -> Result<Arc<ModelSession>, ProviderError> {
        self.session
            .get_or_try_init(|| {
                info!(dir = %self.model_dir.display(), "loading local translation model");
                ModelSession::load(&self.model_dir).map(Arc::new)
            })
            .cloned()
    }
}

#[async_trait]
impl TranslationProvider for LocalTranslator {
    fn name(&self) -> &'static str {
        "local"
    }

    fn supports(&self, source_lang: &str, target_lang: &str) -> bool {
        source_lang == SUPPORTED_SOURCE && target_lang == SUPPORTED_TARGET
    }

    async fn translate(
        &self,
        text: &str,
        _source_lang: &str,
        _target_lang: &str,
    ) -> Result<String, ProviderError> {
        let model = self.model()?;
        let text = text.to_string();
        let max_tokens = self.max_output_tokens;

        // Inference is CPU-bound and holds the session lock; keep it off the
        // async workers.
        tokio::task::spawn_blocking(move || model.translate(&text, max_tokens))
            .await
            .map_err(|e| ProviderError::Inference(format!("inference task failed: {e}")))?
    }
}

/// Loaded ONNX session plus vocabulary
struct ModelSession {
    session: Mutex<Session>,
    token_to_id: HashMap<String, i64>,
    id_to_token: HashMap<i64, String>,
    pad_id: i64,
    eos_id: i64,
    unk_id: i64,
}

impl ModelSession {
    fn load(model_dir: &Path) -> Result<Self, ProviderError> {
        let model_path = model_dir.join(MODEL_FILE);
        let vocab_path = model_dir.join(VOCAB_FILE);

        if !model_path.exists() {
            return Err(ProviderError::Unavailable(format!(
                "model not found at {}",
                model_path.display()
            )));
        }
        if !vocab_path.exists() {
            return Err(ProviderError::Unavailable(format!(
                "vocabulary not found at {}",
                vocab_path.display()
            )));
        }

        let session = Session::builder()
            .and_then(|b| Ok(b.with_intra_threads(4)?))
            .and_then(|mut b| b.commit_from_file(&model_path))
            .map_err(|e| ProviderError::Unavailable(format!("failed to load model: {e}")))?;

        let vocab_content = std::fs::read_to_string(&vocab_path)
            .map_err(|e| ProviderError::Unavailable(format!("failed to read vocabulary: {e}")))?;
        let (token_to_id, id_to_token) = parse_vocabulary(&vocab_content);

        let special = |token: &str| -> Result<i64, ProviderError> {
            token_to_id.get(token).copied().ok_or_else(|| {
                ProviderError::Unavailable(format!("vocabulary is missing the {token} token"))
            })
        };
        let pad_id = special(PAD_TOKEN)?;
        let eos_id = special(EOS_TOKEN)?;
        let unk_id = special(UNK_TOKEN)?;

        info!(
            vocab_size = token_to_id.len(),
            "local translation model initialized"
        );

        Ok(Self {
            session: Mutex::new(session),
            token_to_id,
            id_to_token,
            pad_id,
            eos_id,
            unk_id,
        })
    }

    /// Encode text into input ids, terminated by EOS
    fn encode(&self, text: &str) -> Vec<i64> {
        let mut ids = Vec::new();
        for word in text.split_whitespace() {
            // The vocabulary marks word-initial pieces with the boundary
            // prefix; fall back to the bare form, then to <unk>.
            let marked = format!("{WORD_PREFIX}{word}");
            let id = self
                .token_to_id
                .get(&marked)
                .or_else(|| self.token_to_id.get(word))
                .copied()
                .unwrap_or(self.unk_id);
            ids.push(id);
        }
        ids.push(self.eos_id);
        ids
    }

    /// Join decoded tokens back into text, honoring the boundary prefix
    fn decode(&self, ids: &[i64]) -> String {
        let mut out = String::new();
        for id in ids {
            match self.id_to_token.get(id) {
                Some(token) if token.starts_with(WORD_PREFIX) => {
                    if !out.is_empty() {
                        out.push(' ');
                    }
                    out.push_str(token.trim_start_matches(WORD_PREFIX));
                }
                Some(token) => out.push_str(token),
                None => {}
            }
        }
        out.trim().to_string()
    }

    /// Greedy autoregressive decode, bounded by `max_tokens`
    fn translate(&self, text: &str, max_tokens: usize) -> Result<String, ProviderError> {
        let input_ids = self.encode(text);
        // Marian decoders start from the pad token
        let mut decoder_ids: Vec<i64> = vec![self.pad_id];
        let mut generated: Vec<i64> = Vec::new();

        for _ in 0..max_tokens {
            let next = self.decode_step(&input_ids, &decoder_ids)?;
            if next == self.eos_id {
                break;
            }
            generated.push(next);
            decoder_ids.push(next);
        }

        let translated = self.decode(&generated);
        debug!(
            input_tokens = input_ids.len(),
            output_tokens = generated.len(),
            "local translation complete"
        );
        Ok(translated)
    }

    /// Run one decoder step and return the argmax token id of the last
    /// position.
    fn decode_step(&self, input_ids: &[i64], decoder_ids: &[i64]) -> Result<i64, ProviderError> {
        let input_value = Value::from_array(([1usize, input_ids.len()], input_ids.to_vec()))
            .map_err(|e| ProviderError::Inference(e.to_string()))?;
        let decoder_value = Value::from_array(([1usize, decoder_ids.len()], decoder_ids.to_vec()))
            .map_err(|e| ProviderError::Inference(e.to_string()))?;

        let (dims, logits) = {
            let mut session = self.session.lock();
            let outputs = session
                .run(ort::inputs![
                    "input_ids" => input_value,
                    "decoder_input_ids" => decoder_value
                ])
                .map_err(|e| ProviderError::Inference(e.to_string()))?;

            // Prefer the named logits output, fall back to the first one
            let (shape, data) = if let Some(output) = outputs.get("logits") {
                output
                    .try_extract_tensor::<f32>()
                    .map_err(|e| ProviderError::Inference(e.to_string()))?
            } else {
                let first_key = outputs.keys().next().ok_or_else(|| {
                    ProviderError::Inference("model produced no outputs".to_string())
                })?;
                outputs[first_key]
                    .try_extract_tensor::<f32>()
                    .map_err(|e| ProviderError::Inference(e.to_string()))?
            };

            let dims: Vec<usize> = shape.iter().map(|&x| x as usize).collect();
            (dims, data.to_vec())
        };

        // Expect [1, T, V]
        if dims.len() != 3 || dims[0] != 1 {
            return Err(ProviderError::Inference(format!(
                "unexpected logits shape: {dims:?}"
            )));
        }
        let vocab_size = dims[2];
        let last_step = &logits[(dims[1] - 1) * vocab_size..dims[1] * vocab_size];

        let mut best_id = 0i64;
        let mut best_val = f32::NEG_INFINITY;
        for (i, &val) in last_step.iter().enumerate() {
            if val > best_val {
                best_val = val;
                best_id = i as i64;
            }
        }
        Ok(best_id)
    }
}

/// Parse a vocabulary file in `index\ttoken` format
fn parse_vocabulary(content: &str) -> (HashMap<String, i64>, HashMap<i64, String>) {
    let mut token_to_id = HashMap::new();
    let mut id_to_token = HashMap::new();

    for line in content.lines() {
        let line = line.trim_end();
        if line.is_empty() {
            continue;
        }
        if let Some((idx_str, token)) = line.split_once('\t') {
            if let Ok(idx) = idx_str.parse::<i64>() {
                token_to_id.insert(token.to_string(), idx);
                id_to_token.insert(idx, token.to_string());
            }
        }
    }

    (token_to_id, id_to_token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vocabulary_parsing() {
        let content = "0\t<pad>\n1\t</s>\n2\t<unk>\n3\t\u{2581}hello\n4\tworld\n\n";
        let (token_to_id, id_to_token) = parse_vocabulary(content);

        assert_eq!(token_to_id.len(), 5);
        assert_eq!(token_to_id.get("<pad>"), Some(&0));
        assert_eq!(token_to_id.get("\u{2581}hello"), Some(&3));
        assert_eq!(id_to_token.get(&4).map(String::as_str), Some("world"));
    }

    #[test]
    fn test_supported_pair_is_en_hi_only() {
        let translator = LocalTranslator::new("models/opus-mt-en-hi", 256);
        assert!(translator.supports("en", "hi"));
        assert!(!translator.supports("hi", "en"));
        assert!(!translator.supports("fr", "de"));
        assert!(!translator.supports("auto", "hi"));
    }

    #[tokio::test]
    async fn test_missing_model_reports_unavailable() {
        let translator = LocalTranslator::new("/nonexistent/model/dir", 256);
        assert!(!translator.is_available());

        let err = translator.translate("Hello", "en", "hi").await.unwrap_err();
        assert!(matches!(err, ProviderError::Unavailable(_)));
    }
}
