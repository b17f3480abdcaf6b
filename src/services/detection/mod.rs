// Language detection adapter
//
// Best-effort guess of a text's source language. This never fails the
// caller: inconclusive detection and unmappable languages both degrade to
// the "auto" sentinel, which downstream code passes to providers verbatim.

use tracing::debug;
use whatlang::Lang;

use crate::core::types::AUTO_LANG;

/// Stateless detector over whatlang's trigram classifier
#[derive(Debug, Clone, Default)]
pub struct LanguageDetector;

impl LanguageDetector {
    pub fn new() -> Self {
        Self
    }

    /// Detect the language of `text`, returning an ISO 639-1 code or the
    /// `"auto"` sentinel when detection is inconclusive.
    pub fn detect(&self, text: &str) -> String {
        match whatlang::detect(text) {
            Some(info) => match iso639_1(info.lang()) {
                Some(code) => {
                    debug!(
                        lang = code,
                        confidence = info.confidence(),
                        "detected source language"
                    );
                    code.to_string()
                }
                None => {
                    debug!(lang = %info.lang(), "detected language has no ISO 639-1 code");
                    AUTO_LANG.to_string()
                }
            },
            None => AUTO_LANG.to_string(),
        }
    }
}

/// Map whatlang's ISO 639-3 language set to the two-letter codes the
/// translation providers speak. Unlisted languages fall back to detection
/// failure rather than sending a code the providers will not recognize.
fn iso639_1(lang: Lang) -> Option<&'static str> {
    let code = match lang {
        Lang::Eng => "en",
        Lang::Hin => "hi",
        Lang::Spa => "es",
        Lang::Fra => "fr",
        Lang::Deu => "de",
        Lang::Ita => "it",
        Lang::Por => "pt",
        Lang::Nld => "nl",
        Lang::Rus => "ru",
        Lang::Ukr => "uk",
        Lang::Pol => "pl",
        Lang::Ces => "cs",
        Lang::Bul => "bg",
        Lang::Ell => "el",
        Lang::Swe => "sv",
        Lang::Dan => "da",
        Lang::Fin => "fi",
        Lang::Hun => "hu",
        Lang::Ron => "ro",
        Lang::Tur => "tr",
        Lang::Ara => "ar",
        Lang::Heb => "he",
        Lang::Pes => "fa",
        Lang::Urd => "ur",
        Lang::Ben => "bn",
        Lang::Tam => "ta",
        Lang::Tel => "te",
        Lang::Mar => "mr",
        Lang::Guj => "gu",
        Lang::Kan => "kn",
        Lang::Mal => "ml",
        Lang::Pan => "pa",
        Lang::Nep => "ne",
        Lang::Sin => "si",
        Lang::Cmn => "zh",
        Lang::Jpn => "ja",
        Lang::Kor => "ko",
        Lang::Tha => "th",
        Lang::Vie => "vi",
        Lang::Ind => "id",
        _ => return None,
    };
    Some(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_english() {
        let detector = LanguageDetector::new();
        let lang = detector.detect(
            "The quick brown fox jumps over the lazy dog while the sun sets over the hills.",
        );
        assert_eq!(lang, "en");
    }

    #[test]
    fn test_detects_hindi() {
        let detector = LanguageDetector::new();
        let lang = detector.detect("यह एक लंबा हिंदी वाक्य है जो भाषा पहचान की जाँच करता है।");
        assert_eq!(lang, "hi");
    }

    #[test]
    fn test_inconclusive_input_degrades_to_auto() {
        let detector = LanguageDetector::new();
        // No alphabetic content to classify; must not panic or error
        assert_eq!(detector.detect(""), AUTO_LANG);
        assert_eq!(detector.detect("1234567890 !!! ???"), AUTO_LANG);
    }
}
