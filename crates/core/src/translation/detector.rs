//! Language detection for translation gating.

use once_cell::sync::Lazy;
use whatlang::{Detector, Lang};

/// Languages the detector is allowed to report. Restricting the set keeps
/// detection usable on short headline-length inputs.
const ALLOWED_LANGS: [Lang; 18] = [
    Lang::Eng,
    Lang::Cmn,
    Lang::Jpn,
    Lang::Kor,
    Lang::Spa,
    Lang::Fra,
    Lang::Deu,
    Lang::Por,
    Lang::Rus,
    Lang::Ita,
    Lang::Ara,
    Lang::Nld,
    Lang::Pol,
    Lang::Tur,
    Lang::Vie,
    Lang::Tha,
    Lang::Ind,
    Lang::Hin,
];

static DETECTOR: Lazy<Detector> = Lazy::new(|| Detector::with_allowlist(ALLOWED_LANGS.to_vec()));

/// Decides whether a piece of text needs translating into a target language.
///
/// Detection is advisory: whenever the language cannot be determined the
/// answer is "translate", so uncertain inputs are never silently skipped.
#[derive(Debug, Default, Clone, Copy)]
pub struct LanguageDetector;

impl LanguageDetector {
    pub fn new() -> Self {
        Self
    }

    /// Detect the language of `text` as a two-letter code. Returns `None` for
    /// inputs too short to classify or outside the allowed set.
    pub fn detect(&self, text: &str) -> Option<String> {
        let text = prepare(text);
        if text.chars().count() < 3 {
            return None;
        }
        DETECTOR
            .detect_lang(&text)
            .and_then(two_letter_code)
            .map(str::to_string)
    }

    /// True when `text` should be translated into `target_language`.
    ///
    /// Fails open: if detection is inconclusive the text is translated.
    pub fn should_translate(&self, text: &str, target_language: &str) -> bool {
        let target = normalize_language_code(target_language);
        match self.detect(text) {
            Some(detected) => detected != target,
            None => true,
        }
    }
}

/// Lowercased two-letter form of a language code ("en-US" -> "en").
pub fn normalize_language_code(code: &str) -> String {
    code.trim().to_lowercase().chars().take(2).collect()
}

/// Use the tag-stripped form of the text when stripping actually removed
/// markup and left enough signal behind.
fn prepare(text: &str) -> String {
    let stripped = strip_tags(text);
    if stripped.chars().count() > 10 && stripped.len() < text.len() {
        stripped
    } else {
        text.to_string()
    }
}

fn strip_tags(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_tag = false;
    for c in text.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out
}

/// `None` for languages outside the allowed set; treated as detection
/// failure by the caller.
fn two_letter_code(lang: Lang) -> Option<&'static str> {
    let code = match lang {
        Lang::Eng => "en",
        Lang::Cmn => "zh",
        Lang::Jpn => "ja",
        Lang::Kor => "ko",
        Lang::Spa => "es",
        Lang::Fra => "fr",
        Lang::Deu => "de",
        Lang::Por => "pt",
        Lang::Rus => "ru",
        Lang::Ita => "it",
        Lang::Ara => "ar",
        Lang::Nld => "nl",
        Lang::Pol => "pl",
        Lang::Tur => "tr",
        Lang::Vie => "vi",
        Lang::Tha => "th",
        Lang::Ind => "id",
        Lang::Hin => "hi",
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
        assert_eq!(
            detector.detect("This is an article about technology and science."),
            Some("en".to_string())
        );
    }

    #[test]
    fn test_detects_chinese() {
        let detector = LanguageDetector::new();
        assert_eq!(
            detector.detect("这是一篇关于技术的文章。"),
            Some("zh".to_string())
        );
    }

    #[test]
    fn test_short_text_is_inconclusive() {
        let detector = LanguageDetector::new();
        assert_eq!(detector.detect("Hi"), None);
        assert_eq!(detector.detect("  "), None);
    }

    #[test]
    fn test_should_translate_matching_language() {
        let detector = LanguageDetector::new();
        assert!(!detector.should_translate("This is an article about technology.", "en"));
        assert!(!detector.should_translate("This is an article about technology.", "EN-us"));
    }

    #[test]
    fn test_should_translate_foreign_language() {
        let detector = LanguageDetector::new();
        assert!(detector.should_translate("这是一篇关于技术的文章。", "en"));
    }

    #[test]
    fn test_should_translate_fails_open() {
        let detector = LanguageDetector::new();
        assert!(detector.should_translate("Hi", "en"));
    }

    #[test]
    fn test_html_is_ignored_when_enough_text_remains() {
        let detector = LanguageDetector::new();
        assert_eq!(
            detector.detect("<p>This is an article about technology and science.</p>"),
            Some("en".to_string())
        );
    }

    #[test]
    fn test_unlisted_language_has_no_code() {
        assert_eq!(two_letter_code(Lang::Cmn), Some("zh"));
        assert_eq!(two_letter_code(Lang::Ukr), None);
        assert_eq!(two_letter_code(Lang::Ben), None);
    }

    #[test]
    fn test_normalize_language_code() {
        assert_eq!(normalize_language_code("en-US"), "en");
        assert_eq!(normalize_language_code(" ZH "), "zh");
        assert_eq!(normalize_language_code("fr"), "fr");
    }
}
