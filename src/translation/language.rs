//! Language codes accepted by the pipeline and their display names.

use crate::error::{Error, Result};

/// Source-language value meaning "let the model detect it".
pub const AUTO_DETECT: &str = "auto";

/// Supported language codes (ISO 639-1) and their names.
pub const SUPPORTED_LANGUAGES: &[(&str, &str)] = &[
    ("ar", "Arabic"),
    ("bg", "Bulgarian"),
    ("bn", "Bengali"),
    ("ca", "Catalan"),
    ("cs", "Czech"),
    ("da", "Danish"),
    ("de", "German"),
    ("el", "Greek"),
    ("en", "English"),
    ("es", "Spanish"),
    ("et", "Estonian"),
    ("fa", "Persian"),
    ("fi", "Finnish"),
    ("fr", "French"),
    ("he", "Hebrew"),
    ("hi", "Hindi"),
    ("hr", "Croatian"),
    ("hu", "Hungarian"),
    ("id", "Indonesian"),
    ("it", "Italian"),
    ("ja", "Japanese"),
    ("ko", "Korean"),
    ("lt", "Lithuanian"),
    ("lv", "Latvian"),
    ("ms", "Malay"),
    ("nl", "Dutch"),
    ("no", "Norwegian"),
    ("pl", "Polish"),
    ("pt", "Portuguese"),
    ("ro", "Romanian"),
    ("ru", "Russian"),
    ("sk", "Slovak"),
    ("sl", "Slovenian"),
    ("sr", "Serbian"),
    ("sv", "Swedish"),
    ("th", "Thai"),
    ("tr", "Turkish"),
    ("uk", "Ukrainian"),
    ("vi", "Vietnamese"),
    ("zh", "Chinese (Simplified)"),
    ("zh-TW", "Chinese (Traditional)"),
];

/// Canonical spelling of `code` (case-insensitive lookup).
pub fn canonical_code(code: &str) -> Option<&'static str> {
    SUPPORTED_LANGUAGES
        .iter()
        .find(|(known, _)| known.eq_ignore_ascii_case(code))
        .map(|(known, _)| *known)
}

/// English display name of `code`, used when prompting a model.
pub fn language_name(code: &str) -> Option<&'static str> {
    let canonical = canonical_code(code)?;
    SUPPORTED_LANGUAGES
        .iter()
        .find(|(known, _)| *known == canonical)
        .map(|(_, name)| *name)
}

/// Validates a target language code.
pub fn validate_language(lang: &str) -> Result<()> {
    if canonical_code(lang).is_some() {
        Ok(())
    } else {
        Err(Error::config(format!(
            "Invalid language code: '{lang}'\n\n\
             Valid language codes (ISO 639-1): ja, en, zh, ko, fr, de, es, ...\n\
             Run 'transgate languages' to see all supported codes."
        )))
    }
}

/// Validates a source language code; `auto` is also accepted.
pub fn validate_source_language(lang: &str) -> Result<()> {
    if lang.eq_ignore_ascii_case(AUTO_DETECT) {
        return Ok(());
    }
    validate_language(lang)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_language_valid() {
        assert!(validate_language("ja").is_ok());
        assert!(validate_language("en").is_ok());
        assert!(validate_language("zh-TW").is_ok());
        assert!(validate_language("ZH-tw").is_ok());
    }

    #[test]
    fn test_validate_language_invalid() {
        let err = validate_language("invalid").unwrap_err();
        assert!(err.to_string().contains("Invalid language code"));
        assert!(validate_language("").is_err());
        assert!(validate_language(AUTO_DETECT).is_err());
    }

    #[test]
    fn test_source_language_accepts_auto() {
        assert!(validate_source_language("auto").is_ok());
        assert!(validate_source_language("de").is_ok());
        assert!(validate_source_language("xx").is_err());
    }

    #[test]
    fn test_language_name() {
        assert_eq!(language_name("ja"), Some("Japanese"));
        assert_eq!(language_name("FR"), Some("French"));
        assert_eq!(language_name("tlh"), None);
    }

    #[test]
    fn test_canonical_code() {
        assert_eq!(canonical_code("EN"), Some("en"));
        assert_eq!(canonical_code("zh-tw"), Some("zh-TW"));
    }
}
