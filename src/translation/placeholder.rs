//! Placeholder markers that carry structural spans through a translation.
//!
//! A generative model may re-space a marker (`<b3>` can come back as
//! `< b 3 >`), so every marker is paired with a recognizer that tolerates
//! whitespace between its tokens.

use regex::Regex;

/// A marker as sent to the model, plus the pattern that finds it afterwards.
#[derive(Debug, Clone)]
pub struct Marker {
    pub text: String,
    pub pattern: Regex,
}

impl Marker {
    /// Builds a marker from literal tokens; the recognizer allows any
    /// whitespace between consecutive tokens.
    fn from_tokens(tokens: &[&str]) -> Self {
        let text = tokens.concat();
        let pattern = tokens
            .iter()
            .map(|t| regex::escape(t))
            .collect::<Vec<_>>()
            .join(r"\s*");

        // Escaped literal tokens always form a valid pattern.
        #[allow(clippy::unwrap_used)]
        let pattern = Regex::new(&pattern).unwrap();

        Self { text, pattern }
    }

    pub fn is_match(&self, haystack: &str) -> bool {
        self.pattern.is_match(haystack)
    }

    /// Removes every occurrence of the marker from `haystack`.
    pub fn strip(&self, haystack: &str) -> String {
        self.pattern.replace_all(haystack, "").into_owned()
    }
}

/// Opening marker of a rich-text span: `<b{id}>`.
pub fn left_marker(id: u32) -> Marker {
    let id = id.to_string();
    Marker::from_tokens(&["<", "b", &id, ">"])
}

/// Closing marker of a rich-text span: `</b{id}>`.
pub fn right_marker(id: u32) -> Marker {
    let id = id.to_string();
    Marker::from_tokens(&["<", "/", "b", &id, ">"])
}

/// Stand-in for a formula region: `{v{id}}`.
pub fn formula_marker(id: u32) -> Marker {
    let id = id.to_string();
    Marker::from_tokens(&["{", "v", &id, "}"])
}

/// Wraps `inner` in the rich-text markers for `id`.
pub fn wrap_rich_text(id: u32, inner: &str) -> String {
    format!("{}{inner}{}", left_marker(id).text, right_marker(id).text)
}

/// Strips the rich-text markers for `id` from translated text.
pub fn strip_rich_text(id: u32, translated: &str) -> String {
    right_marker(id).strip(&left_marker(id).strip(translated))
}
