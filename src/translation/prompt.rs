use crate::protocol::ChatMessage;

pub const SYSTEM_PROMPT: &str = "You are a professional, authentic machine translation engine.";

/// User-turn instruction. `{target_language}` and `{text}` are substituted.
pub const USER_PROMPT_TEMPLATE: &str = ";; Treat next line as plain text input and translate it into {target_language}, \
     output translation ONLY. If translation is unnecessary (e.g. proper nouns, codes, \
     numbered placeholders such as {v1} or <b1>), return the original text. \
     NO explanations. NO notes. Input:\n\n{text}";

/// Builds the two-part translation instruction for `text`.
#[allow(clippy::literal_string_with_formatting_args)]
pub fn build_messages(target_language: &str, text: &str) -> Vec<ChatMessage> {
    // Language first: braces inside the source text are never expanded.
    let user = USER_PROMPT_TEMPLATE
        .replace("{target_language}", target_language)
        .replacen("{text}", text, 1);

    vec![
        ChatMessage::new("system", SYSTEM_PROMPT),
        ChatMessage::new("user", user),
    ]
}

/// The full prompt with an empty input; changes whenever the wording does,
/// which makes it usable as a cache-impact parameter.
pub fn prompt_fingerprint(target_language: &str) -> String {
    build_messages(target_language, "")
        .into_iter()
        .map(|m| format!("{}: {}", m.role, m.content))
        .collect::<Vec<_>>()
        .join("\n")
}
