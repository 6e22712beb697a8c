use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fmt;

/// Output-affecting parameters of a translation, sorted by name so the
/// serialized form is canonical.
pub type CacheParams = BTreeMap<String, Value>;

/// Deterministic, content-addressed cache key (hex SHA-256).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

#[derive(Serialize)]
struct KeyMaterial<'a> {
    engine: &'a str,
    params: &'a CacheParams,
    text: &'a str,
}

impl CacheKey {
    /// Derives the key for `text` translated by `engine` under `params`.
    ///
    /// Two derivations agree exactly when the engine, every parameter and
    /// the normalized text agree.
    pub fn derive(engine: &str, params: &CacheParams, text: &str) -> Self {
        let normalized = normalize_text(text);
        let material = KeyMaterial {
            engine,
            params,
            text: &normalized,
        };

        // Serializing a struct of str/BTreeMap/Value cannot fail.
        let encoded = serde_json::to_vec(&material).unwrap_or_default();

        let mut hasher = Sha256::new();
        hasher.update(&encoded);
        Self(hex::encode(hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Drops control characters that carry no layout (keeps `\n`, `\t`, `\r`).
pub fn normalize_text(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_control() || c.is_whitespace())
        .collect()
}
