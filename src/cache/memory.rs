use std::collections::HashMap;
use std::sync::RwLock;

use super::{CacheKey, TranslationCache};
use crate::error::{Error, Result};

/// Process-local cache, used when persistence is not wanted.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<CacheKey, String>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().map_or(0, |entries| entries.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl TranslationCache for MemoryCache {
    fn get(&self, key: &CacheKey) -> Result<Option<String>> {
        let entries = self
            .entries
            .read()
            .map_err(|_| Error::cache("memory cache lock poisoned"))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &CacheKey, translated: &str) -> Result<()> {
        self.entries
            .write()
            .map_err(|_| Error::cache("memory cache lock poisoned"))?
            .insert(key.clone(), translated.to_string());
        Ok(())
    }
}
