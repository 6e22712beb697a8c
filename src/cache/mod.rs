//! Content-addressed translation cache.
//!
//! The pipeline only needs point lookups and last-write-wins stores, so any
//! backing store implementing [`TranslationCache`] can be plugged in.

mod key;
mod memory;
mod sqlite;

pub use key::{CacheKey, CacheParams, normalize_text};
pub use memory::MemoryCache;
pub use sqlite::SqliteCache;

use crate::error::Result;

/// Key/value store of previously computed translations.
///
/// Implementations must tolerate concurrent `get`/`set` from many tasks.
/// Errors from `get` are treated by callers as a miss.
pub trait TranslationCache: Send + Sync {
    fn get(&self, key: &CacheKey) -> Result<Option<String>>;

    fn set(&self, key: &CacheKey, translated: &str) -> Result<()>;
}
