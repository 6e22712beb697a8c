use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::{Error, Result};

/// Whitespace-delimited word count, the fallback token estimate.
pub fn whitespace_tokens(text: &str) -> u64 {
    text.split_whitespace().count() as u64
}

/// Token counts of one call, as reported by a chat-completions upstream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
}

impl Usage {
    /// Estimates usage by counting whitespace-separated words.
    pub fn estimate(prompt: &str, completion: &str) -> Self {
        let prompt_tokens = whitespace_tokens(prompt);
        let completion_tokens = whitespace_tokens(completion);
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
        }
    }
}

/// Running token totals of one engine. Lock-free, safe to share.
#[derive(Debug, Default)]
pub struct TokenCounter {
    prompt: AtomicU64,
    completion: AtomicU64,
    total: AtomicU64,
}

impl TokenCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one call's usage to the totals.
    ///
    /// Rejects inconsistent reports (total smaller than its parts) without
    /// touching the counters.
    pub fn record(&self, usage: Usage) -> Result<()> {
        let parts = usage
            .prompt_tokens
            .checked_add(usage.completion_tokens)
            .ok_or_else(|| Error::malformed("token usage overflows"))?;
        if usage.total_tokens < parts {
            return Err(Error::malformed(format!(
                "total_tokens {} is less than prompt + completion ({parts})",
                usage.total_tokens
            )));
        }

        self.prompt.fetch_add(usage.prompt_tokens, Ordering::Relaxed);
        self.completion
            .fetch_add(usage.completion_tokens, Ordering::Relaxed);
        self.total.fetch_add(usage.total_tokens, Ordering::Relaxed);
        Ok(())
    }

    pub fn snapshot(&self) -> Usage {
        Usage {
            prompt_tokens: self.prompt.load(Ordering::Relaxed),
            completion_tokens: self.completion.load(Ordering::Relaxed),
            total_tokens: self.total.load(Ordering::Relaxed),
        }
    }
}
