//! # transgate - rate-limited, caching translation pipeline
//!
//! `transgate` translates documents through any OpenAI-compatible
//! chat-completions endpoint. Every call goes through a
//! [`TranslationPipeline`](translation::TranslationPipeline) that looks up a
//! content-addressed cache, waits on a process-wide rate limiter, and retries
//! the upstream on quota exhaustion with bounded backoff.
//!
//! Providers that speak the Gemini generative-content API are reached
//! through an in-process [`gateway`] that exposes them as
//! `POST /v1/chat/completions` on a loopback port.
//!
//! ## Quick Start
//!
//! ```bash
//! # Translate a file
//! transgate --to ja ./notes.md
//!
//! # Translate from stdin with a gemini provider
//! cat report.md | transgate --provider gemini --to ko
//!
//! # Run a standalone gateway for other tools
//! transgate serve --port 8089
//! ```
//!
//! ## Configuration
//!
//! Settings are stored in `~/.config/transgate/config.toml`:
//!
//! ```toml
//! [transgate]
//! provider = "gemini"
//! model = "gemini-1.5-flash"
//! to = "ja"
//! qps = 5
//!
//! [providers.gemini]
//! kind = "gemini"
//! api_key_env = "GEMINI_API_KEY"
//!
//! [providers.ollama]
//! endpoint = "http://localhost:11434"
//! models = ["gemma3:12b"]
//! ```

/// Translation caches keyed by content hash.
pub mod cache;

/// Command-line interface definitions and handlers.
pub mod cli;

/// Configuration file management and provider settings.
pub mod config;

pub mod error;

/// Local OpenAI-compatible gateway.
pub mod gateway;

/// Input reading and fragment splitting.
pub mod input;

pub mod logging;

/// XDG-style path utilities for configuration and cache.
pub mod paths;

/// Chat-completions wire types.
pub mod protocol;

/// Leaky-bucket request spacing.
pub mod ratelimit;

/// Pipeline, backends, prompts and placeholder markers.
pub mod translation;

/// Terminal UI components (progress, colors).
pub mod ui;

/// Generative-content upstreams.
pub mod upstream;

pub use error::{Error, Result};
