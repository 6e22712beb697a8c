use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "transgate")]
#[command(about = "Rate-limited, caching translation CLI with a local OpenAI-compatible gateway")]
#[command(version)]
pub struct Args {
    /// File to translate (reads from stdin if not provided)
    pub file: Option<PathBuf>,

    /// Source language code, or `auto`
    #[arg(short = 'f', long = "from")]
    pub from: Option<String>,

    /// Target language code (ISO 639-1, e.g., ja, en, zh)
    #[arg(short = 't', long = "to")]
    pub to: Option<String>,

    /// Provider name from the config file
    #[arg(short = 'p', long)]
    pub provider: Option<String>,

    /// Model name
    #[arg(short = 'm', long)]
    pub model: Option<String>,

    /// Skip cache lookups and overwrite cached entries
    #[arg(short = 'n', long)]
    pub no_cache: bool,

    /// Send each fragment as a bare instruction instead of the translation prompt
    #[arg(short = 'g', long)]
    pub generative: bool,

    /// Fragments translated concurrently
    #[arg(short = 'j', long, default_value_t = 4, value_parser = clap::value_parser!(u16).range(1..))]
    pub jobs: u16,

    /// Only print warnings and errors
    #[arg(short = 'q', long, global = true)]
    pub quiet: bool,

    /// Print debug diagnostics
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run an OpenAI-compatible gateway in front of a gemini provider
    Serve {
        /// Provider name from the config file
        #[arg(short = 'p', long)]
        provider: Option<String>,

        /// Model name
        #[arg(short = 'm', long)]
        model: Option<String>,

        /// Port on 127.0.0.1 (0 picks a free one)
        #[arg(long, default_value_t = 0)]
        port: u16,

        /// Upstream requests per second
        #[arg(long)]
        qps: Option<f64>,
    },
    /// List supported language codes
    Languages,
    /// List configured providers
    Providers {
        /// Show details for one provider
        provider: Option<String>,
    },
}
