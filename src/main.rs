use anyhow::Result;
use clap::Parser;

use transgate::cli::commands::{languages, providers, serve, translate};
use transgate::cli::{Args, Command};
use transgate::logging::{self, Verbosity};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(Verbosity::from_flags(args.quiet, args.verbose));

    match args.command {
        Some(Command::Languages) => {
            languages::print_languages();
        }
        Some(Command::Providers { provider }) => {
            providers::print_providers(provider.as_deref())?;
        }
        Some(Command::Serve {
            provider,
            model,
            port,
            qps,
        }) => {
            let options = serve::ServeOptions {
                provider,
                model,
                port,
                qps,
            };
            serve::run_serve(options).await?;
        }
        None => {
            let options = translate::TranslateOptions {
                file: args.file,
                from: args.from,
                to: args.to,
                provider: args.provider,
                model: args.model,
                no_cache: args.no_cache,
                generative: args.generative,
                jobs: usize::from(args.jobs),
                quiet: args.quiet,
            };
            translate::run_translate(options).await?;
        }
    }

    Ok(())
}
