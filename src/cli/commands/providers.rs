//! Provider listing command handler.

use anyhow::Result;

use crate::config::{ConfigManager, ProviderConfig, ProviderKind, find_provider};
use crate::ui::Style;

/// Prints configured providers to stdout.
///
/// With `specific_provider`, shows that provider's details instead of the list.
pub fn print_providers(specific_provider: Option<&str>) -> Result<()> {
    let manager = ConfigManager::new();
    let config = manager.load_or_default()?;

    if config.providers.is_empty() {
        println!("No providers configured.");
        println!(
            "Add providers to {}",
            Style::secondary(manager.config_path().display())
        );
        return Ok(());
    }

    let default_provider = config.transgate.provider.as_deref();
    let marker = |name: &str| {
        if default_provider == Some(name) {
            format!(" {}", Style::default_marker())
        } else {
            String::new()
        }
    };

    if let Some(name) = specific_provider {
        let provider = find_provider(&config, name)?;
        println!("Provider: {}{}", Style::value(name), marker(name));
        print_details(provider);
        return Ok(());
    }

    println!("{}\n", Style::header("Configured providers:"));
    let mut names: Vec<_> = config.providers.keys().collect();
    names.sort();
    for name in names {
        let provider = &config.providers[name];
        println!(
            "  {}{} {}",
            Style::value(name),
            marker(name),
            Style::secondary(format!("[{}]", provider.kind.as_str()))
        );
        println!(
            "    {} {}",
            Style::label("endpoint:"),
            endpoint_display(provider)
        );
        if !provider.models.is_empty() {
            println!(
                "    {} {}",
                Style::label("models:"),
                provider.models.join(", ")
            );
        }
    }

    Ok(())
}

fn print_details(provider: &ProviderConfig) {
    println!("  {} {}", Style::label("kind     ="), provider.kind.as_str());
    println!("  {} {}", Style::label("endpoint ="), endpoint_display(provider));
    if provider.requires_api_key() {
        let status = if provider.get_api_key().is_some() {
            Style::success("(set)")
        } else {
            Style::warning("(not set)")
        };
        println!("  {} {status}", Style::label("api_key  ="));
    }
    if provider.kind == ProviderKind::Gemini {
        println!(
            "  {}",
            Style::secondary("requests are routed through a local gateway")
        );
    }
    if provider.models.is_empty() {
        println!("  {} (none configured)", Style::label("models   ="));
    } else {
        println!("  {}", Style::label("models:"));
        for model in &provider.models {
            println!("    - {model}");
        }
    }
}

fn endpoint_display(provider: &ProviderConfig) -> String {
    provider
        .resolved_endpoint()
        .unwrap_or_else(|| Style::warning("(missing)"))
}
