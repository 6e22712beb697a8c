use anyhow::{Context, Result, anyhow, bail};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::paths;
use crate::ratelimit::{DEFAULT_QPS, min_interval_for};
use crate::translation::language::AUTO_DETECT;
use crate::translation::{validate_language, validate_source_language};
use crate::upstream::DEFAULT_GEMINI_ENDPOINT;

/// Default settings in the `[transgate]` section of config.toml.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransgateConfig {
    pub provider: Option<String>,
    pub model: Option<String>,
    /// Source language code, or `auto`.
    pub from: Option<String>,
    /// Target language code (ISO 639-1).
    pub to: Option<String>,
    /// Process-wide request rate towards the provider.
    pub qps: Option<f64>,
    /// Rate the in-process gateway allows towards a gemini upstream.
    pub gateway_qps: Option<f64>,
    pub temperature: Option<f64>,
}

/// Wire protocol a provider speaks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// OpenAI-style chat completions, called directly.
    #[default]
    OpenAi,
    /// Gemini generative-content, reached through a local gateway.
    Gemini,
}

impl ProviderKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Gemini => "gemini",
        }
    }
}

/// Configuration for a translation provider.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProviderConfig {
    #[serde(default)]
    pub kind: ProviderKind,
    /// API root; optional for gemini providers.
    #[serde(default)]
    pub endpoint: Option<String>,
    /// API key stored directly in config (not recommended).
    #[serde(default)]
    pub api_key: Option<String>,
    /// Environment variable name containing the API key.
    #[serde(default)]
    pub api_key_env: Option<String>,
    #[serde(default)]
    pub models: Vec<String>,
}

impl ProviderConfig {
    /// Gets the API key, preferring environment variable over config file.
    pub fn get_api_key(&self) -> Option<String> {
        if let Some(env_var) = &self.api_key_env
            && let Ok(key) = std::env::var(env_var)
            && !key.is_empty()
        {
            return Some(key);
        }
        self.api_key.clone()
    }

    /// Gemini always needs a key; other providers only when one is configured.
    pub const fn requires_api_key(&self) -> bool {
        matches!(self.kind, ProviderKind::Gemini)
            || self.api_key.is_some()
            || self.api_key_env.is_some()
    }

    pub fn resolved_endpoint(&self) -> Option<String> {
        match (&self.endpoint, self.kind) {
            (Some(endpoint), _) => Some(endpoint.clone()),
            (None, ProviderKind::Gemini) => Some(DEFAULT_GEMINI_ENDPOINT.to_string()),
            (None, ProviderKind::OpenAi) => None,
        }
    }
}

/// The complete configuration file structure.
///
/// Corresponds to `~/.config/transgate/config.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub transgate: TransgateConfig,
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
}

/// Resolved configuration after merging CLI arguments and config file.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub provider_name: String,
    pub kind: ProviderKind,
    pub endpoint: String,
    pub model: String,
    pub api_key: Option<String>,
    pub source_language: String,
    pub target_language: String,
    pub qps: f64,
    pub gateway_qps: f64,
    pub temperature: f64,
}

/// CLI overrides that take precedence over config file values.
#[derive(Debug, Clone, Default)]
pub struct ResolveOptions {
    pub from: Option<String>,
    pub to: Option<String>,
    pub provider: Option<String>,
    pub model: Option<String>,
    pub qps: Option<f64>,
    pub gateway_qps: Option<f64>,
}

fn missing(field: &str, flag: &str) -> anyhow::Error {
    anyhow!(
        "Missing required configuration: {field}\n\n\
         Please provide it via:\n  \
         - CLI option: transgate {flag}\n  \
         - Config file: ~/.config/transgate/config.toml"
    )
}

fn positive_rate(name: &str, value: f64) -> Result<f64> {
    match min_interval_for(value) {
        Ok(_) => Ok(value),
        Err(e) => bail!("Invalid configuration: '{name}': {e}"),
    }
}

/// Looks up a provider by name with a helpful error listing the alternatives.
pub fn find_provider<'a>(config_file: &'a ConfigFile, name: &str) -> Result<&'a ProviderConfig> {
    config_file.providers.get(name).ok_or_else(|| {
        let mut available: Vec<_> = config_file.providers.keys().map(String::as_str).collect();
        available.sort_unstable();
        if available.is_empty() {
            anyhow!(
                "Provider '{name}' not found\n\n\
                 No providers configured. Add providers to ~/.config/transgate/config.toml"
            )
        } else {
            anyhow!(
                "Provider '{name}' not found\n\n\
                 Available providers:\n  \
                 - {}\n\n\
                 Add providers to ~/.config/transgate/config.toml",
                available.join("\n  - ")
            )
        }
    })
}

/// Resolves configuration by merging CLI options with config file settings.
///
/// # Errors
///
/// Fails if provider, model or target language is missing, the provider is
/// unknown or lacks a required key or endpoint, a language code is invalid,
/// or a rate is not positive.
pub fn resolve_config(
    options: &ResolveOptions,
    config_file: &ConfigFile,
) -> Result<ResolvedConfig> {
    let defaults = &config_file.transgate;

    let provider_name = options
        .provider
        .as_ref()
        .or(defaults.provider.as_ref())
        .cloned()
        .ok_or_else(|| missing("'provider'", "--provider <name>"))?;

    let provider_config = find_provider(config_file, &provider_name)?;

    let model = options
        .model
        .as_ref()
        .or(defaults.model.as_ref())
        .cloned()
        .ok_or_else(|| missing("'model'", "--model <name>"))?;

    if !provider_config.models.is_empty() && !provider_config.models.contains(&model) {
        warn!(
            model = %model,
            provider = %provider_name,
            configured = %provider_config.models.join(", "),
            "model is not in the configured models list, proceeding anyway"
        );
    }

    let target_language = options
        .to
        .as_ref()
        .or(defaults.to.as_ref())
        .cloned()
        .ok_or_else(|| missing("'to' (target language)", "--to <lang>"))?;
    validate_language(&target_language)?;

    let source_language = options
        .from
        .as_ref()
        .or(defaults.from.as_ref())
        .cloned()
        .unwrap_or_else(|| AUTO_DETECT.to_string());
    validate_source_language(&source_language)?;

    let endpoint = provider_config.resolved_endpoint().ok_or_else(|| {
        anyhow!(
            "Provider '{provider_name}' has no endpoint\n\n\
             Set endpoint under [providers.{provider_name}] in ~/.config/transgate/config.toml"
        )
    })?;

    let api_key = provider_config.get_api_key();
    if provider_config.requires_api_key() && api_key.is_none() {
        let env_var = provider_config.api_key_env.as_deref().unwrap_or("API_KEY");
        bail!(
            "Provider '{provider_name}' requires an API key\n\n\
             Set the {env_var} environment variable:\n  \
             export {env_var}=\"your-api-key\"\n\n\
             Or set api_key in ~/.config/transgate/config.toml"
        );
    }

    let qps = positive_rate("qps", options.qps.or(defaults.qps).unwrap_or(DEFAULT_QPS))?;
    let gateway_qps = positive_rate(
        "gateway_qps",
        options
            .gateway_qps
            .or(defaults.gateway_qps)
            .unwrap_or(DEFAULT_QPS),
    )?;

    Ok(ResolvedConfig {
        provider_name,
        kind: provider_config.kind,
        endpoint,
        model,
        api_key,
        source_language,
        target_language,
        qps,
        gateway_qps,
        temperature: defaults.temperature.unwrap_or(0.0),
    })
}

/// Settings for a standalone gateway in front of a gemini provider.
#[derive(Debug, Clone)]
pub struct ResolvedGateway {
    pub provider_name: String,
    pub endpoint: String,
    pub model: String,
    pub api_key: String,
    pub qps: f64,
}

/// Resolves `transgate serve` settings. Only gemini providers qualify; the
/// target language is not needed.
pub fn resolve_gateway(
    options: &ResolveOptions,
    config_file: &ConfigFile,
) -> Result<ResolvedGateway> {
    let defaults = &config_file.transgate;

    let provider_name = options
        .provider
        .as_ref()
        .or(defaults.provider.as_ref())
        .cloned()
        .ok_or_else(|| missing("'provider'", "serve --provider <name>"))?;
    let provider_config = find_provider(config_file, &provider_name)?;

    if provider_config.kind != ProviderKind::Gemini {
        bail!(
            "Provider '{provider_name}' already speaks chat completions\n\n\
             Only providers with kind = \"gemini\" need a gateway."
        );
    }

    let model = options
        .model
        .as_ref()
        .or(defaults.model.as_ref())
        .cloned()
        .ok_or_else(|| missing("'model'", "serve --model <name>"))?;

    let api_key = provider_config.get_api_key().ok_or_else(|| {
        let env_var = provider_config.api_key_env.as_deref().unwrap_or("GEMINI_API_KEY");
        anyhow!(
            "Provider '{provider_name}' requires an API key\n\n\
             Set the {env_var} environment variable:\n  \
             export {env_var}=\"your-api-key\""
        )
    })?;

    let qps = positive_rate(
        "gateway_qps",
        options
            .gateway_qps
            .or(defaults.gateway_qps)
            .unwrap_or(DEFAULT_QPS),
    )?;

    Ok(ResolvedGateway {
        provider_name,
        endpoint: provider_config
            .resolved_endpoint()
            .unwrap_or_else(|| DEFAULT_GEMINI_ENDPOINT.to_string()),
        model,
        api_key,
        qps,
    })
}

/// Manages loading and saving configuration files.
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Configuration lives at `$XDG_CONFIG_HOME/transgate/config.toml`.
    pub fn new() -> Self {
        Self::at(paths::config_dir().join("config.toml"))
    }

    pub fn at(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
        }
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn load(&self) -> Result<ConfigFile> {
        let contents = fs::read_to_string(&self.config_path).with_context(|| {
            format!("Failed to read config file: {}", self.config_path.display())
        })?;

        toml::from_str(&contents).with_context(|| {
            format!(
                "Failed to parse config file: {}",
                self.config_path.display()
            )
        })
    }

    /// Loads the file, or an empty config when it does not exist.
    ///
    /// A file that exists but fails to parse is still an error.
    pub fn load_or_default(&self) -> Result<ConfigFile> {
        if self.config_path.exists() {
            self.load()
        } else {
            Ok(ConfigFile::default())
        }
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}
