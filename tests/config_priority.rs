#![allow(clippy::unwrap_used)]
//! Config priority contract tests.
//!
//! Priority order (highest to lowest):
//! 1. CLI arguments
//! 2. Config file defaults
//! 3. Built-in defaults

use transgate::config::{ConfigFile, ProviderKind, ResolveOptions, resolve_config};
use transgate::ratelimit::DEFAULT_QPS;

fn make_config_with_defaults() -> ConfigFile {
    toml::from_str(
        r#"
[transgate]
provider = "test_provider"
model = "config_model"
from = "en"
to = "ja"
qps = 2
gateway_qps = 3
temperature = 0.3

[providers.test_provider]
endpoint = "http://test.local"
api_key = "test_key"
models = ["config_model", "cli_model"]

[providers.other_provider]
kind = "gemini"
api_key = "other_key"
"#,
    )
    .unwrap()
}

#[test]
fn test_config_file_values_apply_without_cli_options() {
    let resolved = resolve_config(&ResolveOptions::default(), &make_config_with_defaults()).unwrap();

    assert_eq!(resolved.provider_name, "test_provider");
    assert_eq!(resolved.kind, ProviderKind::OpenAi);
    assert_eq!(resolved.endpoint, "http://test.local");
    assert_eq!(resolved.model, "config_model");
    assert_eq!(resolved.source_language, "en");
    assert_eq!(resolved.target_language, "ja");
    assert_eq!(resolved.api_key.as_deref(), Some("test_key"));
    assert!((resolved.qps - 2.0).abs() < f64::EPSILON);
    assert!((resolved.gateway_qps - 3.0).abs() < f64::EPSILON);
    assert!((resolved.temperature - 0.3).abs() < f64::EPSILON);
}

#[test]
fn test_cli_options_override_config_file() {
    let options = ResolveOptions {
        from: Some("auto".to_string()),
        to: Some("ko".to_string()),
        provider: Some("other_provider".to_string()),
        model: Some("cli_model".to_string()),
        qps: Some(0.5),
        gateway_qps: Some(1.5),
    };

    let resolved = resolve_config(&options, &make_config_with_defaults()).unwrap();

    assert_eq!(resolved.provider_name, "other_provider");
    assert_eq!(resolved.kind, ProviderKind::Gemini);
    assert_eq!(resolved.model, "cli_model");
    assert_eq!(resolved.source_language, "auto");
    assert_eq!(resolved.target_language, "ko");
    assert_eq!(resolved.api_key.as_deref(), Some("other_key"));
    assert!((resolved.qps - 0.5).abs() < f64::EPSILON);
    assert!((resolved.gateway_qps - 1.5).abs() < f64::EPSILON);
}

#[test]
fn test_partial_cli_options_mix_with_file() {
    let options = ResolveOptions {
        to: Some("de".to_string()),
        ..ResolveOptions::default()
    };

    let resolved = resolve_config(&options, &make_config_with_defaults()).unwrap();

    assert_eq!(resolved.target_language, "de");
    assert_eq!(resolved.provider_name, "test_provider");
    assert_eq!(resolved.model, "config_model");
}

#[test]
fn test_built_in_defaults_fill_gaps() {
    let config: ConfigFile = toml::from_str(
        r#"
[transgate]
provider = "p"
model = "m"
to = "fr"

[providers.p]
endpoint = "http://localhost:1"
"#,
    )
    .unwrap();

    let resolved = resolve_config(&ResolveOptions::default(), &config).unwrap();

    assert_eq!(resolved.source_language, "auto");
    assert!((resolved.qps - DEFAULT_QPS).abs() < f64::EPSILON);
    assert!((resolved.gateway_qps - DEFAULT_QPS).abs() < f64::EPSILON);
    assert!(resolved.temperature.abs() < f64::EPSILON);
    assert!(resolved.api_key.is_none());
}
