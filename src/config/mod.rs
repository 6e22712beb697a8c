mod manager;

pub use manager::{
    ConfigFile, ConfigManager, ProviderConfig, ProviderKind, ResolveOptions, ResolvedConfig,
    ResolvedGateway, TransgateConfig, find_provider, resolve_config, resolve_gateway,
};
