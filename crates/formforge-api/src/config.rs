//! Service configuration
//!
//! Defaults, then an optional TOML file, then `FORMFORGE__*` environment
//! variables (`FORMFORGE__SERVER__BIND_ADDR`, `FORMFORGE__ENGINE__PAGING__MAX_SIZE`).

use formforge_core::EngineConfig;
use serde::Deserialize;

pub const CONFIG_PATH_VAR: &str = "FORMFORGE_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "formforge.toml";

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub server: ServerConfig,
    pub rate_limit: RateLimitConfig,
    pub engine: EngineConfig,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Per client origin
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    pub submissions_per_hour: u32,
    pub burst: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            submissions_per_hour: 20,
            burst: 20,
        }
    }
}

impl ApiConfig {
    /// Load from `FORMFORGE_CONFIG` (or `formforge.toml`) and the environment
    pub fn load() -> Result<Self, config::ConfigError> {
        let path = std::env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::from_sources(config::File::with_name(&path).required(false))
    }

    fn from_sources<S>(file: S) -> Result<Self, config::ConfigError>
    where
        S: config::Source + Send + Sync + 'static,
    {
        config::Config::builder()
            .add_source(file)
            .add_source(
                config::Environment::with_prefix("FORMFORGE")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_sources() {
        let config = ApiConfig::from_sources(config::File::from_str("", config::FileFormat::Toml)).unwrap();
        assert_eq!(config.server.bind_addr, "0.0.0.0:8080");
        assert_eq!(config.rate_limit.submissions_per_hour, 20);
        assert_eq!(config.engine.submission.min_fill_time_ms, 2000);
    }

    #[test]
    fn test_file_overrides_nested_engine_settings() {
        let toml = r#"
            [rate_limit]
            burst = 5

            [engine.paging]
            max_size = 50
        "#;
        let config = ApiConfig::from_sources(config::File::from_str(toml, config::FileFormat::Toml)).unwrap();
        assert_eq!(config.rate_limit.burst, 5);
        assert_eq!(config.rate_limit.submissions_per_hour, 20);
        assert_eq!(config.engine.paging.max_size, 50);
        assert_eq!(config.engine.paging.default_size, 20);
    }
}
