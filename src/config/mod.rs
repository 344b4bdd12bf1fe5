pub mod persist;
mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let mut config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    config.providers.apply_env_overrides();

    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    // Try default locations
    let default_paths = [
        "./reelname.toml",
        "~/.config/reelname/config.toml",
        "/etc/reelname/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            return load_config(path);
        }
    }

    // Return default config if no file found
    let mut config = Config::default();
    config.providers.apply_env_overrides();
    Ok(config)
}

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    if config.rate_limit.default_interval_ms == 0 {
        anyhow::bail!("rate_limit.default_interval_ms cannot be 0");
    }

    if config.cache.title_ttl_days == 0 {
        anyhow::bail!("cache.title_ttl_days must be at least 1");
    }

    if config.format.movie_pattern.trim().is_empty() {
        anyhow::bail!("format.movie_pattern cannot be empty");
    }
    if config.format.tv_pattern.trim().is_empty() {
        anyhow::bail!("format.tv_pattern cannot be empty");
    }

    if config.rate_limit.anidb_interval_ms < 3000 {
        tracing::warn!(
            configured_ms = config.rate_limit.anidb_interval_ms,
            "AniDB interval below 3000ms; the 3s floor will be used"
        );
    }

    if config.resolver.tmdb_override_fallthrough && config.providers.tmdb_api_key.is_empty() {
        tracing::debug!("tmdb override will fall through to automatic resolution");
    }

    Ok(())
}
