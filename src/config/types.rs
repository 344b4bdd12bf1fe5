use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use reelname_common::ProviderKind;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub providers: ProvidersConfig,

    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub resolver: ResolverConfig,

    #[serde(default)]
    pub format: FormatConfig,
}

/// Credentials for the key-gated providers.
///
/// An empty string means "not configured"; the provider is then reported
/// unavailable and skipped without a request.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub tmdb_api_key: String,

    #[serde(default)]
    pub tvdb_api_key: String,

    /// Trakt application client id, sent as the `trakt-api-key` header
    #[serde(default)]
    pub trakt_client_id: String,

    #[serde(default)]
    pub omdb_api_key: String,

    /// Registered AniDB HTTP API client name
    #[serde(default)]
    pub anidb_client: String,

    #[serde(default = "default_anidb_client_version")]
    pub anidb_client_version: u32,

    /// Preferred metadata language (ISO-639-1 with optional region)
    #[serde(default = "default_language")]
    pub language: String,
}

fn default_anidb_client_version() -> u32 {
    1
}

fn default_language() -> String {
    "en-US".to_string()
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            tmdb_api_key: String::new(),
            tvdb_api_key: String::new(),
            trakt_client_id: String::new(),
            omdb_api_key: String::new(),
            anidb_client: String::new(),
            anidb_client_version: default_anidb_client_version(),
            language: default_language(),
        }
    }
}

impl ProvidersConfig {
    /// The configured credential for `kind`, if that provider needs one and
    /// it is non-empty.
    pub fn credential(&self, kind: ProviderKind) -> Option<&str> {
        let key = match kind {
            ProviderKind::Tmdb => &self.tmdb_api_key,
            ProviderKind::Tvdb => &self.tvdb_api_key,
            ProviderKind::Trakt => &self.trakt_client_id,
            ProviderKind::Omdb => &self.omdb_api_key,
            ProviderKind::Anidb => &self.anidb_client,
            ProviderKind::Tvmaze
            | ProviderKind::Anilist
            | ProviderKind::Kitsu
            | ProviderKind::Jikan => return None,
        };
        let key = key.trim();
        (!key.is_empty()).then_some(key)
    }

    /// Fill empty credentials from the environment.
    pub fn apply_env_overrides(&mut self) {
        let slots: [(&str, &mut String); 5] = [
            ("TMDB_API_KEY", &mut self.tmdb_api_key),
            ("TVDB_API_KEY", &mut self.tvdb_api_key),
            ("TRAKT_CLIENT_ID", &mut self.trakt_client_id),
            ("OMDB_API_KEY", &mut self.omdb_api_key),
            ("ANIDB_CLIENT", &mut self.anidb_client),
        ];
        for (var, slot) in slots {
            if slot.trim().is_empty() {
                if let Ok(value) = std::env::var(var) {
                    *slot = value;
                }
            }
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RateLimitConfig {
    /// Minimum gap between two requests to the same provider
    #[serde(default = "default_interval_ms")]
    pub default_interval_ms: u64,

    /// Minimum gap between AniDB requests; raised to the 3s floor if lower
    #[serde(default = "default_anidb_interval_ms")]
    pub anidb_interval_ms: u64,
}

fn default_interval_ms() -> u64 {
    250
}

fn default_anidb_interval_ms() -> u64 {
    3000
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            default_interval_ms: default_interval_ms(),
            anidb_interval_ms: default_anidb_interval_ms(),
        }
    }
}

impl RateLimitConfig {
    pub fn default_interval(&self) -> Duration {
        Duration::from_millis(self.default_interval_ms)
    }

    pub fn anidb_interval(&self) -> Duration {
        Duration::from_millis(self.anidb_interval_ms)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    /// Directory holding the AniDB title dump (tilde is expanded)
    #[serde(default = "default_cache_dir")]
    pub dir: PathBuf,

    /// Age after which the title dump is downloaded again
    #[serde(default = "default_title_ttl_days")]
    pub title_ttl_days: u64,
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from("~/.cache/reelname")
}

fn default_title_ttl_days() -> u64 {
    7
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: default_cache_dir(),
            title_ttl_days: default_title_ttl_days(),
        }
    }
}

impl CacheConfig {
    /// Cache directory with `~` expanded.
    pub fn resolved_dir(&self) -> PathBuf {
        let raw = self.dir.to_string_lossy();
        PathBuf::from(shellexpand::tilde(raw.as_ref()).as_ref())
    }

    pub fn title_ttl(&self) -> Duration {
        Duration::from_secs(self.title_ttl_days * 24 * 60 * 60)
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ResolverConfig {
    /// When the `tmdb` override is requested but TMDB has no key, resolve
    /// in automatic mode instead of returning nothing. Off by default:
    /// explicit selections are single-attempt.
    #[serde(default)]
    pub tmdb_override_fallthrough: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FormatConfig {
    #[serde(default = "default_movie_pattern")]
    pub movie_pattern: String,

    #[serde(default = "default_tv_pattern")]
    pub tv_pattern: String,
}

fn default_movie_pattern() -> String {
    "{title} ({year})".to_string()
}

fn default_tv_pattern() -> String {
    "{title} - {S}{E} - {episodeTitle}".to_string()
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            movie_pattern: default_movie_pattern(),
            tv_pattern: default_tv_pattern(),
        }
    }
}
