//! Provider registry for managing multiple [`MetadataProvider`] implementations.
//!
//! The [`ProviderRegistry`] owns every configured provider. Each provider
//! gets its own rate limiter, except AniDB: its limiter and title cache are
//! process-wide, because AniDB throttles by client identity no matter how
//! many registries a process builds. Availability is answered from each
//! provider's [`ProviderDescriptor`] without touching the network.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use once_cell::sync::{Lazy, OnceCell};
use parking_lot::Mutex;
use tracing::debug;

use reelname_common::{ProviderKind, Result};

use super::anidb_titles::TitleCache;
use super::http::HttpClient;
use super::provider::{MetadataProvider, ProviderDescriptor};
use super::providers::jikan::JIKAN_INTERVAL;
use super::providers::{
    AnidbProvider, AnilistProvider, JikanProvider, KitsuProvider, OmdbProvider, TmdbProvider,
    TraktProvider, TvdbProvider, TvmazeProvider,
};
use super::rate_limit::{RateLimiter, ANIDB_MIN_INTERVAL};
use crate::config::Config;

const TITLE_DUMP_TIMEOUT: Duration = Duration::from_secs(60);

static ANIDB_LIMITER: OnceCell<Arc<RateLimiter>> = OnceCell::new();

static TITLE_CACHES: Lazy<Mutex<HashMap<PathBuf, Arc<TitleCache>>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

/// The process-wide AniDB limiter. The first caller fixes the interval.
fn shared_anidb_limiter(interval: Duration) -> Arc<RateLimiter> {
    let limiter = ANIDB_LIMITER
        .get_or_init(|| Arc::new(RateLimiter::with_floor(interval, ANIDB_MIN_INTERVAL)));
    if limiter.interval() != interval.max(ANIDB_MIN_INTERVAL) {
        debug!(
            requested = ?interval,
            active = ?limiter.interval(),
            "AniDB limiter already running; keeping its interval"
        );
    }
    Arc::clone(limiter)
}

/// The process-wide title cache for `cache_dir`.
fn shared_title_cache(
    cache_dir: &Path,
    ttl: Duration,
    interval: Duration,
) -> Result<Arc<TitleCache>> {
    let mut caches = TITLE_CACHES.lock();
    if let Some(cache) = caches.get(cache_dir) {
        return Ok(Arc::clone(cache));
    }
    let cache = Arc::new(TitleCache::new(
        HttpClient::new(
            ProviderKind::Anidb,
            TITLE_DUMP_TIMEOUT,
            Arc::new(RateLimiter::new(interval)),
        )?,
        cache_dir,
        ttl,
    ));
    caches.insert(cache_dir.to_path_buf(), Arc::clone(&cache));
    Ok(cache)
}

/// A registry of [`MetadataProvider`] implementations keyed by [`ProviderKind`].
///
/// Providers are stored in registration order. Registering a second provider
/// of the same kind replaces the first.
///
/// # Examples
///
/// ```rust,ignore
/// use std::sync::Arc;
/// use reelname::metadata::registry::ProviderRegistry;
///
/// let mut registry = ProviderRegistry::new();
/// registry.register(Arc::new(my_provider));
///
/// let tmdb = registry.get(ProviderKind::Tmdb);
/// ```
pub struct ProviderRegistry {
    providers: Vec<Arc<dyn MetadataProvider>>,
    titles: Option<Arc<TitleCache>>,
    anidb_limiter: Option<Arc<RateLimiter>>,
}

impl ProviderRegistry {
    /// Create an empty registry with no providers.
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
            titles: None,
            anidb_limiter: None,
        }
    }

    /// Build all nine providers from configuration.
    ///
    /// Key-gated providers without a credential are still registered; their
    /// descriptors report them unavailable. Every registry in the process
    /// shares one AniDB limiter and one title cache per cache directory.
    pub fn from_config(config: &Config) -> Result<Self> {
        let creds = &config.providers;
        let default_interval = config.rate_limit.default_interval();
        let limiter = || Arc::new(RateLimiter::new(default_interval));

        let anidb_limiter = shared_anidb_limiter(config.rate_limit.anidb_interval());
        let titles = shared_title_cache(
            &config.cache.resolved_dir(),
            config.cache.title_ttl(),
            default_interval,
        )?;

        let key = |kind| creds.credential(kind).unwrap_or_default();

        let mut registry = Self::new();
        registry.register(Arc::new(TmdbProvider::new(
            key(ProviderKind::Tmdb),
            &creds.language,
            limiter(),
        )?));
        registry.register(Arc::new(TvdbProvider::new(key(ProviderKind::Tvdb), limiter())?));
        registry.register(Arc::new(TvmazeProvider::new(limiter())?));
        registry.register(Arc::new(TraktProvider::new(key(ProviderKind::Trakt), limiter())?));
        registry.register(Arc::new(OmdbProvider::new(key(ProviderKind::Omdb), limiter())?));
        registry.register(Arc::new(AnilistProvider::new(limiter())?));
        registry.register(Arc::new(KitsuProvider::new(limiter())?));
        registry.register(Arc::new(JikanProvider::new(Arc::new(RateLimiter::new(
            default_interval.max(JIKAN_INTERVAL),
        )))?));
        registry.register(Arc::new(AnidbProvider::new(
            key(ProviderKind::Anidb),
            creds.anidb_client_version,
            Arc::clone(&anidb_limiter),
            Arc::clone(&titles),
        )?));
        registry.titles = Some(titles);
        registry.anidb_limiter = Some(anidb_limiter);

        Ok(registry)
    }

    /// Register a new metadata provider.
    pub fn register(&mut self, provider: Arc<dyn MetadataProvider>) {
        let kind = provider.kind();
        self.providers.retain(|p| p.kind() != kind);
        self.providers.push(provider);
    }

    /// Return references to all providers that are currently available
    /// (i.e. configured with valid credentials).
    pub fn available(&self) -> Vec<&dyn MetadataProvider> {
        self.providers
            .iter()
            .filter(|p| p.descriptor().is_available())
            .map(|p| p.as_ref())
            .collect()
    }

    /// Look up a provider by kind.
    ///
    /// Returns `None` if no provider of that kind has been registered.
    pub fn get(&self, kind: ProviderKind) -> Option<&dyn MetadataProvider> {
        self.providers
            .iter()
            .find(|p| p.kind() == kind)
            .map(|p| p.as_ref())
    }

    /// Descriptors of every registered provider, in registration order.
    pub fn descriptors(&self) -> Vec<ProviderDescriptor> {
        self.providers.iter().map(|p| p.descriptor()).collect()
    }

    /// The shared AniDB title cache, when built from configuration.
    pub fn title_cache(&self) -> Option<&Arc<TitleCache>> {
        self.titles.as_ref()
    }

    pub(crate) fn anidb_limiter(&self) -> Option<&Arc<RateLimiter>> {
        self.anidb_limiter.as_ref()
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::provider::{Capabilities, SearchOutcome};
    use async_trait::async_trait;
    use tempfile::tempdir;

    /// A minimal stub provider used for testing.
    struct StubProvider {
        kind: ProviderKind,
        available: bool,
    }

    #[async_trait]
    impl MetadataProvider for StubProvider {
        fn kind(&self) -> ProviderKind {
            self.kind
        }

        fn descriptor(&self) -> ProviderDescriptor {
            ProviderDescriptor::keyed(self.kind, Capabilities::BOTH, self.available)
        }

        async fn search_movie(&self, _title: &str, _year: Option<u16>) -> SearchOutcome {
            Ok(None)
        }

        async fn search_tv(&self, _title: &str, _season: u32, _episode: u32) -> SearchOutcome {
            Ok(None)
        }
    }

    fn stub(kind: ProviderKind, available: bool) -> Arc<dyn MetadataProvider> {
        Arc::new(StubProvider { kind, available })
    }

    #[test]
    fn empty_registry() {
        let registry = ProviderRegistry::new();
        assert!(registry.available().is_empty());
        assert!(registry.get(ProviderKind::Tmdb).is_none());
        assert!(registry.title_cache().is_none());
    }

    #[test]
    fn register_and_lookup() {
        let mut registry = ProviderRegistry::new();
        registry.register(stub(ProviderKind::Tmdb, true));
        registry.register(stub(ProviderKind::Omdb, false));

        assert_eq!(registry.available().len(), 1);
        assert!(registry.get(ProviderKind::Tmdb).is_some());
        assert!(registry.get(ProviderKind::Omdb).is_some()); // registered but not available
        assert!(registry.get(ProviderKind::Kitsu).is_none());
    }

    #[test]
    fn register_replaces_same_kind() {
        let mut registry = ProviderRegistry::new();
        registry.register(stub(ProviderKind::Tmdb, false));
        registry.register(stub(ProviderKind::Tmdb, true));

        assert_eq!(registry.descriptors().len(), 1);
        assert!(registry.descriptors()[0].key_present);
    }

    #[test]
    fn from_config_registers_all_nine() {
        let dir = tempdir().unwrap();
        let mut config = Config::default();
        config.cache.dir = dir.path().to_path_buf();
        config.providers.tmdb_api_key = "key".to_string();

        let registry = ProviderRegistry::from_config(&config).unwrap();
        let names: Vec<_> = registry.descriptors().iter().map(|d| d.name).collect();
        assert_eq!(
            names,
            ["tmdb", "tvdb", "tvmaze", "trakt", "omdb", "anilist", "kitsu", "jikan", "anidb"]
        );

        let available: Vec<_> = registry.available().iter().map(|p| p.kind()).collect();
        assert!(available.contains(&ProviderKind::Tmdb));
        assert!(available.contains(&ProviderKind::Tvmaze));
        assert!(!available.contains(&ProviderKind::Tvdb));
        assert!(registry.title_cache().is_some());
    }

    #[test]
    fn registries_share_anidb_services() {
        let dir = tempdir().unwrap();
        let mut config = Config::default();
        config.cache.dir = dir.path().to_path_buf();

        let first = ProviderRegistry::from_config(&config).unwrap();
        let second = ProviderRegistry::from_config(&config).unwrap();

        assert!(Arc::ptr_eq(
            first.anidb_limiter().unwrap(),
            second.anidb_limiter().unwrap()
        ));
        assert!(Arc::ptr_eq(
            first.title_cache().unwrap(),
            second.title_cache().unwrap()
        ));
        assert!(first.anidb_limiter().unwrap().interval() >= ANIDB_MIN_INTERVAL);

        // A different cache directory gets its own dump, but the same limiter.
        let other = tempdir().unwrap();
        config.cache.dir = other.path().to_path_buf();
        let third = ProviderRegistry::from_config(&config).unwrap();
        assert!(!Arc::ptr_eq(
            first.title_cache().unwrap(),
            third.title_cache().unwrap()
        ));
        assert!(Arc::ptr_eq(
            first.anidb_limiter().unwrap(),
            third.anidb_limiter().unwrap()
        ));
    }
}
