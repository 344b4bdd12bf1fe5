//! Multi-provider resolution with fixed fallback chains.
//!
//! The [`Resolver`] turns a [`MediaQuery`] into a [`MetadataRecord`] by
//! walking a priority-ordered chain of providers and returning the first
//! non-empty result. Which chain is walked depends on the shape of the parse
//! (episode or film) and on the anime keyword heuristic:
//!
//! | query              | chain                                              |
//! |--------------------|----------------------------------------------------|
//! | episode, anime     | anilist, jikan, kitsu, anidb, then the general TV chain |
//! | episode, general   | tvdb, tvmaze, trakt, tmdb, omdb                    |
//! | film, anime        | anilist, jikan, kitsu, then the general film chain |
//! | film, general      | tmdb, omdb, trakt                                  |
//!
//! Unavailable providers are skipped without a request. A provider error is
//! logged and treated like an empty answer; the chain simply moves on.

use std::sync::Arc;

use tracing::{debug, info, warn};

use reelname_common::{MetadataRecord, ProviderKind, Result};
use reelname_parser::{build_query, AnimeClassifier, MediaQuery, ParsedFilename};

use super::provider::ProviderDescriptor;
use super::registry::ProviderRegistry;
use crate::config::Config;

/// Anime providers tried first for episodes.
pub const TV_ANIME_CHAIN: [ProviderKind; 4] = [
    ProviderKind::Anilist,
    ProviderKind::Jikan,
    ProviderKind::Kitsu,
    ProviderKind::Anidb,
];

/// General TV providers, in priority order.
pub const TV_GENERAL_CHAIN: [ProviderKind; 5] = [
    ProviderKind::Tvdb,
    ProviderKind::Tvmaze,
    ProviderKind::Trakt,
    ProviderKind::Tmdb,
    ProviderKind::Omdb,
];

/// Anime providers tried first for films.
pub const MOVIE_ANIME_CHAIN: [ProviderKind; 3] = [
    ProviderKind::Anilist,
    ProviderKind::Jikan,
    ProviderKind::Kitsu,
];

/// General film providers, in priority order.
pub const MOVIE_GENERAL_CHAIN: [ProviderKind; 3] =
    [ProviderKind::Tmdb, ProviderKind::Omdb, ProviderKind::Trakt];

/// One search against one provider.
#[derive(Debug, Clone, Copy)]
enum Lookup<'a> {
    Movie {
        title: &'a str,
        year: Option<u16>,
    },
    Tv {
        title: &'a str,
        season: u32,
        episode: u32,
    },
}

impl Lookup<'_> {
    fn served_by(&self, descriptor: &ProviderDescriptor) -> bool {
        match self {
            Self::Movie { .. } => descriptor.serves_movies(),
            Self::Tv { .. } => descriptor.serves_tv(),
        }
    }
}

/// The fallback engine.
pub struct Resolver {
    registry: Arc<ProviderRegistry>,
    tmdb_override_fallthrough: bool,
}

impl Resolver {
    /// Create a resolver over an existing registry.
    pub fn new(registry: Arc<ProviderRegistry>) -> Self {
        Self {
            registry,
            tmdb_override_fallthrough: false,
        }
    }

    /// Build the registry and resolver from configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        let registry = Arc::new(ProviderRegistry::from_config(config)?);
        Ok(Self::new(registry)
            .with_tmdb_override_fallthrough(config.resolver.tmdb_override_fallthrough))
    }

    /// When `tmdb` is requested explicitly but unavailable, resolve
    /// automatically instead of returning nothing.
    pub fn with_tmdb_override_fallthrough(mut self, enabled: bool) -> Self {
        self.tmdb_override_fallthrough = enabled;
        self
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    /// Parse `filename` and resolve it.
    ///
    /// `provider` restricts the lookup to a single provider. `None` means
    /// no provider produced a record; the reason is only in the logs.
    pub async fn resolve(
        &self,
        filename: &str,
        provider: Option<ProviderKind>,
    ) -> Option<MetadataRecord> {
        let query = build_query(filename);
        self.resolve_query(&query, provider).await
    }

    /// Resolve an already built query.
    pub async fn resolve_query(
        &self,
        query: &MediaQuery,
        provider: Option<ProviderKind>,
    ) -> Option<MetadataRecord> {
        if query.title().is_empty() {
            info!(file = query.raw_filename(), "no title in filename");
            return None;
        }

        debug!(
            file = query.raw_filename(),
            media_type = %query.media_type(),
            title = query.title(),
            "resolving"
        );

        let record = match query.parsed() {
            ParsedFilename::Tv(tv) => {
                let lookup = Lookup::Tv {
                    title: &tv.title,
                    season: tv.season,
                    episode: tv.episode,
                };
                self.resolve_lookup(lookup, provider).await
            }
            ParsedFilename::Movie(movie) => {
                let lookup = Lookup::Movie {
                    title: &movie.title,
                    year: movie.year,
                };
                self.resolve_lookup(lookup, provider).await
            }
        };

        if record.is_none() {
            info!(file = query.raw_filename(), "no metadata found");
        }
        record
    }

    async fn resolve_lookup(
        &self,
        lookup: Lookup<'_>,
        provider: Option<ProviderKind>,
    ) -> Option<MetadataRecord> {
        if let Some(kind) = provider {
            let available = self
                .registry
                .get(kind)
                .is_some_and(|p| lookup.served_by(&p.descriptor()));
            if available {
                return self.attempt(kind, lookup).await;
            }
            if kind == ProviderKind::Tmdb && self.tmdb_override_fallthrough {
                debug!("tmdb requested but unavailable, resolving automatically");
            } else {
                info!(provider = %kind, "requested provider is not available");
                return None;
            }
        }

        let (anime_chain, general_chain, classifier): (&[ProviderKind], &[ProviderKind], _) =
            match lookup {
                Lookup::Tv { .. } => (
                    &TV_ANIME_CHAIN[..],
                    &TV_GENERAL_CHAIN[..],
                    AnimeClassifier::TV,
                ),
                Lookup::Movie { .. } => (
                    &MOVIE_ANIME_CHAIN[..],
                    &MOVIE_GENERAL_CHAIN[..],
                    AnimeClassifier::MOVIE,
                ),
            };

        let title = match lookup {
            Lookup::Tv { title, .. } | Lookup::Movie { title, .. } => title,
        };
        if classifier.is_anime(title) {
            debug!(title, "anime title, trying anime providers first");
            if let Some(record) = self.walk(anime_chain, lookup).await {
                return Some(record);
            }
        }

        self.walk(general_chain, lookup).await
    }

    /// Try each provider in order; the first record wins.
    async fn walk(&self, chain: &[ProviderKind], lookup: Lookup<'_>) -> Option<MetadataRecord> {
        for &kind in chain {
            if let Some(record) = self.attempt(kind, lookup).await {
                return Some(record);
            }
        }
        None
    }

    /// Query a single provider, folding every failure into `None`.
    async fn attempt(&self, kind: ProviderKind, lookup: Lookup<'_>) -> Option<MetadataRecord> {
        let provider = self.registry.get(kind)?;
        let descriptor = provider.descriptor();
        if !lookup.served_by(&descriptor) {
            debug!(provider = %kind, "skipped: unavailable");
            return None;
        }

        let outcome = match lookup {
            Lookup::Movie { title, year } => provider.search_movie(title, year).await,
            Lookup::Tv {
                title,
                season,
                episode,
            } => provider.search_tv(title, season, episode).await,
        };

        match outcome {
            Ok(Some(record)) => {
                debug!(provider = %kind, title = record.title(), "resolved");
                Some(renumber(record, &descriptor, lookup))
            }
            Ok(None) => {
                debug!(provider = %kind, "no match");
                None
            }
            Err(e) => {
                warn!(provider = %kind, error = %e, "provider failed");
                None
            }
        }
    }
}

/// Put the requested season/episode back on records from providers that
/// number episodes absolutely, keeping the absolute number alongside.
fn renumber(
    record: MetadataRecord,
    descriptor: &ProviderDescriptor,
    lookup: Lookup<'_>,
) -> MetadataRecord {
    match (record, lookup) {
        (MetadataRecord::Episode(mut ep), Lookup::Tv { season, episode, .. })
            if descriptor.absolute_numbering =>
        {
            ep.absolute_episode.get_or_insert(ep.episode);
            ep.season = season;
            ep.episode = episode;
            MetadataRecord::Episode(ep)
        }
        (record, _) => record,
    }
}
