//! Trait definition and descriptors for metadata providers.
//!
//! This module defines the [`MetadataProvider`] trait that every metadata
//! backend (TMDB, TVDB, TVmaze, Trakt, OMDb, AniList, Kitsu, Jikan, AniDB)
//! implements, along with the [`ProviderDescriptor`] the resolver consults to
//! decide availability without touching the network.

use async_trait::async_trait;
use serde::Serialize;

use reelname_common::{MetadataRecord, ProviderKind, Result};

// ---------------------------------------------------------------------------
// Descriptors
// ---------------------------------------------------------------------------

/// Which searches a provider can serve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Capabilities {
    pub movie: bool,
    pub tv: bool,
}

impl Capabilities {
    /// Movie and TV.
    pub const BOTH: Capabilities = Capabilities {
        movie: true,
        tv: true,
    };

    /// TV only.
    pub const TV_ONLY: Capabilities = Capabilities {
        movie: false,
        tv: true,
    };
}

/// Static facts about a configured provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderDescriptor {
    /// Short lowercase identifier.
    pub name: &'static str,
    /// Whether the provider needs a credential to be used at all.
    pub requires_key: bool,
    /// Which searches it serves.
    pub capabilities: Capabilities,
    /// Whether a non-empty credential was configured.
    pub key_present: bool,
    /// Whether returned episode numbers count continuously across seasons.
    pub absolute_numbering: bool,
}

impl ProviderDescriptor {
    /// Descriptor for a provider that works without a credential.
    pub fn keyless(kind: ProviderKind, capabilities: Capabilities) -> Self {
        Self {
            name: kind.name(),
            requires_key: false,
            capabilities,
            key_present: false,
            absolute_numbering: false,
        }
    }

    /// Descriptor for a credential-gated provider.
    pub fn keyed(kind: ProviderKind, capabilities: Capabilities, key_present: bool) -> Self {
        Self {
            name: kind.name(),
            requires_key: true,
            capabilities,
            key_present,
            absolute_numbering: false,
        }
    }

    /// Mark the provider as using absolute episode numbering.
    pub fn with_absolute_numbering(mut self) -> Self {
        self.absolute_numbering = true;
        self
    }

    /// Whether the provider may be queried at all.
    pub fn is_available(&self) -> bool {
        !self.requires_key || self.key_present
    }

    /// Whether the provider may be queried for films.
    pub fn serves_movies(&self) -> bool {
        self.is_available() && self.capabilities.movie
    }

    /// Whether the provider may be queried for episodes.
    pub fn serves_tv(&self) -> bool {
        self.is_available() && self.capabilities.tv
    }
}

// ---------------------------------------------------------------------------
// Provider trait
// ---------------------------------------------------------------------------

/// Outcome of a single provider search.
///
/// `Ok(Some(_))` is a match, `Ok(None)` a well-formed "nothing found", and
/// `Err(_)` a transport or parse failure. The resolver treats the last two
/// alike and moves on to the next provider.
pub type SearchOutcome = Result<Option<MetadataRecord>>;

/// Async trait that all metadata providers must implement.
///
/// Each provider wraps a single external API and exposes a uniform pair of
/// searches. Providers are shared behind an `Arc` so they can be used from
/// several resolution tasks at once.
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Which service this is.
    fn kind(&self) -> ProviderKind;

    /// Availability and capability facts derived from configuration.
    fn descriptor(&self) -> ProviderDescriptor;

    /// Search for a film by title, optionally constrained by year.
    async fn search_movie(&self, title: &str, year: Option<u16>) -> SearchOutcome;

    /// Look up a single episode of the series best matching `title`.
    async fn search_tv(&self, title: &str, season: u32, episode: u32) -> SearchOutcome;
}
